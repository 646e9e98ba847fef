use recast::convert::{Result, unmarshal_with};

use crate::cmd::util::{InputArgs, emit_json, instance_to_json, load_input, print_instance};

#[derive(clap::Args)]
pub struct Args {
	#[command(flatten)]
	pub input: InputArgs,
	#[arg(long)]
	pub json: bool,
}

/// Unmarshal the document and print the instance tree.
pub fn run(args: Args) -> Result<()> {
	let Args { input, json } = args;

	let loaded = load_input(&input)?;
	let instance = unmarshal_with(loaded.value, &loaded.declared, &loaded.unmarshal)?;

	if json {
		return emit_json(&UnmarshalJson {
			root: loaded.root_label,
			instance: instance_to_json(&instance),
		});
	}

	println!("root: {}", loaded.root_label);
	println!("instance:");
	print_instance(&instance, 2);
	Ok(())
}

#[derive(serde::Serialize)]
struct UnmarshalJson {
	root: String,
	instance: serde_json::Value,
}
