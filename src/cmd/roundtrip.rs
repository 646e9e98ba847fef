use recast::convert::{Result, marshal_with, unmarshal_with};

use crate::cmd::util::{InputArgs, emit_json, load_input};

#[derive(clap::Args)]
pub struct Args {
	#[command(flatten)]
	pub input: InputArgs,
	#[arg(long)]
	pub json: bool,
}

/// Unmarshal then marshal the document and report whether the output matches.
pub fn run(args: Args) -> Result<()> {
	let Args { input, json } = args;

	let loaded = load_input(&input)?;
	let instance = unmarshal_with(loaded.value.clone(), &loaded.declared, &loaded.unmarshal)?;
	let output = marshal_with(&instance, &loaded.declared, &loaded.marshal)?;
	let equal = output == loaded.value;

	if json {
		return emit_json(&RoundtripJson {
			root: loaded.root_label,
			equal,
			output,
		});
	}

	println!("root: {}", loaded.root_label);
	println!("equal: {equal}");
	println!("output:");
	println!("{}", serde_json::to_string_pretty(&output)?);
	Ok(())
}

#[derive(serde::Serialize)]
struct RoundtripJson {
	root: String,
	equal: bool,
	output: serde_json::Value,
}
