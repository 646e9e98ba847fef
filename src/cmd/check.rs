use std::path::PathBuf;

use recast::convert::{Catalog, Result};

#[derive(clap::Args)]
pub struct Args {
	/// Schema catalog JSON file.
	pub catalog: PathBuf,
}

/// Resolve a catalog and print each record with its fields.
pub fn run(args: Args) -> Result<()> {
	let Args { catalog: path } = args;

	let catalog = Catalog::load(&path)?;

	println!("catalog: {}", path.display());
	println!("records: {}", catalog.len());
	for (name, schema) in catalog.iter() {
		println!("  {name}: {} fields", schema.fields.len());
		for field in &schema.fields {
			let required = if field.required { " required" } else { "" };
			let omit = if field.omit_empty { " omit_empty" } else { "" };
			println!("    {} ({}): {} [{}]{required}{omit}", field.name, field.key, field.declared, field.semantic.label());
		}
	}

	Ok(())
}
