#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "recast", about = "Schema-directed JSON conversion tools")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Load a schema catalog and list its records.
	Check(cmd::check::Args),
	/// Unmarshal a JSON document against a catalog record.
	Unmarshal(cmd::unmarshal::Args),
	/// Unmarshal then marshal a JSON document and compare.
	Roundtrip(cmd::roundtrip::Args),
}

fn main() {
	init_tracing();
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> recast::convert::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Check(args) => cmd::check::run(args),
		Commands::Unmarshal(args) => cmd::unmarshal::run(args),
		Commands::Roundtrip(args) => cmd::roundtrip::run(args),
	}
}

fn init_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.with_writer(std::io::stderr)
		.try_init();
}
