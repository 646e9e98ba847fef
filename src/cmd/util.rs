use std::path::PathBuf;

use recast::convert::{
	Catalog, ConvertError, DeclaredType, Instance, MarshalOptions, Result, TimeFormat, UnmarshalOptions, Value,
};

/// Input selection shared by the conversion commands.
#[derive(clap::Args)]
pub struct InputArgs {
	/// Schema catalog JSON file.
	pub catalog: PathBuf,
	/// JSON document to convert.
	pub data: PathBuf,
	/// Catalog record the document root is declared as.
	#[arg(long)]
	pub root: String,
	/// Treat the document root as a list of `--root` records.
	#[arg(long)]
	pub list: bool,
	/// strftime pattern for date fields.
	#[arg(long = "date-format")]
	pub date_format: Option<String>,
	/// strftime pattern for datetime fields.
	#[arg(long = "datetime-format")]
	pub datetime_format: Option<String>,
}

/// Loaded catalog, root type, document and formats for one conversion run.
pub(crate) struct Loaded {
	pub root_label: String,
	pub declared: DeclaredType,
	pub value: Value,
	pub unmarshal: UnmarshalOptions,
	pub marshal: MarshalOptions,
}

pub(crate) fn load_input(args: &InputArgs) -> Result<Loaded> {
	let catalog = Catalog::load(&args.catalog)?;
	let record = catalog.record_type(&args.root).ok_or_else(|| ConvertError::UnknownRecord {
		name: args.root.clone(),
		from: "--root".to_owned(),
	})?;
	let (declared, root_label) = if args.list {
		(DeclaredType::list(record), format!("List[{}]", args.root))
	} else {
		(record, args.root.clone())
	};

	let date_format = match &args.date_format {
		Some(pattern) => TimeFormat::new(pattern)?,
		None => TimeFormat::iso_date(),
	};
	let datetime_format = match &args.datetime_format {
		Some(pattern) => TimeFormat::new(pattern)?,
		None => TimeFormat::iso_datetime(),
	};

	let text = std::fs::read_to_string(&args.data)?;
	let value: Value = serde_json::from_str(&text)?;

	Ok(Loaded {
		root_label,
		declared,
		value,
		unmarshal: UnmarshalOptions::with_formats(date_format.clone(), datetime_format.clone()),
		marshal: MarshalOptions::with_formats(date_format, datetime_format),
	})
}

/// Print a pretty JSON payload to stdout.
pub(crate) fn emit_json<T: serde::Serialize>(payload: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(payload)?);
	Ok(())
}

/// Render an instance tree as JSON for `--json` output.
pub(crate) fn instance_to_json(instance: &Instance) -> serde_json::Value {
	use serde_json::{Map, Value as JsonValue};

	match instance {
		Instance::Null => JsonValue::Null,
		Instance::Bool(v) => serde_json::json!(v),
		Instance::Integer(v) => serde_json::json!(v),
		Instance::Float(v) => serde_json::json!(v),
		Instance::String(v) => serde_json::json!(v),
		Instance::Date(v) => serde_json::json!(v.to_string()),
		Instance::DateTime(v) => serde_json::json!(v.to_string()),
		Instance::List(items) => JsonValue::Array(items.iter().map(instance_to_json).collect()),
		Instance::Record(record) => {
			let fields: Map<String, JsonValue> = record
				.fields
				.iter()
				.filter_map(|slot| slot.value.as_ref().map(|value| (slot.name.to_string(), instance_to_json(value))))
				.collect();

			let mut out = Map::new();
			out.insert("type".to_owned(), serde_json::json!(record.type_name()));
			out.insert("fields".to_owned(), JsonValue::Object(fields));
			JsonValue::Object(out)
		}
	}
}

/// Print an instance tree as indented text.
pub(crate) fn print_instance(instance: &Instance, indent: usize) {
	let pad = " ".repeat(indent);
	match instance {
		Instance::Null => println!("{pad}null"),
		Instance::Bool(v) => println!("{pad}{v}"),
		Instance::Integer(v) => println!("{pad}{v}"),
		Instance::Float(v) => println!("{pad}{v:?}"),
		Instance::String(v) => println!("{pad}\"{v}\""),
		Instance::Date(v) => println!("{pad}date {v}"),
		Instance::DateTime(v) => println!("{pad}datetime {v}"),
		Instance::List(items) => {
			println!("{pad}[");
			for item in items {
				print_instance(item, indent + 2);
			}
			println!("{pad}]");
		}
		Instance::Record(record) => {
			println!("{pad}{} {{", record.type_name());
			for slot in &record.fields {
				match &slot.value {
					None => println!("{pad}  {} = <absent>", slot.name),
					Some(value @ (Instance::Record(_) | Instance::List(_))) => {
						println!("{pad}  {} =", slot.name);
						print_instance(value, indent + 4);
					}
					Some(value) => {
						print!("{pad}  {} = ", slot.name);
						print_instance(value, 0);
					}
				}
			}
			println!("{pad}}}");
		}
	}
}
