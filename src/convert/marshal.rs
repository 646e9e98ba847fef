use serde_json::{Map, Number};
use tracing::debug;

use crate::convert::{ConvertError, DeclaredType, Instance, Kind, RecordInstance, Result, SchemaRef, Semantic, TimeFormat, Value};

/// Temporal formats applied while marshalling.
#[derive(Debug, Clone)]
pub struct MarshalOptions {
	/// Pattern used to render `Date` instances.
	pub date_format: TimeFormat,
	/// Pattern used to render `DateTime` instances.
	pub datetime_format: TimeFormat,
}

impl Default for MarshalOptions {
	fn default() -> Self {
		Self {
			date_format: TimeFormat::iso_date(),
			datetime_format: TimeFormat::iso_datetime(),
		}
	}
}

impl MarshalOptions {
	/// Custom temporal patterns.
	pub fn with_formats(date_format: TimeFormat, datetime_format: TimeFormat) -> Self {
		Self {
			date_format,
			datetime_format,
		}
	}
}

/// Marshal an instance into a value tree with default options.
pub fn marshal(instance: &Instance, declared: &DeclaredType) -> Result<Value> {
	marshal_with(instance, declared, &MarshalOptions::default())
}

/// Marshal an instance into a value tree.
///
/// Fields are emitted under their source keys in declared order. Absent fields
/// are never emitted; `omit_empty` fields are also dropped when null or empty.
/// Recursion follows the declared type, so its depth is bounded by schema
/// nesting.
pub fn marshal_with(instance: &Instance, declared: &DeclaredType, options: &MarshalOptions) -> Result<Value> {
	declared.check()?;
	debug!(root = %declared, "marshal start");
	marshal_value(instance, declared, options, "$")
}

fn marshal_value(instance: &Instance, declared: &DeclaredType, options: &MarshalOptions, path: &str) -> Result<Value> {
	match (declared, instance) {
		(DeclaredType::Optional(_), Instance::Null) => Ok(Value::Null),
		(DeclaredType::Optional(inner), _) => marshal_value(instance, inner, options, path),
		(DeclaredType::Primitive(kind), _) => marshal_primitive(*kind, instance, options)?.ok_or_else(|| mismatch(declared, instance, path)),
		(DeclaredType::Union(_), _) => marshal_union_member(declared, instance, options)?.ok_or_else(|| mismatch(declared, instance, path)),
		(DeclaredType::List(inner), Instance::List(items)) => {
			let mut out = Vec::with_capacity(items.len());
			for (idx, item) in items.iter().enumerate() {
				out.push(marshal_value(item, inner, options, &format!("{path}[{idx}]"))?);
			}
			Ok(Value::Array(out))
		}
		(DeclaredType::Record(schema), Instance::Record(record)) if same_schema(schema, record) => marshal_record(schema, record, options, path),
		_ => Err(mismatch(declared, instance, path)),
	}
}

fn marshal_record(schema: &SchemaRef, record: &RecordInstance, options: &MarshalOptions, path: &str) -> Result<Value> {
	let mut out = Map::new();

	for field in &schema.fields {
		let field_path = format!("{path}.{}", field.key);
		let Some(value) = record.get(&field.name) else {
			if field.required && !field.omit_empty {
				return Err(ConvertError::InstanceMismatch {
					expected: field.declared.to_string(),
					found: "absent",
					path: field_path,
				});
			}
			continue;
		};

		if field.omit_empty && is_empty(value) {
			continue;
		}

		if let (Semantic::Enum(variants), Instance::String(text)) = (&field.semantic, value)
			&& !variants.iter().any(|variant| **variant == **text)
		{
			return Err(ConvertError::InvalidEnumVariant {
				field: field.name.to_string(),
				path: field_path,
				value: text.clone(),
			});
		}

		let rendered = marshal_value(value, &field.declared, options, &field_path)?;
		out.insert(field.key.to_string(), rendered);
	}

	Ok(Value::Object(out))
}

/// `Ok(None)` when the instance does not fit `kind`; non-finite floats never fit.
fn marshal_primitive(kind: Kind, instance: &Instance, options: &MarshalOptions) -> Result<Option<Value>> {
	let rendered = match (kind, instance) {
		(Kind::Null, Instance::Null) => Some(Value::Null),
		(Kind::Bool, Instance::Bool(flag)) => Some(Value::Bool(*flag)),
		(Kind::Integer, Instance::Integer(int)) => Some(Value::from(*int)),
		(Kind::Float, Instance::Float(float)) => Number::from_f64(*float).map(Value::Number),
		(Kind::String, Instance::String(text)) => Some(Value::String(text.clone())),
		(Kind::String, Instance::Date(date)) => Some(Value::String(options.date_format.format_date(*date)?)),
		(Kind::String, Instance::DateTime(datetime)) => Some(Value::String(options.datetime_format.format_datetime(*datetime)?)),
		_ => None,
	};
	Ok(rendered)
}

/// First member accepting the instance, under the validator's member rules.
fn marshal_union_member(member: &DeclaredType, instance: &Instance, options: &MarshalOptions) -> Result<Option<Value>> {
	match member {
		DeclaredType::Primitive(kind) => marshal_primitive(*kind, instance, options),
		DeclaredType::Optional(_) if matches!(instance, Instance::Null) => Ok(Some(Value::Null)),
		DeclaredType::Optional(inner) => marshal_union_member(inner, instance, options),
		DeclaredType::Union(members) => {
			for nested in members {
				if let Some(rendered) = marshal_union_member(nested, instance, options)? {
					return Ok(Some(rendered));
				}
			}
			Ok(None)
		}
		DeclaredType::Record(_) | DeclaredType::List(_) => Ok(None),
	}
}

fn same_schema(schema: &SchemaRef, record: &RecordInstance) -> bool {
	SchemaRef::ptr_eq(schema, &record.schema) || schema.name == record.schema.name
}

fn is_empty(value: &Instance) -> bool {
	match value {
		Instance::Null => true,
		Instance::String(text) => text.is_empty(),
		Instance::List(items) => items.is_empty(),
		Instance::Record(record) => record.fields.iter().all(|slot| slot.value.is_none()),
		_ => false,
	}
}

fn mismatch(declared: &DeclaredType, instance: &Instance, path: &str) -> ConvertError {
	ConvertError::InstanceMismatch {
		expected: declared.to_string(),
		found: instance.variant_name(),
		path: path.to_owned(),
	}
}

#[cfg(test)]
mod tests {
	use chrono::NaiveDate;
	use serde_json::json;

	use super::{MarshalOptions, marshal, marshal_with};
	use crate::convert::{ConvertError, DeclaredType, FieldDescriptor, Instance, RecordInstance, Schema, Semantic, TimeFormat};

	#[test]
	fn fields_are_renamed_to_source_keys() {
		let schema = Schema::new("Item", vec![FieldDescriptor::required("first_val", DeclaredType::string()).with_key("firstVal")]);
		let record = RecordInstance::empty(&schema).with("first_val", Some(Instance::String("hello".to_owned())));
		let got = marshal(&Instance::Record(record), &DeclaredType::record(&schema)).expect("marshals");
		assert_eq!(got, json!({"firstVal": "hello"}));
	}

	#[test]
	fn omit_empty_drops_null_and_empty_values() {
		let schema = Schema::new(
			"Address",
			vec![
				FieldDescriptor::new("street", DeclaredType::optional(DeclaredType::string())).omit_empty(),
				FieldDescriptor::new("names", DeclaredType::optional(DeclaredType::list(DeclaredType::string()))).omit_empty(),
				FieldDescriptor::new("note", DeclaredType::optional(DeclaredType::string())),
			],
		);
		let record = RecordInstance::empty(&schema)
			.with("street", Some(Instance::Null))
			.with("names", Some(Instance::List(Vec::new())))
			.with("note", Some(Instance::Null));
		let got = marshal(&Instance::Record(record), &DeclaredType::record(&schema)).expect("marshals");
		assert_eq!(got, json!({"note": null}));
	}

	#[test]
	fn absent_required_field_is_rejected() {
		let schema = Schema::new("Item", vec![FieldDescriptor::required("a", DeclaredType::string())]);
		let err = marshal(&Instance::Record(RecordInstance::empty(&schema)), &DeclaredType::record(&schema)).expect_err("a is required");
		assert!(matches!(err, ConvertError::InstanceMismatch { found: "absent", ref path, .. } if path == "$.a"));
	}

	#[test]
	fn dates_use_caller_formats() {
		let schema = Schema::new("Holder", vec![FieldDescriptor::required("dob", DeclaredType::string()).with_semantic(Semantic::Date)]);
		let date = NaiveDate::from_ymd_opt(1980, 2, 28).expect("valid date");
		let record = Instance::Record(RecordInstance::empty(&schema).with("dob", Some(Instance::Date(date))));

		let iso = marshal(&record, &DeclaredType::record(&schema)).expect("iso");
		assert_eq!(iso, json!({"dob": "1980-02-28"}));

		let options = MarshalOptions::with_formats(TimeFormat::new("%d %B %y").expect("valid"), TimeFormat::iso_datetime());
		let custom = marshal_with(&record, &DeclaredType::record(&schema), &options).expect("custom");
		assert_eq!(custom, json!({"dob": "28 February 80"}));
	}

	#[test]
	fn list_order_is_preserved() {
		let ty = DeclaredType::list(DeclaredType::integer());
		let list = Instance::List(vec![Instance::Integer(3), Instance::Integer(1), Instance::Integer(2)]);
		assert_eq!(marshal(&list, &ty).expect("marshals"), json!([3, 1, 2]));
	}

	#[test]
	fn union_picks_member_by_instance() {
		let ty = DeclaredType::union(vec![DeclaredType::string(), DeclaredType::integer()]);
		assert_eq!(marshal(&Instance::Integer(4), &ty).expect("integer member"), json!(4));
		assert!(marshal(&Instance::Bool(true), &ty).is_err());
	}

	#[test]
	fn union_optional_and_nested_members_render() {
		let optional = DeclaredType::union(vec![DeclaredType::optional(DeclaredType::string()), DeclaredType::integer()]);
		assert_eq!(marshal(&Instance::Null, &optional).expect("optional member"), json!(null));
		assert_eq!(marshal(&Instance::String("x".to_owned()), &optional).expect("inner string"), json!("x"));

		let nested = DeclaredType::union(vec![DeclaredType::union(vec![DeclaredType::string()]), DeclaredType::integer()]);
		assert_eq!(marshal(&Instance::String("x".to_owned()), &nested).expect("nested member"), json!("x"));
		assert!(matches!(
			marshal(&Instance::Null, &nested),
			Err(ConvertError::InstanceMismatch { found: "Null", .. })
		));
	}

	#[test]
	fn wrong_instance_shape_reports_path() {
		let ty = DeclaredType::list(DeclaredType::string());
		let err = marshal(&Instance::List(vec![Instance::Integer(1)]), &ty).expect_err("integer is not string");
		assert!(matches!(err, ConvertError::InstanceMismatch { found: "Integer", ref path, .. } if path == "$[0]"));
	}

	#[test]
	fn enum_variant_is_checked() {
		let schema = Schema::new(
			"Account",
			vec![FieldDescriptor::required("kind", DeclaredType::string()).with_semantic(Semantic::enumeration(["SAVING"]))],
		);
		let record = Instance::Record(RecordInstance::empty(&schema).with("kind", Some(Instance::String("LOAN".to_owned()))));
		assert!(matches!(
			marshal(&record, &DeclaredType::record(&schema)),
			Err(ConvertError::InvalidEnumVariant { ref path, .. }) if path == "$.kind"
		));
	}

	#[test]
	fn invalid_union_schema_fails_before_rendering() {
		let schema = Schema::new("Item", vec![FieldDescriptor::new("a", DeclaredType::string())]);
		let ty = DeclaredType::union(vec![DeclaredType::string(), DeclaredType::record(&schema)]);
		let err = marshal(&Instance::String("x".to_owned()), &ty).expect_err("bad union");
		assert!(matches!(err, ConvertError::InvalidUnionSchema { .. }));
	}
}
