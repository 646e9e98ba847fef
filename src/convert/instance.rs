use chrono::{NaiveDate, NaiveDateTime};

use crate::convert::{ConvertError, FromInstance, Result, SchemaRef};

/// Typed result of unmarshalling; the input of marshalling.
#[derive(Debug, Clone, PartialEq)]
pub enum Instance {
	/// Null value.
	Null,
	/// Boolean.
	Bool(bool),
	/// Signed integer.
	Integer(i64),
	/// Float.
	Float(f64),
	/// String (plain or enum variant).
	String(String),
	/// Calendar date.
	Date(NaiveDate),
	/// Local date and time.
	DateTime(NaiveDateTime),
	/// Ordered list.
	List(Vec<Instance>),
	/// Record built from a schema.
	Record(RecordInstance),
}

impl Instance {
	/// Variant name used in diagnostics.
	pub fn variant_name(&self) -> &'static str {
		match self {
			Self::Null => "Null",
			Self::Bool(_) => "Bool",
			Self::Integer(_) => "Integer",
			Self::Float(_) => "Float",
			Self::String(_) => "String",
			Self::Date(_) => "Date",
			Self::DateTime(_) => "DateTime",
			Self::List(_) => "List",
			Self::Record(_) => "Record",
		}
	}

	/// Borrow the record payload.
	pub fn as_record(&self) -> Option<&RecordInstance> {
		match self {
			Self::Record(record) => Some(record),
			_ => None,
		}
	}

	/// Borrow the list payload.
	pub fn as_list(&self) -> Option<&[Instance]> {
		match self {
			Self::List(items) => Some(items),
			_ => None,
		}
	}

	/// Borrow the string payload.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(value) => Some(value),
			_ => None,
		}
	}
}

/// One field of a record instance.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSlot {
	/// Canonical field name.
	pub name: Box<str>,
	/// Field value; `None` when the source object did not contain the field.
	pub value: Option<Instance>,
}

/// Record instance holding one slot per schema field, in declared order.
#[derive(Debug, Clone)]
pub struct RecordInstance {
	/// Schema this record was built from.
	pub schema: SchemaRef,
	/// Field slots in declared order.
	pub fields: Vec<FieldSlot>,
}

impl RecordInstance {
	/// Record with every field absent.
	pub fn empty(schema: &SchemaRef) -> Self {
		let fields = schema
			.fields
			.iter()
			.map(|field| FieldSlot {
				name: field.name.clone(),
				value: None,
			})
			.collect();
		Self {
			schema: SchemaRef::clone(schema),
			fields,
		}
	}

	/// Record type name.
	pub fn type_name(&self) -> &str {
		&self.schema.name
	}

	/// Borrow a present field value by canonical name.
	pub fn get(&self, name: &str) -> Option<&Instance> {
		self.fields
			.iter()
			.find(|slot| &*slot.name == name)
			.and_then(|slot| slot.value.as_ref())
	}

	/// Set a field by canonical name; returns `false` for unknown names.
	pub fn set(&mut self, name: &str, value: Instance) -> bool {
		match self.fields.iter_mut().find(|slot| &*slot.name == name) {
			Some(slot) => {
				slot.value = Some(value);
				true
			}
			None => false,
		}
	}

	/// Builder-style [`RecordInstance::set`] that skips `None`.
	pub fn with(mut self, name: &str, value: Option<Instance>) -> Self {
		if let Some(value) = value {
			self.set(name, value);
		}
		self
	}

	/// Move a field value out, leaving it absent.
	pub fn take(&mut self, name: &str) -> Option<Instance> {
		self.fields
			.iter_mut()
			.find(|slot| &*slot.name == name)
			.and_then(|slot| slot.value.take())
	}

	/// Move a field out and convert it; absence is an error.
	pub fn take_required<T: FromInstance>(&mut self, name: &str) -> Result<T> {
		let path = format!("{}.{name}", self.schema.name);
		let value = self.take(name).ok_or_else(|| ConvertError::InstanceMismatch {
			expected: T::describe(),
			found: "absent",
			path: path.clone(),
		})?;
		T::from_instance(value, &path)
	}

	/// Move a field out and convert it; absence and null both yield `None`.
	pub fn take_optional<T: FromInstance>(&mut self, name: &str) -> Result<Option<T>> {
		let path = format!("{}.{name}", self.schema.name);
		match self.take(name) {
			None | Some(Instance::Null) => Ok(None),
			Some(value) => T::from_instance(value, &path).map(Some),
		}
	}
}

impl PartialEq for RecordInstance {
	fn eq(&self, other: &Self) -> bool {
		SchemaRef::ptr_eq(&self.schema, &other.schema) && self.fields == other.fields
	}
}
