use std::fmt;

/// Untyped JSON value tree consumed and produced by the engines.
pub type Value = serde_json::Value;

/// Concrete tag of a [`Value`], with numbers split into integer and float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueTag {
	/// JSON `null`.
	Null,
	/// JSON boolean.
	Bool,
	/// Number representable as `i64` or `u64`.
	Integer,
	/// Any other number.
	Float,
	/// JSON string.
	String,
	/// JSON array.
	Array,
	/// JSON object.
	Object,
}

impl ValueTag {
	/// Classify a value.
	pub fn of(value: &Value) -> Self {
		match value {
			Value::Null => Self::Null,
			Value::Bool(_) => Self::Bool,
			Value::Number(number) if number.is_i64() || number.is_u64() => Self::Integer,
			Value::Number(_) => Self::Float,
			Value::String(_) => Self::String,
			Value::Array(_) => Self::Array,
			Value::Object(_) => Self::Object,
		}
	}

	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool => "bool",
			Self::Integer => "integer",
			Self::Float => "float",
			Self::String => "string",
			Self::Array => "array",
			Self::Object => "object",
		}
	}
}

impl fmt::Display for ValueTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self {
			Self::Null => "Null",
			Self::Bool => "Bool",
			Self::Integer => "Integer",
			Self::Float => "Float",
			Self::String => "String",
			Self::Array => "Array",
			Self::Object => "Object",
		};
		f.write_str(label)
	}
}
