use thiserror::Error;

use crate::convert::ValueTag;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors produced while inspecting schemas and converting values.
#[derive(Debug, Error)]
pub enum ConvertError {
	/// Declared type is incompatible with the concrete value tag.
	#[error("schema mismatch at {path}: expected {expected}, got {found}")]
	SchemaMismatch {
		/// Rendered declared type.
		expected: String,
		/// Concrete tag of the offending value.
		found: ValueTag,
		/// Location of the offending value (`$` for the root).
		path: String,
	},
	/// A required field was absent from the object.
	#[error("missing field {key} in {received}")]
	MissingField {
		/// Expected source key.
		key: String,
		/// Object as it was received.
		received: serde_json::Value,
	},
	/// A union declares a composite member.
	#[error("invalid union schema {union}: members must be primitive")]
	InvalidUnionSchema {
		/// Rendered union type.
		union: String,
	},
	/// Internal engine invariant was broken.
	#[error("structural failure: {reason}")]
	StructuralFailure {
		/// Which invariant failed.
		reason: String,
	},
	/// Date/datetime/enum semantic declared on a non-string field.
	#[error("invalid semantic {semantic} on field {field} of {record}: field type is {declared}")]
	InvalidSemantic {
		/// Owning record name.
		record: String,
		/// Canonical field name.
		field: String,
		/// Semantic label.
		semantic: &'static str,
		/// Rendered field type.
		declared: String,
	},
	/// Two fields of one record share a name or source key.
	#[error("duplicate field {name} in {record}")]
	DuplicateField {
		/// Owning record name.
		record: String,
		/// Repeated canonical name or source key.
		name: String,
	},
	/// Catalog references a record that was never declared.
	#[error("unknown record {name} referenced from {from}")]
	UnknownRecord {
		/// Missing record name.
		name: String,
		/// Record holding the reference.
		from: String,
	},
	/// Catalog records reference each other in a loop.
	#[error("schema cycle through {name}")]
	SchemaCycle {
		/// Record that closes the cycle.
		name: String,
	},
	/// Date or datetime string did not match its format.
	#[error("invalid temporal value {value:?} for field {field} at {path} (format {format:?})")]
	InvalidTemporal {
		/// Canonical field name.
		field: String,
		/// Location of the offending value.
		path: String,
		/// Offending string.
		value: String,
		/// Pattern used for parsing.
		format: String,
	},
	/// Date/time pattern is not a valid strftime pattern for the value it renders.
	#[error("invalid time format {pattern:?}")]
	InvalidTimeFormat {
		/// Offending pattern.
		pattern: String,
	},
	/// Enum field value is not one of the declared variants.
	#[error("invalid enum variant {value:?} for field {field} at {path}")]
	InvalidEnumVariant {
		/// Canonical field name.
		field: String,
		/// Location of the offending value.
		path: String,
		/// Offending string.
		value: String,
	},
	/// Integer does not fit the signed 64-bit instance representation.
	#[error("integer out of range at {path}: {value}")]
	IntegerOutOfRange {
		/// Location of the offending value.
		path: String,
		/// Rendered number.
		value: String,
	},
	/// Data nesting exceeded the configured limit.
	#[error("unmarshal depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Conversion would create more work items than allowed.
	#[error("unmarshal item budget exceeded (max={max})")]
	TooManyItems {
		/// Configured item ceiling.
		max: usize,
	},
	/// Instance does not fit the declared type during marshal or model extraction.
	#[error("instance mismatch at {path}: expected {expected}, got {found}")]
	InstanceMismatch {
		/// Rendered declared type.
		expected: String,
		/// Instance variant name.
		found: &'static str,
		/// Location of the offending instance.
		path: String,
	},
	/// JSON text encode/decode failure.
	#[error("json: {0}")]
	Json(#[from] serde_json::Error),
	/// Filesystem failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
}
