mod body;
mod catalog;
mod error;
mod instance;
mod marshal;
mod model;
mod schema;
mod temporal;
mod unmarshal;
mod validate;
mod value;

/// Whole-body response decoding and request encoding.
pub use body::{decode_response_body, encode_request_body};
/// JSON-declared record schema catalog.
pub use catalog::Catalog;
/// Error and result aliases.
pub use error::{ConvertError, Result};
/// Typed instance tree produced by unmarshalling.
pub use instance::{FieldSlot, Instance, RecordInstance};
/// Instance-to-value conversion entry points and options.
pub use marshal::{MarshalOptions, marshal, marshal_with};
/// Typed model traits and helpers.
pub use model::{FromInstance, IntoInstance, Model, marshal_model, model_from_instance, unmarshal_model};
/// Declared type and record schema representation.
pub use schema::{DeclaredType, FieldDescriptor, Kind, Schema, SchemaRef, Semantic};
/// Date and datetime text formats.
pub use temporal::{DEFAULT_DATE_FORMAT, DEFAULT_DATETIME_FORMAT, TimeFormat};
/// Value-to-instance conversion entry points and options.
pub use unmarshal::{UnmarshalOptions, unmarshal, unmarshal_with};
/// Shape validation against a declared type.
pub use validate::validate;
/// Generic value tree and its tags.
pub use value::{Value, ValueTag};
