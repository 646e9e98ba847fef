//! Schema-directed conversion between untyped JSON value trees and typed records.

/// Schema model, validator, and the unmarshal/marshal engines.
pub mod convert;
