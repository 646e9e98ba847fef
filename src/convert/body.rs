use crate::convert::{DeclaredType, Instance, MarshalOptions, Result, UnmarshalOptions, Value, marshal_with, unmarshal_with};

/// Decode a response body and unmarshal it.
///
/// An empty or all-whitespace body decodes as `null`.
pub fn decode_response_body(text: &str, declared: &DeclaredType, options: &UnmarshalOptions) -> Result<Instance> {
	let value = if text.trim().is_empty() { Value::Null } else { serde_json::from_str(text)? };
	unmarshal_with(value, declared, options)
}

/// Marshal an instance and encode it as a compact JSON request body.
pub fn encode_request_body(instance: &Instance, declared: &DeclaredType, options: &MarshalOptions) -> Result<String> {
	let value = marshal_with(instance, declared, options)?;
	Ok(serde_json::to_string(&value)?)
}
