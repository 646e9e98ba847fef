use crate::convert::{ConvertError, DeclaredType, Result, Value, ValueTag};

/// Check a value's top-level shape against a declared type.
///
/// Only the outermost layer is inspected: record fields and list elements are
/// validated as the engine produces them.
pub fn validate(value: &Value, declared: &DeclaredType) -> Result<()> {
	validate_at(value, declared, "$")
}

pub(crate) fn validate_at(value: &Value, declared: &DeclaredType, path: &str) -> Result<()> {
	let tag = ValueTag::of(value);
	let mut current = declared;

	loop {
		let accepted = match current {
			DeclaredType::Primitive(kind) => kind.accepts(tag),
			DeclaredType::Union(members) => {
				if members.is_empty() || members.iter().any(DeclaredType::is_composite) {
					return Err(ConvertError::InvalidUnionSchema { union: current.to_string() });
				}
				members.iter().any(|member| accepts_primitive(member, tag))
			}
			DeclaredType::Record(_) => tag == ValueTag::Object,
			DeclaredType::List(_) => tag == ValueTag::Array,
			DeclaredType::Optional(inner) => {
				if tag == ValueTag::Null {
					return Ok(());
				}
				current = inner;
				continue;
			}
		};

		if accepted {
			return Ok(());
		}
		return Err(mismatch(declared, tag, path));
	}
}

fn accepts_primitive(member: &DeclaredType, tag: ValueTag) -> bool {
	match member {
		DeclaredType::Primitive(kind) => kind.accepts(tag),
		DeclaredType::Optional(inner) => tag == ValueTag::Null || accepts_primitive(inner, tag),
		DeclaredType::Union(members) => members.iter().any(|nested| accepts_primitive(nested, tag)),
		DeclaredType::Record(_) | DeclaredType::List(_) => false,
	}
}

pub(crate) fn mismatch(declared: &DeclaredType, tag: ValueTag, path: &str) -> ConvertError {
	ConvertError::SchemaMismatch {
		expected: declared.to_string(),
		found: tag,
		path: path.to_owned(),
	}
}
