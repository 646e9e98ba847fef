use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::convert::{ConvertError, Result, ValueTag};

/// Shared, immutable handle to a record schema.
pub type SchemaRef = Arc<Schema>;

/// Primitive value categories a declared type can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
	/// UTF-8 string.
	String,
	/// Signed 64-bit integer.
	Integer,
	/// Double-precision float.
	Float,
	/// Boolean.
	Bool,
	/// The null value.
	Null,
}

impl Kind {
	/// Whether a value carrying `tag` satisfies this kind.
	pub fn accepts(self, tag: ValueTag) -> bool {
		matches!(
			(self, tag),
			(Self::String, ValueTag::String)
				| (Self::Integer, ValueTag::Integer)
				| (Self::Float, ValueTag::Float)
				| (Self::Bool, ValueTag::Bool)
				| (Self::Null, ValueTag::Null)
		)
	}
}

impl fmt::Display for Kind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self {
			Self::String => "String",
			Self::Integer => "Integer",
			Self::Float => "Float",
			Self::Bool => "Bool",
			Self::Null => "Null",
		};
		f.write_str(label)
	}
}

/// Declared shape of a value.
#[derive(Debug, Clone)]
pub enum DeclaredType {
	/// One primitive kind.
	Primitive(Kind),
	/// Nested record described by a shared schema.
	Record(SchemaRef),
	/// Homogeneous ordered list.
	List(Box<DeclaredType>),
	/// Null, or a value of the inner type.
	Optional(Box<DeclaredType>),
	/// Any one of the member types; members must be primitive.
	Union(Vec<DeclaredType>),
}

impl DeclaredType {
	/// `Primitive(String)`.
	pub fn string() -> Self {
		Self::Primitive(Kind::String)
	}

	/// `Primitive(Integer)`.
	pub fn integer() -> Self {
		Self::Primitive(Kind::Integer)
	}

	/// `Primitive(Float)`.
	pub fn float() -> Self {
		Self::Primitive(Kind::Float)
	}

	/// `Primitive(Bool)`.
	pub fn bool() -> Self {
		Self::Primitive(Kind::Bool)
	}

	/// `Record(schema)`.
	pub fn record(schema: &SchemaRef) -> Self {
		Self::Record(Arc::clone(schema))
	}

	/// `List(inner)`.
	pub fn list(inner: DeclaredType) -> Self {
		Self::List(Box::new(inner))
	}

	/// `Optional(inner)`.
	pub fn optional(inner: DeclaredType) -> Self {
		Self::Optional(Box::new(inner))
	}

	/// `Union(members)`.
	pub fn union(members: Vec<DeclaredType>) -> Self {
		Self::Union(members)
	}

	/// Whether values of this type are expanded into child work items.
	///
	/// Records and lists are composite; an optional is composite when its
	/// inner type is.
	pub fn is_composite(&self) -> bool {
		match self {
			Self::Record(_) | Self::List(_) => true,
			Self::Optional(inner) => inner.is_composite(),
			Self::Primitive(_) | Self::Union(_) => false,
		}
	}

	/// Strip any number of `Optional` wrappers.
	pub fn unwrap_optional(&self) -> &DeclaredType {
		let mut current = self;
		while let Self::Optional(inner) = current {
			current = inner;
		}
		current
	}

	/// Inspect the whole type graph reachable from this type.
	///
	/// Rejects unions with composite or no members, semantics on non-string
	/// fields, and duplicate field names or keys. Each shared schema is
	/// inspected once. Runs before any data is touched.
	pub fn check(&self) -> Result<()> {
		let mut seen: HashSet<*const Schema> = HashSet::new();
		let mut stack: Vec<&DeclaredType> = vec![self];

		while let Some(current) = stack.pop() {
			match current {
				Self::Primitive(_) => {}
				Self::List(inner) | Self::Optional(inner) => stack.push(inner),
				Self::Union(members) => {
					if members.is_empty() || members.iter().any(DeclaredType::is_composite) {
						return Err(ConvertError::InvalidUnionSchema { union: current.to_string() });
					}
					stack.extend(members.iter());
				}
				Self::Record(schema) => {
					if !seen.insert(Arc::as_ptr(schema)) {
						continue;
					}
					schema.check_fields()?;
					stack.extend(schema.fields.iter().map(|field| &field.declared));
				}
			}
		}

		Ok(())
	}
}

impl PartialEq for DeclaredType {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Primitive(a), Self::Primitive(b)) => a == b,
			(Self::Record(a), Self::Record(b)) => Arc::ptr_eq(a, b),
			(Self::List(a), Self::List(b)) | (Self::Optional(a), Self::Optional(b)) => a == b,
			(Self::Union(a), Self::Union(b)) => a == b,
			_ => false,
		}
	}
}

impl fmt::Display for DeclaredType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Primitive(kind) => write!(f, "{kind}"),
			Self::Record(schema) => f.write_str(&schema.name),
			Self::List(inner) => write!(f, "List[{inner}]"),
			Self::Optional(inner) => write!(f, "Optional[{inner}]"),
			Self::Union(members) => {
				f.write_str("Union[")?;
				for (idx, member) in members.iter().enumerate() {
					if idx > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{member}")?;
				}
				f.write_str("]")
			}
		}
	}
}

/// Extra meaning layered on a string field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Semantic {
	/// Plain value, copied through.
	#[default]
	Plain,
	/// Calendar date rendered with the date format.
	Date,
	/// Local date and time rendered with the datetime format.
	DateTime,
	/// String restricted to a fixed set of variants.
	Enum(Arc<[Box<str>]>),
}

impl Semantic {
	/// Build an enum semantic from its variants.
	pub fn enumeration<I, S>(variants: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<Box<str>>,
	{
		Self::Enum(variants.into_iter().map(Into::into).collect())
	}

	/// Short label used in diagnostics.
	pub fn label(&self) -> &'static str {
		match self {
			Self::Plain => "plain",
			Self::Date => "date",
			Self::DateTime => "datetime",
			Self::Enum(_) => "enum",
		}
	}
}

/// One field declaration of a record schema.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
	/// Canonical field name.
	pub name: Box<str>,
	/// Key as it appears in a JSON object.
	pub key: Box<str>,
	/// Declared field type.
	pub declared: DeclaredType,
	/// Whether the field must be present in the source object.
	pub required: bool,
	/// Semantic layered on string fields.
	pub semantic: Semantic,
	/// Drop the field on marshal when its value is null, absent, or empty.
	pub omit_empty: bool,
}

impl FieldDescriptor {
	/// Optional field whose source key equals its name.
	pub fn new(name: impl Into<Box<str>>, declared: DeclaredType) -> Self {
		let name = name.into();
		Self {
			key: name.clone(),
			name,
			declared,
			required: false,
			semantic: Semantic::Plain,
			omit_empty: false,
		}
	}

	/// Required field whose source key equals its name.
	pub fn required(name: impl Into<Box<str>>, declared: DeclaredType) -> Self {
		Self {
			required: true,
			..Self::new(name, declared)
		}
	}

	/// Override the source key.
	pub fn with_key(mut self, key: impl Into<Box<str>>) -> Self {
		self.key = key.into();
		self
	}

	/// Attach a semantic.
	pub fn with_semantic(mut self, semantic: Semantic) -> Self {
		self.semantic = semantic;
		self
	}

	/// Mark the field as omitted on marshal when empty.
	pub fn omit_empty(mut self) -> Self {
		self.omit_empty = true;
		self
	}
}

/// Ordered field declarations of one record type.
#[derive(Debug)]
pub struct Schema {
	/// Record type name.
	pub name: Box<str>,
	/// Field declarations in declared order.
	pub fields: Vec<FieldDescriptor>,
}

impl Schema {
	/// Build a shared schema.
	pub fn new(name: impl Into<Box<str>>, fields: Vec<FieldDescriptor>) -> SchemaRef {
		Arc::new(Self { name: name.into(), fields })
	}

	/// Look up a field by canonical name.
	pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
		self.fields.iter().find(|field| &*field.name == name)
	}

	/// Position of a field by canonical name.
	pub fn position(&self, name: &str) -> Option<usize> {
		self.fields.iter().position(|field| &*field.name == name)
	}

	fn check_fields(&self) -> Result<()> {
		let mut names = HashSet::new();
		let mut keys = HashSet::new();

		for field in &self.fields {
			if !names.insert(&*field.name) {
				return Err(ConvertError::DuplicateField {
					record: self.name.to_string(),
					name: field.name.to_string(),
				});
			}
			if !keys.insert(&*field.key) {
				return Err(ConvertError::DuplicateField {
					record: self.name.to_string(),
					name: field.key.to_string(),
				});
			}
			// Unmarshal falls back from key to name, so a name must not be another field's key.
			if let Some(other) = self.fields.iter().find(|other| other.key == field.name && other.name != field.name) {
				return Err(ConvertError::DuplicateField {
					record: self.name.to_string(),
					name: other.key.to_string(),
				});
			}

			if field.semantic != Semantic::Plain && field.declared.unwrap_optional() != &DeclaredType::string() {
				return Err(ConvertError::InvalidSemantic {
					record: self.name.to_string(),
					field: field.name.to_string(),
					semantic: field.semantic.label(),
					declared: field.declared.to_string(),
				});
			}
		}

		Ok(())
	}
}
