use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::convert::{ConvertError, DeclaredType, FieldDescriptor, Kind, Result, Schema, SchemaRef, Semantic, Value};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogDoc {
	records: BTreeMap<String, RecordDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordDoc {
	fields: Vec<FieldDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldDoc {
	name: String,
	#[serde(default)]
	key: Option<String>,
	#[serde(rename = "type")]
	ty: TypeExpr,
	#[serde(default)]
	required: bool,
	#[serde(default)]
	semantic: SemanticDoc,
	#[serde(default)]
	omit_empty: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TypeExpr {
	String,
	Integer,
	Float,
	Bool,
	Null,
	Record(String),
	List(Box<TypeExpr>),
	Optional(Box<TypeExpr>),
	Union(Vec<TypeExpr>),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SemanticDoc {
	#[default]
	Plain,
	Date,
	DateTime,
	Enum(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
	InProgress,
	Done,
}

/// Record schemas declared as a JSON document and resolved once.
#[derive(Debug, Default)]
pub struct Catalog {
	records: BTreeMap<String, SchemaRef>,
}

impl Catalog {
	/// Read and resolve a catalog file.
	pub fn load(path: &Path) -> Result<Self> {
		let text = std::fs::read_to_string(path)?;
		Self::from_json(&text)
	}

	/// Parse and resolve catalog JSON text.
	pub fn from_json(text: &str) -> Result<Self> {
		Self::resolve(serde_json::from_str(text)?)
	}

	/// Resolve an already-decoded catalog document.
	pub fn from_value(value: Value) -> Result<Self> {
		Self::resolve(serde_json::from_value(value)?)
	}

	/// Resolved schema by record name.
	pub fn get(&self, name: &str) -> Option<&SchemaRef> {
		self.records.get(name)
	}

	/// `Record` declared type for a record name.
	pub fn record_type(&self, name: &str) -> Option<DeclaredType> {
		self.get(name).map(DeclaredType::record)
	}

	/// Resolved schemas in name order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaRef)> {
		self.records.iter().map(|(name, schema)| (name.as_str(), schema))
	}

	/// Number of records.
	pub fn len(&self) -> usize {
		self.records.len()
	}

	/// Whether the catalog declares no records.
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	fn resolve(doc: CatalogDoc) -> Result<Self> {
		let mut built: BTreeMap<String, SchemaRef> = BTreeMap::new();
		let mut state: HashMap<&str, Visit> = HashMap::new();

		for root in doc.records.keys() {
			let mut stack: Vec<(&str, bool)> = vec![(root.as_str(), false)];

			while let Some((name, deps_done)) = stack.pop() {
				if deps_done {
					let schema = build_schema(name, &doc.records[name], &built)?;
					built.insert(name.to_owned(), schema);
					state.insert(name, Visit::Done);
					continue;
				}

				match state.get(name) {
					Some(Visit::Done) => continue,
					// Popped again inside its own subtree.
					Some(Visit::InProgress) => return Err(ConvertError::SchemaCycle { name: name.to_owned() }),
					None => {}
				}

				state.insert(name, Visit::InProgress);
				stack.push((name, true));

				for field in &doc.records[name].fields {
					for dep in referenced_records(&field.ty) {
						let Some((dep_name, _)) = doc.records.get_key_value(dep) else {
							return Err(ConvertError::UnknownRecord {
								name: dep.to_owned(),
								from: name.to_owned(),
							});
						};
						if state.get(dep_name.as_str()) != Some(&Visit::Done) {
							stack.push((dep_name.as_str(), false));
						}
					}
				}
			}
		}

		for schema in built.values() {
			DeclaredType::record(schema).check()?;
		}

		debug!(records = built.len(), "catalog resolved");
		Ok(Self { records: built })
	}
}

fn referenced_records(ty: &TypeExpr) -> Vec<&str> {
	let mut out = Vec::new();
	let mut stack = vec![ty];
	while let Some(current) = stack.pop() {
		match current {
			TypeExpr::Record(name) => out.push(name.as_str()),
			TypeExpr::List(inner) | TypeExpr::Optional(inner) => stack.push(inner),
			TypeExpr::Union(members) => stack.extend(members.iter()),
			TypeExpr::String | TypeExpr::Integer | TypeExpr::Float | TypeExpr::Bool | TypeExpr::Null => {}
		}
	}
	out
}

fn build_schema(name: &str, doc: &RecordDoc, built: &BTreeMap<String, SchemaRef>) -> Result<SchemaRef> {
	let mut fields = Vec::with_capacity(doc.fields.len());
	for field in &doc.fields {
		let declared = declared_type(&field.ty, name, built)?;
		let semantic = match &field.semantic {
			SemanticDoc::Plain => Semantic::Plain,
			SemanticDoc::Date => Semantic::Date,
			SemanticDoc::DateTime => Semantic::DateTime,
			SemanticDoc::Enum(variants) => Semantic::enumeration(variants.iter().map(String::as_str)),
		};
		fields.push(FieldDescriptor {
			name: field.name.as_str().into(),
			key: field.key.as_deref().unwrap_or(&field.name).into(),
			declared,
			required: field.required,
			semantic,
			omit_empty: field.omit_empty,
		});
	}
	Ok(Schema::new(name, fields))
}

fn declared_type(ty: &TypeExpr, owner: &str, built: &BTreeMap<String, SchemaRef>) -> Result<DeclaredType> {
	let declared = match ty {
		TypeExpr::String => DeclaredType::Primitive(Kind::String),
		TypeExpr::Integer => DeclaredType::Primitive(Kind::Integer),
		TypeExpr::Float => DeclaredType::Primitive(Kind::Float),
		TypeExpr::Bool => DeclaredType::Primitive(Kind::Bool),
		TypeExpr::Null => DeclaredType::Primitive(Kind::Null),
		TypeExpr::Record(name) => built.get(name).map(DeclaredType::record).ok_or_else(|| ConvertError::UnknownRecord {
			name: name.clone(),
			from: owner.to_owned(),
		})?,
		TypeExpr::List(inner) => DeclaredType::list(declared_type(inner, owner, built)?),
		TypeExpr::Optional(inner) => DeclaredType::optional(declared_type(inner, owner, built)?),
		TypeExpr::Union(members) => DeclaredType::union(
			members
				.iter()
				.map(|member| declared_type(member, owner, built))
				.collect::<Result<Vec<_>>>()?,
		),
	};
	Ok(declared)
}
