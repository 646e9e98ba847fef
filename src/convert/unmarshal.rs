use std::mem;

use tracing::{debug, error, trace};

use crate::convert::validate::validate_at;
use crate::convert::{
	ConvertError, DeclaredType, FieldDescriptor, Instance, RecordInstance, Result, SchemaRef, Semantic, TimeFormat, Value,
};

/// Runtime limits and formats for unmarshalling.
#[derive(Debug, Clone)]
pub struct UnmarshalOptions {
	/// Maximum record/list nesting depth of the data.
	pub max_depth: u32,
	/// Maximum number of work items one conversion may create.
	pub max_items: usize,
	/// Pattern used to parse `Date` fields.
	pub date_format: TimeFormat,
	/// Pattern used to parse `DateTime` fields.
	pub datetime_format: TimeFormat,
}

impl Default for UnmarshalOptions {
	fn default() -> Self {
		Self {
			max_depth: 512,
			max_items: 1_000_000,
			date_format: TimeFormat::iso_date(),
			datetime_format: TimeFormat::iso_datetime(),
		}
	}
}

impl UnmarshalOptions {
	/// Defaults with custom temporal patterns.
	pub fn with_formats(date_format: TimeFormat, datetime_format: TimeFormat) -> Self {
		Self {
			date_format,
			datetime_format,
			..Self::default()
		}
	}
}

/// Unmarshal a value tree into a typed instance with default options.
pub fn unmarshal(value: Value, declared: &DeclaredType) -> Result<Instance> {
	unmarshal_with(value, declared, &UnmarshalOptions::default())
}

/// Unmarshal a value tree into a typed instance.
///
/// The declared type graph is checked before any data is inspected. The
/// traversal runs on an explicit work stack, so nesting depth never grows the
/// native call stack.
pub fn unmarshal_with(value: Value, declared: &DeclaredType, options: &UnmarshalOptions) -> Result<Instance> {
	declared.check()?;
	debug!(root = %declared, "unmarshal start");
	Engine::new(options).run(value, declared)
}

type ItemId = usize;

/// Field or element position an item fills in its parent.
#[derive(Debug, Clone, Copy)]
struct ParentSlot {
	parent: ItemId,
	position: usize,
}

#[derive(Debug)]
enum Build {
	/// Not yet dispatched.
	Raw(Value),
	/// Expanded list accumulating its elements in order.
	List { items: Vec<Instance>, expected: usize },
	/// Expanded record waiting for composite fields.
	Record { record: RecordInstance, pending: usize },
	Materialized(Instance),
	/// Moved into its parent.
	Folded,
}

#[derive(Debug)]
struct WorkItem<'t> {
	declared: &'t DeclaredType,
	slot: Option<ParentSlot>,
	path: String,
	depth: u32,
	validated: bool,
	build: Build,
}

impl WorkItem<'_> {
	fn materialized(&self) -> bool {
		matches!(self.build, Build::Materialized(_))
	}
}

struct Engine<'t, 'o> {
	options: &'o UnmarshalOptions,
	arena: Vec<WorkItem<'t>>,
	stack: Vec<ItemId>,
	pending: Vec<ItemId>,
	steps: usize,
}

impl<'t, 'o> Engine<'t, 'o> {
	fn new(options: &'o UnmarshalOptions) -> Self {
		Self {
			options,
			arena: Vec::new(),
			stack: Vec::new(),
			pending: Vec::new(),
			steps: 0,
		}
	}

	fn run(&mut self, value: Value, declared: &'t DeclaredType) -> Result<Instance> {
		let root = self.alloc(value, declared, None, "$".to_owned(), 0)?;
		self.stack.push(root);

		loop {
			self.tick()?;
			let Some(id) = self.stack.pop() else {
				return Err(structural("work stack drained without a result"));
			};

			if self.arena[id].materialized() {
				if self.stack.is_empty() && self.pending.is_empty() && self.arena[id].slot.is_none() {
					return self.finish(id);
				}
				return Err(structural(format!("materialized item {} resurfaced before folding", self.arena[id].path)));
			}

			self.dispatch(id)?;
			self.stack.push(id);
			self.promote()?;
		}
	}

	fn finish(&mut self, id: ItemId) -> Result<Instance> {
		match mem::replace(&mut self.arena[id].build, Build::Folded) {
			Build::Materialized(instance) => {
				debug!(items = self.arena.len(), steps = self.steps, "unmarshal finished");
				Ok(instance)
			}
			_ => Err(structural("root finished without a value")),
		}
	}

	/// Each item is dispatched once and folded at most once.
	fn tick(&mut self) -> Result<()> {
		self.steps += 1;
		if self.steps > 2 * self.arena.len() + 1 {
			return Err(structural(format!("progress bound exceeded after {} steps", self.steps)));
		}
		Ok(())
	}

	fn alloc(&mut self, value: Value, declared: &'t DeclaredType, slot: Option<ParentSlot>, path: String, depth: u32) -> Result<ItemId> {
		if depth > self.options.max_depth {
			return Err(ConvertError::DepthExceeded {
				max_depth: self.options.max_depth,
			});
		}
		if self.arena.len() >= self.options.max_items {
			return Err(ConvertError::TooManyItems { max: self.options.max_items });
		}

		self.arena.push(WorkItem {
			declared,
			slot,
			path,
			depth,
			validated: false,
			build: Build::Raw(value),
		});
		Ok(self.arena.len() - 1)
	}

	fn dispatch(&mut self, id: ItemId) -> Result<()> {
		let item = &mut self.arena[id];
		let Build::Raw(value) = mem::replace(&mut item.build, Build::Folded) else {
			return Err(structural(format!("item {} dispatched twice", item.path)));
		};
		if !item.validated {
			validate_at(&value, item.declared, &item.path)?;
			item.validated = true;
		}

		let mut declared = item.declared;
		loop {
			match declared {
				DeclaredType::Optional(inner) => {
					if value.is_null() {
						self.arena[id].build = Build::Materialized(Instance::Null);
						return Ok(());
					}
					declared = inner;
				}
				DeclaredType::Primitive(_) | DeclaredType::Union(_) => {
					let instance = primitive_instance(value, &self.arena[id].path)?;
					self.arena[id].build = Build::Materialized(instance);
					return Ok(());
				}
				DeclaredType::List(inner) => return self.expand_list(id, value, inner),
				DeclaredType::Record(schema) => return self.expand_record(id, value, schema),
			}
		}
	}

	fn expand_list(&mut self, id: ItemId, value: Value, inner: &'t DeclaredType) -> Result<()> {
		let Value::Array(elements) = value else {
			return Err(structural(format!("list item {} does not hold an array", self.arena[id].path)));
		};

		let expected = elements.len();
		if expected == 0 {
			self.arena[id].build = Build::Materialized(Instance::List(Vec::new()));
			return Ok(());
		}

		let depth = self.arena[id].depth + 1;
		for (position, element) in elements.into_iter().enumerate() {
			let path = format!("{}[{position}]", self.arena[id].path);
			let child = self.alloc(element, inner, Some(ParentSlot { parent: id, position }), path, depth)?;
			self.pending.push(child);
		}

		trace!(path = %self.arena[id].path, count = expected, "list expanded");
		self.arena[id].build = Build::List {
			items: Vec::with_capacity(expected),
			expected,
		};
		Ok(())
	}

	fn expand_record(&mut self, id: ItemId, value: Value, schema: &'t SchemaRef) -> Result<()> {
		let Value::Object(mut object) = value else {
			return Err(structural(format!("record item {} does not hold an object", self.arena[id].path)));
		};

		for field in &schema.fields {
			if field.required && !object.contains_key(&*field.key) && !object.contains_key(&*field.name) {
				return Err(ConvertError::MissingField {
					key: field.key.to_string(),
					received: Value::Object(object),
				});
			}
		}

		let depth = self.arena[id].depth + 1;
		let mut record = RecordInstance::empty(schema);
		let mut pending = 0_usize;

		for (position, field) in schema.fields.iter().enumerate() {
			let Some(raw) = object.remove(&*field.key).or_else(|| object.remove(&*field.name)) else {
				continue;
			};
			let path = format!("{}.{}", self.arena[id].path, field.key);

			if raw.is_null() || !field.declared.is_composite() {
				validate_at(&raw, &field.declared, &path)?;
				record.fields[position].value = Some(self.resident(raw, field, &path)?);
				continue;
			}

			let child = self.alloc(raw, &field.declared, Some(ParentSlot { parent: id, position }), path, depth)?;
			self.pending.push(child);
			pending += 1;
		}

		trace!(
			path = %self.arena[id].path,
			record = %schema.name,
			composite = pending,
			discarded = object.len(),
			"record expanded"
		);

		self.arena[id].build = if pending == 0 {
			Build::Materialized(Instance::Record(record))
		} else {
			Build::Record { record, pending }
		};
		Ok(())
	}

	/// Convert a validated non-composite field value in place.
	fn resident(&self, raw: Value, field: &FieldDescriptor, path: &str) -> Result<Instance> {
		let text = match (&field.semantic, raw) {
			(_, Value::Null) => return Ok(Instance::Null),
			(Semantic::Plain, raw) => return primitive_instance(raw, path),
			(_, Value::String(text)) => text,
			(_, raw) => return primitive_instance(raw, path),
		};

		match &field.semantic {
			Semantic::Date => {
				let format = &self.options.date_format;
				format
					.parse_date(&text)
					.map(Instance::Date)
					.ok_or_else(|| invalid_temporal(field, path, text.clone(), format))
			}
			Semantic::DateTime => {
				let format = &self.options.datetime_format;
				format
					.parse_datetime(&text)
					.map(Instance::DateTime)
					.ok_or_else(|| invalid_temporal(field, path, text.clone(), format))
			}
			Semantic::Enum(variants) => {
				if variants.iter().any(|variant| **variant == *text) {
					Ok(Instance::String(text))
				} else {
					Err(ConvertError::InvalidEnumVariant {
						field: field.name.to_string(),
						path: path.to_owned(),
						value: text,
					})
				}
			}
			Semantic::Plain => Ok(Instance::String(text)),
		}
	}

	fn promote(&mut self) -> Result<()> {
		if !self.pending.is_empty() {
			// Reversal: the first child in source order lands on top.
			while let Some(child) = self.pending.pop() {
				self.stack.push(child);
			}
			return Ok(());
		}
		self.fold()
	}

	fn fold(&mut self) -> Result<()> {
		while self.stack.len() >= 2 {
			let Some(&top) = self.stack.last() else {
				break;
			};
			if !self.arena[top].materialized() {
				break;
			}
			self.stack.pop();
			self.tick()?;

			let slot = self.arena[top]
				.slot
				.ok_or_else(|| structural(format!("root {} materialized under other work", self.arena[top].path)))?;
			let Build::Materialized(instance) = mem::replace(&mut self.arena[top].build, Build::Folded) else {
				return Err(structural("fold source lost its value"));
			};

			let complete = {
				let parent = self
					.arena
					.get_mut(slot.parent)
					.ok_or_else(|| structural(format!("fold target {} does not exist", slot.parent)))?;
				match &mut parent.build {
					Build::List { items, expected } => {
						if items.len() != slot.position {
							return Err(structural(format!(
								"element {} of {} folded at position {}",
								slot.position,
								parent.path,
								items.len()
							)));
						}
						items.push(instance);
						items.len() == *expected
					}
					Build::Record { record, pending } => {
						let Some(field) = record.fields.get_mut(slot.position) else {
							return Err(structural(format!("field {} of {} out of range", slot.position, parent.path)));
						};
						if field.value.is_some() {
							return Err(structural(format!("field {} of {} filled twice", field.name, parent.path)));
						}
						field.value = Some(instance);
						*pending = pending
							.checked_sub(1)
							.ok_or_else(|| structural(format!("record {} has no pending fields", parent.path)))?;
						*pending == 0
					}
					_ => return Err(structural(format!("fold target {} is not being built", parent.path))),
				}
			};

			if complete {
				self.materialize_parent(slot.parent)?;
			}
		}
		Ok(())
	}

	fn materialize_parent(&mut self, id: ItemId) -> Result<()> {
		let parent = &mut self.arena[id];
		let instance = match mem::replace(&mut parent.build, Build::Folded) {
			Build::List { items, .. } => Instance::List(items),
			Build::Record { record, .. } => Instance::Record(record),
			_ => return Err(structural(format!("completed item {} was not being built", parent.path))),
		};
		parent.build = Build::Materialized(instance);

		if self.stack.last() != Some(&id) {
			return Err(structural(format!("completed item {} is not on top of the work stack", self.arena[id].path)));
		}
		Ok(())
	}
}

fn primitive_instance(value: Value, path: &str) -> Result<Instance> {
	match value {
		Value::Null => Ok(Instance::Null),
		Value::Bool(flag) => Ok(Instance::Bool(flag)),
		Value::String(text) => Ok(Instance::String(text)),
		Value::Number(number) => {
			if let Some(int) = number.as_i64() {
				return Ok(Instance::Integer(int));
			}
			if number.is_u64() {
				return Err(ConvertError::IntegerOutOfRange {
					path: path.to_owned(),
					value: number.to_string(),
				});
			}
			number.as_f64().map(Instance::Float).ok_or_else(|| ConvertError::IntegerOutOfRange {
				path: path.to_owned(),
				value: number.to_string(),
			})
		}
		Value::Array(_) | Value::Object(_) => Err(structural(format!("composite value at {path} reached a primitive slot"))),
	}
}

fn invalid_temporal(field: &FieldDescriptor, path: &str, value: String, format: &TimeFormat) -> ConvertError {
	ConvertError::InvalidTemporal {
		field: field.name.to_string(),
		path: path.to_owned(),
		value,
		format: format.pattern().to_owned(),
	}
}

fn structural(reason: impl Into<String>) -> ConvertError {
	let reason = reason.into();
	error!(%reason, "unmarshal invariant violated");
	ConvertError::StructuralFailure { reason }
}
