use chrono::{NaiveDate, NaiveDateTime};

use crate::convert::{
	ConvertError, DeclaredType, Instance, MarshalOptions, RecordInstance, Result, SchemaRef, UnmarshalOptions, Value, marshal_with,
	unmarshal_with,
};

/// Conversion from an unmarshalled instance into a Rust value.
pub trait FromInstance: Sized {
	/// Expected shape, used in mismatch errors.
	fn describe() -> String;

	/// Convert, reporting `path` on mismatch.
	fn from_instance(instance: Instance, path: &str) -> Result<Self>;
}

/// Conversion from a Rust value into an instance ready for marshalling.
pub trait IntoInstance {
	/// Build the instance.
	fn to_instance(&self) -> Instance;
}

/// Rust struct bound to a statically declared record schema.
pub trait Model: Sized {
	/// Shared schema describing the record.
	fn schema() -> SchemaRef;

	/// Build the struct from a record instance of [`Model::schema`].
	fn from_record(record: RecordInstance) -> Result<Self>;

	/// Render the struct as a record instance of [`Model::schema`].
	fn to_record(&self) -> RecordInstance;
}

/// Unmarshal a value tree straight into a model.
pub fn unmarshal_model<T: Model>(value: Value, options: &UnmarshalOptions) -> Result<T> {
	let declared = DeclaredType::Record(T::schema());
	let instance = unmarshal_with(value, &declared, options)?;
	model_from_instance(instance, "$")
}

/// Marshal a model into a value tree.
pub fn marshal_model<T: Model>(model: &T, options: &MarshalOptions) -> Result<Value> {
	let declared = DeclaredType::Record(T::schema());
	marshal_with(&Instance::Record(model.to_record()), &declared, options)
}

/// Extract a nested model; use from a model's [`FromInstance`] impl.
pub fn model_from_instance<T: Model>(instance: Instance, path: &str) -> Result<T> {
	match instance {
		Instance::Record(record) => T::from_record(record),
		other => Err(ConvertError::InstanceMismatch {
			expected: T::schema().name.to_string(),
			found: other.variant_name(),
			path: path.to_owned(),
		}),
	}
}

macro_rules! scalar_instance {
	($ty:ty, $variant:ident, $label:literal) => {
		impl FromInstance for $ty {
			fn describe() -> String {
				$label.to_owned()
			}

			fn from_instance(instance: Instance, path: &str) -> Result<Self> {
				match instance {
					Instance::$variant(value) => Ok(value),
					other => Err(ConvertError::InstanceMismatch {
						expected: Self::describe(),
						found: other.variant_name(),
						path: path.to_owned(),
					}),
				}
			}
		}

		impl IntoInstance for $ty {
			fn to_instance(&self) -> Instance {
				Instance::$variant(ToOwned::to_owned(self))
			}
		}
	};
}

scalar_instance!(String, String, "String");
scalar_instance!(i64, Integer, "Integer");
scalar_instance!(f64, Float, "Float");
scalar_instance!(bool, Bool, "Bool");
scalar_instance!(NaiveDate, Date, "Date");
scalar_instance!(NaiveDateTime, DateTime, "DateTime");

impl<T: FromInstance> FromInstance for Option<T> {
	fn describe() -> String {
		format!("Optional[{}]", T::describe())
	}

	fn from_instance(instance: Instance, path: &str) -> Result<Self> {
		match instance {
			Instance::Null => Ok(None),
			other => T::from_instance(other, path).map(Some),
		}
	}
}

impl<T: IntoInstance> IntoInstance for Option<T> {
	fn to_instance(&self) -> Instance {
		self.as_ref().map_or(Instance::Null, IntoInstance::to_instance)
	}
}

impl<T: FromInstance> FromInstance for Vec<T> {
	fn describe() -> String {
		format!("List[{}]", T::describe())
	}

	fn from_instance(instance: Instance, path: &str) -> Result<Self> {
		match instance {
			Instance::List(items) => items
				.into_iter()
				.enumerate()
				.map(|(idx, item)| T::from_instance(item, &format!("{path}[{idx}]")))
				.collect(),
			other => Err(ConvertError::InstanceMismatch {
				expected: Self::describe(),
				found: other.variant_name(),
				path: path.to_owned(),
			}),
		}
	}
}

impl<T: IntoInstance> IntoInstance for Vec<T> {
	fn to_instance(&self) -> Instance {
		Instance::List(self.iter().map(IntoInstance::to_instance).collect())
	}
}
