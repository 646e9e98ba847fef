//! Shared test helpers for workspace crates.

use std::path::{Path, PathBuf};

use recast::convert::{DeclaredType, FieldDescriptor, Schema, SchemaRef, Semantic, Value};

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve a fixture path under `<workspace>/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
	workspace_root().join("fixtures").join(name)
}

/// Read and parse a JSON fixture.
pub fn fixture_json(name: &str) -> Value {
	let path = fixture_path(name);
	let text = std::fs::read_to_string(&path).unwrap_or_else(|err| panic!("read {}: {err}", path.display()));
	serde_json::from_str(&text).unwrap_or_else(|err| panic!("parse {}: {err}", path.display()))
}

/// One-field record: `first_val` read from `firstVal`.
pub fn item_schema() -> SchemaRef {
	Schema::new(
		"Item",
		vec![FieldDescriptor::required("first_val", DeclaredType::string()).with_key("firstVal")],
	)
}

/// Record whose `item` field holds an [`item_schema`] record.
pub fn outer_schema(item: &SchemaRef) -> SchemaRef {
	Schema::new("Outer", vec![FieldDescriptor::required("item", DeclaredType::record(item))])
}

/// Record with a required `val` and an optional list of [`item_schema`] records under `items`.
pub fn group_schema(item: &SchemaRef) -> SchemaRef {
	Schema::new(
		"Group",
		vec![
			FieldDescriptor::required("val", DeclaredType::string()),
			FieldDescriptor::new("items", DeclaredType::optional(DeclaredType::list(DeclaredType::record(item)))),
		],
	)
}

/// Bank account sample schemas.
#[derive(Debug, Clone)]
pub struct AccountSchemas {
	/// `Address` record.
	pub address: SchemaRef,
	/// `AccountHolder` record.
	pub holder: SchemaRef,
	/// `Account` record.
	pub account: SchemaRef,
}

/// Account, holder and address schemas with key renames, temporal fields, an enum and omit-empty fields.
pub fn account_schemas() -> AccountSchemas {
	let address = Schema::new(
		"Address",
		vec![
			FieldDescriptor::required("house_number", DeclaredType::string()).with_key("houseNumber"),
			FieldDescriptor::required("post_code", DeclaredType::string()).with_key("postCode"),
			FieldDescriptor::new("street", DeclaredType::optional(DeclaredType::string())).omit_empty(),
		],
	);
	let holder = Schema::new(
		"AccountHolder",
		vec![
			FieldDescriptor::required("first_name", DeclaredType::string()).with_key("firstName"),
			FieldDescriptor::required("last_name", DeclaredType::string()).with_key("lastName"),
			FieldDescriptor::new("middle_names", DeclaredType::optional(DeclaredType::list(DeclaredType::string())))
				.with_key("middleNames")
				.omit_empty(),
			FieldDescriptor::required("address", DeclaredType::record(&address)),
			FieldDescriptor::required("date_of_birth", DeclaredType::string())
				.with_key("dob")
				.with_semantic(Semantic::Date),
		],
	);
	let account = Schema::new(
		"Account",
		vec![
			FieldDescriptor::required("account_number", DeclaredType::integer()).with_key("accountNumber"),
			FieldDescriptor::required("sort_code", DeclaredType::integer()).with_key("sortCode"),
			FieldDescriptor::required("account_type", DeclaredType::string())
				.with_key("accountType")
				.with_semantic(Semantic::enumeration(["SAVING", "CURRENT", "ISA"])),
			FieldDescriptor::required("account_holder", DeclaredType::record(&holder)).with_key("accountHolder"),
			FieldDescriptor::required("date_opened", DeclaredType::string())
				.with_key("dateOpened")
				.with_semantic(Semantic::DateTime),
		],
	);
	AccountSchemas { address, holder, account }
}
