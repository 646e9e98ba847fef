#![allow(missing_docs)]

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime};
use recast::convert::{
	ConvertError, DeclaredType, FromInstance, Instance, IntoInstance, MarshalOptions, Model, RecordInstance, Result, SchemaRef, TimeFormat,
	UnmarshalOptions, decode_response_body, encode_request_body, marshal_model, model_from_instance, unmarshal_model,
};
use recast_testkit::{AccountSchemas, account_schemas, fixture_json};
use serde_json::json;

fn schemas() -> &'static AccountSchemas {
	static SCHEMAS: OnceLock<AccountSchemas> = OnceLock::new();
	SCHEMAS.get_or_init(account_schemas)
}

#[derive(Debug, Clone, PartialEq)]
struct Address {
	house_number: String,
	post_code: String,
	street: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct AccountHolder {
	first_name: String,
	last_name: String,
	middle_names: Option<Vec<String>>,
	address: Address,
	date_of_birth: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AccountType {
	Saving,
	Current,
	Isa,
}

#[derive(Debug, Clone, PartialEq)]
struct Account {
	account_number: i64,
	sort_code: i64,
	account_type: AccountType,
	account_holder: AccountHolder,
	date_opened: NaiveDateTime,
}

impl FromInstance for AccountType {
	fn describe() -> String {
		"AccountType".to_owned()
	}

	fn from_instance(instance: Instance, path: &str) -> Result<Self> {
		match instance.as_str() {
			Some("SAVING") => Ok(Self::Saving),
			Some("CURRENT") => Ok(Self::Current),
			Some("ISA") => Ok(Self::Isa),
			_ => Err(ConvertError::InstanceMismatch {
				expected: Self::describe(),
				found: instance.variant_name(),
				path: path.to_owned(),
			}),
		}
	}
}

impl IntoInstance for AccountType {
	fn to_instance(&self) -> Instance {
		let label = match self {
			Self::Saving => "SAVING",
			Self::Current => "CURRENT",
			Self::Isa => "ISA",
		};
		Instance::String(label.to_owned())
	}
}

impl Model for Address {
	fn schema() -> SchemaRef {
		schemas().address.clone()
	}

	fn from_record(mut record: RecordInstance) -> Result<Self> {
		Ok(Self {
			house_number: record.take_required("house_number")?,
			post_code: record.take_required("post_code")?,
			street: record.take_optional("street")?,
		})
	}

	fn to_record(&self) -> RecordInstance {
		RecordInstance::empty(&Self::schema())
			.with("house_number", Some(self.house_number.to_instance()))
			.with("post_code", Some(self.post_code.to_instance()))
			.with("street", self.street.as_ref().map(IntoInstance::to_instance))
	}
}

impl FromInstance for Address {
	fn describe() -> String {
		"Address".to_owned()
	}

	fn from_instance(instance: Instance, path: &str) -> Result<Self> {
		model_from_instance(instance, path)
	}
}

impl Model for AccountHolder {
	fn schema() -> SchemaRef {
		schemas().holder.clone()
	}

	fn from_record(mut record: RecordInstance) -> Result<Self> {
		Ok(Self {
			first_name: record.take_required("first_name")?,
			last_name: record.take_required("last_name")?,
			middle_names: record.take_optional("middle_names")?,
			address: record.take_required("address")?,
			date_of_birth: record.take_required("date_of_birth")?,
		})
	}

	fn to_record(&self) -> RecordInstance {
		RecordInstance::empty(&Self::schema())
			.with("first_name", Some(self.first_name.to_instance()))
			.with("last_name", Some(self.last_name.to_instance()))
			.with("middle_names", self.middle_names.as_ref().map(IntoInstance::to_instance))
			.with("address", Some(Instance::Record(self.address.to_record())))
			.with("date_of_birth", Some(self.date_of_birth.to_instance()))
	}
}

impl FromInstance for AccountHolder {
	fn describe() -> String {
		"AccountHolder".to_owned()
	}

	fn from_instance(instance: Instance, path: &str) -> Result<Self> {
		model_from_instance(instance, path)
	}
}

impl Model for Account {
	fn schema() -> SchemaRef {
		schemas().account.clone()
	}

	fn from_record(mut record: RecordInstance) -> Result<Self> {
		Ok(Self {
			account_number: record.take_required("account_number")?,
			sort_code: record.take_required("sort_code")?,
			account_type: record.take_required("account_type")?,
			account_holder: record.take_required("account_holder")?,
			date_opened: record.take_required("date_opened")?,
		})
	}

	fn to_record(&self) -> RecordInstance {
		RecordInstance::empty(&Self::schema())
			.with("account_number", Some(self.account_number.to_instance()))
			.with("sort_code", Some(self.sort_code.to_instance()))
			.with("account_type", Some(self.account_type.to_instance()))
			.with("account_holder", Some(Instance::Record(self.account_holder.to_record())))
			.with("date_opened", Some(self.date_opened.to_instance()))
	}
}

fn sample_account() -> Account {
	Account {
		account_number: 12345678,
		sort_code: 989898,
		account_type: AccountType::Saving,
		date_opened: NaiveDate::from_ymd_opt(2020, 11, 3)
			.and_then(|date| date.and_hms_opt(12, 32, 12))
			.expect("valid datetime"),
		account_holder: AccountHolder {
			first_name: "John".to_owned(),
			last_name: "Smith".to_owned(),
			middle_names: None,
			date_of_birth: NaiveDate::from_ymd_opt(1980, 2, 28).expect("valid date"),
			address: Address {
				house_number: "12B".to_owned(),
				post_code: "SW11 1AP".to_owned(),
				street: None,
			},
		},
	}
}

fn custom_formats() -> (TimeFormat, TimeFormat) {
	(
		TimeFormat::new("%d %B %y").expect("date pattern"),
		TimeFormat::new("%d %B %y %I %M %S %p").expect("datetime pattern"),
	)
}

#[test]
fn unmarshal_builds_typed_account() {
	let account: Account = unmarshal_model(fixture_json("account.json"), &UnmarshalOptions::default()).expect("unmarshal");
	assert_eq!(account, sample_account());
}

#[test]
fn marshal_renders_source_keys_and_iso_dates() {
	let value = marshal_model(&sample_account(), &MarshalOptions::default()).expect("marshal");
	assert_eq!(value, fixture_json("account.json"));
}

#[test]
fn custom_formats_apply_both_ways() {
	let (date, datetime) = custom_formats();

	let account: Account =
		unmarshal_model(fixture_json("account_custom_formats.json"), &UnmarshalOptions::with_formats(date.clone(), datetime.clone()))
			.expect("unmarshal");
	assert_eq!(account, sample_account());

	let value = marshal_model(&account, &MarshalOptions::with_formats(date, datetime)).expect("marshal");
	assert_eq!(value, fixture_json("account_custom_formats.json"));
}

#[test]
fn short_datetime_format_drops_seconds_on_marshal() {
	let date = TimeFormat::new("%d %B %y").expect("date pattern");
	let datetime = TimeFormat::new("%d %B %y %I %M %p").expect("datetime pattern");

	let value = marshal_model(&sample_account(), &MarshalOptions::with_formats(date, datetime)).expect("marshal");
	assert_eq!(value["dateOpened"], json!("03 November 20 12 32 PM"));
	assert_eq!(value["accountHolder"]["dob"], json!("28 February 80"));
}

#[test]
fn omit_empty_fields_appear_only_when_set() {
	let mut account = sample_account();
	account.account_holder.middle_names = Some(vec!["Henry".to_owned()]);
	account.account_holder.address.street = Some("Lavender Hill".to_owned());

	let value = marshal_model(&account, &MarshalOptions::default()).expect("marshal");
	assert_eq!(value["accountHolder"]["middleNames"], json!(["Henry"]));
	assert_eq!(value["accountHolder"]["address"]["street"], json!("Lavender Hill"));

	account.account_holder.middle_names = Some(Vec::new());
	let value = marshal_model(&account, &MarshalOptions::default()).expect("marshal");
	assert!(value["accountHolder"].get("middleNames").is_none());
}

#[test]
fn unknown_enum_variant_is_rejected() {
	let err = unmarshal_model::<Account>(fixture_json("account_bad_type.json"), &UnmarshalOptions::default()).expect_err("PENSION");
	assert!(matches!(err, ConvertError::InvalidEnumVariant { ref field, ref path, ref value } if field == "account_type" && path == "$.accountType" && value == "PENSION"));
}

#[test]
fn unparseable_date_is_rejected() {
	let mut data = fixture_json("account.json");
	data["accountHolder"]["dob"] = json!("28/02/1980");
	let err = unmarshal_model::<Account>(data, &UnmarshalOptions::default()).expect_err("bad dob");
	assert!(matches!(err, ConvertError::InvalidTemporal { ref field, ref path, ref format, .. } if field == "date_of_birth" && path == "$.accountHolder.dob" && format == "%Y-%m-%d"));
}

#[test]
fn body_helpers_wrap_text() {
	let declared = DeclaredType::Record(Account::schema());
	let text = serde_json::to_string(&fixture_json("account.json")).expect("encode fixture");

	let instance = decode_response_body(&text, &declared, &UnmarshalOptions::default()).expect("decode");
	let account: Account = model_from_instance(instance.clone(), "$").expect("model");
	assert_eq!(account, sample_account());

	let body = encode_request_body(&instance, &declared, &MarshalOptions::default()).expect("encode");
	let reparsed: serde_json::Value = serde_json::from_str(&body).expect("valid json");
	assert_eq!(reparsed, fixture_json("account.json"));

	let empty = decode_response_body("  \n", &DeclaredType::optional(declared), &UnmarshalOptions::default()).expect("empty body");
	assert_eq!(empty, Instance::Null);
}
