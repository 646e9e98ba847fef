use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime};

use crate::convert::{ConvertError, Result};

/// Default pattern for date fields.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
/// Default pattern for datetime fields.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// strftime-style pattern used to parse and render temporal fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFormat {
	pattern: Box<str>,
	lenient_iso: bool,
}

impl TimeFormat {
	/// Validate and wrap a strftime pattern.
	pub fn new(pattern: &str) -> Result<Self> {
		if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
			return Err(ConvertError::InvalidTimeFormat { pattern: pattern.to_owned() });
		}
		Ok(Self {
			pattern: pattern.into(),
			lenient_iso: false,
		})
	}

	/// ISO calendar date, `1980-02-28`.
	pub fn iso_date() -> Self {
		Self {
			pattern: DEFAULT_DATE_FORMAT.into(),
			lenient_iso: false,
		}
	}

	/// ISO local datetime, `2020-11-03T12:32:12`; parsing accepts any ISO-8601 local form.
	pub fn iso_datetime() -> Self {
		Self {
			pattern: DEFAULT_DATETIME_FORMAT.into(),
			lenient_iso: true,
		}
	}

	/// Underlying pattern text.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// Parse a date string.
	pub fn parse_date(&self, text: &str) -> Option<NaiveDate> {
		NaiveDate::parse_from_str(text, &self.pattern).ok()
	}

	/// Parse a datetime string.
	pub fn parse_datetime(&self, text: &str) -> Option<NaiveDateTime> {
		NaiveDateTime::parse_from_str(text, &self.pattern)
			.ok()
			.or_else(|| if self.lenient_iso { text.parse::<NaiveDateTime>().ok() } else { None })
	}

	/// Render a date.
	pub fn format_date(&self, date: NaiveDate) -> Result<String> {
		let mut out = String::new();
		write!(out, "{}", date.format(&self.pattern)).map_err(|_| self.invalid())?;
		Ok(out)
	}

	/// Render a datetime.
	pub fn format_datetime(&self, datetime: NaiveDateTime) -> Result<String> {
		let mut out = String::new();
		write!(out, "{}", datetime.format(&self.pattern)).map_err(|_| self.invalid())?;
		Ok(out)
	}

	fn invalid(&self) -> ConvertError {
		ConvertError::InvalidTimeFormat {
			pattern: self.pattern.to_string(),
		}
	}
}
