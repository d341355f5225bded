//! Value sources: the named, untyped input a bind call reads from.
//!
//! A [`ValueSource`] is the in-process face of form fields, route values and
//! query strings: a lookup from dotted/indexed names to raw string entries.
//! [`SourceValue::convert_to`] performs the culture-aware scalar conversion
//! step; everything richer is the binders' job.

mod errors;

pub use errors::ConversionError;

use indexmap::IndexMap;

use crate::language::{ScalarKind, Ty};
use crate::value::Value;

/// A named, untyped lookup of raw request values.
pub trait ValueSource {
    /// The raw entry registered under `name`, if any.
    fn get_value(&self, name: &str) -> Option<SourceValue>;

    /// Whether any entry lives at or under `prefix` (the entry itself,
    /// `prefix.child`, or `prefix[index]`).
    fn contains_prefix(&self, prefix: &str) -> bool;
}

/// The culture a raw value was produced under.
///
/// Scalar conversion honors the locale's decimal separator when parsing
/// floating-point values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    pub decimal_separator: char,
}

impl Locale {
    pub const INVARIANT: Locale = Locale {
        decimal_separator: '.',
    };
}

impl Default for Locale {
    fn default() -> Self {
        Locale::INVARIANT
    }
}

/// One or more raw string entries registered under a single name, plus the
/// locale to convert them under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceValue {
    values: Vec<String>,
    locale: Locale,
}

impl SourceValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            values: vec![value.into()],
            locale: Locale::INVARIANT,
        }
    }

    /// A multi-entry value, e.g. a repeated form field.
    pub fn multi(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            locale: Locale::INVARIANT,
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// The raw entries, in the order they were supplied.
    pub fn to_strings(&self) -> &[String] {
        &self.values
    }

    /// The first raw entry, or the empty string if there is none.
    pub fn first(&self) -> &str {
        self.values.first().map(String::as_str).unwrap_or_default()
    }

    /// The display form recorded into model state alongside errors.
    pub fn attempted(&self) -> String {
        self.values.join(",")
    }

    /// Convert the first entry into a value of the target type.
    ///
    /// Only scalar targets are convertible; a failure names the offending
    /// value and the expected type rather than being swallowed.
    pub fn convert_to(&self, ty: &Ty) -> Result<Value, ConversionError> {
        self.convert_entry(0, ty)
    }

    /// Convert the entry at `index` into a value of the target type.
    pub fn convert_entry(&self, index: usize, ty: &Ty) -> Result<Value, ConversionError> {
        let raw = self
            .values
            .get(index)
            .map(String::as_str)
            .unwrap_or_default();
        let Ty::Scalar(kind) = ty else {
            return Err(ConversionError::UnsupportedTarget { ty: ty.clone() });
        };
        let parse_error = || ConversionError::Parse {
            value: raw.to_owned(),
            expected: kind.name(),
        };
        let value = match kind {
            ScalarKind::String => Value::str(raw),
            ScalarKind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => Value::bool(true),
                "false" => Value::bool(false),
                _ => return Err(parse_error()),
            },
            ScalarKind::Int => raw
                .trim()
                .parse::<i64>()
                .map(Value::int)
                .map_err(|_| parse_error())?,
            ScalarKind::Float => {
                let normalized = raw.trim().replace(self.locale.decimal_separator, ".");
                normalized
                    .parse::<f64>()
                    .map(Value::float)
                    .map_err(|_| parse_error())?
            }
        };
        Ok(value)
    }
}

/// An in-memory [`ValueSource`]: the implementation used by tests and by
/// embedders that already hold their request data as name/value pairs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryValueSource {
    entries: IndexMap<String, SourceValue>,
}

impl InMemoryValueSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: SourceValue) {
        self.entries.insert(name.into(), value);
    }

    /// Builder-style insertion of a single-entry value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, SourceValue::new(value));
        self
    }

    /// Builder-style insertion of an arbitrary value.
    pub fn with_value(mut self, name: impl Into<String>, value: SourceValue) -> Self {
        self.insert(name, value);
        self
    }
}

impl ValueSource for InMemoryValueSource {
    fn get_value(&self, name: &str) -> Option<SourceValue> {
        self.entries.get(name).cloned()
    }

    fn contains_prefix(&self, prefix: &str) -> bool {
        if prefix.is_empty() {
            return !self.entries.is_empty();
        }
        self.entries.keys().any(|key| {
            key == prefix
                || key
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('.') || rest.starts_with('['))
        })
    }
}
