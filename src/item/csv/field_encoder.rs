use std::borrow::Cow;

use crate::core::config::CsvConfig;

/// Encodes one string as a CSV field.
///
/// Encoding is applied exactly once per field: encoding an already encoded
/// field quotes it a second time.
pub trait FieldEncoder: Send + Sync {
    fn encode<'a>(&self, value: &'a str) -> Cow<'a, str>;
}

/// Quotes a field when it contains one of the configured escape strings.
///
/// The field is wrapped in the item delimiter and every delimiter inside it is doubled.
///
/// # Examples
///
/// ```
/// use csv_records::item::csv::field_encoder::{FieldEncoder, QuotingEncoder};
///
/// let encoder = QuotingEncoder::default();
///
/// assert_eq!(encoder.encode("plain"), "plain");
/// assert_eq!(encoder.encode("a,b"), "\"a,b\"");
/// assert_eq!(encoder.encode("say \"hi\""), "\"say \"\"hi\"\"\"");
/// ```
#[derive(Debug, Clone)]
pub struct QuotingEncoder {
    delimiter: String,
    escape_strings: Vec<String>,
}

impl QuotingEncoder {
    pub fn new<D, I, S>(delimiter: D, escape_strings: I) -> Self
    where
        D: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QuotingEncoder {
            delimiter: delimiter.into(),
            escape_strings: escape_strings
                .into_iter()
                .map(Into::into)
                .filter(|escape: &String| !escape.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &CsvConfig) -> Self {
        Self::new(config.item_delimiter(), config.escape_strings().iter().cloned())
    }

    fn needs_quoting(&self, value: &str) -> bool {
        self.escape_strings
            .iter()
            .any(|escape| value.contains(escape.as_str()))
    }
}

impl Default for QuotingEncoder {
    fn default() -> Self {
        Self::from_config(&CsvConfig::default())
    }
}

impl FieldEncoder for QuotingEncoder {
    fn encode<'a>(&self, value: &'a str) -> Cow<'a, str> {
        if self.delimiter.is_empty() || !self.needs_quoting(value) {
            return Cow::Borrowed(value);
        }

        let doubled = self.delimiter.repeat(2);
        Cow::Owned(format!(
            "{delimiter}{}{delimiter}",
            value.replace(&self.delimiter, &doubled),
            delimiter = self.delimiter
        ))
    }
}
