use serde_json::Value;

use crate::error::CsvError;

/// Renders a non-string field value as text.
pub trait ScalarFormatter: Send + Sync {
    fn format(&self, value: &Value) -> Result<String, CsvError>;
}

/// Formats scalars canonically and nested values as compact JSON.
///
/// # Examples
///
/// ```
/// use csv_records::item::csv::scalar_formatter::{JsonScalarFormatter, ScalarFormatter};
/// use serde_json::json;
///
/// let formatter = JsonScalarFormatter;
///
/// assert_eq!(formatter.format(&json!(42)).unwrap(), "42");
/// assert_eq!(formatter.format(&json!(null)).unwrap(), "");
/// assert_eq!(formatter.format(&json!([1, 2])).unwrap(), "[1,2]");
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonScalarFormatter;

impl ScalarFormatter for JsonScalarFormatter {
    fn format(&self, value: &Value) -> Result<String, CsvError> {
        match value {
            Value::Null => Ok(String::new()),
            Value::Bool(flag) => Ok(flag.to_string()),
            Value::Number(number) => Ok(number.to_string()),
            Value::String(text) => Ok(text.clone()),
            Value::Array(_) | Value::Object(_) => {
                serde_json::to_string(value).map_err(|error| CsvError::Format(error.to_string()))
            }
        }
    }
}
