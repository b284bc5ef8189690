use std::{any::TypeId, collections::HashMap};

/// Default string written between two fields of a row.
pub const DEFAULT_ITEM_SEPARATOR: &str = ",";

/// Default string used to quote a field that needs escaping.
pub const DEFAULT_ITEM_DELIMITER: &str = "\"";

/// Default row terminator, the platform line terminator.
#[cfg(windows)]
pub const DEFAULT_ROW_SEPARATOR: &str = "\r\n";

/// Default row terminator, the platform line terminator.
#[cfg(not(windows))]
pub const DEFAULT_ROW_SEPARATOR: &str = "\n";

/// Formatting options consumed read-only by the CSV writers.
///
/// A `CsvConfig` is produced by [`CsvConfigBuilder`] and never changes afterwards.
/// It holds the global defaults plus per-record-type overrides of the header
/// suppression flag.
///
/// # Examples
///
/// ```
/// use csv_records::core::config::CsvConfigBuilder;
///
/// let config = CsvConfigBuilder::new()
///     .item_separator(";")
///     .row_separator("\r\n")
///     .omit_headers_for::<String>(true)
///     .build();
///
/// assert_eq!(config.item_separator(), ";");
/// assert!(config.escape_strings().contains(&";".to_string()));
/// assert!(config.omit_headers_for::<String>());
/// assert!(!config.omit_headers_for::<u32>());
/// ```
#[derive(Debug, Clone)]
pub struct CsvConfig {
    item_separator: String,
    item_delimiter: String,
    row_separator: String,
    escape_strings: Vec<String>,
    omit_headers: bool,
    shape_omit_headers: HashMap<TypeId, bool>,
}

impl CsvConfig {
    pub fn item_separator(&self) -> &str {
        &self.item_separator
    }

    pub fn item_delimiter(&self) -> &str {
        &self.item_delimiter
    }

    pub fn row_separator(&self) -> &str {
        &self.row_separator
    }

    /// Strings whose presence in a field forces it to be quoted.
    pub fn escape_strings(&self) -> &[String] {
        &self.escape_strings
    }

    /// Global header suppression default.
    pub fn omit_headers(&self) -> bool {
        self.omit_headers
    }

    /// Effective header suppression flag for record type `T`.
    ///
    /// A per-type override wins over the global default.
    pub fn omit_headers_for<T: 'static>(&self) -> bool {
        self.shape_omit_headers
            .get(&TypeId::of::<T>())
            .copied()
            .unwrap_or(self.omit_headers)
    }
}

impl Default for CsvConfig {
    fn default() -> Self {
        CsvConfigBuilder::new().build()
    }
}

/// Builder for [`CsvConfig`].
#[derive(Debug)]
pub struct CsvConfigBuilder {
    item_separator: String,
    item_delimiter: String,
    row_separator: String,
    escape_strings: Option<Vec<String>>,
    omit_headers: bool,
    shape_omit_headers: HashMap<TypeId, bool>,
}

impl Default for CsvConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvConfigBuilder {
    pub fn new() -> CsvConfigBuilder {
        CsvConfigBuilder {
            item_separator: DEFAULT_ITEM_SEPARATOR.to_string(),
            item_delimiter: DEFAULT_ITEM_DELIMITER.to_string(),
            row_separator: DEFAULT_ROW_SEPARATOR.to_string(),
            escape_strings: None,
            omit_headers: false,
            shape_omit_headers: HashMap::new(),
        }
    }

    pub fn item_separator<S: Into<String>>(mut self, separator: S) -> CsvConfigBuilder {
        self.item_separator = separator.into();
        self
    }

    pub fn item_delimiter<S: Into<String>>(mut self, delimiter: S) -> CsvConfigBuilder {
        self.item_delimiter = delimiter.into();
        self
    }

    pub fn row_separator<S: Into<String>>(mut self, separator: S) -> CsvConfigBuilder {
        self.row_separator = separator.into();
        self
    }

    /// Replaces the computed quoting trigger set.
    ///
    /// When not set, the trigger set is the item delimiter, the item separator,
    /// the row separator, `\r` and `\n`.
    pub fn escape_strings<I, S>(mut self, escapes: I) -> CsvConfigBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.escape_strings = Some(escapes.into_iter().map(Into::into).collect());
        self
    }

    pub fn omit_headers(mut self, yes: bool) -> CsvConfigBuilder {
        self.omit_headers = yes;
        self
    }

    pub fn omit_headers_for<T: 'static>(mut self, yes: bool) -> CsvConfigBuilder {
        self.shape_omit_headers.insert(TypeId::of::<T>(), yes);
        self
    }

    pub fn build(self) -> CsvConfig {
        let candidates = self.escape_strings.unwrap_or_else(|| {
            vec![
                self.item_delimiter.clone(),
                self.item_separator.clone(),
                self.row_separator.clone(),
                "\r".to_string(),
                "\n".to_string(),
            ]
        });

        let mut escape_strings: Vec<String> = Vec::with_capacity(candidates.len());
        for escape in candidates {
            if !escape.is_empty() && !escape_strings.contains(&escape) {
                escape_strings.push(escape);
            }
        }

        CsvConfig {
            item_separator: self.item_separator,
            item_delimiter: self.item_delimiter,
            row_separator: self.row_separator,
            escape_strings,
            omit_headers: self.omit_headers,
            shape_omit_headers: self.shape_omit_headers,
        }
    }
}
