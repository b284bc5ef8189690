use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CsvError;

/// Reads one field out of a record.
///
/// A produced `Value::Null` is written as an empty field.
pub type FieldAccessor<T> = Arc<dyn Fn(&T) -> Result<Value, CsvError> + Send + Sync>;

/// Whether a field value can be rendered by the scalar formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    /// The value has no string representation; the field never becomes a column.
    Opaque,
}

/// Describes one declared field of a structured record.
///
/// # Examples
///
/// ```
/// use csv_records::core::record::{FieldDescriptor, FieldKind};
///
/// struct Person {
///     id: u32,
///     name: String,
/// }
///
/// let id = FieldDescriptor::new("id", |p: &Person| &p.id);
/// let name = FieldDescriptor::new("name", |p: &Person| &p.name).data_member("full_name");
///
/// assert_eq!(id.name(), "id");
/// assert_eq!(name.data_member_name(), Some("full_name"));
/// assert_eq!(name.kind(), FieldKind::Scalar);
/// ```
pub struct FieldDescriptor<T> {
    name: String,
    data_member_name: Option<String>,
    accessor: Option<FieldAccessor<T>>,
    kind: FieldKind,
    ignored: bool,
}

impl<T> FieldDescriptor<T> {
    /// Describes a field read through `getter` and rendered with serde.
    pub fn new<N, V, F>(name: N, getter: F) -> Self
    where
        N: Into<String>,
        V: Serialize + ?Sized,
        F: Fn(&T) -> &V + Send + Sync + 'static,
    {
        let name = name.into();
        let field = name.clone();
        let accessor: FieldAccessor<T> = Arc::new(move |record: &T| {
            serde_json::to_value(getter(record))
                .map_err(|error| CsvError::Accessor(format!("field '{}': {}", field, error)))
        });

        Self::with_accessor(name, Some(accessor))
    }

    /// Describes a field whose value is produced by a fallible accessor.
    pub fn computed<N, F>(name: N, accessor: F) -> Self
    where
        N: Into<String>,
        F: Fn(&T) -> Result<Value, CsvError> + Send + Sync + 'static,
    {
        Self::with_accessor(name.into(), Some(Arc::new(accessor)))
    }

    /// Describes a field that has no readable accessor.
    pub fn write_only<N: Into<String>>(name: N) -> Self {
        Self::with_accessor(name.into(), None)
    }

    fn with_accessor(name: String, accessor: Option<FieldAccessor<T>>) -> Self {
        FieldDescriptor {
            name,
            data_member_name: None,
            accessor,
            kind: FieldKind::Scalar,
            ignored: false,
        }
    }

    /// Explicit column name used when the shape follows the data contract convention.
    pub fn data_member<N: Into<String>>(mut self, name: N) -> Self {
        self.data_member_name = Some(name.into());
        self
    }

    pub fn opaque(mut self) -> Self {
        self.kind = FieldKind::Opaque;
        self
    }

    pub fn ignore(mut self) -> Self {
        self.ignored = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_member_name(&self) -> Option<&str> {
        self.data_member_name.as_deref()
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    pub fn accessor(&self) -> Option<&FieldAccessor<T>> {
        self.accessor.as_ref()
    }
}

/// The declared field set of a structured record type, in declaration order.
pub struct StructuredShape<T> {
    fields: Vec<FieldDescriptor<T>>,
    data_contract: bool,
}

impl<T> StructuredShape<T> {
    pub fn new(fields: Vec<FieldDescriptor<T>>) -> Self {
        StructuredShape {
            fields,
            data_contract: false,
        }
    }

    /// Opts into data contract naming: a field's data member name replaces its declared name.
    pub fn data_contract(mut self) -> Self {
        self.data_contract = true;
        self
    }

    pub fn is_data_contract(&self) -> bool {
        self.data_contract
    }

    pub fn fields(&self) -> &[FieldDescriptor<T>] {
        &self.fields
    }
}

/// How a record decomposes into CSV fields.
pub enum RecordShape<T> {
    /// The record is a single string field.
    Text(fn(&T) -> &str),
    /// The record is a single non-string value.
    Value(fn(&T) -> Value),
    /// A fixed field set, described once per type.
    Structured(fn() -> StructuredShape<T>),
    /// String values under a key set that varies per record; columns are the sorted key union.
    StringMap(fn(&T) -> Vec<(&str, &str)>),
    /// Arbitrary values; the header comes from the first record's own keys.
    ObjectMap(fn(&T) -> Vec<(&str, Value)>),
}

impl<T> RecordShape<T> {
    pub fn is_map(&self) -> bool {
        matches!(self, RecordShape::StringMap(_) | RecordShape::ObjectMap(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            RecordShape::Text(_) => "text",
            RecordShape::Value(_) => "value",
            RecordShape::Structured(_) => "structured",
            RecordShape::StringMap(_) => "string map",
            RecordShape::ObjectMap(_) => "object map",
        }
    }
}

/// A type that can be written as CSV records.
///
/// # Examples
///
/// ```
/// use csv_records::core::record::{CsvRecord, FieldDescriptor, RecordShape, StructuredShape};
///
/// struct City {
///     name: String,
///     population: u64,
/// }
///
/// impl CsvRecord for City {
///     fn shape() -> RecordShape<Self> {
///         RecordShape::Structured(|| {
///             StructuredShape::new(vec![
///                 FieldDescriptor::new("name", |c: &City| &c.name),
///                 FieldDescriptor::new("population", |c: &City| &c.population),
///             ])
///         })
///     }
/// }
///
/// assert!(!City::shape().is_map());
/// ```
pub trait CsvRecord: Sized + 'static {
    fn shape() -> RecordShape<Self>;
}

fn string_text(value: &String) -> &str {
    value.as_str()
}

fn static_str_text<'a>(value: &'a &'static str) -> &'a str {
    value
}

fn cow_text<'a>(value: &'a Cow<'static, str>) -> &'a str {
    value.as_ref()
}

impl CsvRecord for String {
    fn shape() -> RecordShape<Self> {
        RecordShape::Text(string_text)
    }
}

impl CsvRecord for &'static str {
    fn shape() -> RecordShape<Self> {
        RecordShape::Text(static_str_text)
    }
}

impl CsvRecord for Cow<'static, str> {
    fn shape() -> RecordShape<Self> {
        RecordShape::Text(cow_text)
    }
}

macro_rules! value_record {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CsvRecord for $ty {
                fn shape() -> RecordShape<Self> {
                    RecordShape::Value(|value| Value::from(*value))
                }
            }
        )*
    };
}

value_record!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool);

impl CsvRecord for char {
    fn shape() -> RecordShape<Self> {
        RecordShape::Value(|value| Value::String(value.to_string()))
    }
}

fn hash_string_entries(map: &HashMap<String, String>) -> Vec<(&str, &str)> {
    map.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
}

fn btree_string_entries(map: &BTreeMap<String, String>) -> Vec<(&str, &str)> {
    map.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
}

fn hash_object_entries(map: &HashMap<String, Value>) -> Vec<(&str, Value)> {
    map.iter().map(|(k, v)| (k.as_str(), v.clone())).collect()
}

fn btree_object_entries(map: &BTreeMap<String, Value>) -> Vec<(&str, Value)> {
    map.iter().map(|(k, v)| (k.as_str(), v.clone())).collect()
}

fn json_object_entries(map: &Map<String, Value>) -> Vec<(&str, Value)> {
    map.iter().map(|(k, v)| (k.as_str(), v.clone())).collect()
}

impl CsvRecord for HashMap<String, String> {
    fn shape() -> RecordShape<Self> {
        RecordShape::StringMap(hash_string_entries)
    }
}

impl CsvRecord for BTreeMap<String, String> {
    fn shape() -> RecordShape<Self> {
        RecordShape::StringMap(btree_string_entries)
    }
}

impl CsvRecord for HashMap<String, Value> {
    fn shape() -> RecordShape<Self> {
        RecordShape::ObjectMap(hash_object_entries)
    }
}

impl CsvRecord for BTreeMap<String, Value> {
    fn shape() -> RecordShape<Self> {
        RecordShape::ObjectMap(btree_object_entries)
    }
}

impl CsvRecord for Map<String, Value> {
    fn shape() -> RecordShape<Self> {
        RecordShape::ObjectMap(json_object_entries)
    }
}
