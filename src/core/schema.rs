use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError},
};

use log::debug;
use serde_json::Value;

use crate::{
    core::record::{FieldAccessor, FieldKind, StructuredShape},
    error::CsvError,
};

/// Maps an original column name to its replacement header.
///
/// Columns whose original name is absent from the map are dropped.
pub type HeaderOverrideMap = HashMap<String, String>;

/// One output column of a structured record type.
pub struct Column<T> {
    name: String,
    header: String,
    accessor: FieldAccessor<T>,
}

impl<T> Column<T> {
    /// Original column name, used to match header overrides.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display name, not yet encoded as a CSV field.
    ///
    /// Writers encode it when the header row is emitted, so one cached schema
    /// serves serializers with different separators and delimiters.
    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn read(&self, record: &T) -> Result<Value, CsvError> {
        (self.accessor)(record)
    }
}

/// The ordered columns of a structured record type.
pub struct Schema<T> {
    columns: Vec<Column<T>>,
}

impl<T> Schema<T> {
    fn build(shape: StructuredShape<T>) -> Self {
        let data_contract = shape.is_data_contract();
        let columns = shape
            .fields()
            .iter()
            .filter(|field| !field.is_ignored() && field.kind() == FieldKind::Scalar)
            .filter_map(|field| {
                let accessor = field.accessor()?.clone();
                let name = match field.data_member_name() {
                    Some(member) if data_contract => member.to_string(),
                    _ => field.name().to_string(),
                };
                Some(Column {
                    header: name.clone(),
                    name,
                    accessor,
                })
            })
            .collect();

        Schema { columns }
    }

    fn apply_overrides(&mut self, overrides: &HeaderOverrideMap) {
        for index in (0..self.columns.len()).rev() {
            match overrides.get(&self.columns[index].name) {
                Some(header) => self.columns[index].header = header.clone(),
                None => {
                    self.columns.remove(index);
                }
            }
        }
    }

    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::header)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

type CachedSchema = Arc<dyn Any + Send + Sync>;

/// Per-type cache of structured record schemas.
///
/// A schema is built on first use and reused until the type is reset or its
/// headers are overridden. All operations on the cache are serialized by one lock,
/// so two concurrent resolutions of the same type never build two schemas.
///
/// # Examples
///
/// ```
/// use csv_records::core::record::{FieldDescriptor, StructuredShape};
/// use csv_records::core::schema::{HeaderOverrideMap, SchemaCache};
///
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// fn point_shape() -> StructuredShape<Point> {
///     StructuredShape::new(vec![
///         FieldDescriptor::new("x", |p: &Point| &p.x),
///         FieldDescriptor::new("y", |p: &Point| &p.y),
///     ])
/// }
///
/// let cache = SchemaCache::new();
///
/// let schema = cache.resolve(point_shape);
/// assert_eq!(schema.headers().collect::<Vec<_>>(), vec!["x", "y"]);
///
/// let overrides = HeaderOverrideMap::from([("y".to_string(), "Y axis".to_string())]);
/// let schema = cache.apply_header_override(point_shape, &overrides);
/// assert_eq!(schema.headers().collect::<Vec<_>>(), vec!["Y axis"]);
/// ```
#[derive(Default)]
pub struct SchemaCache {
    schemas: Mutex<HashMap<TypeId, CachedSchema>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache shared by serializers that do not inject their own.
    pub fn global() -> Arc<SchemaCache> {
        static GLOBAL: OnceLock<Arc<SchemaCache>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(SchemaCache::new())).clone()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TypeId, CachedSchema>> {
        self.schemas.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached schema of `T`, building it on first access.
    pub fn resolve<T: 'static>(
        &self,
        describe: fn() -> StructuredShape<T>,
    ) -> Arc<Schema<T>> {
        let mut schemas = self.lock();

        if let Some(schema) = schemas
            .get(&TypeId::of::<T>())
            .and_then(|cached| cached.clone().downcast::<Schema<T>>().ok())
        {
            return schema;
        }

        let schema = Arc::new(Schema::build(describe()));
        debug!(
            "Built CSV schema for {} with {} columns",
            type_name::<T>(),
            schema.len()
        );
        schemas.insert(TypeId::of::<T>(), schema.clone());
        schema
    }

    /// Rebuilds the schema of `T`, discarding any cached columns and overrides.
    pub fn reset<T: 'static>(
        &self,
        describe: fn() -> StructuredShape<T>,
    ) -> Arc<Schema<T>> {
        let schema = Arc::new(Schema::build(describe()));
        debug!("Reset CSV schema for {}", type_name::<T>());
        self.lock().insert(TypeId::of::<T>(), schema.clone());
        schema
    }

    /// Rebuilds the schema of `T` then keeps and renames only the overridden columns.
    pub fn apply_header_override<T: 'static>(
        &self,
        describe: fn() -> StructuredShape<T>,
        overrides: &HeaderOverrideMap,
    ) -> Arc<Schema<T>> {
        let mut schemas = self.lock();

        let mut schema = Schema::build(describe());
        schema.apply_overrides(overrides);
        debug!(
            "Applied header override to {}, {} columns kept",
            type_name::<T>(),
            schema.len()
        );

        let schema = Arc::new(schema);
        schemas.insert(TypeId::of::<T>(), schema.clone());
        schema
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.lock().contains_key(&TypeId::of::<T>())
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
