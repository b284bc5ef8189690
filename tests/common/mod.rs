pub mod mocks;

pub use mocks::*;

use std::sync::Arc;

use csv_records::{
    core::{config::CsvConfigBuilder, schema::SchemaCache},
    item::csv::csv_writer::{CsvSerializer, CsvSerializerBuilder},
};

/// Installs the test logger once per test binary.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A serializer writing `\n` rows with its own schema cache.
pub fn serializer() -> CsvSerializer {
    CsvSerializerBuilder::new()
        .config(CsvConfigBuilder::new().row_separator("\n").build())
        .schema_cache(Arc::new(SchemaCache::new()))
        .build()
}
