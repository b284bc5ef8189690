/// Global and per-type formatting options.
pub mod config;

/// Record shapes and field descriptors.
pub mod record;

/// Per-type schema cache and header overrides.
pub mod schema;
