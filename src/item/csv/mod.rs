//! CSV writing for scalar, structured and key-value records.
//!
//! # Module Architecture
//!
//! The CSV module is layered from the field up:
//!
//! 1. **FieldEncoder**: quotes a single field when it contains an escape string.
//!
//! 2. **ScalarFormatter**: renders non-string values as text.
//!
//! 3. **RowEmitter**: joins fields with the item separator and ends the row.
//!
//! 4. **UniformWriter**: writes scalar records as single-field rows and structured
//!    records through their cached schema.
//!
//! 5. **MapWriter**: writes key-value records, either under the sorted union of
//!    all keys (string maps) or under the first record's own keys (object maps).
//!
//! 6. **CsvSerializer**: the entry point, dispatching each record type to the
//!    right writer.
//!
//! # Examples
//!
//! ## Writing key-value records
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use csv_records::core::config::CsvConfigBuilder;
//! use csv_records::item::csv::csv_writer::CsvSerializerBuilder;
//!
//! let first = BTreeMap::from([("k1".to_string(), "v1".to_string())]);
//! let second = BTreeMap::from([("k2".to_string(), "v2".to_string())]);
//!
//! let serializer = CsvSerializerBuilder::new()
//!     .config(CsvConfigBuilder::new().row_separator("\n").build())
//!     .build();
//!
//! let data = serializer.serialize_to_string(&[first, second]).unwrap();
//! assert_eq!(data, "k1,k2\nv1,\n,v2\n");
//! ```
//!
//! ## Writing scalars
//!
//! ```
//! use csv_records::core::config::CsvConfigBuilder;
//! use csv_records::item::csv::csv_writer::CsvSerializerBuilder;
//!
//! let serializer = CsvSerializerBuilder::new()
//!     .config(CsvConfigBuilder::new().row_separator("\n").build())
//!     .build();
//!
//! let data = serializer.serialize_to_string(&["x", "y"]).unwrap();
//! assert_eq!(data, "x\ny\n");
//! ```

/// A module providing the entry point for writing CSV records.
pub mod csv_writer;

/// A module providing field quoting.
pub mod field_encoder;

/// A module providing the two key-value record strategies.
pub mod map_writer;

pub mod row_emitter;

/// A module providing value formatting for non-string fields.
pub mod scalar_formatter;

pub mod uniform_writer;
