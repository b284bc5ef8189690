#![cfg_attr(docsrs, feature(doc_cfg))]
//#![warn(missing_docs)]

/*!
 # CSV Records

 A configurable CSV serializer for sequences of in-memory records. It writes
 uniform structured records, key-value maps and scalar values as CSV text, and takes care
 of header derivation, field escaping, column reconciliation across heterogeneous maps
 and header customization.

 ## Core Concepts

- **RecordShape:** Declares how one record decomposes into fields. A record is either a
  scalar (the record itself is the only field), a structured record with a fixed field
  set, or a key-value map whose keys vary per record.
- **Schema:** The ordered columns of a structured record type. It is built once per type
  and cached in a `SchemaCache` until the type is reset or its headers are overridden.
- **Header override:** A mapping from original column names to replacement headers.
  Columns missing from the mapping are dropped.
- **Row:** One line of encoded fields joined by the item separator.

 ## Record kinds

| **Kind**          | **Header**                               | **Columns**                           |
|-------------------|------------------------------------------|---------------------------------------|
| Scalar text/value | never                                    | one per record                        |
| Structured        | column names, unless omitted             | schema order                          |
| String map        | sorted union of all keys, unless omitted | sorted key union, missing keys empty  |
| Object map        | first record's keys, unless omitted      | each record's own keys                |

 ## Getting Started

```rust
use csv_records::{
    core::{
        config::CsvConfigBuilder,
        record::{CsvRecord, FieldDescriptor, RecordShape, StructuredShape},
    },
    item::csv::csv_writer::CsvSerializerBuilder,
    CsvError,
};

struct Car {
    year: u16,
    make: String,
    model: String,
    description: Option<String>,
}

impl CsvRecord for Car {
    fn shape() -> RecordShape<Self> {
        RecordShape::Structured(|| {
            StructuredShape::new(vec![
                FieldDescriptor::new("year", |c: &Car| &c.year),
                FieldDescriptor::new("make", |c: &Car| &c.make),
                FieldDescriptor::new("model", |c: &Car| &c.model),
                FieldDescriptor::new("description", |c: &Car| &c.description),
            ])
        })
    }
}

fn main() -> Result<(), CsvError> {
    let cars = vec![
        Car {
            year: 1948,
            make: "Porsche".to_string(),
            model: "356".to_string(),
            description: Some("Luxury sports car".to_string()),
        },
        Car {
            year: 1967,
            make: "Ford".to_string(),
            model: "Mustang fastback 1967".to_string(),
            description: None,
        },
    ];

    let serializer = CsvSerializerBuilder::new()
        .config(CsvConfigBuilder::new().row_separator("\n").build())
        .build();

    let csv = serializer.serialize_to_string(&cars)?;

    assert_eq!(
        csv,
        "year,make,model,description\n\
         1948,Porsche,356,Luxury sports car\n\
         1967,Ford,Mustang fastback 1967,\n"
    );

    Ok(())
}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.

 */

/// Core module for record shapes, schemas and configuration
pub mod core;

/// Error types for CSV serialization
pub mod error;

#[doc(inline)]
pub use error::*;

/// Set of CSV writers (for example: uniform and map record writers)
pub mod item;
