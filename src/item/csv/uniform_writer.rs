use std::{any::type_name, io::Write};

use serde_json::Value;

use crate::{
    core::{
        config::CsvConfig,
        record::{RecordShape, StructuredShape},
        schema::SchemaCache,
    },
    error::CsvError,
    item::csv::{
        field_encoder::FieldEncoder, row_emitter::RowEmitter, scalar_formatter::ScalarFormatter,
    },
};

/// Writes homogeneous sequences of scalar or structured records.
///
/// Scalar records become single-field rows and never get a header. Structured
/// records are written through their cached schema, so every row has exactly one
/// field per column.
pub struct UniformWriter<'a> {
    cache: &'a SchemaCache,
    formatter: &'a dyn ScalarFormatter,
    encoder: &'a dyn FieldEncoder,
    emitter: RowEmitter<'a>,
}

impl<'a> UniformWriter<'a> {
    pub fn new(
        config: &'a CsvConfig,
        cache: &'a SchemaCache,
        formatter: &'a dyn ScalarFormatter,
        encoder: &'a dyn FieldEncoder,
    ) -> Self {
        UniformWriter {
            cache,
            formatter,
            encoder,
            emitter: RowEmitter::new(config, encoder),
        }
    }

    /// Writes `records` and returns the number of data rows written.
    pub fn write<'r, W, T, I>(
        &self,
        sink: &mut W,
        shape: RecordShape<T>,
        records: I,
        omit_headers: bool,
    ) -> Result<usize, CsvError>
    where
        W: Write + ?Sized,
        T: 'static,
        I: IntoIterator<Item = &'r T>,
    {
        let kind = shape.name();
        match shape {
            RecordShape::Text(text) => self.write_rows(sink, records, |record| {
                Ok(vec![self.encoder.encode(text(record)).into_owned()])
            }),
            RecordShape::Value(value) => self.write_rows(sink, records, |record| {
                Ok(vec![self.field(value(record))?])
            }),
            RecordShape::Structured(describe) => {
                self.write_structured(sink, describe, records, omit_headers)
            }
            RecordShape::StringMap(_) | RecordShape::ObjectMap(_) => Err(CsvError::Shape(format!(
                "{} is a {} record and cannot be written as uniform rows",
                type_name::<T>(),
                kind
            ))),
        }
    }

    fn write_structured<'r, W, T, I>(
        &self,
        sink: &mut W,
        describe: fn() -> StructuredShape<T>,
        records: I,
        omit_headers: bool,
    ) -> Result<usize, CsvError>
    where
        W: Write + ?Sized,
        T: 'static,
        I: IntoIterator<Item = &'r T>,
    {
        let schema = self.cache.resolve(describe);

        if !omit_headers && !schema.is_empty() {
            self.emitter.emit_raw_row(sink, schema.headers())?;
        }

        self.write_rows(sink, records, |record| {
            schema
                .columns()
                .iter()
                .map(|column| self.field(column.read(record)?))
                .collect()
        })
    }

    fn write_rows<'r, W, T, I, F>(&self, sink: &mut W, records: I, to_row: F) -> Result<usize, CsvError>
    where
        W: Write + ?Sized,
        T: 'r,
        I: IntoIterator<Item = &'r T>,
        F: Fn(&T) -> Result<Vec<String>, CsvError>,
    {
        let mut count = 0;
        for record in records {
            let row = to_row(record)?;
            self.emitter.emit_row(sink, &row)?;
            count += 1;
        }
        Ok(count)
    }

    /// Strings pass through unformatted; null becomes an empty field.
    fn field(&self, value: Value) -> Result<String, CsvError> {
        let text = match value {
            Value::Null => return Ok(String::new()),
            Value::String(text) => text,
            other => self.formatter.format(&other)?,
        };
        Ok(self.encoder.encode(&text).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use serde_json::{Map, Value, json};

    use super::UniformWriter;
    use crate::{
        core::{
            config::{CsvConfig, CsvConfigBuilder},
            record::{CsvRecord, FieldDescriptor, RecordShape, StructuredShape},
            schema::SchemaCache,
        },
        error::CsvError,
        item::csv::{field_encoder::QuotingEncoder, scalar_formatter::JsonScalarFormatter},
    };

    struct Item {
        id: u32,
        name: Option<String>,
    }

    impl CsvRecord for Item {
        fn shape() -> RecordShape<Self> {
            RecordShape::Structured(|| {
                StructuredShape::new(vec![
                    FieldDescriptor::new("id", |i: &Item| &i.id),
                    FieldDescriptor::new("name", |i: &Item| &i.name),
                ])
            })
        }
    }

    struct Hidden;

    impl CsvRecord for Hidden {
        fn shape() -> RecordShape<Self> {
            RecordShape::Structured(|| {
                StructuredShape::new(vec![FieldDescriptor::write_only("nothing")])
            })
        }
    }

    struct Tagged {
        tags: Vec<&'static str>,
    }

    impl CsvRecord for Tagged {
        fn shape() -> RecordShape<Self> {
            RecordShape::Structured(|| {
                StructuredShape::new(vec![
                    FieldDescriptor::new("tags", |t: &Tagged| &t.tags),
                    FieldDescriptor::computed("fails", |_: &Tagged| {
                        Err(CsvError::Accessor("boom".to_string()))
                    }),
                ])
            })
        }
    }

    struct Pair {
        left: u32,
        right: u32,
    }

    impl CsvRecord for Pair {
        fn shape() -> RecordShape<Self> {
            RecordShape::Structured(|| {
                StructuredShape::new(vec![
                    FieldDescriptor::new("x;y", |p: &Pair| &p.left),
                    FieldDescriptor::new("b", |p: &Pair| &p.right),
                ])
            })
        }
    }

    fn config() -> CsvConfig {
        CsvConfigBuilder::new().row_separator("\n").build()
    }

    fn write<T: CsvRecord>(
        config: &CsvConfig,
        records: &[T],
        omit_headers: bool,
    ) -> Result<String, Box<dyn Error>> {
        let cache = SchemaCache::new();
        let encoder = QuotingEncoder::from_config(config);
        let writer = UniformWriter::new(config, &cache, &JsonScalarFormatter, &encoder);
        let mut buffer = Vec::new();

        writer.write(&mut buffer, T::shape(), records, omit_headers)?;

        Ok(String::from_utf8(buffer)?)
    }

    #[test]
    fn structured_records_should_have_header_and_aligned_rows() -> Result<(), Box<dyn Error>> {
        let items = vec![
            Item {
                id: 1,
                name: Some("a,b".to_string()),
            },
            Item { id: 2, name: None },
        ];

        let output = write(&config(), &items, false)?;

        assert_eq!(output, "id,name\n1,\"a,b\"\n2,\n");
        Ok(())
    }

    #[test]
    fn omitted_headers_should_keep_data_rows() -> Result<(), Box<dyn Error>> {
        let items = vec![Item {
            id: 9,
            name: Some("x".to_string()),
        }];

        let output = write(&config(), &items, true)?;

        assert_eq!(output, "9,x\n");
        Ok(())
    }

    #[test]
    fn shared_schema_should_be_encoded_per_writer() -> Result<(), Box<dyn Error>> {
        let cache = SchemaCache::new();
        let records = vec![Pair { left: 1, right: 2 }];
        let comma = config();
        let semicolon = CsvConfigBuilder::new()
            .item_separator(";")
            .row_separator("\n")
            .build();

        let mut output = Vec::new();
        for config in [&comma, &semicolon] {
            let encoder = QuotingEncoder::from_config(config);
            let writer = UniformWriter::new(config, &cache, &JsonScalarFormatter, &encoder);
            let mut buffer = Vec::new();
            writer.write(&mut buffer, Pair::shape(), &records, false)?;
            output.push(String::from_utf8(buffer)?);
        }

        assert_eq!(output, vec!["x;y,b\n1,2\n", "\"x;y\";b\n1;2\n"]);
        Ok(())
    }

    #[test]
    fn empty_sequence_should_write_header_only() -> Result<(), Box<dyn Error>> {
        let output = write::<Item>(&config(), &[], false)?;

        assert_eq!(output, "id,name\n");
        Ok(())
    }

    #[test]
    fn empty_schema_should_skip_header() -> Result<(), Box<dyn Error>> {
        let output = write(&config(), &[Hidden, Hidden], false)?;

        assert_eq!(output, "\n\n");
        Ok(())
    }

    #[test]
    fn text_records_should_never_have_header() -> Result<(), Box<dyn Error>> {
        let records = vec!["x".to_string(), "y,z".to_string()];

        let output = write(&config(), &records, false)?;

        assert_eq!(output, "x\n\"y,z\"\n");
        Ok(())
    }

    #[test]
    fn value_records_should_be_formatted() -> Result<(), Box<dyn Error>> {
        let output = write(&config(), &[1.5f64, -2.0], false)?;

        assert_eq!(output, "1.5\n-2.0\n");
        Ok(())
    }

    #[test]
    fn accessor_failure_should_stop_the_write() {
        let config = config();
        let cache = SchemaCache::new();
        let encoder = QuotingEncoder::from_config(&config);
        let writer = UniformWriter::new(&config, &cache, &JsonScalarFormatter, &encoder);
        let mut buffer = Vec::new();
        let records = vec![Tagged { tags: vec!["a", "b"] }];

        let result = writer.write(&mut buffer, Tagged::shape(), &records, false);

        assert!(matches!(result, Err(CsvError::Accessor(_))));
        assert_eq!(String::from_utf8(buffer).unwrap(), "tags,fails\n");
    }

    #[test]
    fn map_shape_should_be_rejected() {
        let config = config();
        let cache = SchemaCache::new();
        let encoder = QuotingEncoder::from_config(&config);
        let writer = UniformWriter::new(&config, &cache, &JsonScalarFormatter, &encoder);
        let records = vec![json!({"k": "v"}).as_object().unwrap().clone()];

        let result = writer.write(&mut Vec::<u8>::new(), Map::<String, Value>::shape(), &records, false);

        assert!(matches!(result, Err(CsvError::Shape(_))));
    }
}
