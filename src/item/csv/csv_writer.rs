use std::{
    any::type_name,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    sync::Arc,
};

use log::debug;

use crate::{
    core::{
        config::CsvConfig,
        record::{CsvRecord, RecordShape, StructuredShape},
        schema::{HeaderOverrideMap, SchemaCache},
    },
    error::CsvError,
    item::csv::{
        field_encoder::{FieldEncoder, QuotingEncoder},
        map_writer::MapWriter,
        row_emitter::RowEmitter,
        scalar_formatter::{JsonScalarFormatter, ScalarFormatter},
        uniform_writer::UniformWriter,
    },
};

/// Serializes sequences of records to CSV text.
///
/// The record type decides how rows are produced: scalar records become
/// single-field rows, structured records follow their cached schema, and map
/// records are written by the map strategies. An absent sink or an absent record
/// sequence makes every write a silent no-op.
///
/// # Examples
///
/// ```
/// use csv_records::core::config::CsvConfigBuilder;
/// use csv_records::core::record::{CsvRecord, FieldDescriptor, RecordShape, StructuredShape};
/// use csv_records::item::csv::csv_writer::CsvSerializerBuilder;
///
/// struct City {
///     city: &'static str,
///     country: &'static str,
///     population: u64,
/// }
///
/// impl CsvRecord for City {
///     fn shape() -> RecordShape<Self> {
///         RecordShape::Structured(|| {
///             StructuredShape::new(vec![
///                 FieldDescriptor::new("city", |c: &City| c.city),
///                 FieldDescriptor::new("country", |c: &City| c.country),
///                 FieldDescriptor::new("popcount", |c: &City| &c.population),
///             ])
///         })
///     }
/// }
///
/// let serializer = CsvSerializerBuilder::new()
///     .config(CsvConfigBuilder::new().row_separator("\n").build())
///     .build();
///
/// let cities = vec![
///     City { city: "Boston", country: "United States", population: 4628910 },
///     City { city: "Concord", country: "United States", population: 42695 },
/// ];
///
/// let data = serializer.serialize_to_string(&cities).unwrap();
/// assert_eq!(data, "\
/// city,country,popcount
/// Boston,United States,4628910
/// Concord,United States,42695
/// ");
/// ```
pub struct CsvSerializer {
    config: CsvConfig,
    cache: Arc<SchemaCache>,
    formatter: Box<dyn ScalarFormatter>,
    encoder: Box<dyn FieldEncoder>,
}

impl CsvSerializer {
    pub fn config(&self) -> &CsvConfig {
        &self.config
    }

    pub fn schema_cache(&self) -> &SchemaCache {
        &self.cache
    }

    /// Writes `records` to `sink`, header first when the record type has one.
    ///
    /// Nothing is written when either the sink or the records are absent. A
    /// failing field accessor aborts the call and leaves the rows written so far
    /// in the sink.
    pub fn write<'r, W, T, I>(
        &self,
        sink: Option<&mut W>,
        records: Option<I>,
    ) -> Result<(), CsvError>
    where
        W: Write + ?Sized,
        T: CsvRecord,
        I: IntoIterator<Item = &'r T>,
    {
        let (Some(sink), Some(records)) = (sink, records) else {
            debug!("No sink or records to write for {}", type_name::<T>());
            return Ok(());
        };

        let shape = T::shape();
        let omit_headers = self.config.omit_headers_for::<T>();

        let count = if shape.is_map() {
            MapWriter::new(&self.config, self.formatter.as_ref(), self.encoder.as_ref())
                .write(sink, shape, records, omit_headers)?
        } else {
            UniformWriter::new(
                &self.config,
                &self.cache,
                self.formatter.as_ref(),
                self.encoder.as_ref(),
            )
            .write(sink, shape, records, omit_headers)?
        };

        debug!("Wrote {} CSV rows for {}", count, type_name::<T>());
        Ok(())
    }

    /// Writes a single record as a one-row sequence.
    pub fn write_record<W, T>(
        &self,
        sink: Option<&mut W>,
        record: Option<&T>,
    ) -> Result<(), CsvError>
    where
        W: Write + ?Sized,
        T: CsvRecord,
    {
        self.write(sink, record.map(std::iter::once))
    }

    /// Writes precomputed rows, encoding each field. No header is written.
    pub fn write_rows<W, R>(&self, sink: Option<&mut W>, rows: Option<R>) -> Result<(), CsvError>
    where
        W: Write + ?Sized,
        R: IntoIterator,
        R::Item: IntoIterator,
        <R::Item as IntoIterator>::Item: AsRef<str>,
    {
        let (Some(sink), Some(rows)) = (sink, rows) else {
            debug!("No sink or rows to write");
            return Ok(());
        };

        let emitter = RowEmitter::new(&self.config, self.encoder.as_ref());
        let mut count = 0;
        for row in rows {
            emitter.emit_raw_row(sink, row)?;
            count += 1;
        }

        debug!("Wrote {} precomputed CSV rows", count);
        Ok(())
    }

    pub fn serialize_to_string<'r, T, I>(&self, records: I) -> Result<String, CsvError>
    where
        T: CsvRecord,
        I: IntoIterator<Item = &'r T>,
    {
        let mut buffer: Vec<u8> = Vec::new();
        self.write(Some(&mut buffer), Some(records))?;
        String::from_utf8(buffer).map_err(|error| CsvError::Format(error.to_string()))
    }

    /// Writes `records` to a new file at `path`, replacing any existing file.
    pub fn serialize_to_path<'r, P, T, I>(&self, path: P, records: I) -> Result<(), CsvError>
    where
        P: AsRef<Path>,
        T: CsvRecord,
        I: IntoIterator<Item = &'r T>,
    {
        let file = File::create(path.as_ref()).map_err(|error| {
            CsvError::Sink(format!("{}: {}", path.as_ref().display(), error))
        })?;
        let mut writer = BufWriter::new(file);

        self.write(Some(&mut writer), Some(records))?;

        writer
            .flush()
            .map_err(|error| CsvError::Sink(error.to_string()))
    }

    /// Keeps only the columns of `T` named in `overrides`, renamed to their mapped headers.
    pub fn set_custom_headers<T: CsvRecord>(
        &self,
        overrides: &HeaderOverrideMap,
    ) -> Result<(), CsvError> {
        let describe = structured::<T>()?;
        self.cache
            .apply_header_override(describe, overrides);
        Ok(())
    }

    /// Restores the default columns of `T`.
    pub fn reset_schema<T: CsvRecord>(&self) -> Result<(), CsvError> {
        let describe = structured::<T>()?;
        self.cache.reset(describe);
        Ok(())
    }
}

fn structured<T: CsvRecord>() -> Result<fn() -> StructuredShape<T>, CsvError> {
    match T::shape() {
        RecordShape::Structured(describe) => Ok(describe),
        shape => Err(CsvError::Shape(format!(
            "{} is a {} record and has no schema",
            type_name::<T>(),
            shape.name()
        ))),
    }
}

/// Builder for [`CsvSerializer`].
#[derive(Default)]
pub struct CsvSerializerBuilder {
    config: Option<CsvConfig>,
    cache: Option<Arc<SchemaCache>>,
    formatter: Option<Box<dyn ScalarFormatter>>,
    encoder: Option<Box<dyn FieldEncoder>>,
}

impl CsvSerializerBuilder {
    pub fn new() -> CsvSerializerBuilder {
        CsvSerializerBuilder::default()
    }

    pub fn config(mut self, config: CsvConfig) -> CsvSerializerBuilder {
        self.config = Some(config);
        self
    }

    /// Uses `cache` instead of the process-wide schema cache.
    pub fn schema_cache(mut self, cache: Arc<SchemaCache>) -> CsvSerializerBuilder {
        self.cache = Some(cache);
        self
    }

    pub fn formatter<F: ScalarFormatter + 'static>(mut self, formatter: F) -> CsvSerializerBuilder {
        self.formatter = Some(Box::new(formatter));
        self
    }

    pub fn encoder<E: FieldEncoder + 'static>(mut self, encoder: E) -> CsvSerializerBuilder {
        self.encoder = Some(Box::new(encoder));
        self
    }

    pub fn build(self) -> CsvSerializer {
        let config = self.config.unwrap_or_default();
        let encoder = self
            .encoder
            .unwrap_or_else(|| Box::new(QuotingEncoder::from_config(&config)));

        CsvSerializer {
            cache: self.cache.unwrap_or_else(SchemaCache::global),
            formatter: self
                .formatter
                .unwrap_or_else(|| Box::new(JsonScalarFormatter)),
            encoder,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{error::Error, io::Cursor, sync::Arc};

    use super::CsvSerializerBuilder;
    use crate::{
        core::{
            config::CsvConfigBuilder,
            record::{CsvRecord, FieldDescriptor, RecordShape, StructuredShape},
            schema::{HeaderOverrideMap, SchemaCache},
        },
        error::CsvError,
    };

    struct Owned {
        city: String,
        population: u64,
    }

    impl CsvRecord for Owned {
        fn shape() -> RecordShape<Self> {
            RecordShape::Structured(|| {
                StructuredShape::new(vec![
                    FieldDescriptor::new("city", |r: &Owned| &r.city),
                    FieldDescriptor::new("population", |r: &Owned| &r.population),
                ])
            })
        }
    }

    fn serializer() -> super::CsvSerializer {
        CsvSerializerBuilder::new()
            .config(CsvConfigBuilder::new().row_separator("\n").build())
            .schema_cache(Arc::new(SchemaCache::new()))
            .build()
    }

    fn boston() -> Owned {
        Owned {
            city: "Boston".to_string(),
            population: 4628910,
        }
    }

    #[test]
    fn structured_records_should_be_serialized() -> Result<(), Box<dyn Error>> {
        let data = serializer().serialize_to_string(&vec![
            boston(),
            Owned {
                city: "Concord".to_string(),
                population: 42695,
            },
        ])?;

        assert_eq!(
            data,
            "city,population
Boston,4628910
Concord,42695
"
        );

        Ok(())
    }

    #[test]
    fn absent_sink_or_records_should_be_a_no_op() -> Result<(), Box<dyn Error>> {
        let serializer = serializer();
        let records = vec![boston()];
        let mut buffer: Vec<u8> = Vec::new();

        serializer.write(None::<&mut Vec<u8>>, Some(&records))?;
        serializer.write(Some(&mut buffer), None::<&Vec<Owned>>)?;

        assert!(buffer.is_empty());
        Ok(())
    }

    #[test]
    fn single_record_should_have_header() -> Result<(), Box<dyn Error>> {
        let mut cursor = Cursor::new(Vec::new());

        serializer().write_record(Some(&mut cursor), Some(&boston()))?;

        assert_eq!(
            String::from_utf8(cursor.into_inner())?,
            "city,population\nBoston,4628910\n"
        );
        Ok(())
    }

    #[test]
    fn precomputed_rows_should_be_encoded() -> Result<(), Box<dyn Error>> {
        let mut buffer: Vec<u8> = Vec::new();
        let rows = vec![vec!["a", "b,c"], vec!["\"q\""]];

        serializer().write_rows(Some(&mut buffer), Some(rows))?;

        assert_eq!(String::from_utf8(buffer)?, "a,\"b,c\"\n\"\"\"q\"\"\"\n");
        Ok(())
    }

    #[test]
    fn custom_headers_should_filter_and_rename() -> Result<(), Box<dyn Error>> {
        let serializer = serializer();
        serializer.set_custom_headers::<Owned>(&HeaderOverrideMap::from([(
            "population".to_string(),
            "Pop.".to_string(),
        )]))?;

        assert_eq!(serializer.serialize_to_string(&[boston()])?, "Pop.\n4628910\n");

        serializer.reset_schema::<Owned>()?;
        assert_eq!(
            serializer.serialize_to_string(&[boston()])?,
            "city,population\nBoston,4628910\n"
        );
        Ok(())
    }

    #[test]
    fn custom_headers_should_reject_scalar_records() {
        let result = serializer().set_custom_headers::<String>(&HeaderOverrideMap::new());

        assert!(matches!(result, Err(CsvError::Shape(_))));
    }

    #[test]
    fn per_type_header_suppression_should_apply() -> Result<(), Box<dyn Error>> {
        let serializer = CsvSerializerBuilder::new()
            .config(
                CsvConfigBuilder::new()
                    .row_separator("\n")
                    .omit_headers_for::<Owned>(true)
                    .build(),
            )
            .schema_cache(Arc::new(SchemaCache::new()))
            .build();

        assert_eq!(serializer.serialize_to_string(&[boston()])?, "Boston,4628910\n");
        Ok(())
    }

    #[test]
    fn builder_should_keep_config_and_injected_cache() -> Result<(), Box<dyn Error>> {
        let cache = Arc::new(SchemaCache::new());
        let serializer = CsvSerializerBuilder::new()
            .config(
                CsvConfigBuilder::new()
                    .item_separator("|")
                    .row_separator("\n")
                    .build(),
            )
            .schema_cache(cache.clone())
            .build();

        assert_eq!(serializer.config().item_separator(), "|");
        assert!(std::ptr::eq(serializer.schema_cache(), cache.as_ref()));
        assert!(!serializer.schema_cache().contains::<Owned>());

        assert_eq!(
            serializer.serialize_to_string(&[boston()])?,
            "city|population\nBoston|4628910\n"
        );
        assert!(cache.contains::<Owned>());
        Ok(())
    }
}
