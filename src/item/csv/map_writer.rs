use std::{any::type_name, collections::BTreeSet, io::Write};

use serde_json::Value;

use crate::{
    core::{config::CsvConfig, record::RecordShape},
    error::CsvError,
    item::csv::{
        field_encoder::FieldEncoder, row_emitter::RowEmitter, scalar_formatter::ScalarFormatter,
    },
};

/// Writes key-value records whose key sets may differ from one record to the next.
///
/// String maps are written in two passes: the union of all keys is collected
/// and sorted before any row is emitted, so the column layout depends only on the
/// set of keys seen. Object maps are written in a single pass: the first record's
/// own keys become the header and every record writes its own values in its own
/// key order, without reconciling keys across records.
pub struct MapWriter<'a> {
    formatter: &'a dyn ScalarFormatter,
    encoder: &'a dyn FieldEncoder,
    emitter: RowEmitter<'a>,
}

impl<'a> MapWriter<'a> {
    pub fn new(
        config: &'a CsvConfig,
        formatter: &'a dyn ScalarFormatter,
        encoder: &'a dyn FieldEncoder,
    ) -> Self {
        MapWriter {
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
        T: 'r,
        I: IntoIterator<Item = &'r T>,
    {
        let kind = shape.name();
        match shape {
            RecordShape::StringMap(entries) => {
                let records: Vec<&T> = records.into_iter().collect();
                self.write_ordered_keys(sink, &records, entries, omit_headers)
            }
            RecordShape::ObjectMap(entries) => {
                self.write_per_record(sink, records, entries, omit_headers)
            }
            _ => Err(CsvError::Shape(format!(
                "{} is a {} record and cannot be written as a map",
                type_name::<T>(),
                kind
            ))),
        }
    }

    /// Writes string maps under the sorted union of their keys.
    pub fn write_ordered_keys<W, T>(
        &self,
        sink: &mut W,
        records: &[&T],
        entries: fn(&T) -> Vec<(&str, &str)>,
        omit_headers: bool,
    ) -> Result<usize, CsvError>
    where
        W: Write + ?Sized,
    {
        let rows: Vec<Vec<(&str, &str)>> = records.iter().map(|record| entries(*record)).collect();

        let headers: Vec<&str> = rows
            .iter()
            .flatten()
            .map(|(key, _)| *key)
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .collect();

        if !omit_headers && !headers.is_empty() {
            let encoded: Vec<String> = headers.iter().map(|key| self.encode(key)).collect();
            self.emitter.emit_row(sink, &encoded)?;
        }

        for row in &rows {
            let fields: Vec<String> = headers
                .iter()
                .map(|header| {
                    row.iter()
                        .find(|(key, _)| key == header)
                        .map(|(_, value)| self.encode(value))
                        .unwrap_or_default()
                })
                .collect();
            self.emitter.emit_row(sink, &fields)?;
        }

        Ok(rows.len())
    }

    /// Writes object maps one record at a time, taking the header from the first record.
    pub fn write_per_record<'r, W, T, I>(
        &self,
        sink: &mut W,
        records: I,
        entries: fn(&T) -> Vec<(&str, Value)>,
        omit_headers: bool,
    ) -> Result<usize, CsvError>
    where
        W: Write + ?Sized,
        T: 'r,
        I: IntoIterator<Item = &'r T>,
    {
        let mut count = 0;
        for record in records {
            let row = entries(record);

            if !omit_headers && count == 0 {
                let headers: Vec<String> = row.iter().map(|(key, _)| self.encode(key)).collect();
                self.emitter.emit_row(sink, &headers)?;
            }

            let fields = row
                .into_iter()
                .map(|(_, value)| self.field(value))
                .collect::<Result<Vec<String>, CsvError>>()?;
            self.emitter.emit_row(sink, &fields)?;
            count += 1;
        }
        Ok(count)
    }

    fn encode(&self, text: &str) -> String {
        self.encoder.encode(text).into_owned()
    }

    fn field(&self, value: Value) -> Result<String, CsvError> {
        match value {
            Value::Null => Ok(String::new()),
            Value::String(text) => Ok(self.encode(&text)),
            other => Ok(self.encode(&self.formatter.format(&other)?)),
        }
    }
}
