use std::io::Write;

use log::trace;

use crate::{core::config::CsvConfig, error::CsvError, item::csv::field_encoder::FieldEncoder};

/// Writes rows of fields joined by the item separator and ended by the row separator.
pub struct RowEmitter<'a> {
    item_separator: &'a str,
    row_separator: &'a str,
    encoder: &'a dyn FieldEncoder,
}

impl<'a> RowEmitter<'a> {
    pub fn new(config: &'a CsvConfig, encoder: &'a dyn FieldEncoder) -> Self {
        RowEmitter {
            item_separator: config.item_separator(),
            row_separator: config.row_separator(),
            encoder,
        }
    }

    /// Writes fields that are already encoded.
    ///
    /// The separator goes before every field except the first, so an empty
    /// row is written as a bare row separator.
    pub fn emit_row<W, S>(&self, sink: &mut W, fields: &[S]) -> Result<(), CsvError>
    where
        W: Write + ?Sized,
        S: AsRef<str>,
    {
        for (index, field) in fields.iter().enumerate() {
            if index > 0 {
                write_str(sink, self.item_separator)?;
            }
            write_str(sink, field.as_ref())?;
        }
        write_str(sink, self.row_separator)?;
        trace!("Emitted CSV row with {} fields", fields.len());
        Ok(())
    }

    /// Encodes each field while writing it. Used for header rows and precomputed rows.
    pub fn emit_raw_row<W, I>(&self, sink: &mut W, fields: I) -> Result<(), CsvError>
    where
        W: Write + ?Sized,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut count = 0;
        for field in fields {
            if count > 0 {
                write_str(sink, self.item_separator)?;
            }
            write_str(sink, &self.encoder.encode(field.as_ref()))?;
            count += 1;
        }
        write_str(sink, self.row_separator)?;
        trace!("Emitted raw CSV row with {} fields", count);
        Ok(())
    }
}

fn write_str<W: Write + ?Sized>(sink: &mut W, text: &str) -> Result<(), CsvError> {
    sink.write_all(text.as_bytes())
        .map_err(|error| CsvError::Sink(error.to_string()))
}
