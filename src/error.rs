use thiserror::Error;

#[derive(Error, Debug)]
/// CSV serialization error
pub enum CsvError {
    #[error("CsvSink from: {0}")]
    Sink(String),

    #[error("FieldAccessor from: {0}")]
    Accessor(String),

    #[error("ScalarFormatter from: {0}")]
    Format(String),

    #[error("RecordShape from: {0}")]
    Shape(String),
}
