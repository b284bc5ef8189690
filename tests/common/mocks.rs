//! Mock versions of a CSV sink and of the scalar formatter.
use mockall::mock;

use std::io::{self, Write};

use csv_records::{CsvError, item::csv::scalar_formatter::ScalarFormatter};
use serde_json::Value;

mock! {
    pub Sink {}
    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
        fn flush(&mut self) -> io::Result<()>;
    }
}

mock! {
    pub Formatter {}
    impl ScalarFormatter for Formatter {
        fn format(&self, value: &Value) -> Result<String, CsvError>;
    }
}
