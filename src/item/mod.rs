/// This module provides the CSV writers for scalar, structured and map records.
pub mod csv;
