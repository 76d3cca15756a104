//! Define GitHub Actions workflows as typed Rust values and export them to YAML
pub mod cli;
pub mod error;
pub mod exporter;
pub mod graph;
pub mod schema;
pub mod text;
pub mod validation;

pub use error::{Error, ExportError, Result, ValidationError};
pub use exporter::{to_writer, to_yaml_string, write_to_path};
