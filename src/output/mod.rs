// ABOUTME: Output module for plans and execution reports
// ABOUTME: Formats as text, JSON, or YAML and writes to stdout or a file

pub mod error;
pub mod formatter;
pub mod writer;

pub use error::{OutputError, Result};
pub use formatter::{
    formatter_for, render_workflow, JsonFormatter, OutputFormatter, ReportFormat, TextFormatter,
    YamlFormatter,
};
pub use writer::write_output;
