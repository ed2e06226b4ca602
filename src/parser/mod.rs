//! Text-table parsing for CLASS output files.

pub mod class_headers;

// Re-export main functions
pub use class_headers::{read_class_file_headers, split_column_names};
