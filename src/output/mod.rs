//! Output of validation results and reconciliation status.
//!
//! - [`terminal`] - Terminal output with colors
//! - [`status_file`] - JSON config input and status file output

mod status_file;
mod terminal;

pub use status_file::{read_json_file, read_status, write_status};
pub use terminal::{format_error_row, format_field, format_status, print_error_list, print_status};
