//! Terminal output utilities.
//!
//! Provides formatting helpers for validation results and status.

use colored::Colorize;
use itertools::Itertools;

use crate::models::InfrastructureStatus;
use crate::validation::{ErrorList, FieldError};

/// Format a value as a quoted, right-aligned field.
///
/// # Arguments
/// * `value` - The value to format
/// * `width` - The minimum width of the field
///
/// # Returns
/// A quoted, right-aligned string
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let value_str = value.to_string();
    let quoted = format!("\"{value_str}\"");
    let quoted_len = quoted.len();

    if quoted_len >= width {
        quoted
    } else {
        format!("{quoted:>width$}")
    }
}

/// One row per validation error: type, field, bad value, detail.
pub fn format_error_row(error: &FieldError) -> String {
    let field = if error.field.is_empty() {
        "<cluster>"
    } else {
        error.field.as_str()
    };
    [
        format_field(&error.error_type, 16),
        format_field(field, 28),
        format_field(error.bad_value.as_deref().unwrap_or(""), 20),
        format!("\"{}\"", error.detail),
    ]
    .join(", ")
}

/// Print validation errors. Returns true when there were none.
pub fn print_error_list(errors: &ErrorList) -> bool {
    if errors.is_empty() {
        println!("#{}# network configuration is valid", "OK".on_green());
        return true;
    }
    println!(r#"          "type",                      "field",              "value", "detail""#);
    for error in errors {
        println!("{}", format_error_row(error));
    }
    println!(
        "#{}# {} error(s) in network configuration",
        "INVALID".on_red(),
        errors.len()
    );
    false
}

/// Single line summary of a status record.
pub fn format_status(status: &InfrastructureStatus) -> String {
    let ips = status
        .outbound_ips
        .iter()
        .map(|ip| format!("{}={}", ip.name, ip.ip.as_deref().unwrap_or("<pending>")))
        .join(" ");
    format!(
        "resource_group={} load_balancer={} outbound_ips=[{}]",
        status.resource_group.name,
        status
            .load_balancer
            .as_ref()
            .map_or("<none>", |lb| lb.name.as_str()),
        ips
    )
}

pub fn print_status(status: &InfrastructureStatus) {
    println!("#{}# {}", "STATUS".on_blue(), format_status(status));
}
