//! Admission time validation of network configuration.
//!
//! - [`field`] - field-path tagged errors
//! - [`cidr`] - containment and overlap checks between CIDR fields
//! - [`infrastructure`] - rules for the infrastructure network section

mod cidr;
mod field;
mod infrastructure;

pub use cidr::CidrField;
pub use field::{ErrorList, ErrorType, FieldError, FieldPath};
pub use infrastructure::{validate_infrastructure_config, validate_infrastructure_config_update};
