//! Field-path tagged validation errors.

use std::fmt;

/// Dotted path to a configuration field, e.g. `networks.vnet.cidr`.
///
/// The empty path is used for values that do not come from the validated
/// object (cluster supplied node/pod/service ranges).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn new(root: &str) -> FieldPath {
        FieldPath(vec![root.to_string()])
    }

    pub fn child(&self, name: &str) -> FieldPath {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        FieldPath(segments)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    Required,
    Invalid,
    Forbidden,
    Duplicate,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorType::Required => "Required value",
            ErrorType::Invalid => "Invalid value",
            ErrorType::Forbidden => "Forbidden",
            ErrorType::Duplicate => "Duplicate value",
        };
        write!(f, "{s}")
    }
}

/// One misconfiguration found by a validator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldError {
    pub error_type: ErrorType,
    pub field: String,
    pub bad_value: Option<String>,
    pub detail: String,
}

/// All misconfigurations found in one validation call. Empty means valid.
pub type ErrorList = Vec<FieldError>;

impl FieldError {
    pub fn required(path: &FieldPath, detail: &str) -> FieldError {
        FieldError {
            error_type: ErrorType::Required,
            field: path.to_string(),
            bad_value: None,
            detail: detail.to_string(),
        }
    }

    pub fn invalid(path: &FieldPath, value: impl Into<String>, detail: &str) -> FieldError {
        FieldError {
            error_type: ErrorType::Invalid,
            field: path.to_string(),
            bad_value: Some(value.into()),
            detail: detail.to_string(),
        }
    }

    pub fn forbidden(path: &FieldPath, detail: &str) -> FieldError {
        FieldError {
            error_type: ErrorType::Forbidden,
            field: path.to_string(),
            bad_value: None,
            detail: detail.to_string(),
        }
    }

    pub fn duplicate(path: &FieldPath, value: impl Into<String>) -> FieldError {
        FieldError {
            error_type: ErrorType::Duplicate,
            field: path.to_string(),
            bad_value: Some(value.into()),
            detail: String::new(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.bad_value {
            Some(value) => write!(f, "{}: {}: {:?}", self.field, self.error_type, value)?,
            None => write!(f, "{}: {}", self.field, self.error_type)?,
        }
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_path() {
        let path = FieldPath::new("networks").child("vnet").child("cidr");
        assert_eq!(path.to_string(), "networks.vnet.cidr");
        assert_eq!(FieldPath::default().to_string(), "");
    }

    #[test]
    fn test_field_error_display() {
        let workers = FieldPath::new("networks").child("workers");
        assert_eq!(
            FieldError::invalid(&workers, "invalid-cidr", "invalid CIDR address: invalid-cidr")
                .to_string(),
            r#"networks.workers: Invalid value: "invalid-cidr": invalid CIDR address: invalid-cidr"#
        );
        assert_eq!(
            FieldError::required(&workers, "must specify the network range").to_string(),
            "networks.workers: Required value: must specify the network range"
        );
        assert_eq!(
            FieldError::duplicate(&workers, "10.0.0.0/8").to_string(),
            r#"networks.workers: Duplicate value: "10.0.0.0/8""#
        );
        assert_eq!(
            FieldError::forbidden(&workers, "not allowed").error_type,
            ErrorType::Forbidden
        );
    }
}
