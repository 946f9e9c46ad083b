//! Validation helpers for CIDR valued configuration fields.
//!
//! Every check skips ranges that failed to parse; the parse failure itself is
//! reported once by [`CidrField::validate_parse`].

use super::field::{ErrorList, FieldError, FieldPath};
use crate::models::{Cidr, CidrParseError};

/// A CIDR text together with the field it was read from.
#[derive(Debug, Clone)]
pub struct CidrField {
    value: String,
    path: FieldPath,
    parsed: Result<Cidr, CidrParseError>,
}

impl CidrField {
    /// `path` is None for ranges supplied by the cluster rather than the
    /// validated object.
    pub fn new(value: &str, path: Option<&FieldPath>) -> CidrField {
        let path = path.cloned().unwrap_or_default();
        let parsed = Cidr::new(value).map(|c| c.with_label(path.to_string()));
        CidrField {
            value: value.to_string(),
            path,
            parsed,
        }
    }

    pub fn cidr(&self) -> Option<&Cidr> {
        self.parsed.as_ref().ok()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn validate_parse(&self) -> ErrorList {
        match &self.parsed {
            Ok(_) => vec![],
            Err(e) => vec![FieldError::invalid(&self.path, &self.value, &e.to_string())],
        }
    }

    pub fn validate_canonical(&self) -> ErrorList {
        match self.cidr() {
            Some(c) if !c.is_canonical() => vec![FieldError::invalid(
                &self.path,
                &self.value,
                "must be valid canonical CIDR",
            )],
            _ => vec![],
        }
    }

    /// Each present range in `subsets` must lie completely inside `self`.
    pub fn validate_subset(&self, subsets: &[Option<&CidrField>]) -> ErrorList {
        self.check_each(subsets, |outer, inner| {
            if outer.contains(inner) {
                None
            } else {
                Some("must be a subset of")
            }
        })
    }

    /// No present range in `others` may share an address with `self`.
    pub fn validate_not_subset(&self, others: &[Option<&CidrField>]) -> ErrorList {
        self.check_each(others, |outer, other| {
            if outer.overlaps(other) {
                Some("must not be a subset of")
            } else {
                None
            }
        })
    }

    /// Each present range in `others` must be nested with `self` in either
    /// direction (CIDR blocks either nest or are disjoint).
    pub fn validate_overlap(&self, others: &[Option<&CidrField>]) -> ErrorList {
        self.check_each(others, |outer, other| {
            if outer.overlaps(other) {
                None
            } else {
                Some("must overlap with")
            }
        })
    }

    fn check_each(
        &self,
        others: &[Option<&CidrField>],
        check: impl Fn(&Cidr, &Cidr) -> Option<&'static str>,
    ) -> ErrorList {
        let Some(outer) = self.cidr() else {
            return vec![];
        };
        others
            .iter()
            .flatten()
            .filter_map(|other| {
                let inner = other.cidr()?;
                let verdict = check(outer, inner)?;
                log::debug!(
                    "{inner} ({}) {verdict} {outer} ({})",
                    inner.label.as_deref().unwrap_or_default(),
                    outer.label.as_deref().unwrap_or_default()
                );
                Some(FieldError::invalid(
                    &other.path,
                    &other.value,
                    &format!("{verdict} {:?} ({:?})", self.path.to_string(), self.value),
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ErrorType;

    fn field(value: &str, path: &str) -> CidrField {
        CidrField::new(value, Some(&FieldPath::new(path)))
    }

    #[test]
    fn test_validate_parse() {
        assert!(field("10.0.0.0/8", "vnet").validate_parse().is_empty());

        let errs = field("invalid-cidr", "vnet").validate_parse();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].error_type, ErrorType::Invalid);
        assert_eq!(errs[0].field, "vnet");
        assert_eq!(errs[0].detail, "invalid CIDR address: invalid-cidr");
    }

    #[test]
    fn test_validate_canonical_skips_unparseable() {
        assert!(field("invalid-cidr", "vnet").validate_canonical().is_empty());
        assert!(field("10.0.0.0/8", "vnet").validate_canonical().is_empty());
        let errs = field("10.0.0.3/8", "vnet").validate_canonical();
        assert_eq!(errs[0].detail, "must be valid canonical CIDR");
    }

    #[test]
    fn test_validate_subset_reports_inner_field() {
        let vnet = field("10.0.0.0/8", "networks.vnet.cidr");
        let workers = field("1.1.1.1/32", "networks.workers");
        let nodes = CidrField::new("10.250.0.0/16", None);

        let errs = vnet.validate_subset(&[Some(&nodes), Some(&workers), None]);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].field, "networks.workers");
        assert_eq!(errs[0].bad_value.as_deref(), Some("1.1.1.1/32"));
        assert_eq!(
            errs[0].detail,
            r#"must be a subset of "networks.vnet.cidr" ("10.0.0.0/8")"#
        );
    }

    #[test]
    fn test_validate_not_subset() {
        let vnet = field("10.0.0.0/8", "networks.vnet.cidr");
        let pods = CidrField::new("10.0.0.1/32", None);
        let services = CidrField::new("100.64.0.0/13", None);

        let errs = vnet.validate_not_subset(&[Some(&pods), Some(&services)]);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].field, "");
        assert_eq!(
            errs[0].detail,
            r#"must not be a subset of "networks.vnet.cidr" ("10.0.0.0/8")"#
        );
    }

    #[test]
    fn test_validate_overlap_accepts_either_direction() {
        let workers = field("10.250.3.0/24", "networks.workers");
        let wider = CidrField::new("10.250.0.0/16", None);
        let narrower = CidrField::new("10.250.3.0/28", None);
        let elsewhere = CidrField::new("192.168.0.0/16", None);

        assert!(workers.validate_overlap(&[Some(&wider), Some(&narrower)]).is_empty());
        let errs = workers.validate_overlap(&[Some(&elsewhere)]);
        assert_eq!(
            errs[0].detail,
            r#"must overlap with "networks.workers" ("10.250.3.0/24")"#
        );
    }

    #[test]
    fn test_checks_skip_unparseable() {
        let broken = field("invalid-cidr", "networks.vnet.cidr");
        let workers = field("10.250.3.0/24", "networks.workers");
        assert!(broken.validate_subset(&[Some(&workers)]).is_empty());
        assert!(workers.validate_subset(&[Some(&broken)]).is_empty());
        assert!(workers.validate_not_subset(&[Some(&broken)]).is_empty());
    }
}
