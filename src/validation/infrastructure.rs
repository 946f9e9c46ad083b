//! Admission validation of the infrastructure network configuration.

use super::cidr::CidrField;
use super::field::{ErrorList, FieldError, FieldPath};
use crate::models::{InfrastructureConfig, VNet};

/// Validate the network section of `infra` against the cluster ranges.
///
/// `nodes_cidr`, `pods_cidr` and `services_cidr` come from the cluster; None
/// means the range is not known yet and checks against it are skipped. All
/// checks run, so every misconfiguration is reported in one pass.
pub fn validate_infrastructure_config(
    infra: &InfrastructureConfig,
    resource_group_name: &str,
    nodes_cidr: Option<&str>,
    pods_cidr: Option<&str>,
    services_cidr: Option<&str>,
) -> ErrorList {
    let mut all_errs = ErrorList::new();

    let nodes = nodes_cidr.map(|c| CidrField::new(c, None));
    let pods = pods_cidr.map(|c| CidrField::new(c, None));
    let services = services_cidr.map(|c| CidrField::new(c, None));

    let networks_path = FieldPath::new("networks");
    let workers_path = networks_path.child("workers");

    let workers = match infra.networks.workers.as_deref() {
        Some(w) if !w.is_empty() => {
            let workers = CidrField::new(w, Some(&workers_path));
            all_errs.extend(workers.validate_parse());
            all_errs.extend(workers.validate_canonical());
            Some(workers)
        }
        _ => {
            all_errs.push(FieldError::required(
                &workers_path,
                "must specify the network range for the worker network",
            ));
            None
        }
    };

    let vnet = &infra.networks.vnet;
    let vnet_path = networks_path.child("vnet");
    match (&vnet.name, &vnet.resource_group) {
        (Some(_), None) | (None, Some(_)) => {
            all_errs.push(FieldError::invalid(
                &vnet_path,
                describe_vnet(vnet),
                "specifying an existing vnet name require a vnet name and vnet resource group",
            ));
        }
        (Some(_), Some(vnet_group)) => {
            if vnet.cidr.is_some() {
                all_errs.push(FieldError::invalid(
                    &vnet_path.child("cidr"),
                    vnet_group,
                    "specifying a cidr for an existing vnet is not possible",
                ));
            }
            if vnet_group == resource_group_name {
                all_errs.push(FieldError::invalid(
                    &vnet_path.child("resourceGroup"),
                    vnet_group,
                    "specifying an existing vnet in the cluster resource group is not supported",
                ));
            }
        }
        (None, None) => match &vnet.cidr {
            None => {
                // the worker range doubles as the vnet range
                if let Some(workers) = &workers {
                    all_errs.extend(workers.validate_overlap(&[nodes.as_ref()]));
                    all_errs.extend(
                        workers.validate_not_subset(&[pods.as_ref(), services.as_ref()]),
                    );
                }
            }
            Some(cidr) => {
                let vnet_cidr = CidrField::new(cidr, Some(&vnet_path.child("cidr")));
                all_errs.extend(vnet_cidr.validate_parse());
                all_errs.extend(vnet_cidr.validate_subset(&[nodes.as_ref()]));
                all_errs.extend(vnet_cidr.validate_subset(&[workers.as_ref()]));
                all_errs.extend(
                    vnet_cidr.validate_not_subset(&[pods.as_ref(), services.as_ref()]),
                );
                all_errs.extend(vnet_cidr.validate_canonical());
            }
        },
    }

    if let Some(nodes) = &nodes {
        all_errs.extend(nodes.validate_subset(&[workers.as_ref()]));
    }

    if !all_errs.is_empty() {
        log::debug!(
            "infrastructure config of {resource_group_name} has {} error(s)",
            all_errs.len()
        );
    }
    all_errs
}

/// Validate an update of the infrastructure config: the network section may
/// not change once set.
pub fn validate_infrastructure_config_update(
    old_config: &InfrastructureConfig,
    new_config: &InfrastructureConfig,
) -> ErrorList {
    if old_config.networks == new_config.networks {
        return vec![];
    }
    let value = serde_json::to_string(&new_config.networks).unwrap_or_default();
    vec![FieldError::invalid(
        &FieldPath::new("networks"),
        value,
        "field is immutable",
    )]
}

fn describe_vnet(vnet: &VNet) -> String {
    serde_json::to_string(vnet).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NetworkConfig;
    use crate::validation::ErrorType;
    use std::collections::HashSet;

    const RESOURCE_GROUP: &str = "shoot--test--foo";
    const NODES: &str = "10.250.0.0/16";
    const PODS: &str = "100.96.0.0/11";
    const SERVICES: &str = "100.64.0.0/13";
    const VNET_CIDR: &str = "10.0.0.0/8";

    fn config(workers: &str, vnet: VNet) -> InfrastructureConfig {
        InfrastructureConfig {
            networks: NetworkConfig {
                workers: Some(workers.to_string()),
                vnet,
            },
            ..Default::default()
        }
    }

    fn vnet_cidr(cidr: &str) -> VNet {
        VNet {
            cidr: Some(cidr.to_string()),
            ..Default::default()
        }
    }

    fn validate(
        infra: &InfrastructureConfig,
        nodes: &str,
        pods: &str,
        services: &str,
    ) -> ErrorList {
        validate_infrastructure_config(
            infra,
            RESOURCE_GROUP,
            Some(nodes),
            Some(pods),
            Some(services),
        )
    }

    fn fields(errs: &ErrorList) -> Vec<(ErrorType, &str, &str)> {
        errs.iter()
            .map(|e| (e.error_type, e.field.as_str(), e.detail.as_str()))
            .collect()
    }

    #[test]
    fn test_valid_new_vnet() {
        let infra = config("10.250.3.0/24", vnet_cidr(VNET_CIDR));
        assert!(validate(&infra, NODES, PODS, SERVICES).is_empty());
    }

    #[test]
    fn test_worker_range_as_vnet() {
        let infra = config("10.250.3.0/24", VNet::default());
        assert!(validate(&infra, NODES, PODS, SERVICES).is_empty());
        assert!(validate(&infra, "10.250.3.0/24", PODS, SERVICES).is_empty());
    }

    #[test]
    fn test_worker_range_as_vnet_overlapping_pods() {
        let infra = config("100.96.0.0/24", VNet::default());
        let errs = validate(&infra, NODES, PODS, SERVICES);
        assert_eq!(
            fields(&errs),
            vec![
                (ErrorType::Invalid, "", r#"must overlap with "networks.workers" ("100.96.0.0/24")"#),
                (ErrorType::Invalid, "", r#"must not be a subset of "networks.workers" ("100.96.0.0/24")"#),
                (ErrorType::Invalid, "networks.workers", r#"must be a subset of "" ("10.250.0.0/16")"#),
            ]
        );
    }

    #[test]
    fn test_vnet_name_without_resource_group() {
        let infra = config(
            "10.250.3.0/24",
            VNet {
                name: Some("existing-vnet".to_string()),
                ..Default::default()
            },
        );
        let errs = validate(&infra, NODES, PODS, SERVICES);
        assert_eq!(
            fields(&errs),
            vec![(
                ErrorType::Invalid,
                "networks.vnet",
                "specifying an existing vnet name require a vnet name and vnet resource group"
            )]
        );
    }

    #[test]
    fn test_vnet_resource_group_without_name() {
        let infra = config(
            "10.250.3.0/24",
            VNet {
                resource_group: Some("existing-vnet-rg".to_string()),
                ..Default::default()
            },
        );
        let errs = validate(&infra, NODES, PODS, SERVICES);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].field, "networks.vnet");
    }

    #[test]
    fn test_existing_vnet_with_cidr() {
        let infra = config(
            "10.250.3.0/24",
            VNet {
                name: Some("existing-vnet".to_string()),
                resource_group: Some("existing-vnet-rg".to_string()),
                cidr: Some(VNET_CIDR.to_string()),
            },
        );
        let errs = validate(&infra, NODES, PODS, SERVICES);
        assert_eq!(
            fields(&errs),
            vec![(
                ErrorType::Invalid,
                "networks.vnet.cidr",
                "specifying a cidr for an existing vnet is not possible"
            )]
        );
    }

    #[test]
    fn test_existing_vnet_in_cluster_resource_group() {
        let infra = config(
            "10.250.3.0/24",
            VNet {
                name: Some("existing-vnet".to_string()),
                resource_group: Some(RESOURCE_GROUP.to_string()),
                cidr: None,
            },
        );
        let errs = validate(&infra, NODES, PODS, SERVICES);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].field, "networks.vnet.resourceGroup");
        assert_eq!(errs[0].bad_value.as_deref(), Some(RESOURCE_GROUP));
    }

    #[test]
    fn test_missing_workers() {
        let mut infra = config("", vnet_cidr(VNET_CIDR));
        let errs = validate(&infra, NODES, PODS, SERVICES);
        assert_eq!(
            fields(&errs),
            vec![(
                ErrorType::Required,
                "networks.workers",
                "must specify the network range for the worker network"
            )]
        );

        infra.networks.workers = None;
        assert_eq!(validate(&infra, NODES, PODS, SERVICES), errs);
    }

    #[test]
    fn test_invalid_vnet_cidr() {
        let infra = config("10.250.3.0/24", vnet_cidr("invalid-cidr"));
        let errs = validate(&infra, NODES, PODS, SERVICES);
        assert_eq!(
            fields(&errs),
            vec![(ErrorType::Invalid, "networks.vnet.cidr", "invalid CIDR address: invalid-cidr")]
        );
    }

    #[test]
    fn test_invalid_workers_cidr() {
        let infra = config("invalid-cidr", vnet_cidr(VNET_CIDR));
        let errs = validate(&infra, NODES, PODS, SERVICES);
        assert_eq!(
            fields(&errs),
            vec![(ErrorType::Invalid, "networks.workers", "invalid CIDR address: invalid-cidr")]
        );
    }

    #[test]
    fn test_workers_outside_vnet_and_nodes() {
        let infra = config("1.1.1.1/32", vnet_cidr(VNET_CIDR));
        let errs = validate(&infra, NODES, PODS, SERVICES);
        assert_eq!(
            fields(&errs),
            vec![
                (ErrorType::Invalid, "networks.workers", r#"must be a subset of "networks.vnet.cidr" ("10.0.0.0/8")"#),
                (ErrorType::Invalid, "networks.workers", r#"must be a subset of "" ("10.250.0.0/16")"#),
            ]
        );
    }

    #[test]
    fn test_pods_overlapping_vnet() {
        let infra = config("10.250.3.0/24", vnet_cidr(VNET_CIDR));
        let errs = validate(&infra, NODES, "10.0.0.1/32", SERVICES);
        assert_eq!(
            fields(&errs),
            vec![(ErrorType::Invalid, "", r#"must not be a subset of "networks.vnet.cidr" ("10.0.0.0/8")"#)]
        );
    }

    #[test]
    fn test_services_overlapping_vnet() {
        let infra = config("10.250.3.0/24", vnet_cidr(VNET_CIDR));
        let errs = validate(&infra, NODES, PODS, "10.0.0.1/32");
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].bad_value.as_deref(), Some("10.0.0.1/32"));
    }

    #[test]
    fn test_non_canonical_cidrs() {
        let infra = config("10.250.3.8/24", vnet_cidr("10.0.0.3/8"));
        let errs = validate(&infra, "10.250.0.3/16", "100.96.0.4/11", "100.64.0.5/13");
        assert_eq!(
            fields(&errs),
            vec![
                (ErrorType::Invalid, "networks.workers", "must be valid canonical CIDR"),
                (ErrorType::Invalid, "networks.vnet.cidr", "must be valid canonical CIDR"),
            ]
        );
    }

    #[test]
    fn test_unknown_cluster_ranges_are_skipped() {
        let infra = config("10.250.3.0/24", vnet_cidr(VNET_CIDR));
        let errs = validate_infrastructure_config(&infra, RESOURCE_GROUP, None, None, None);
        assert!(errs.is_empty());

        let far = config("1.1.1.1/32", vnet_cidr(VNET_CIDR));
        let errs = validate_infrastructure_config(&far, RESOURCE_GROUP, None, None, None);
        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn test_errors_independent_of_which_ranges_are_supplied() {
        let infra = config("100.96.0.0/24", vnet_cidr("100.64.0.0/10"));
        let set = |errs: ErrorList| errs.into_iter().collect::<HashSet<_>>();

        let all = set(validate(&infra, NODES, PODS, SERVICES));
        let partial = |nodes, pods, services| {
            set(validate_infrastructure_config(
                &infra,
                RESOURCE_GROUP,
                nodes,
                pods,
                services,
            ))
        };
        let only_nodes = partial(Some(NODES), None, None);
        let only_pods = partial(None, Some(PODS), None);
        let only_services = partial(None, None, Some(SERVICES));

        assert!(!all.is_empty());
        let union: HashSet<_> = only_nodes
            .union(&only_pods)
            .cloned()
            .collect::<HashSet<_>>()
            .union(&only_services)
            .cloned()
            .collect();
        assert_eq!(union, all);
    }

    #[test]
    fn test_update_unchanged() {
        let infra = config("10.250.3.0/24", vnet_cidr(VNET_CIDR));
        assert!(validate_infrastructure_config_update(&infra, &infra.clone()).is_empty());
    }

    #[test]
    fn test_update_changing_networks() {
        let old = config("10.250.3.0/24", vnet_cidr(VNET_CIDR));
        let mut new = old.clone();
        new.networks.vnet.cidr = Some("1.2.3.4/5".to_string());

        let errs = validate_infrastructure_config_update(&old, &new);
        assert_eq!(
            fields(&errs),
            vec![(ErrorType::Invalid, "networks", "field is immutable")]
        );

        let mut zoned = old.clone();
        zoned.zoned = true;
        assert!(validate_infrastructure_config_update(&old, &zoned).is_empty());
    }
}
