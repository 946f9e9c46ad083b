//! Diff of the observed load balancer against the desired outbound topology.

use crate::azure::ids;
use crate::config::OUTBOUND_NAME;
use crate::error::{Error, Result};
use crate::models::{
    BackendAddressPool, FrontendIpConfiguration, LoadBalancer, LoadBalancerProperties,
    OutboundRule, OutboundTopology, PublicIpAddress, Sku, SubResource,
};

/// What the reader found in the provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservedTopology {
    /// The outbound public IP. Must exist before planning.
    pub public_ip: Option<PublicIpAddress>,
    pub load_balancer: Option<LoadBalancer>,
}

/// Result of [`plan`]: which parts of the load balancer need work, and the
/// merged load balancer object to submit when any of them do.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergencePlan {
    /// No load balancer exists; `load_balancer` is built from scratch.
    pub create: bool,
    pub needs_backend_pool: bool,
    pub needs_frontend_ip_config: bool,
    pub needs_public_ip_assignment: bool,
    pub needs_outbound_rule: bool,
    pub load_balancer: LoadBalancer,
}

impl ConvergencePlan {
    pub fn apply_needed(&self) -> bool {
        self.needs_backend_pool
            || self.needs_frontend_ip_config
            || self.needs_public_ip_assignment
            || self.needs_outbound_rule
    }
}

/// ID of the outbound frontend IP configuration of the desired load balancer.
pub fn frontend_ip_config_id(desired: &OutboundTopology) -> String {
    ids::frontend_ip_config_id(
        &desired.subscription_id,
        &desired.resource_group,
        &desired.name,
        OUTBOUND_NAME,
    )
}

/// ID of the backend pool of the desired load balancer.
pub fn backend_pool_id(desired: &OutboundTopology) -> String {
    ids::backend_pool_id(
        &desired.subscription_id,
        &desired.resource_group,
        &desired.name,
        &desired.name,
    )
}

/// Plan the load balancer changes for `desired`.
///
/// The observed load balancer is never modified; existing frontends, pools
/// and rules are kept and missing ones appended to a copy.
pub fn plan(desired: &OutboundTopology, observed: &ObservedTopology) -> Result<ConvergencePlan> {
    let public_ip_id = observed
        .public_ip
        .as_ref()
        .and_then(|ip| ip.id.as_deref())
        .ok_or_else(|| Error::MissingId {
            kind: "publicip",
            resource_group: desired.resource_group.clone(),
            name: OUTBOUND_NAME.to_string(),
        })?;
    let frontend_id = frontend_ip_config_id(desired);
    let backend_pool_id = backend_pool_id(desired);

    let Some(observed_lb) = &observed.load_balancer else {
        log::info!("load balancer {} absent, create from scratch", desired.name);
        return Ok(ConvergencePlan {
            create: true,
            needs_backend_pool: true,
            needs_frontend_ip_config: true,
            needs_public_ip_assignment: true,
            needs_outbound_rule: true,
            load_balancer: LoadBalancer {
                name: Some(desired.name.clone()),
                location: Some(desired.region.clone()),
                sku: Some(Sku::standard()),
                properties: LoadBalancerProperties {
                    frontend_ip_configurations: vec![FrontendIpConfiguration::new(
                        OUTBOUND_NAME,
                        public_ip_id,
                    )],
                    backend_address_pools: vec![BackendAddressPool::new(&desired.name)],
                    outbound_rules: vec![OutboundRule::new(
                        OUTBOUND_NAME,
                        &frontend_id,
                        &backend_pool_id,
                    )],
                    ..Default::default()
                },
                ..Default::default()
            },
        });
    };
    let observed_props = &observed_lb.properties;

    let needs_backend_pool = !observed_props
        .backend_address_pools
        .iter()
        .any(|p| p.name == desired.name);
    let mut backend_address_pools = observed_props.backend_address_pools.clone();
    if needs_backend_pool {
        log::info!("load balancer {} needs backend pool {}", desired.name, desired.name);
        backend_address_pools.push(BackendAddressPool::new(&desired.name));
    }

    let frontend = observed_props
        .frontend_ip_configurations
        .iter()
        .find(|f| f.name == OUTBOUND_NAME);
    let needs_frontend_ip_config = frontend.is_none();
    let needs_public_ip_assignment = !frontend
        .and_then(|f| f.public_ip_id())
        .is_some_and(|id| id.eq_ignore_ascii_case(public_ip_id));
    let mut frontend_ip_configurations: Vec<FrontendIpConfiguration> = observed_props
        .frontend_ip_configurations
        .iter()
        .map(|f| {
            if f.name == OUTBOUND_NAME && needs_public_ip_assignment {
                log::info!(
                    "frontend {OUTBOUND_NAME} of {} needs public ip {public_ip_id}, has {:?}",
                    desired.name,
                    f.public_ip_id()
                );
                let mut reassigned = f.clone();
                reassigned.properties.public_ip_address = Some(SubResource::new(public_ip_id));
                reassigned
            } else {
                f.clone()
            }
        })
        .collect();
    if needs_frontend_ip_config {
        log::info!("load balancer {} needs frontend {OUTBOUND_NAME}", desired.name);
        frontend_ip_configurations.push(FrontendIpConfiguration::new(OUTBOUND_NAME, public_ip_id));
    }

    let rule = observed_props
        .outbound_rules
        .iter()
        .find(|r| r.name == OUTBOUND_NAME);
    let needs_outbound_rule = rule.is_none();
    let mut outbound_rules = observed_props.outbound_rules.clone();
    match rule {
        Some(r) if !r.references(&frontend_id, &backend_pool_id) => {
            log::warn!(
                "outbound rule {OUTBOUND_NAME} of {} does not reference {frontend_id} and \
                 {backend_pool_id}, left as is",
                desired.name
            );
        }
        Some(_) => {}
        None => {
            log::info!("load balancer {} needs outbound rule {OUTBOUND_NAME}", desired.name);
            outbound_rules.push(OutboundRule::new(
                OUTBOUND_NAME,
                &frontend_id,
                &backend_pool_id,
            ));
        }
    }

    Ok(ConvergencePlan {
        create: false,
        needs_backend_pool,
        needs_frontend_ip_config,
        needs_public_ip_assignment,
        needs_outbound_rule,
        load_balancer: LoadBalancer {
            properties: LoadBalancerProperties {
                frontend_ip_configurations,
                backend_address_pools,
                outbound_rules,
                ..observed_props.clone()
            },
            ..observed_lb.clone()
        },
    })
}
