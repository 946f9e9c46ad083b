//! Reads that turn provider absence into `None`.

use super::client::NetworkClient;
use crate::error::{Error, Result};
use crate::models::{LoadBalancer, PublicIpAddress};

/// Read a public IP. `Ok(None)` when it does not exist.
///
/// A public IP reported without an ID cannot be referenced by a load
/// balancer, so it is an error rather than a value.
pub async fn read_public_ip(
    client: &dyn NetworkClient,
    resource_group: &str,
    name: &str,
) -> Result<Option<PublicIpAddress>> {
    let ip = match client.get_public_ip(resource_group, name).await {
        Ok(ip) => ip,
        Err(e) if e.is_not_found() => {
            log::debug!("public ip {name} not found in {resource_group}");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    if ip.id.is_none() {
        return Err(Error::MissingId {
            kind: "publicip",
            resource_group: resource_group.to_string(),
            name: name.to_string(),
        });
    }
    log::debug!(
        "public ip {name} found in {resource_group}: {}",
        ip.properties.ip_address.as_deref().unwrap_or("<unassigned>")
    );
    Ok(Some(ip))
}

/// Read a load balancer. `Ok(None)` when it does not exist.
pub async fn read_load_balancer(
    client: &dyn NetworkClient,
    resource_group: &str,
    name: &str,
) -> Result<Option<LoadBalancer>> {
    match client.get_load_balancer(resource_group, name).await {
        Ok(lb) => {
            log::debug!(
                "load balancer {name} found in {resource_group} frontends={} pools={} rules={}",
                lb.properties.frontend_ip_configurations.len(),
                lb.properties.backend_address_pools.len(),
                lb.properties.outbound_rules.len()
            );
            Ok(Some(lb))
        }
        Err(e) if e.is_not_found() => {
            log::debug!("load balancer {name} not found in {resource_group}");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
