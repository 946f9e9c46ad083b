//! Persisted result of a reconciliation pass.

use serde::{Deserialize, Serialize};

/// Infrastructure status read by downstream consumers (DNS, firewall rules).
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureStatus {
    pub resource_group: ResourceGroup,
    /// Public IPs all outbound traffic leaves through.
    #[serde(default, rename = "outboundIPs")]
    pub outbound_ips: Vec<PublicIp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balancer: Option<LoadBalancerRef>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceGroup {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicIp {
    pub name: String,
    pub resource_group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadBalancerRef {
    pub name: String,
}

impl InfrastructureStatus {
    pub fn new(resource_group: &str) -> InfrastructureStatus {
        InfrastructureStatus {
            resource_group: ResourceGroup {
                name: resource_group.to_string(),
            },
            ..Default::default()
        }
    }

    /// Add `ip`, replacing an entry with the same name and resource group.
    pub fn upsert_outbound_ip(&mut self, ip: PublicIp) {
        match self
            .outbound_ips
            .iter_mut()
            .find(|o| o.name == ip.name && o.resource_group == ip.resource_group)
        {
            Some(existing) => *existing = ip,
            None => self.outbound_ips.push(ip),
        }
    }
}
