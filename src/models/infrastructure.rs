//! Infrastructure configuration supplied by the cluster owner.

use serde::{Deserialize, Serialize};

/// Provider specific infrastructure configuration of a cluster.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureConfig {
    /// Network ranges and VNet placement.
    #[serde(default)]
    pub networks: NetworkConfig,
    /// Outbound connectivity requirements (None means provider default egress).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound_connectivity: Option<OutboundConnectivity>,
    /// Whether the cluster spreads its nodes over availability zones.
    #[serde(default)]
    pub zoned: bool,
}

/// The network section of an [`InfrastructureConfig`]. Immutable once set.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// CIDR of the worker subnet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<String>,
    /// Existing VNet reference or the CIDR of a new VNet.
    #[serde(default)]
    pub vnet: VNet,
}

/// Either a reference to an existing VNet (name + resource group) or the
/// range of a VNet to create. All fields empty means "use the worker range".
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VNet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OutboundConnectivity {
    /// Route all egress through one reserved public IP.
    #[serde(default, rename = "stableEgressIP")]
    pub stable_egress_ip: bool,
}

/// What a reconciliation pass is asked to provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfrastructureSpec {
    /// Azure region, e.g. "westeurope".
    pub region: String,
    pub stable_egress_ip: bool,
    pub zoned: bool,
}

impl InfrastructureSpec {
    pub fn new(region: &str, config: &InfrastructureConfig) -> InfrastructureSpec {
        InfrastructureSpec {
            region: region.to_string(),
            stable_egress_ip: config
                .outbound_connectivity
                .as_ref()
                .is_some_and(|o| o.stable_egress_ip),
            zoned: config.zoned,
        }
    }

    /// The outbound load balancer is only managed for zoned clusters that
    /// asked for a stable egress IP.
    pub fn wants_outbound_load_balancer(&self) -> bool {
        self.stable_egress_ip && self.zoned
    }
}

/// Desired outbound topology of one cluster resource group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundTopology {
    pub subscription_id: String,
    pub resource_group: String,
    pub region: String,
    /// Name of both the load balancer and its backend pool.
    pub name: String,
}

impl OutboundTopology {
    /// Topology for a cluster resource group; the load balancer and backend
    /// pool are named after the resource group.
    pub fn new(subscription_id: &str, resource_group: &str, spec: &InfrastructureSpec) -> Self {
        OutboundTopology {
            subscription_id: subscription_id.to_string(),
            resource_group: resource_group.to_string(),
            region: spec.region.clone(),
            name: resource_group.to_string(),
        }
    }
}
