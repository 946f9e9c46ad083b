//! Azure network resource records as returned by the Resource Manager API.
//!
//! Only the fields the outbound convergence reads or writes are typed. All
//! other provider fields are kept in `extra` so a full object PUT sends back
//! what it received (probes, load balancing rules, tags, ...).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reference to another resource by ID.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SubResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl SubResource {
    pub fn new(id: &str) -> SubResource {
        SubResource {
            id: Some(id.to_string()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Sku {
    pub name: String,
}

impl Sku {
    pub fn standard() -> Sku {
        Sku {
            name: "Standard".to_string(),
        }
    }
}

/// A public IP address resource.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PublicIpAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    #[serde(default)]
    pub properties: PublicIpAddressProperties,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PublicIpAddressProperties {
    #[serde(
        rename = "publicIPAllocationMethod",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub allocation_method: Option<String>,
    #[serde(rename = "ipAddress", default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(
        rename = "provisioningState",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub provisioning_state: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PublicIpAddress {
    /// Create request body for a Standard SKU public IP with a static address.
    pub fn static_standard(region: &str) -> PublicIpAddress {
        PublicIpAddress {
            location: Some(region.to_string()),
            sku: Some(Sku::standard()),
            properties: PublicIpAddressProperties {
                allocation_method: Some("Static".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// A load balancer resource.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LoadBalancer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    #[serde(default)]
    pub properties: LoadBalancerProperties,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LoadBalancerProperties {
    #[serde(rename = "frontendIPConfigurations", default)]
    pub frontend_ip_configurations: Vec<FrontendIpConfiguration>,
    #[serde(rename = "backendAddressPools", default)]
    pub backend_address_pools: Vec<BackendAddressPool>,
    #[serde(rename = "outboundRules", default)]
    pub outbound_rules: Vec<OutboundRule>,
    #[serde(
        rename = "provisioningState",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub provisioning_state: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FrontendIpConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub properties: FrontendIpConfigurationProperties,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FrontendIpConfigurationProperties {
    #[serde(
        rename = "publicIPAddress",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub public_ip_address: Option<SubResource>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FrontendIpConfiguration {
    pub fn new(name: &str, public_ip_id: &str) -> FrontendIpConfiguration {
        FrontendIpConfiguration {
            name: name.to_string(),
            properties: FrontendIpConfigurationProperties {
                public_ip_address: Some(SubResource::new(public_ip_id)),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// ID of the public IP attached to this frontend, if any.
    pub fn public_ip_id(&self) -> Option<&str> {
        self.properties
            .public_ip_address
            .as_ref()
            .and_then(|p| p.id.as_deref())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct BackendAddressPool {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BackendAddressPool {
    pub fn new(name: &str) -> BackendAddressPool {
        BackendAddressPool {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct OutboundRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub properties: OutboundRuleProperties,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct OutboundRuleProperties {
    #[serde(rename = "frontendIPConfigurations", default)]
    pub frontend_ip_configurations: Vec<SubResource>,
    #[serde(
        rename = "backendAddressPool",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub backend_address_pool: Option<SubResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OutboundRule {
    /// Outbound rule for all protocols from `backend_pool_id` through `frontend_id`.
    pub fn new(name: &str, frontend_id: &str, backend_pool_id: &str) -> OutboundRule {
        OutboundRule {
            name: name.to_string(),
            properties: OutboundRuleProperties {
                frontend_ip_configurations: vec![SubResource::new(frontend_id)],
                backend_address_pool: Some(SubResource::new(backend_pool_id)),
                protocol: Some("All".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// True when the rule routes `backend_pool_id` through `frontend_id`.
    /// ID comparison is case insensitive as Azure normalises casing.
    pub fn references(&self, frontend_id: &str, backend_pool_id: &str) -> bool {
        let frontend_ok = self
            .properties
            .frontend_ip_configurations
            .iter()
            .filter_map(|f| f.id.as_deref())
            .any(|id| id.eq_ignore_ascii_case(frontend_id));
        let backend_ok = self
            .properties
            .backend_address_pool
            .as_ref()
            .and_then(|b| b.id.as_deref())
            .is_some_and(|id| id.eq_ignore_ascii_case(backend_pool_id));
        frontend_ok && backend_ok
    }
}
