//! Domain models for outbound network provisioning.
//!
//! This module contains the core data structures used throughout the crate:
//! - [`Cidr`] - address ranges with containment and overlap checks
//! - [`InfrastructureConfig`] and [`OutboundTopology`] - what the cluster asks for
//! - [`LoadBalancer`] and [`PublicIpAddress`] - provider resource records
//! - [`InfrastructureStatus`] - the persisted result of a pass

mod cidr;
mod infrastructure;
mod network;
mod status;

// Re-export public types
pub use cidr::{
    cut_addr, get_cidr_mask, max_length, Cidr, CidrParseError, MAX_LENGTH_V4, MAX_LENGTH_V6,
};
pub use infrastructure::{
    InfrastructureConfig, InfrastructureSpec, NetworkConfig, OutboundConnectivity,
    OutboundTopology, VNet,
};
pub use network::{
    BackendAddressPool, FrontendIpConfiguration, FrontendIpConfigurationProperties,
    LoadBalancer, LoadBalancerProperties, OutboundRule, OutboundRuleProperties, PublicIpAddress,
    PublicIpAddressProperties, Sku, SubResource,
};
pub use status::{InfrastructureStatus, LoadBalancerRef, PublicIp, ResourceGroup};
