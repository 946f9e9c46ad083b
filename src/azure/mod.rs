//! Azure Resource Manager interaction.
//!
//! This module handles all provider operations:
//! - [`client`] - the [`NetworkClient`] capability and its REST implementation
//! - [`auth`] - service principal bearer tokens
//! - [`ids`] - resource ID builders
//! - [`reader`] - reads mapping absence to `None`
//! - [`memory`] - in-memory provider for dry runs and tests

mod auth;
mod client;
pub mod ids;
mod memory;
mod reader;

// Re-export public types and functions
pub use client::{ArmClient, NetworkClient, OperationToken};
pub(crate) use client::decode;
pub use memory::{CallKind, InMemoryNetworkClient, ProviderCall};
pub use reader::{read_load_balancer, read_public_ip};
