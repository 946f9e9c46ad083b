//! Network range validation and outbound load balancer convergence for
//! Azure hosted clusters.
//!
//! - [`validation`] checks an infrastructure network configuration at
//!   admission time.
//! - [`reconcile`] converges the outbound public IP and load balancer of a
//!   cluster resource group through a [`azure::NetworkClient`].

pub mod azure;
pub mod config;
pub mod convergence;
pub mod error;
pub mod models;
pub mod output;
mod reconcile;
pub mod validation;

pub use error::{Error, Result};
pub use reconcile::reconcile;
