//! Outbound load balancer convergence.
//!
//! - [`planner`] - decides which parts of the load balancer need work
//! - [`executor`] - issues the provider calls and updates the status

mod executor;
mod planner;

pub use executor::{ensure_load_balancer, ensure_outbound_public_ip, ensure_outbound_topology};
pub use planner::{backend_pool_id, frontend_ip_config_id, plan, ConvergencePlan, ObservedTopology};
