//! One reconciliation pass of the outbound network.

use colored::Colorize;

use crate::azure::NetworkClient;
use crate::convergence::ensure_outbound_topology;
use crate::error::Result;
use crate::models::{InfrastructureSpec, InfrastructureStatus, OutboundTopology};

/// Run one pass for the cluster whose resource group is recorded in `status`.
///
/// Only zoned clusters with a stable egress IP get an outbound load
/// balancer; for all others the outbound fields of `status` are cleared.
/// On error `status` is unchanged.
pub async fn reconcile(
    client: &dyn NetworkClient,
    spec: &InfrastructureSpec,
    status: &mut InfrastructureStatus,
) -> Result<()> {
    let resource_group = status.resource_group.name.clone();
    if !spec.wants_outbound_load_balancer() {
        log::info!(
            "{} outbound load balancer for {resource_group} (stable_egress_ip={} zoned={})",
            "skip".yellow(),
            spec.stable_egress_ip,
            spec.zoned
        );
        status.load_balancer = None;
        status.outbound_ips.clear();
        return Ok(());
    }

    log::info!("#Start reconcile() {resource_group} in {}", spec.region);
    let desired = OutboundTopology::new(client.subscription_id(), &resource_group, spec);
    ensure_outbound_topology(client, &desired, status).await?;
    log::info!("#End reconcile() {resource_group}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::InMemoryNetworkClient;

    fn spec(stable_egress_ip: bool, zoned: bool) -> InfrastructureSpec {
        InfrastructureSpec {
            region: "westeurope".to_string(),
            stable_egress_ip,
            zoned,
        }
    }

    #[tokio::test]
    async fn test_skips_without_stable_egress_or_zones() {
        for (stable, zoned) in [(false, false), (true, false), (false, true)] {
            let client = InMemoryNetworkClient::new("sub");
            let mut status = InfrastructureStatus::new("rg");
            reconcile(&client, &spec(stable, zoned), &mut status)
                .await
                .unwrap();
            assert!(client.calls().is_empty());
            assert_eq!(status, InfrastructureStatus::new("rg"));
        }
    }

    #[tokio::test]
    async fn test_disabling_stable_egress_clears_status() {
        let client = InMemoryNetworkClient::new("sub");
        let mut status = InfrastructureStatus::new("rg");
        reconcile(&client, &spec(true, true), &mut status)
            .await
            .unwrap();
        assert!(status.load_balancer.is_some());

        reconcile(&client, &spec(false, true), &mut status)
            .await
            .unwrap();
        assert_eq!(status, InfrastructureStatus::new("rg"));
        assert_eq!(client.mutating_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_names_follow_resource_group() {
        let client = InMemoryNetworkClient::new("sub");
        let mut status = InfrastructureStatus::new("shoot--dev--b");
        reconcile(&client, &spec(true, true), &mut status)
            .await
            .unwrap();
        assert!(client.public_ip("shoot--dev--b", "outbound").is_some());
        let lb = client.load_balancer("shoot--dev--b", "shoot--dev--b").unwrap();
        assert_eq!(lb.properties.backend_address_pools[0].name, "shoot--dev--b");
        assert_eq!(status.load_balancer.unwrap().name, "shoot--dev--b");
    }
}
