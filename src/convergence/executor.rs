//! Applies convergence decisions through a [`NetworkClient`].

use colored::Colorize;

use super::planner::{plan, ObservedTopology};
use crate::azure::{read_load_balancer, read_public_ip, NetworkClient};
use crate::config::OUTBOUND_NAME;
use crate::error::{Error, Result};
use crate::models::{
    InfrastructureStatus, LoadBalancer, LoadBalancerRef, OutboundTopology, PublicIp,
    PublicIpAddress,
};

/// Make sure the outbound public IP exists and record it in `status`.
///
/// A missing IP is created with a static address and read back once the
/// provider operation has finished, as the create response may not carry
/// the final ID.
pub async fn ensure_outbound_public_ip(
    client: &dyn NetworkClient,
    desired: &OutboundTopology,
    status: &mut InfrastructureStatus,
) -> Result<PublicIpAddress> {
    let rg = &desired.resource_group;
    let name = OUTBOUND_NAME;

    let ip = match read_public_ip(client, rg, name).await? {
        Some(ip) => {
            log::info!("public ip {name} already exists in {rg}");
            ip
        }
        None => {
            log::info!("{} public ip {name} in {rg}", "create".green());
            let token = client
                .create_public_ip(rg, name, &PublicIpAddress::static_standard(&desired.region))
                .await?;
            client.wait_for_operation(&token).await?;
            read_public_ip(client, rg, name)
                .await?
                .ok_or_else(|| Error::OperationFailed {
                    status: "Succeeded".to_string(),
                    message: format!("public IP {name} does not exist after creation"),
                })?
        }
    };

    status.upsert_outbound_ip(PublicIp {
        name: ip.name.clone().unwrap_or_else(|| name.to_string()),
        resource_group: rg.to_string(),
        ip: ip.properties.ip_address.clone(),
    });
    Ok(ip)
}

/// Converge the outbound load balancer onto `public_ip` and record it in
/// `status`. Issues no write when the observed load balancer already matches.
pub async fn ensure_load_balancer(
    client: &dyn NetworkClient,
    desired: &OutboundTopology,
    public_ip: &PublicIpAddress,
    status: &mut InfrastructureStatus,
) -> Result<LoadBalancer> {
    let observed = ObservedTopology {
        public_ip: Some(public_ip.clone()),
        load_balancer: read_load_balancer(client, &desired.resource_group, &desired.name).await?,
    };
    let plan = plan(desired, &observed)?;

    if plan.apply_needed() {
        log::info!(
            "{} load balancer {} in {} (create={} pool={} frontend={} ip={} rule={})",
            "update".green(),
            desired.name,
            desired.resource_group,
            plan.create,
            plan.needs_backend_pool,
            plan.needs_frontend_ip_config,
            plan.needs_public_ip_assignment,
            plan.needs_outbound_rule
        );
        let token = client
            .create_or_update_load_balancer(
                &desired.resource_group,
                &desired.name,
                &plan.load_balancer,
            )
            .await?;
        client.wait_for_operation(&token).await?;
    } else {
        log::info!("load balancer {} is up to date", desired.name);
    }

    status.load_balancer = Some(LoadBalancerRef {
        name: desired.name.clone(),
    });
    Ok(plan.load_balancer)
}

/// Ensure the public IP, then the load balancer referencing it.
///
/// The outbound fields of `status` are rebuilt from this pass only and
/// written back when both steps succeed. Transient failures are returned as
/// [`Error::Retryable`].
pub async fn ensure_outbound_topology(
    client: &dyn NetworkClient,
    desired: &OutboundTopology,
    status: &mut InfrastructureStatus,
) -> Result<()> {
    let mut staged = InfrastructureStatus::new(&status.resource_group.name);
    let public_ip = ensure_outbound_public_ip(client, desired, &mut staged)
        .await
        .map_err(Error::into_retryable)?;
    ensure_load_balancer(client, desired, &public_ip, &mut staged)
        .await
        .map_err(Error::into_retryable)?;
    *status = staged;
    Ok(())
}
