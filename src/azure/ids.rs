//! Azure resource ID builders.

const NETWORK_PROVIDER: &str = "providers/Microsoft.Network";

/// ID of a top level Microsoft.Network resource, e.g. a public IP.
pub fn network_resource_id(
    subscription: &str,
    resource_group: &str,
    resource_type: &str,
    name: &str,
) -> String {
    format!("/subscriptions/{subscription}/resourceGroups/{resource_group}/{NETWORK_PROVIDER}/{resource_type}/{name}")
}

pub fn public_ip_id(subscription: &str, resource_group: &str, name: &str) -> String {
    network_resource_id(subscription, resource_group, "publicIPAddresses", name)
}

pub fn load_balancer_id(subscription: &str, resource_group: &str, name: &str) -> String {
    network_resource_id(subscription, resource_group, "loadBalancers", name)
}

pub fn frontend_ip_config_id(
    subscription: &str,
    resource_group: &str,
    load_balancer: &str,
    frontend_ip_config: &str,
) -> String {
    format!(
        "{}/frontendIPConfigurations/{frontend_ip_config}",
        load_balancer_id(subscription, resource_group, load_balancer)
    )
}

pub fn backend_pool_id(
    subscription: &str,
    resource_group: &str,
    load_balancer: &str,
    backend_pool: &str,
) -> String {
    format!(
        "{}/backendAddressPools/{backend_pool}",
        load_balancer_id(subscription, resource_group, load_balancer)
    )
}
