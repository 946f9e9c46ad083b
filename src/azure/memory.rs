//! In-memory [`NetworkClient`] used for dry runs and tests.
//!
//! Writes become visible only after their operation has been waited for,
//! like Azure's asynchronous PUTs. Every call is recorded.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use super::client::{NetworkClient, OperationToken};
use super::ids;
use crate::error::{Error, Result};
use crate::models::{LoadBalancer, PublicIpAddress};

/// One call issued against the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderCall {
    GetPublicIp(String),
    CreatePublicIp(String),
    GetLoadBalancer(String),
    CreateOrUpdateLoadBalancer(String),
    WaitForOperation,
}

impl ProviderCall {
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            ProviderCall::CreatePublicIp(_) | ProviderCall::CreateOrUpdateLoadBalancer(_)
        )
    }

    fn kind(&self) -> CallKind {
        match self {
            ProviderCall::GetPublicIp(_) => CallKind::GetPublicIp,
            ProviderCall::CreatePublicIp(_) => CallKind::CreatePublicIp,
            ProviderCall::GetLoadBalancer(_) => CallKind::GetLoadBalancer,
            ProviderCall::CreateOrUpdateLoadBalancer(_) => CallKind::CreateOrUpdateLoadBalancer,
            ProviderCall::WaitForOperation => CallKind::WaitForOperation,
        }
    }
}

/// Call type, for injecting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    GetPublicIp,
    CreatePublicIp,
    GetLoadBalancer,
    CreateOrUpdateLoadBalancer,
    WaitForOperation,
}

enum PendingWrite {
    PublicIp(String, PublicIpAddress),
    LoadBalancer(String, LoadBalancer),
    /// Accepted by the provider but never applied.
    Lost,
}

type Key = (String, String);

#[derive(Default)]
struct MemoryState {
    public_ips: BTreeMap<Key, PublicIpAddress>,
    load_balancers: BTreeMap<Key, LoadBalancer>,
    pending: HashMap<String, PendingWrite>,
    next_operation: usize,
    calls: Vec<ProviderCall>,
    failures: HashMap<CallKind, u16>,
    lost_writes: HashSet<CallKind>,
}

pub struct InMemoryNetworkClient {
    subscription_id: String,
    state: Mutex<MemoryState>,
}

impl InMemoryNetworkClient {
    pub fn new(subscription_id: &str) -> InMemoryNetworkClient {
        InMemoryNetworkClient {
            subscription_id: subscription_id.to_string(),
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Seed an existing public IP.
    pub fn with_public_ip(self, resource_group: &str, ip: PublicIpAddress) -> Self {
        let name = ip.name.clone().unwrap_or_default();
        self.lock()
            .public_ips
            .insert((resource_group.to_string(), name), ip);
        self
    }

    /// Seed an existing load balancer.
    pub fn with_load_balancer(self, resource_group: &str, lb: LoadBalancer) -> Self {
        let name = lb.name.clone().unwrap_or_default();
        self.lock()
            .load_balancers
            .insert((resource_group.to_string(), name), lb);
        self
    }

    /// Make every call of `kind` fail with HTTP `status`.
    pub fn fail_with(self, kind: CallKind, status: u16) -> Self {
        self.lock().failures.insert(kind, status);
        self
    }

    /// Accept every write of `kind` and report its operation as succeeded,
    /// without ever applying it.
    pub fn lose_writes(self, kind: CallKind) -> Self {
        self.lock().lost_writes.insert(kind);
        self
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.lock().calls.clone()
    }

    pub fn mutating_calls(&self) -> Vec<ProviderCall> {
        self.calls().into_iter().filter(|c| c.is_mutating()).collect()
    }

    pub fn public_ip(&self, resource_group: &str, name: &str) -> Option<PublicIpAddress> {
        self.lock()
            .public_ips
            .get(&(resource_group.to_string(), name.to_string()))
            .cloned()
    }

    pub fn load_balancer(&self, resource_group: &str, name: &str) -> Option<LoadBalancer> {
        self.lock()
            .load_balancers
            .get(&(resource_group.to_string(), name.to_string()))
            .cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record `call`, failing it when a failure was injected for its kind.
    fn record(&self, state: &mut MemoryState, call: ProviderCall) -> Result<()> {
        log::debug!("memory provider {call:?}");
        let kind = call.kind();
        state.calls.push(call);
        match state.failures.get(&kind) {
            Some(status) => Err(Error::Provider {
                kind: "memory",
                status: *status,
                message: format!("injected failure for {kind:?}"),
                retry_after: None,
            }),
            None => Ok(()),
        }
    }

    fn start_operation(state: &mut MemoryState, write: PendingWrite) -> OperationToken {
        state.next_operation += 1;
        let url = format!("memory://operations/{}", state.next_operation);
        state.pending.insert(url.clone(), write);
        OperationToken::AsyncOperation(url)
    }
}

#[async_trait]
impl NetworkClient for InMemoryNetworkClient {
    fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    async fn get_public_ip(&self, resource_group: &str, name: &str) -> Result<PublicIpAddress> {
        let mut state = self.lock();
        self.record(&mut state, ProviderCall::GetPublicIp(name.to_string()))?;
        state
            .public_ips
            .get(&(resource_group.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| Error::NotFound {
                kind: "publicip",
                name: name.to_string(),
            })
    }

    async fn create_public_ip(
        &self,
        resource_group: &str,
        name: &str,
        spec: &PublicIpAddress,
    ) -> Result<OperationToken> {
        let mut state = self.lock();
        self.record(&mut state, ProviderCall::CreatePublicIp(name.to_string()))?;

        let mut ip = spec.clone();
        ip.id = Some(ids::public_ip_id(&self.subscription_id, resource_group, name));
        ip.name = Some(name.to_string());
        // TEST-NET-3 addresses, one per created IP
        let host = state.public_ips.len() + state.pending.len() + 1;
        ip.properties.ip_address = Some(format!("203.0.113.{host}"));
        ip.properties.provisioning_state = Some("Succeeded".to_string());

        let write = if state.lost_writes.contains(&CallKind::CreatePublicIp) {
            PendingWrite::Lost
        } else {
            PendingWrite::PublicIp(resource_group.to_string(), ip)
        };
        Ok(Self::start_operation(&mut state, write))
    }

    async fn get_load_balancer(&self, resource_group: &str, name: &str) -> Result<LoadBalancer> {
        let mut state = self.lock();
        self.record(&mut state, ProviderCall::GetLoadBalancer(name.to_string()))?;
        state
            .load_balancers
            .get(&(resource_group.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| Error::NotFound {
                kind: "loadbalancer",
                name: name.to_string(),
            })
    }

    async fn create_or_update_load_balancer(
        &self,
        resource_group: &str,
        name: &str,
        spec: &LoadBalancer,
    ) -> Result<OperationToken> {
        let mut state = self.lock();
        self.record(
            &mut state,
            ProviderCall::CreateOrUpdateLoadBalancer(name.to_string()),
        )?;

        let mut lb = spec.clone();
        lb.id = Some(ids::load_balancer_id(&self.subscription_id, resource_group, name));
        lb.name = Some(name.to_string());
        lb.properties.provisioning_state = Some("Succeeded".to_string());

        let write = if state
            .lost_writes
            .contains(&CallKind::CreateOrUpdateLoadBalancer)
        {
            PendingWrite::Lost
        } else {
            PendingWrite::LoadBalancer(resource_group.to_string(), lb)
        };
        Ok(Self::start_operation(&mut state, write))
    }

    async fn wait_for_operation(&self, token: &OperationToken) -> Result<()> {
        let mut state = self.lock();
        self.record(&mut state, ProviderCall::WaitForOperation)?;
        let OperationToken::AsyncOperation(url) = token else {
            return Ok(());
        };
        match state.pending.remove(url) {
            Some(PendingWrite::PublicIp(rg, ip)) => {
                let name = ip.name.clone().unwrap_or_default();
                state.public_ips.insert((rg, name), ip);
            }
            Some(PendingWrite::LoadBalancer(rg, lb)) => {
                let name = lb.name.clone().unwrap_or_default();
                state.load_balancers.insert((rg, name), lb);
            }
            Some(PendingWrite::Lost) => log::debug!("memory provider dropped write {url}"),
            None => {
                return Err(Error::OperationFailed {
                    status: "NotFound".to_string(),
                    message: format!("unknown operation {url}"),
                })
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_visible_after_wait() {
        let client = InMemoryNetworkClient::new("sub");
        let token = client
            .create_public_ip("rg", "outbound", &PublicIpAddress::static_standard("westeurope"))
            .await
            .unwrap();

        let err = client.get_public_ip("rg", "outbound").await.unwrap_err();
        assert!(err.is_not_found());

        client.wait_for_operation(&token).await.unwrap();
        let ip = client.get_public_ip("rg", "outbound").await.unwrap();
        assert_eq!(
            ip.id.as_deref(),
            Some("/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Network/publicIPAddresses/outbound")
        );
        assert_eq!(ip.properties.ip_address.as_deref(), Some("203.0.113.1"));
        assert_eq!(client.mutating_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_lost_write_succeeds_without_effect() {
        let client = InMemoryNetworkClient::new("sub").lose_writes(CallKind::CreatePublicIp);
        let token = client
            .create_public_ip("rg", "outbound", &PublicIpAddress::static_standard("westeurope"))
            .await
            .unwrap();
        client.wait_for_operation(&token).await.unwrap();
        assert!(client.public_ip("rg", "outbound").is_none());
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let client = InMemoryNetworkClient::new("sub").fail_with(CallKind::GetLoadBalancer, 503);
        let err = client.get_load_balancer("rg", "rg").await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(client.calls(), vec![ProviderCall::GetLoadBalancer("rg".to_string())]);
    }
}
