//! Constants and credentials configuration.

use crate::error::{Error, Result};

/// Name of the outbound public IP, frontend IP configuration and outbound rule.
pub const OUTBOUND_NAME: &str = "outbound";

/// Azure Resource Manager endpoint of the public cloud.
pub const MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";
/// OAuth scope for Resource Manager tokens.
pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";
/// Azure AD authority of the public cloud.
pub const AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// api-version of the Microsoft.Network resource provider.
pub const NETWORK_API_VERSION: &str = "2019-06-01";

/// Pause between polls of an asynchronous provider operation.
pub const POLL_INTERVAL_MSEC: u64 = 2_000;

/// Suggested requeue interval for transient provider failures.
pub const DEFAULT_REQUEUE_AFTER_SECS: u64 = 30;

const ENV_SUBSCRIPTION_ID: &str = "AZURE_SUBSCRIPTION_ID";
const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";

/// Service principal credentials for one subscription.
#[derive(Clone)]
pub struct ClientAuth {
    pub subscription_id: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl ClientAuth {
    /// Read credentials from `AZURE_*` environment variables (a `.env` file
    /// is loaded by `main` beforehand).
    pub fn from_env() -> Result<ClientAuth> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<ClientAuth> {
        let get = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::Config(format!("environment variable {key} is not set")))
        };
        Ok(ClientAuth {
            subscription_id: get(ENV_SUBSCRIPTION_ID)?,
            tenant_id: get(ENV_TENANT_ID)?,
            client_id: get(ENV_CLIENT_ID)?,
            client_secret: get(ENV_CLIENT_SECRET)?,
        })
    }
}

impl std::fmt::Debug for ClientAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientAuth")
            .field("subscription_id", &self.subscription_id)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}
