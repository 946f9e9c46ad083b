//! Bearer tokens for the Resource Manager API.

use azure_core::auth::TokenCredential;
use azure_identity::{ClientSecretCredential, TokenCredentialOptions};

use crate::config::{ClientAuth, AUTHORITY_HOST, MANAGEMENT_SCOPE};
use crate::error::{Error, Result};

/// Service principal token source. Owned by one [`super::ArmClient`].
pub struct TokenSource {
    credential: ClientSecretCredential,
}

impl TokenSource {
    pub fn new(auth: &ClientAuth) -> Result<TokenSource> {
        let authority = azure_core::Url::parse(AUTHORITY_HOST)
            .map_err(|e| Error::Config(format!("invalid authority host {AUTHORITY_HOST}: {e}")))?;
        let credential = ClientSecretCredential::new(
            azure_core::new_http_client(),
            auth.tenant_id.clone(),
            auth.client_id.clone(),
            auth.client_secret.clone(),
            TokenCredentialOptions::new(authority),
        );
        Ok(TokenSource { credential })
    }

    /// Current bearer token for Resource Manager.
    pub async fn bearer(&self) -> Result<String> {
        let token = self
            .credential
            .get_token(&[MANAGEMENT_SCOPE])
            .await
            .map_err(|e| Error::Auth(e.to_string()))?;
        Ok(token.token.secret().to_string())
    }
}
