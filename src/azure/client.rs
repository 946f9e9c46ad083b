//! Provider capability interface and its Azure Resource Manager implementation.

use async_trait::async_trait;
use colored::Colorize;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::auth::TokenSource;
use crate::config::{self, ClientAuth};
use crate::error::{Error, Result};
use crate::models::{LoadBalancer, PublicIpAddress};

const ASYNC_OPERATION: &str = "Azure-AsyncOperation";
const LOCATION: &str = "Location";

/// Handle to an asynchronous provider operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationToken {
    /// The provider finished the operation with its response.
    Completed,
    /// Poll this `Azure-AsyncOperation` URL until it reports a terminal status.
    AsyncOperation(String),
    /// Poll this `Location` URL until it stops answering 202.
    Location(String),
}

/// Network operations the convergence needs from the cloud provider.
///
/// Getters return [`Error::NotFound`] when the provider reports absence so
/// callers can tell it apart from transport or auth failures. All calls are
/// safe to retry with the same target name.
#[async_trait]
pub trait NetworkClient: Send + Sync {
    /// Subscription all resource IDs are scoped to.
    fn subscription_id(&self) -> &str;

    async fn get_public_ip(&self, resource_group: &str, name: &str) -> Result<PublicIpAddress>;

    async fn create_public_ip(
        &self,
        resource_group: &str,
        name: &str,
        spec: &PublicIpAddress,
    ) -> Result<OperationToken>;

    async fn get_load_balancer(&self, resource_group: &str, name: &str) -> Result<LoadBalancer>;

    async fn create_or_update_load_balancer(
        &self,
        resource_group: &str,
        name: &str,
        spec: &LoadBalancer,
    ) -> Result<OperationToken>;

    /// Block until the operation behind `token` has completed.
    async fn wait_for_operation(&self, token: &OperationToken) -> Result<()>;
}

/// Body of an `Azure-AsyncOperation` status poll.
#[derive(Deserialize, Serialize, Debug, Default)]
struct OperationStatus {
    status: String,
    #[serde(default)]
    error: Option<OperationError>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
struct OperationError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// [`NetworkClient`] talking to Azure Resource Manager over REST.
pub struct ArmClient {
    http: reqwest::Client,
    subscription_id: String,
    endpoint: String,
    tokens: TokenSource,
    poll_interval: Duration,
}

impl ArmClient {
    pub fn new(auth: &ClientAuth) -> Result<ArmClient> {
        Ok(ArmClient {
            http: reqwest::Client::new(),
            subscription_id: auth.subscription_id.clone(),
            endpoint: config::MANAGEMENT_ENDPOINT.to_string(),
            tokens: TokenSource::new(auth)?,
            poll_interval: Duration::from_millis(config::POLL_INTERVAL_MSEC),
        })
    }

    /// Talk to another Resource Manager endpoint, such as a sovereign cloud.
    pub fn with_endpoint(mut self, endpoint: &str) -> ArmClient {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    fn resource_url(&self, resource_group: &str, resource_type: &str, name: &str) -> String {
        let id = super::ids::network_resource_id(
            &self.subscription_id,
            resource_group,
            resource_type,
            name,
        );
        format!("{}{id}?api-version={}", self.endpoint, config::NETWORK_API_VERSION)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        kind: &'static str,
        url: &str,
        name: &str,
    ) -> Result<T> {
        log::debug!("GET {kind} {}", url.on_blue());
        let response = self
            .http
            .get(url)
            .bearer_auth(self.tokens.bearer().await?)
            .send()
            .await?;

        match read_answer(response.status()) {
            ReadAnswer::Body => decode(kind, &response.text().await?),
            ReadAnswer::Absent => Err(Error::NotFound {
                kind,
                name: name.to_string(),
            }),
            ReadAnswer::Failed => Err(provider_error(kind, response).await),
        }
    }

    async fn put_json<T: Serialize + Sync>(
        &self,
        kind: &'static str,
        url: &str,
        body: &T,
    ) -> Result<OperationToken> {
        log::debug!("PUT {kind} {}", url.on_blue());
        let response = self
            .http
            .put(url)
            .bearer_auth(self.tokens.bearer().await?)
            .json(body)
            .send()
            .await?;

        if !write_accepted(response.status()) {
            return Err(provider_error(kind, response).await);
        }
        Ok(operation_token(response.headers()))
    }

    async fn poll_once(&self, token: &OperationToken) -> Result<(bool, Option<Duration>)> {
        let url = match token {
            OperationToken::Completed => return Ok((true, None)),
            OperationToken::AsyncOperation(url) | OperationToken::Location(url) => url,
        };
        let response = self
            .http
            .get(url)
            .bearer_auth(self.tokens.bearer().await?)
            .send()
            .await?;
        let hint = retry_after(response.headers());
        let status = response.status();

        match token {
            OperationToken::AsyncOperation(_) if status == StatusCode::OK => {
                let done = async_operation_done(&response.text().await?)?;
                Ok((done, hint))
            }
            OperationToken::Location(_) => match location_done(status) {
                Some(done) => Ok((done, hint)),
                None => Err(provider_error("operation", response).await),
            },
            _ => Err(provider_error("operation", response).await),
        }
    }
}

#[async_trait]
impl NetworkClient for ArmClient {
    fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    async fn get_public_ip(&self, resource_group: &str, name: &str) -> Result<PublicIpAddress> {
        let url = self.resource_url(resource_group, "publicIPAddresses", name);
        self.get_json("publicip", &url, name).await
    }

    async fn create_public_ip(
        &self,
        resource_group: &str,
        name: &str,
        spec: &PublicIpAddress,
    ) -> Result<OperationToken> {
        let url = self.resource_url(resource_group, "publicIPAddresses", name);
        self.put_json("publicip", &url, spec).await
    }

    async fn get_load_balancer(&self, resource_group: &str, name: &str) -> Result<LoadBalancer> {
        let url = self.resource_url(resource_group, "loadBalancers", name);
        self.get_json("loadbalancer", &url, name).await
    }

    async fn create_or_update_load_balancer(
        &self,
        resource_group: &str,
        name: &str,
        spec: &LoadBalancer,
    ) -> Result<OperationToken> {
        let url = self.resource_url(resource_group, "loadBalancers", name);
        self.put_json("loadbalancer", &url, spec).await
    }

    async fn wait_for_operation(&self, token: &OperationToken) -> Result<()> {
        loop {
            let (done, retry_after) = self.poll_once(token).await?;
            if done {
                return Ok(());
            }
            tokio::time::sleep(retry_after.unwrap_or(self.poll_interval)).await;
        }
    }
}

/// Decode a provider payload, reporting the JSON path of the first mismatch.
pub(crate) fn decode<T: DeserializeOwned>(kind: &'static str, body: &str) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        log::error!("{kind} BODY START:\n\n{body}\n\nBODY END\n");
        Error::Decode {
            kind,
            path: e.path().to_string(),
            message: e.inner().to_string(),
        }
    })
}

/// How a GET answered, before its body is read.
#[derive(Debug, PartialEq, Eq)]
enum ReadAnswer {
    Body,
    Absent,
    Failed,
}

fn read_answer(status: StatusCode) -> ReadAnswer {
    match status {
        StatusCode::OK => ReadAnswer::Body,
        StatusCode::NOT_FOUND => ReadAnswer::Absent,
        _ => ReadAnswer::Failed,
    }
}

fn write_accepted(status: StatusCode) -> bool {
    matches!(status, StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED)
}

/// Whether an `Azure-AsyncOperation` poll body reports completion.
/// `Failed` and `Canceled` become [`Error::OperationFailed`].
fn async_operation_done(body: &str) -> Result<bool> {
    let op: OperationStatus = decode("operation", body)?;
    log::debug!("operation status {}", op.status);
    match op.status.as_str() {
        "Succeeded" => Ok(true),
        "Failed" | "Canceled" => {
            let error = op.error.unwrap_or_default();
            Err(Error::OperationFailed {
                status: op.status,
                message: format!("{}: {}", error.code, error.message),
            })
        }
        _ => Ok(false),
    }
}

/// Whether a `Location` poll answer reports completion; `None` for an error status.
fn location_done(status: StatusCode) -> Option<bool> {
    match status {
        StatusCode::ACCEPTED => Some(false),
        s if s.is_success() => Some(true),
        _ => None,
    }
}

/// Token for the operation started by a PUT, from its response headers.
pub(crate) fn operation_token(headers: &HeaderMap) -> OperationToken {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    };
    if let Some(url) = header(ASYNC_OPERATION) {
        OperationToken::AsyncOperation(url)
    } else if let Some(url) = header(LOCATION) {
        OperationToken::Location(url)
    } else {
        OperationToken::Completed
    }
}

/// `Retry-After` header in seconds.
pub(crate) fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

async fn provider_error(kind: &'static str, response: Response) -> Error {
    let status = response.status().as_u16();
    let retry_after = retry_after(response.headers());
    let message = response.text().await.unwrap_or_default();
    log::warn!(
        "{failed} {kind} request: status={status} {message}",
        failed = "failed".on_red()
    );
    Error::Provider {
        kind,
        status,
        message,
        retry_after,
    }
}
