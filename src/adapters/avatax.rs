//! HTTP client for the AvaTax REST v2 API.
//!
//! Only the two calls the pipeline needs are implemented: address
//! resolution and transaction creation. Authentication is HTTP basic auth
//! with the account login and password.

use crate::config::credentials::Credentials;
use crate::config::toml_config::ServiceConfig;
use crate::domain::model::{Address, AddressResolution, TaxCalculation, TaxDocument};
use crate::domain::ports::TaxService;
use crate::utils::error::{EtlError, Result, ServiceError};
use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const RESOLVE_ADDRESS_PATH: &str = "/api/v2/addresses/resolve";
const CREATE_TRANSACTION_PATH: &str = "/api/v2/transactions/create";

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorInfo,
}

#[derive(Debug, Deserialize)]
struct ErrorInfo {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AvaTaxClient {
    base_url: String,
    credentials: Credentials,
    http: Client,
}

impl AvaTaxClient {
    pub fn new(config: &ServiceConfig, credentials: Credentials) -> Result<Self> {
        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let client_id = config.client_identifier();
        default_headers.insert(
            "x-avalara-client",
            header::HeaderValue::from_str(&client_id).map_err(|e| EtlError::ConfigError {
                message: format!("Invalid client identifier '{}': {}", client_id, e),
            })?,
        );

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| EtlError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        let base_url = config.base_url()?.trim_end_matches('/').to_string();
        tracing::debug!("Tax service base URL: {}", base_url);

        Ok(Self {
            base_url,
            credentials,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> std::result::Result<R, ServiceError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .json(body)
            .send()
            .await?;

        let response = check_status(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ServiceError::MalformedResponse(e.to_string()))
    }
}

async fn check_status(response: Response) -> std::result::Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => match (envelope.error.code, envelope.error.message) {
            (Some(code), Some(message)) => format!("{}: {}", code, message),
            (None, Some(message)) => message,
            (Some(code), None) => code,
            (None, None) => body,
        },
        Err(_) if body.is_empty() => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
        Err(_) => body,
    };

    Err(ServiceError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl TaxService for AvaTaxClient {
    async fn resolve_address(
        &self,
        address: &Address,
    ) -> std::result::Result<AddressResolution, ServiceError> {
        self.post(RESOLVE_ADDRESS_PATH, address).await
    }

    async fn compute_tax(
        &self,
        document: &TaxDocument,
    ) -> std::result::Result<TaxCalculation, ServiceError> {
        self.post(CREATE_TRANSACTION_PATH, document).await
    }
}
