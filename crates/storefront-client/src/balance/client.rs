//! HTTP client for the Balance Inquiry API

use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::{Client, header};
use serde::Deserialize;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;
use storefront_core::{BalanceConfig, BalanceInquiry};
use tracing::{debug, warn};

/// Anything that can answer a balance inquiry
#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// Fetch the current balances
    async fn fetch_balance(&self) -> ClientResult<BalanceInquiry>;
}

#[derive(Deserialize)]
struct Envelope {
    data: BalanceInquiry,
}

/// Balance Inquiry API client over HTTP
#[derive(Debug, Clone)]
pub struct HttpBalanceClient {
    client: Client,
    endpoint: String,
}

impl HttpBalanceClient {
    /// Create a client for a full inquiry URL
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Create a client from balance configuration
    pub fn from_config(config: &BalanceConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
        })
    }
}

#[async_trait]
impl BalanceSource for HttpBalanceClient {
    async fn fetch_balance(&self) -> ClientResult<BalanceInquiry> {
        debug!(endpoint = %self.endpoint, "Fetching balance");
        let response = self
            .client
            .get(&self.endpoint)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Balance inquiry failed");
            return Err(ClientError::from_status(status.as_u16(), body.trim()));
        }

        let envelope: Envelope = response.json().await?;
        Ok(envelope.data)
    }
}

/// Balance source returning a fixed inquiry, or a fixed failure
#[derive(Debug, Default)]
pub struct StaticBalance {
    reply: Mutex<Option<Result<BalanceInquiry, (u16, String)>>>,
}

impl StaticBalance {
    /// Always answer with `inquiry`
    pub fn new(inquiry: BalanceInquiry) -> Self {
        Self {
            reply: Mutex::new(Some(Ok(inquiry))),
        }
    }

    /// Answer with an HTTP failure until replaced
    pub fn fail_with(&self, status: u16, message: impl Into<String>) {
        *self.reply.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(Err((status, message.into())));
    }

    /// Answer with `inquiry` from now on
    pub fn set(&self, inquiry: BalanceInquiry) {
        *self.reply.lock().unwrap_or_else(PoisonError::into_inner) = Some(Ok(inquiry));
    }
}

#[async_trait]
impl BalanceSource for StaticBalance {
    async fn fetch_balance(&self) -> ClientResult<BalanceInquiry> {
        let reply = self
            .reply
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match reply {
            Some(Ok(inquiry)) => Ok(inquiry),
            Some(Err((status, message))) => Err(ClientError::from_status(status, message)),
            None => Err(ClientError::not_found("No balance information")),
        }
    }
}
