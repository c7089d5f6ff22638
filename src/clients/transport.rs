use async_trait::async_trait;
use reqwest::Client;

use crate::error::ClientError;

/// A single outbound call, already shaped for one of the upstreams.
#[derive(Debug, Clone)]
pub enum ApiRequest {
    Get { url: String },
    Post { url: String, body: serde_json::Value },
}

impl ApiRequest {
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Get { url } | Self::Post { url, .. } => url,
        }
    }
}

/// Status + raw body of an upstream response.
///
/// The body is kept as text so the queue can hand back non-JSON error pages
/// untouched; adapters parse it once the status has been checked.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        self.status == 429
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_str(&self.body).map_err(ClientError::from)
    }
}

/// The HTTP capability the request queues are built on. Production uses
/// [`HttpTransport`]; tests script responses through their own impls.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, ClientError>;
}

pub struct HttpTransport {
    client: Client,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent("Taisen/1.0")
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, ClientError> {
        let response = match request {
            ApiRequest::Get { url } => self.client.get(url).send().await?,
            ApiRequest::Post { url, body } => self.client.post(url).json(body).send().await?,
        };

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(RawResponse { status, body })
    }
}
