//! Client for the `GET /create` endpoint.
//!
//! ```no_run
//! # async fn run() -> Result<(), qrcode_api::ClientError> {
//! use qrcode_api::{CreateOptions, QrCodeClient};
//!
//! let client = QrCodeClient::new();
//! let png = client.create("https://example.com", &CreateOptions::default()).await?;
//! # let _ = png;
//! # Ok(())
//! # }
//! ```

use base64::Engine;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://qrcode.ness.su";

const CREATE_ENDPOINT: &str = "create";

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// The service answered with a non-200 status.
    #[error("{message}")]
    Api { status: StatusCode, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
}

/// Generation parameters besides `data`, with the service defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateOptions {
    pub border: u32,
    pub box_size: u32,
    pub image_url: Option<String>,
    pub image_round: u32,
    pub image_padding: u32,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            border: 3,
            box_size: 30,
            image_url: None,
            image_round: 50,
            image_padding: 10,
        }
    }
}

impl CreateOptions {
    fn query_pairs(&self, data: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("data", data.to_string()),
            ("border", self.border.to_string()),
            ("box_size", self.box_size.to_string()),
        ];
        if let Some(image_url) = self.image_url.as_deref().filter(|url| !url.is_empty()) {
            params.push(("image_url", image_url.to_string()));
            params.push(("image_round", self.image_round.to_string()));
            params.push(("image_padding", self.image_padding.to_string()));
        }
        params
    }
}

#[derive(Clone, Debug)]
pub struct QrCodeClient {
    base_url: String,
    http: Client,
}

impl Default for QrCodeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl QrCodeClient {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, ClientError> {
        Self::with_http_client(base_url, Client::new())
    }

    /// Uses a preconfigured `reqwest::Client`, e.g. one with a timeout.
    pub fn with_http_client(base_url: &str, http: Client) -> Result<Self, ClientError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        Url::parse(trimmed).map_err(|err| ClientError::InvalidBaseUrl(format!("{trimmed}: {err}")))?;
        Ok(Self {
            base_url: trimmed.to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Renders `data` (plain or base64 text) and returns the PNG bytes.
    pub async fn create(&self, data: &str, options: &CreateOptions) -> Result<Vec<u8>, ClientError> {
        self.fetch(CREATE_ENDPOINT, &options.query_pairs(data)).await
    }

    async fn fetch(
        &self,
        endpoint: &str,
        params: &[(&'static str, String)],
    ) -> Result<Vec<u8>, ClientError> {
        let url = format!("{}/{endpoint}", self.base_url);
        let response = self.http.get(&url).query(params).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.bytes().await?;
            return Err(ClientError::Api {
                status,
                message: error_detail(status, &body),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

fn error_detail(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| value.get("detail").cloned())
        .map(|detail| match detail {
            Value::String(message) => message,
            other => other.to_string(),
        })
        .unwrap_or_else(|| format!("Unexpected error: {}", status.as_u16()))
}

/// Base64-encodes text so the service decodes it back verbatim. Useful for
/// data that would otherwise be mistaken for base64.
pub fn encode_data(data: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(data.as_bytes())
}
