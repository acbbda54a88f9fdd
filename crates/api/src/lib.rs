//! Supplier service API client.
//!
//! This crate provides a lightweight client for the supplier REST service.
//! It focuses on:
//!
//! - Constructing an HTTP client with sensible defaults
//! - Resolving the base URL from `SUPPLIERS_API_BASE` or the revision default
//! - Validating the base URL for safety
//! - One method per service operation, with uniform error extraction
//!
//! The primary entry point is [`SupplierClient`]. Create an instance via
//! [`SupplierClient::from_env`] or [`SupplierClient::new`], then call the
//! operation methods of the [`SupplierApi`] trait it implements.
//!
//! # Example
//!
//! ```ignore
//! use suppliers_api::{SupplierApi, SupplierClient};
//! use suppliers_types::SupplierId;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SupplierClient::from_env()?;
//!     let supplier = client.retrieve(&SupplierId::Number(7)).await?;
//!     println!("{}", supplier.name);
//!     Ok(())
//! }
//! ```

use std::env;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::{Client, Method, StatusCode, Url, header};
use serde_json::Value;
use suppliers_types::{ApiRevision, NewSupplier, ProductId, ProductsPatch, SearchCriteria, Supplier, SupplierId};
use thiserror::Error;
use tracing::{debug, warn};

/// Environment variable overriding the full base URL (origin + base path).
pub const API_BASE_ENV: &str = "SUPPLIERS_API_BASE";
/// Environment variable selecting the API revision (`modern` or `legacy`).
pub const API_REVISION_ENV: &str = "SUPPLIERS_API_REVISION";

/// Origin used when `SUPPLIERS_API_BASE` is unset; the revision's base path
/// is appended to it.
const DEFAULT_ORIGIN: &str = "http://localhost:5000";

/// Fallback message shown when a failure body carries no readable error field.
pub const GENERIC_SERVER_ERROR: &str = "Server error!";

/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Characters percent-encoded in query-string values. Covers everything that
/// would corrupt a `key=value&key=value` string plus the characters reqwest
/// would refuse in a URL.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'=')
    .add(b'?');

/// Error surfaced by any client operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The service answered with a non-2xx status. `message` is the value of
    /// the revision's error field, or [`GENERIC_SERVER_ERROR`] when the body
    /// had none.
    #[error("{message}")]
    Remote { status: u16, message: String },
    /// A 2xx response body did not decode as the expected shape.
    #[error("failed to decode response (status {status}): {source}. body preview: {preview}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
        preview: String,
    },
    #[error("invalid base URL '{base}': {reason}")]
    InvalidBaseUrl { base: String, reason: String },
    #[error("invalid api revision '{0}'; expected 'modern' or 'legacy'")]
    InvalidRevision(String),
}

/// Resolved client configuration: one base URL for every endpoint, plus the
/// revision that decides which error field to read.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub revision: ApiRevision,
}

/// Default base URL for a revision: the local development origin joined
/// with the revision's base path.
pub fn default_base_url(revision: ApiRevision) -> String {
    format!("{}{}", DEFAULT_ORIGIN, revision.default_base_path())
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, revision: ApiRevision) -> Self {
        Self {
            base_url: base_url.into(),
            revision,
        }
    }

    /// Resolve configuration from the environment.
    ///
    /// The revision is taken from `SUPPLIERS_API_REVISION` (default: modern).
    /// The base URL is taken from `SUPPLIERS_API_BASE`, falling back to the
    /// local development origin joined with the revision's base path.
    pub fn from_env() -> Result<Self, ApiError> {
        let revision = match env::var(API_REVISION_ENV) {
            Ok(raw) => raw.parse::<ApiRevision>().map_err(|_| ApiError::InvalidRevision(raw))?,
            Err(_) => ApiRevision::default(),
        };
        let base_url = env::var(API_BASE_ENV).unwrap_or_else(|_| default_base_url(revision));
        Ok(Self { base_url, revision })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        let revision = ApiRevision::default();
        Self {
            base_url: default_base_url(revision),
            revision,
        }
    }
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: the scheme must be HTTPS
fn validate_base_url(base: &str) -> Result<(), ApiError> {
    let parsed = Url::parse(base).map_err(|e| ApiError::InvalidBaseUrl {
        base: base.to_string(),
        reason: e.to_string(),
    })?;

    let host = parsed.host_str().ok_or_else(|| ApiError::InvalidBaseUrl {
        base: base.to_string(),
        reason: "missing host".to_string(),
    })?;

    if LOCALHOST_DOMAINS.iter().any(|&allowed| host.eq_ignore_ascii_case(allowed)) {
        return Ok(());
    }

    if parsed.scheme() != "https" {
        return Err(ApiError::InvalidBaseUrl {
            base: base.to_string(),
            reason: format!("non-localhost hosts must use https, got '{}://'", parsed.scheme()),
        });
    }

    Ok(())
}

/// Serialize criteria into a `key=value&key=value` query string.
///
/// Values are percent-encoded; empty criteria produce an empty string with
/// no stray separators.
pub fn encode_query(criteria: &SearchCriteria) -> String {
    let mut out = String::new();
    for (field, value) in criteria.iter() {
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(field);
        out.push('=');
        out.push_str(&utf8_percent_encode(value, QUERY_VALUE).to_string());
    }
    out
}

/// Extract the human-readable message from a failure body.
///
/// Reads the given error field from a JSON object body; anything else
/// (missing field, non-string value, non-JSON body) yields the generic
/// fallback so a malformed error response never crashes the client.
pub fn extract_error_message(body: &str, error_field: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(|value| value.get(error_field))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string())
}

fn truncate_body_preview(text: &str, limit: usize) -> String {
    if text.trim().is_empty() {
        return "<empty>".to_string();
    }

    let mut preview = String::new();
    for ch in text.chars() {
        if preview.len() >= limit {
            preview.push_str("...");
            break;
        }
        match ch {
            '\n' | '\r' | '\t' => {
                if !preview.ends_with(' ') {
                    preview.push(' ');
                }
            }
            _ => preview.push(ch),
        }
    }

    preview.trim().to_string()
}

/// The operations the supplier service exposes.
///
/// [`SupplierClient`] is the production implementation; the trait exists so
/// the form controller can be driven against a stub in tests.
#[async_trait]
pub trait SupplierApi: Send + Sync {
    async fn create(&self, record: &NewSupplier) -> Result<Supplier, ApiError>;
    async fn update(&self, id: &SupplierId, record: &NewSupplier) -> Result<Supplier, ApiError>;
    async fn retrieve(&self, id: &SupplierId) -> Result<Supplier, ApiError>;
    async fn delete(&self, id: &SupplierId) -> Result<(), ApiError>;
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Supplier>, ApiError>;
    async fn list(&self) -> Result<Vec<Supplier>, ApiError>;
    async fn add_products(&self, id: &SupplierId, products: &[ProductId]) -> Result<Supplier, ApiError>;
}

/// Thin wrapper around a configured `reqwest::Client` for supplier service
/// access. All endpoint URLs derive from the single configured base URL.
#[derive(Debug, Clone)]
pub struct SupplierClient {
    base_url: String,
    revision: ApiRevision,
    http: Client,
}

impl SupplierClient {
    /// Construct a client from explicit configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        validate_base_url(&config.base_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            revision: config.revision,
            http,
        })
    }

    /// Construct a client from `SUPPLIERS_API_BASE` / `SUPPLIERS_API_REVISION`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn revision(&self) -> ApiRevision {
        self.revision
    }

    fn record_url(&self, id: &SupplierId) -> String {
        format!("{}/{}", self.base_url, id)
    }

    fn products_url(&self, id: &SupplierId) -> String {
        format!("{}/{}/products", self.base_url, id)
    }

    fn collection_url(&self, criteria: &SearchCriteria) -> String {
        if criteria.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}?{}", self.base_url, encode_query(criteria))
        }
    }

    /// Build a `reqwest::RequestBuilder` for a method and endpoint URL.
    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.http.request(method, url)
    }

    /// Dispatch a prepared request and return the status plus raw body text.
    async fn execute(
        &self,
        method: Method,
        url: &str,
        builder: reqwest::RequestBuilder,
    ) -> Result<(StatusCode, String), ApiError> {
        let start = Instant::now();
        debug!(method = %method, url = %url, "request started");

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if status.is_success() {
            debug!(
                method = %method,
                url = %url,
                status = %status,
                duration_ms = start.elapsed().as_millis(),
                "request completed"
            );
        } else {
            warn!(
                method = %method,
                url = %url,
                status = %status,
                duration_ms = start.elapsed().as_millis(),
                "request failed"
            );
        }

        Ok((status, text))
    }

    fn remote_error(&self, status: StatusCode, body: &str) -> ApiError {
        ApiError::Remote {
            status: status.as_u16(),
            message: extract_error_message(body, self.revision.error_field()),
        }
    }

    fn decode_record(&self, status: StatusCode, body: &str) -> Result<Supplier, ApiError> {
        serde_json::from_str(body).map_err(|source| ApiError::Decode {
            status: status.as_u16(),
            source,
            preview: truncate_body_preview(body, 200),
        })
    }

    fn decode_records(&self, status: StatusCode, body: &str) -> Result<Vec<Supplier>, ApiError> {
        serde_json::from_str(body).map_err(|source| ApiError::Decode {
            status: status.as_u16(),
            source,
            preview: truncate_body_preview(body, 200),
        })
    }

    async fn fetch_record(
        &self,
        method: Method,
        url: &str,
        builder: reqwest::RequestBuilder,
    ) -> Result<Supplier, ApiError> {
        let (status, text) = self.execute(method, url, builder).await?;
        if !status.is_success() {
            return Err(self.remote_error(status, &text));
        }
        self.decode_record(status, &text)
    }

    async fn fetch_records(&self, url: &str) -> Result<Vec<Supplier>, ApiError> {
        let builder = self.request(Method::GET, url);
        let (status, text) = self.execute(Method::GET, url, builder).await?;
        if !status.is_success() {
            return Err(self.remote_error(status, &text));
        }
        self.decode_records(status, &text)
    }
}

#[async_trait]
impl SupplierApi for SupplierClient {
    async fn create(&self, record: &NewSupplier) -> Result<Supplier, ApiError> {
        let url = self.base_url.clone();
        let builder = self.request(Method::POST, &url).json(record);
        self.fetch_record(Method::POST, &url, builder).await
    }

    async fn update(&self, id: &SupplierId, record: &NewSupplier) -> Result<Supplier, ApiError> {
        let url = self.record_url(id);
        let builder = self.request(Method::PUT, &url).json(record);
        self.fetch_record(Method::PUT, &url, builder).await
    }

    async fn retrieve(&self, id: &SupplierId) -> Result<Supplier, ApiError> {
        let url = self.record_url(id);
        let builder = self.request(Method::GET, &url);
        self.fetch_record(Method::GET, &url, builder).await
    }

    async fn delete(&self, id: &SupplierId) -> Result<(), ApiError> {
        let url = self.record_url(id);
        let builder = self.request(Method::DELETE, &url);
        let (status, text) = self.execute(Method::DELETE, &url, builder).await?;
        if !status.is_success() {
            return Err(self.remote_error(status, &text));
        }
        Ok(())
    }

    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Supplier>, ApiError> {
        self.fetch_records(&self.collection_url(criteria)).await
    }

    async fn list(&self) -> Result<Vec<Supplier>, ApiError> {
        let url = self.base_url.clone();
        self.fetch_records(&url).await
    }

    async fn add_products(&self, id: &SupplierId, products: &[ProductId]) -> Result<Supplier, ApiError> {
        let url = self.products_url(id);
        let patch = ProductsPatch {
            products: products.to_vec(),
        };
        let builder = self.request(Method::POST, &url).json(&patch);
        self.fetch_record(Method::POST, &url, builder).await
    }
}
