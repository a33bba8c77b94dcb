use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::config::{Config, Credentials};
use crate::errors::{AppError, FetchError};

/// REST namespace that needs no credentials.
pub const GUEST_PREFIX: &str = "/guestAuth";
/// REST namespace that expects HTTP basic auth.
pub const AUTH_PREFIX: &str = "/httpAuth";

/// A source of JSON documents addressed by TeamCity REST paths.
///
/// Paths either start with `/app/rest/...` or already carry one of the access prefixes
/// (`href` values returned by the server do).
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn get_json(&self, path: &str) -> Result<serde_json::Value, FetchError>;
}

/// Fetches `path` and decodes it into `T`.
pub async fn fetch_json<T, U>(upstream: &U, path: &str) -> Result<T, FetchError>
where
    T: DeserializeOwned,
    U: Upstream + ?Sized,
{
    let value = upstream.get_json(path).await?;
    Ok(serde_json::from_value(value)?)
}

#[derive(Debug, Clone)]
pub struct TeamCityClient {
    http_client: reqwest::Client,
    base: String,
    credentials: Option<Credentials>,
}

impl TeamCityClient {
    pub fn new(
        base: &str,
        credentials: Option<Credentials>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(AppError::Client)?;

        Ok(Self {
            http_client,
            base: base.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            config.base(),
            config.credentials()?,
            config.upstream_timeout(),
        )
    }

    /// Access prefix to put in front of `path`; empty when the path already names one.
    pub fn auth_prefix(&self, path: &str) -> &'static str {
        if path.starts_with(GUEST_PREFIX) || path.starts_with(AUTH_PREFIX) {
            ""
        } else if self.credentials.is_some() {
            AUTH_PREFIX
        } else {
            GUEST_PREFIX
        }
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}{}", self.base, self.auth_prefix(path), path)
    }
}

#[async_trait]
impl Upstream for TeamCityClient {
    async fn get_json(&self, path: &str) -> Result<serde_json::Value, FetchError> {
        let url = self.url_for(path);
        tracing::debug!(url = %url, "Fetching from TeamCity");

        let mut request = self.http_client.get(&url);
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.user, Some(&creds.password));
        }

        let response = request.send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
