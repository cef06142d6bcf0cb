use async_trait::async_trait;
use log::warn;

use crate::{Config, Error, Result};

/// Sends a signed request and hands back the raw response.
///
/// Non-2xx statuses are not errors here; only a request that never
/// completes is.
pub trait Executor {
    fn send(&self, request: http::Request<Vec<u8>>) -> Result<http::Response<Vec<u8>>>;
}

/// Async counterpart of [`Executor`].
#[async_trait]
pub trait AsyncExecutor {
    async fn send(&self, request: http::Request<Vec<u8>>) -> Result<http::Response<Vec<u8>>>;
}

#[cfg(feature = "blocking")]
impl Executor for reqwest::blocking::Client {
    fn send(&self, request: http::Request<Vec<u8>>) -> Result<http::Response<Vec<u8>>> {
        let (parts, body) = request.into_parts();
        let mut builder = self
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers);
        if !body.is_empty() {
            builder = builder.body(body);
        }

        let resp = builder.send()?;
        let mut response = http::Response::builder()
            .status(resp.status())
            .version(resp.version());
        if let Some(headers) = response.headers_mut() {
            *headers = resp.headers().clone();
        }
        let body = resp.bytes()?.to_vec();
        response
            .body(body)
            .map_err(|e| Error::Transport(e.to_string()))
    }
}

#[async_trait]
impl AsyncExecutor for reqwest::Client {
    async fn send(&self, request: http::Request<Vec<u8>>) -> Result<http::Response<Vec<u8>>> {
        let (parts, body) = request.into_parts();
        let mut builder = self
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers);
        if !body.is_empty() {
            builder = builder.body(body);
        }

        let resp = builder.send().await?;
        let mut response = http::Response::builder()
            .status(resp.status())
            .version(resp.version());
        if let Some(headers) = response.headers_mut() {
            *headers = resp.headers().clone();
        }
        let body = resp.bytes().await?.to_vec();
        response
            .body(body)
            .map_err(|e| Error::Transport(e.to_string()))
    }
}

fn warn_if_unverified(config: &Config) {
    if config.accept_invalid_certs {
        warn!("TLS certificate verification is disabled");
    }
}

/// Build a blocking reqwest client honouring the timeout and TLS policy of
/// `config`.
///
/// # Errors
///
/// Fails with [`Error::Environment`] when the TLS backend or the client
/// cannot be initialized.
#[cfg(feature = "blocking")]
pub fn blocking_client(config: &Config) -> Result<reqwest::blocking::Client> {
    warn_if_unverified(config);
    reqwest::blocking::Client::builder()
        .timeout(config.timeout())
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()
        .map_err(|e| Error::Environment(e.to_string()))
}

/// Build an async reqwest client honouring the timeout and TLS policy of
/// `config`.
pub fn async_client(config: &Config) -> Result<reqwest::Client> {
    warn_if_unverified(config);
    reqwest::Client::builder()
        .timeout(config.timeout())
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()
        .map_err(|e| Error::Environment(e.to_string()))
}
