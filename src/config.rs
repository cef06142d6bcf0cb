use std::env;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::{Error, Result, Secrets};

/// Env value used when `consumer_key` is not set.
pub const OAUTH1_CONSUMER_KEY: &str = "OAUTH1_CONSUMER_KEY";
/// Env value used when `consumer_secret` is not set.
pub const OAUTH1_CONSUMER_SECRET: &str = "OAUTH1_CONSUMER_SECRET";
/// Env value used when `access_token` is not set.
pub const OAUTH1_ACCESS_TOKEN: &str = "OAUTH1_ACCESS_TOKEN";
/// Env value used when `access_token_secret` is not set.
pub const OAUTH1_ACCESS_TOKEN_SECRET: &str = "OAUTH1_ACCESS_TOKEN_SECRET";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// How `oauth_nonce` is produced for each signing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonceStrategy {
    /// 32 random alphanumeric characters.
    Random,
    /// The current Unix timestamp, identical to `oauth_timestamp`.
    ///
    /// Two requests signed within the same second share a nonce.
    Timestamp,
}

impl Default for NonceStrategy {
    fn default() -> Self {
        NonceStrategy::Random
    }
}

/// Settings a [`Client`](crate::Client) is constructed from.
///
/// Deserializable from any serde format; every field is optional so that a
/// missing credential is reported by [`Config::secrets`] rather than by the
/// deserializer.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `consumer_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`OAUTH1_CONSUMER_KEY`]
    pub consumer_key: Option<String>,
    /// `consumer_secret` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`OAUTH1_CONSUMER_SECRET`]
    pub consumer_secret: Option<String>,
    /// `access_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`OAUTH1_ACCESS_TOKEN`]
    #[serde(alias = "oauth_access_token")]
    pub access_token: Option<String>,
    /// `access_token_secret` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`OAUTH1_ACCESS_TOKEN_SECRET`]
    #[serde(alias = "oauth_access_token_secret")]
    pub access_token_secret: Option<String>,
    /// Request timeout in seconds, 10 when unset.
    pub timeout: Option<u64>,
    /// Skip TLS certificate and hostname verification.
    ///
    /// Only meant for talking to test servers with self-signed certificates.
    pub accept_invalid_certs: bool,
    pub nonce: NonceStrategy,
}

impl Config {
    /// Fill the unset credential fields from the environment.
    pub fn from_env(mut self) -> Self {
        let load = |field: &mut Option<String>, key: &str| {
            if field.is_none() {
                *field = env::var(key).ok();
            }
        };
        load(&mut self.consumer_key, OAUTH1_CONSUMER_KEY);
        load(&mut self.consumer_secret, OAUTH1_CONSUMER_SECRET);
        load(&mut self.access_token, OAUTH1_ACCESS_TOKEN);
        load(&mut self.access_token_secret, OAUTH1_ACCESS_TOKEN_SECRET);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Build the credential set, failing if any of the four values is absent
    /// or empty.
    pub fn secrets(&self) -> Result<Secrets<'static>> {
        let consumer_key = required(&self.consumer_key, "consumer_key")?;
        let consumer_secret = required(&self.consumer_secret, "consumer_secret")?;
        let access_token = required(&self.access_token, "access_token")?;
        let access_token_secret = required(&self.access_token_secret, "access_token_secret")?;

        let secrets =
            Secrets::new(consumer_key, consumer_secret).token(access_token, access_token_secret);
        secrets.validate()?;
        Ok(secrets)
    }
}

fn required(value: &Option<String>, name: &str) -> Result<String> {
    value
        .clone()
        .ok_or_else(|| Error::Configuration(format!("credential {} is not set", name)))
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "***");
        f.debug_struct("Config")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &redact(&self.consumer_secret))
            .field("access_token", &redact(&self.access_token))
            .field("access_token_secret", &redact(&self.access_token_secret))
            .field("timeout", &self.timeout)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("nonce", &self.nonce)
            .finish()
    }
}
