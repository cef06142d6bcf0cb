use std::collections::BTreeMap;

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use http::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, EXPECT};
use http::Method;
use log::trace;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;
use sha1::Sha1;
use url::Url;

use crate::config::NonceStrategy;
use crate::request::{Parameters, RequestSpec};
use crate::{
    Result, SecretsProvider, UsageError, OAUTH_CONSUMER_KEY, OAUTH_NONCE_KEY, OAUTH_SIGNATURE_KEY,
    OAUTH_SIGNATURE_METHOD_KEY, OAUTH_TIMESTAMP_KEY, OAUTH_TOKEN_KEY, OAUTH_VERSION_KEY,
};

/// Everything but the RFC 3986 unreserved characters.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const VERSION: &str = "1.0";
const NONCE_LEN: usize = 32;

// NOTE: header order is fixed, it is not the sorted base-string order
const HEADER_ORDER: [&str; 7] = [
    OAUTH_CONSUMER_KEY,
    OAUTH_NONCE_KEY,
    OAUTH_SIGNATURE_KEY,
    OAUTH_SIGNATURE_METHOD_KEY,
    OAUTH_TIMESTAMP_KEY,
    OAUTH_TOKEN_KEY,
    OAUTH_VERSION_KEY,
];

const APPLICATION_JSON: &str = "application/json";

/// Percent-encode `input` as RFC 3986 requires, with uppercase hex digits.
pub fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, OAUTH_ENCODE_SET).to_string()
}

/// Controls how `oauth_nonce` and `oauth_timestamp` are produced.
///
/// Both are generated fresh for every signing pass unless pinned here.
#[derive(Debug, Clone, Default)]
pub struct OAuthParameters {
    nonce: Option<String>,
    timestamp: Option<u64>,
    nonce_strategy: NonceStrategy,
}

impl OAuthParameters {
    pub fn new() -> Self {
        Default::default()
    }

    /// set the oauth_nonce value
    pub fn nonce<T>(self, nonce: T) -> Self
    where
        T: Into<String>,
    {
        OAuthParameters {
            nonce: Some(nonce.into()),
            ..self
        }
    }

    /// set the oauth_timestamp value
    pub fn timestamp<T>(self, timestamp: T) -> Self
    where
        T: Into<u64>,
    {
        OAuthParameters {
            timestamp: Some(timestamp.into()),
            ..self
        }
    }

    /// choose how an unpinned oauth_nonce is generated
    pub fn nonce_strategy(self, nonce_strategy: NonceStrategy) -> Self {
        OAuthParameters {
            nonce_strategy,
            ..self
        }
    }

    /// The six protocol parameters that enter the base string.
    fn build(&self, consumer_key: &str, token: &str) -> BTreeMap<&'static str, String> {
        let timestamp = match self.timestamp {
            Some(timestamp) => timestamp.to_string(),
            None => chrono::Utc::now().timestamp().to_string(),
        };
        let nonce = match (&self.nonce, self.nonce_strategy) {
            (Some(nonce), _) => nonce.clone(),
            (None, NonceStrategy::Timestamp) => timestamp.clone(),
            (None, NonceStrategy::Random) => random_nonce(),
        };

        let mut oauth = BTreeMap::new();
        oauth.insert(OAUTH_CONSUMER_KEY, consumer_key.to_string());
        oauth.insert(OAUTH_NONCE_KEY, nonce);
        oauth.insert(OAUTH_SIGNATURE_METHOD_KEY, SIGNATURE_METHOD.to_string());
        oauth.insert(OAUTH_TIMESTAMP_KEY, timestamp);
        oauth.insert(OAUTH_TOKEN_KEY, token.to_string());
        oauth.insert(OAUTH_VERSION_KEY, VERSION.to_string());
        oauth
    }
}

fn random_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

#[derive(Debug, Clone)]
pub struct Signer<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    secrets: &'a TSecretsProvider,
    parameters: &'a OAuthParameters,
}

impl<'a, TSecretsProvider> Signer<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    pub fn new(secrets: &'a TSecretsProvider, parameters: &'a OAuthParameters) -> Self {
        Signer {
            secrets,
            parameters,
        }
    }

    /// Sign `spec` and finalize its target.
    ///
    /// Only the protocol parameters are signed. Query and body parameters
    /// end up in the URL or the JSON body but never in the base string.
    pub fn sign(&self, spec: &RequestSpec) -> SignedRequest {
        let (consumer_key, consumer_secret) = self.secrets.get_consumer_key_pair();
        let (token, token_secret) = self.secrets.get_token_pair();

        let mut oauth = self.parameters.build(consumer_key, token);
        let base = base_string(spec.method(), spec.url(), &oauth);
        trace!("oauth base string: {}", base);

        let signature = hmac_sha1_base64(&signing_key(consumer_secret, token_secret), &base);
        oauth.insert(OAUTH_SIGNATURE_KEY, signature);

        let (url, body) = finalize_target(spec);
        SignedRequest {
            method: spec.method().clone(),
            url,
            authorization: authorization_header(&oauth),
            body,
        }
    }
}

/// `METHOD&encoded-url&encoded-sorted-params`.
fn base_string(method: &Method, url: &Url, oauth: &BTreeMap<&'static str, String>) -> String {
    let normalized = oauth
        .iter()
        .filter(|(key, _)| **key != OAUTH_SIGNATURE_KEY)
        .map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!(
        "{}&{}&{}",
        method.as_str(),
        percent_encode(url.as_str()),
        percent_encode(&normalized)
    )
}

fn signing_key(consumer_secret: &str, token_secret: &str) -> String {
    format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    )
}

fn hmac_sha1_base64(key: &str, content: &str) -> String {
    // SAFETY: HMAC's new_from_slice always returns Ok - it handles any key length
    let mut h = Hmac::<Sha1>::new_from_slice(key.as_bytes()).unwrap();
    h.update(content.as_bytes());

    BASE64_STANDARD.encode(h.finalize().into_bytes())
}

fn authorization_header(oauth: &BTreeMap<&'static str, String>) -> String {
    let values = HEADER_ORDER
        .iter()
        .filter_map(|key| {
            oauth
                .get(key)
                .map(|value| format!("{}=\"{}\"", key, percent_encode(value)))
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("OAuth {}", values)
}

fn finalize_target(spec: &RequestSpec) -> (Url, Option<String>) {
    let mut url = spec.url().clone();
    match spec.parameters() {
        Parameters::None => (url, None),
        Parameters::Query(pairs) => {
            if !pairs.is_empty() {
                url.query_pairs_mut().extend_pairs(pairs.iter());
            }
            (url, None)
        }
        Parameters::Body(fields) => (url, Some(Value::Object(fields.clone()).to_string())),
    }
}

/// A signed request, ready to be dispatched.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    method: Method,
    url: Url,
    authorization: String,
    body: Option<String>,
}

impl SignedRequest {
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The final URL, including the query string when query parameters are set.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The `Authorization` header value, starting with `OAuth `.
    pub fn authorization(&self) -> &str {
        &self.authorization
    }

    /// The JSON body when body parameters are set.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// `Authorization`, `Content-Type: application/json` and an empty `Expect`.
    pub fn headers(&self) -> Result<HeaderMap> {
        let authorization = HeaderValue::from_str(&self.authorization)
            .map_err(|e| UsageError::InvalidRequest(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        headers.insert(EXPECT, HeaderValue::from_static(""));
        Ok(headers)
    }

    pub fn into_http(self) -> Result<http::Request<Vec<u8>>> {
        let headers = self.headers()?;
        let body = self.body.map(String::into_bytes).unwrap_or_default();
        let mut request = http::Request::builder()
            .method(self.method)
            .uri(self.url.as_str())
            .body(body)
            .map_err(|e| UsageError::InvalidRequest(e.to_string()))?;
        *request.headers_mut() = headers;
        Ok(request)
    }
}
