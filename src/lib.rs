/*!
oauth1-exchange: send OAuth 1.0a signed requests to a social-media REST API.

# Overview

This library holds one set of already-issued OAuth 1.0a credentials, signs
each outgoing request with HMAC-SHA1 and sends it through
[reqwest](https://crates.io/crates/reqwest). The response body is handed back
untouched together with its status code.

Only the protocol parameters (`oauth_consumer_key`, `oauth_nonce`,
`oauth_signature_method`, `oauth_timestamp`, `oauth_token`, `oauth_version`)
are signed. A request carries either query parameters or a JSON body, never
both.

# How to use

## Posting a status

```no_run
use oauth1_exchange::{Client, Config};
use serde_json::json;

# fn main() -> Result<(), oauth1_exchange::Error> {
let config = Config {
    consumer_key: Some("[CONSUMER_KEY]".to_string()),
    consumer_secret: Some("[CONSUMER_SECRET]".to_string()),
    access_token: Some("[ACCESS_TOKEN]".to_string()),
    access_token_secret: Some("[ACCESS_TOKEN_SECRET]".to_string()),
    ..Default::default()
};
let client = Client::new(&config)?;

let spec = client
    .post("https://api.twitter.com/1.1/statuses/update.json")?
    .body(&json!({ "status": "Hello, Twitter!", "trim_user": true }))?;
let resp = client.execute(&spec)?;
println!("{} {}", resp.status(), String::from_utf8_lossy(resp.body()));
# Ok(())
# }
```

## Reading a timeline

```no_run
use oauth1_exchange::{Config, OAuthClientProvider, Secrets};

# fn main() -> Result<(), oauth1_exchange::Error> {
let secrets = Secrets::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]")
    .token("[ACCESS_TOKEN]", "[ACCESS_TOKEN_SECRET]");
let client = oauth1_exchange::blocking_client(&Config::default())?.oauth1(secrets)?;

let spec = client
    .get("https://api.twitter.com/1.1/statuses/user_timeline.json")?
    .query_string("?screen_name=twitterapi&count=2")?;
let resp = client.execute(&spec)?;
# Ok(())
# }
```
*/
mod client;
mod config;
mod error;
mod executor;
mod request;
mod secrets;
mod signer;

// exposed to external program
pub use client::{Client, OAuthClientProvider};
pub use config::{
    Config, NonceStrategy, OAUTH1_ACCESS_TOKEN, OAUTH1_ACCESS_TOKEN_SECRET, OAUTH1_CONSUMER_KEY,
    OAUTH1_CONSUMER_SECRET,
};
pub use error::{Error, Result, UsageError};
#[cfg(feature = "blocking")]
pub use executor::blocking_client;
pub use executor::{async_client, AsyncExecutor, Executor};
pub use request::{ParameterKind, Parameters, RequestSpec};
pub use secrets::{Secrets, SecretsProvider};
pub use signer::{percent_encode, OAuthParameters, SignedRequest, Signer};

// exposed constant variables
/// Represents `oauth_consumer_key`.
pub const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
/// Represents `oauth_nonce`.
pub const OAUTH_NONCE_KEY: &str = "oauth_nonce";
/// Represents `oauth_signature`.
pub const OAUTH_SIGNATURE_KEY: &str = "oauth_signature";
/// Represents `oauth_signature_method`.
pub const OAUTH_SIGNATURE_METHOD_KEY: &str = "oauth_signature_method";
/// Represents `oauth_timestamp`.
pub const OAUTH_TIMESTAMP_KEY: &str = "oauth_timestamp";
/// Represents `oauth_token`.
pub const OAUTH_TOKEN_KEY: &str = "oauth_token";
/// Represents `oauth_version`.
pub const OAUTH_VERSION_KEY: &str = "oauth_version";
