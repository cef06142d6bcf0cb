use log::{debug, trace};

use crate::executor::{AsyncExecutor, Executor};
use crate::{Config, OAuthParameters, RequestSpec, Result, Secrets, SignedRequest, Signer};

/// Turns a reqwest client into a signing [`Client`].
pub trait OAuthClientProvider {
    /// # Errors
    ///
    /// Fails with [`Error::Configuration`](crate::Error::Configuration) when
    /// any credential is empty.
    fn oauth1(self, secrets: Secrets<'_>) -> Result<Client<Self>>
    where
        Self: Sized,
    {
        self.oauth1_with_params(secrets, OAuthParameters::new())
    }

    fn oauth1_with_params(
        self,
        secrets: Secrets<'_>,
        parameters: OAuthParameters,
    ) -> Result<Client<Self>>
    where
        Self: Sized,
    {
        Ok(Client::with_executor(secrets, self)?.parameters(parameters))
    }
}

#[cfg(feature = "blocking")]
impl OAuthClientProvider for reqwest::blocking::Client {}

impl OAuthClientProvider for reqwest::Client {}

/// Holds the credentials and the transport used to send signed requests.
///
/// One client signs any number of independent requests; each signing pass
/// draws a fresh nonce and timestamp.
#[derive(Debug, Clone)]
pub struct Client<E> {
    executor: E,
    secrets: Secrets<'static>,
    parameters: OAuthParameters,
}

#[cfg(feature = "blocking")]
impl Client<reqwest::blocking::Client> {
    /// Constructs a new blocking `Client` from `config`.
    ///
    /// # Errors
    ///
    /// Fails with a configuration error if a credential is missing and with
    /// an environment error if the HTTP client cannot be initialized.
    pub fn new(config: &Config) -> Result<Self> {
        let secrets = config.secrets()?;
        let executor = crate::executor::blocking_client(config)?;
        Ok(Client::with_executor(secrets, executor)?.parameters(parameters_from(config)))
    }
}

impl Client<reqwest::Client> {
    /// Constructs a new async `Client` from `config`.
    ///
    /// # Errors
    ///
    /// Same as [`Client::new`].
    pub fn new_async(config: &Config) -> Result<Self> {
        let secrets = config.secrets()?;
        let executor = crate::executor::async_client(config)?;
        Ok(Client::with_executor(secrets, executor)?.parameters(parameters_from(config)))
    }
}

fn parameters_from(config: &Config) -> OAuthParameters {
    OAuthParameters::new().nonce_strategy(config.nonce)
}

impl<E> Client<E> {
    /// Constructs a new `Client` sending through `executor`.
    pub fn with_executor(secrets: Secrets<'_>, executor: E) -> Result<Self> {
        secrets.validate()?;
        Ok(Client {
            executor,
            secrets: secrets.into_owned(),
            parameters: OAuthParameters::new(),
        })
    }

    /// Replace the OAuth parameter settings, e.g. to pin nonce and timestamp.
    pub fn parameters(self, parameters: OAuthParameters) -> Self {
        Client { parameters, ..self }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Start building a request with the given method and URL.
    ///
    /// # Errors
    ///
    /// Fails with a usage error for a method other than GET, POST, PUT or
    /// DELETE, or for an unparsable URL.
    pub fn request(&self, method: &str, url: &str) -> Result<RequestSpec> {
        RequestSpec::new(method, url)
    }

    /// Convenience method to make a `GET` request to a URL.
    pub fn get(&self, url: &str) -> Result<RequestSpec> {
        self.request("GET", url)
    }

    /// Convenience method to make a `POST` request to a URL.
    pub fn post(&self, url: &str) -> Result<RequestSpec> {
        self.request("POST", url)
    }

    /// Convenience method to make a `PUT` request to a URL.
    pub fn put(&self, url: &str) -> Result<RequestSpec> {
        self.request("PUT", url)
    }

    /// Convenience method to make a `DELETE` request to a URL.
    pub fn delete(&self, url: &str) -> Result<RequestSpec> {
        self.request("DELETE", url)
    }

    /// Generate the OAuth signature for `spec`.
    pub fn sign(&self, spec: &RequestSpec) -> SignedRequest {
        Signer::new(&self.secrets, &self.parameters).sign(spec)
    }

    fn prepare(&self, spec: &RequestSpec) -> Result<http::Request<Vec<u8>>> {
        let signed = self.sign(spec);
        debug!("sending {} {}", signed.method(), signed.url());
        if let Some(body) = signed.body() {
            trace!("request body: {}", body);
        }
        signed.into_http()
    }
}

impl<E> Client<E>
where
    E: Executor,
{
    /// Sign `spec`, send it and return the response, whatever its status.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Transport`](crate::Error::Transport) when the
    /// request cannot be completed. No retry is attempted.
    pub fn execute(&self, spec: &RequestSpec) -> Result<http::Response<Vec<u8>>> {
        let request = self.prepare(spec)?;
        let response = self.executor.send(request)?;
        debug!("response status: {}", response.status());
        Ok(response)
    }
}

impl<E> Client<E>
where
    E: AsyncExecutor,
{
    /// Async counterpart of [`Client::execute`].
    pub async fn execute_async(&self, spec: &RequestSpec) -> Result<http::Response<Vec<u8>>> {
        let request = self.prepare(spec)?;
        let response = self.executor.send(request).await?;
        debug!("response status: {}", response.status());
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use http::header::AUTHORIZATION;
    use http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::{Error, UsageError};

    const ENDPOINT: &str = "https://api.example.com/1.1/statuses/update.json";

    /// Records requests and answers each one with `status`.
    #[derive(Debug)]
    struct Recorder {
        status: StatusCode,
        sent: RefCell<Vec<http::Request<Vec<u8>>>>,
    }

    impl Recorder {
        fn new(status: StatusCode) -> Self {
            Recorder {
                status,
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    impl Executor for Recorder {
        fn send(&self, request: http::Request<Vec<u8>>) -> Result<http::Response<Vec<u8>>> {
            self.sent.borrow_mut().push(request);
            let mut response = http::Response::new(b"{\"id\":1}".to_vec());
            *response.status_mut() = self.status;
            Ok(response)
        }
    }

    /// Fails every request as a refused connection would.
    struct Refused;

    impl Executor for Refused {
        fn send(&self, _: http::Request<Vec<u8>>) -> Result<http::Response<Vec<u8>>> {
            Err(Error::Transport("connection refused".to_string()))
        }
    }

    fn secrets() -> Secrets<'static> {
        Secrets::new("ck", "cs").token("at", "ats")
    }

    fn pinned() -> OAuthParameters {
        OAuthParameters::new().nonce("1").timestamp(1_000_000_000u64)
    }

    #[test]
    fn executes_signed_body_request() {
        let client = Client::with_executor(secrets(), Recorder::new(StatusCode::OK))
            .unwrap()
            .parameters(pinned());
        let spec = client
            .post(ENDPOINT)
            .unwrap()
            .body(&json!({"status": "@alice hello"}))
            .unwrap();

        let response = client.execute(&spec).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_slice(), b"{\"id\":1}");

        let sent = client.executor().sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method(), &http::Method::POST);
        assert_eq!(sent[0].uri().to_string(), ENDPOINT);
        assert!(sent[0].headers()[AUTHORIZATION]
            .to_str()
            .unwrap()
            .contains("oauth_signature=\"D0d9fewVsMWYALCWyxGIy%2F0PmjQ%3D\""));
        assert_eq!(
            sent[0].body().as_slice(),
            br#"{"status":"\u0000@alice hello"}"#
        );
    }

    #[test]
    fn non_success_status_is_returned() {
        let client =
            Client::with_executor(secrets(), Recorder::new(StatusCode::UNAUTHORIZED)).unwrap();
        let spec = client
            .get("https://api.example.com/1.1/users/show.json")
            .unwrap()
            .query(&[("screen_name", "alice")])
            .unwrap();

        let response = client.execute(&spec).unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let sent = client.executor().sent.borrow();
        assert_eq!(
            sent[0].uri().to_string(),
            "https://api.example.com/1.1/users/show.json?screen_name=alice"
        );
        assert!(sent[0].body().is_empty());
    }

    #[test]
    fn client_is_reusable() {
        let client = Client::with_executor(secrets(), Recorder::new(StatusCode::OK)).unwrap();
        for url in &[ENDPOINT, "https://api.example.com/1.1/statuses/destroy/1.json"] {
            let spec = client.delete(url).unwrap();
            client.execute(&spec).unwrap();
        }
        let sent = client.executor().sent.borrow();
        assert_eq!(sent.len(), 2);
        assert_ne!(
            sent[0].headers()[AUTHORIZATION],
            sent[1].headers()[AUTHORIZATION]
        );
    }

    #[test]
    fn unsupported_method_never_reaches_the_executor() {
        let client = Client::with_executor(secrets(), Recorder::new(StatusCode::OK)).unwrap();
        match client.request("PATCH", ENDPOINT) {
            Err(Error::Usage(UsageError::UnsupportedMethod(method))) => assert_eq!(method, "PATCH"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(client.executor().sent.borrow().is_empty());
    }

    #[test]
    fn reqwest_client_becomes_signing_client() {
        let client = reqwest::Client::new()
            .oauth1_with_params(secrets(), pinned())
            .unwrap();
        let spec = client.post(ENDPOINT).unwrap();
        assert!(client
            .sign(&spec)
            .authorization()
            .contains("oauth_signature=\"D0d9fewVsMWYALCWyxGIy%2F0PmjQ%3D\""));
    }

    #[test]
    fn transport_failure_is_surfaced() {
        let client = Client::with_executor(secrets(), Refused).unwrap();
        let spec = client.put(ENDPOINT).unwrap();
        match client.execute(&spec) {
            Err(Error::Transport(msg)) => assert_eq!(msg, "connection refused"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn empty_credentials_fail_construction() {
        let secrets = Secrets::new("ck", "cs").token("", "ats");
        match Client::with_executor(secrets, Recorder::new(StatusCode::OK)) {
            Err(Error::Configuration(msg)) => assert!(msg.contains("access_token")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[cfg(feature = "blocking")]
    #[test]
    fn new_requires_complete_config() {
        let config = Config {
            consumer_key: Some("ck".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            Client::new(&config),
            Err(Error::Configuration(_))
        ));
    }

    #[cfg(feature = "blocking")]
    #[test]
    fn new_against_closed_port() {
        let config = Config {
            consumer_key: Some("ck".to_string()),
            consumer_secret: Some("cs".to_string()),
            access_token: Some("at".to_string()),
            access_token_secret: Some("ats".to_string()),
            timeout: Some(2),
            ..Default::default()
        };
        let client = Client::new(&config).unwrap();
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let spec = client
            .get(&format!("http://127.0.0.1:{}/1.1/statuses/home_timeline.json", port))
            .unwrap();
        assert!(matches!(client.execute(&spec), Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn async_client_signs_and_fails_transport() {
        let config = Config {
            consumer_key: Some("ck".to_string()),
            consumer_secret: Some("cs".to_string()),
            access_token: Some("at".to_string()),
            access_token_secret: Some("ats".to_string()),
            ..Default::default()
        };
        let client = Client::new_async(&config).unwrap();
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let spec = client
            .post(&format!("http://127.0.0.1:{}/1.1/statuses/update.json", port))
            .unwrap()
            .body(&json!({"status": "hello"}))
            .unwrap();
        assert!(matches!(
            client.execute_async(&spec).await,
            Err(Error::Transport(_))
        ));
    }
}
