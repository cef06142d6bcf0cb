use std::borrow::Cow;
use std::fmt;

use crate::{Error, Result};

/// Supplies the consumer and access-token pairs a request is signed with.
pub trait SecretsProvider {
    fn get_consumer_key_pair<'a>(&'a self) -> (&'a str, &'a str);

    fn get_token_pair<'a>(&'a self) -> (&'a str, &'a str);
}

/// Credentials issued by the remote service.
///
/// Built in two steps: the consumer pair first, then the access-token pair.
/// Only the complete form can sign requests.
///
/// ```
/// use oauth1_exchange::Secrets;
///
/// let secrets = Secrets::new("consumer-key", "consumer-secret")
///     .token("access-token", "access-token-secret");
/// ```
#[derive(Clone)]
pub struct Secrets<'a, T = Cow<'a, str>> {
    token: T,
    token_secret: T,
    consumer_key: Cow<'a, str>,
    consumer_secret: Cow<'a, str>,
}

impl<'a> Secrets<'a, ()> {
    pub fn new<TKey, TSecret>(consumer_key: TKey, consumer_secret: TSecret) -> Self
    where
        TKey: Into<Cow<'a, str>>,
        TSecret: Into<Cow<'a, str>>,
    {
        Secrets {
            token: (),
            token_secret: (),
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
        }
    }

    pub fn token<TKey, TSecret>(self, token: TKey, token_secret: TSecret) -> Secrets<'a>
    where
        TKey: Into<Cow<'a, str>>,
        TSecret: Into<Cow<'a, str>>,
    {
        Secrets {
            token: token.into(),
            token_secret: token_secret.into(),
            consumer_key: self.consumer_key,
            consumer_secret: self.consumer_secret,
        }
    }
}

impl<'a> Secrets<'a> {
    /// Fails with a configuration error when any of the four values is empty.
    pub(crate) fn validate(&self) -> Result<()> {
        let fields = [
            ("consumer_key", &self.consumer_key),
            ("consumer_secret", &self.consumer_secret),
            ("access_token", &self.token),
            ("access_token_secret", &self.token_secret),
        ];
        match fields.iter().find(|(_, value)| value.is_empty()) {
            Some((name, _)) => Err(Error::Configuration(format!(
                "credential {} must not be empty",
                name
            ))),
            None => Ok(()),
        }
    }

    pub fn into_owned(self) -> Secrets<'static> {
        Secrets {
            token: Cow::Owned(self.token.into_owned()),
            token_secret: Cow::Owned(self.token_secret.into_owned()),
            consumer_key: Cow::Owned(self.consumer_key.into_owned()),
            consumer_secret: Cow::Owned(self.consumer_secret.into_owned()),
        }
    }
}

impl SecretsProvider for Secrets<'_> {
    fn get_consumer_key_pair<'a>(&'a self) -> (&'a str, &'a str) {
        (&self.consumer_key, &self.consumer_secret)
    }

    fn get_token_pair<'a>(&'a self) -> (&'a str, &'a str) {
        (&self.token, &self.token_secret)
    }
}

// secrets never reach logs
impl<T> fmt::Debug for Secrets<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"***")
            .field("token", &"***")
            .field("token_secret", &"***")
            .finish()
    }
}
