use thiserror::Error;

use crate::request::ParameterKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration : {0}")]
    Configuration(String),
    #[error("http client is not available : {0}")]
    Environment(String),
    #[error("invalid usage : {0}")]
    Usage(#[from] UsageError),
    #[error("request failed : {0}")]
    Transport(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("{attempted} parameters cannot be set while {existing} parameters are set")]
    ConflictingParameters {
        existing: ParameterKind,
        attempted: ParameterKind,
    },
    #[error("request method must be either GET, POST, PUT or DELETE, but {0} was given")]
    UnsupportedMethod(String),
    #[error("invalid url {0} : {1}")]
    InvalidUrl(String, String),
    #[error("query parameters could not be serialized : {0}")]
    InvalidQuery(String),
    #[error("body parameters must serialize into a JSON object : {0}")]
    InvalidBody(String),
    #[error("request could not be assembled : {0}")]
    InvalidRequest(String),
}
