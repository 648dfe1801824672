use thiserror::Error;

/// Failure kinds of the weather/location provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("api key rejected: {0}")]
    ApiKey(String),
    #[error("invalid parameter: {0}")]
    Param(String),
    #[error("unrecognized response: {0}")]
    UnknownResponse(String),
}
