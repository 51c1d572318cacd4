use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The access token was rejected. Only seen inside the gateway.
    #[error("access token expired")]
    AuthExpired,

    #[error("session ended, log in again to continue")]
    SessionEnded,

    #[error("transport error: {0}")]
    Transport(String),

    /// Reason reported by the backend on the stream.
    #[error("{0}")]
    Stream(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("a message is already being streamed")]
    SessionActive,

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> ClientError {
        if err.is_decode() {
            return ClientError::Decode(err.to_string());
        }

        return ClientError::Transport(err.to_string());
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> ClientError {
        return ClientError::Decode(err.to_string());
    }
}
