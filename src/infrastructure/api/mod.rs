mod auth;
mod chats;
mod models;

pub use auth::*;
pub use chats::*;
pub use models::*;

use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::domain::models::ClientError;

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    detail: serde_json::Value,
}

/// Turns a non-success status into a transport error carrying the server's
/// `detail`, when it sent one.
pub async fn ensure_success(res: Response) -> Result<Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.unwrap_or_default();
    let detail = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(err) => match err.detail {
            serde_json::Value::String(detail) => detail,
            other => other.to_string(),
        },
        Err(_) => body.trim().to_string(),
    };

    tracing::warn!(status = status.as_u16(), detail = %detail, "Request failed");

    if detail.is_empty() {
        return Err(ClientError::Transport(format!(
            "request failed with status {}",
            status.as_u16()
        )));
    }

    return Err(ClientError::Transport(format!(
        "request failed with status {}: {detail}",
        status.as_u16()
    )));
}

pub async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let res = ensure_success(res).await?;
    let text = res.text().await?;

    return Ok(serde_json::from_str::<T>(&text)?);
}
