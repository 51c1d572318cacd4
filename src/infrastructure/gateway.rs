#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;

use std::sync::Arc;

use reqwest::Response;
use reqwest::StatusCode;
use tokio::sync::broadcast;

use crate::domain::models::ClientError;
use crate::domain::models::Credential;
use crate::domain::models::RefreshRequest;
use crate::domain::models::RequestSpec;
use crate::domain::models::TokenResponse;
use crate::domain::services::CredentialStore;
use crate::domain::services::SingleFlight;

/// Routes every outbound call, attaching the bearer token and repairing it
/// once through the refresh endpoint when the backend rejects it.
pub struct Gateway {
    client: reqwest::Client,
    api_url: String,
    credentials: Arc<CredentialStore>,
    refresh_flight: SingleFlight<(), Result<Credential, ClientError>>,
    session_ended: broadcast::Sender<()>,
}

impl Gateway {
    pub fn new(api_url: &str, credentials: Arc<CredentialStore>) -> Gateway {
        let (session_ended, _) = broadcast::channel(4);

        return Gateway {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            credentials,
            refresh_flight: SingleFlight::default(),
            session_ended,
        };
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        return &self.credentials;
    }

    /// Fires whenever credentials are dropped because they could not be
    /// repaired. The application should send the user back to login.
    pub fn subscribe_session_ended(&self) -> broadcast::Receiver<()> {
        return self.session_ended.subscribe();
    }

    pub fn url(&self, path: &str) -> String {
        return format!("{url}{path}", url = self.api_url);
    }

    pub async fn execute(&self, spec: &RequestSpec) -> Result<Response, ClientError> {
        let token = match spec.authenticated {
            true => self.credentials.access_token(),
            false => None,
        };

        match self.attempt(spec, token.as_deref()).await {
            Err(ClientError::AuthExpired) => {}
            res => return res,
        }

        tracing::debug!(path = %spec.path, "Access token rejected, refreshing");
        let credential = match self.refresh(token).await {
            Ok(credential) => credential,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to refresh credentials");
                return Err(self.end_session());
            }
        };

        match self.attempt(spec, Some(&credential.access_token)).await {
            Err(ClientError::AuthExpired) => {
                tracing::error!(path = %spec.path, "Refreshed access token was rejected");
                return Err(self.end_session());
            }
            res => return res,
        }
    }

    async fn attempt(&self, spec: &RequestSpec, token: Option<&str>) -> Result<Response, ClientError> {
        let mut req = self
            .client
            .request(spec.method.clone(), self.url(&spec.path));

        if !spec.query.is_empty() {
            req = req.query(&spec.query);
        }
        if let Some(body) = &spec.body {
            req = req.json(body);
        }
        if let Some(timeout) = spec.timeout {
            req = req.timeout(timeout);
        }
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }

        let res = req.send().await?;
        tracing::debug!(
            method = %spec.method,
            path = %spec.path,
            status = res.status().as_u16(),
            "Request completed"
        );

        if spec.authenticated && res.status() == StatusCode::UNAUTHORIZED {
            return Err(ClientError::AuthExpired);
        }

        return Ok(res);
    }

    /// Returns a credential newer than `failed_token`. Callers racing on the
    /// same rejection share one refresh call; a caller arriving after that
    /// refresh landed reuses its result.
    async fn refresh(&self, failed_token: Option<String>) -> Result<Credential, ClientError> {
        let current = match self.credentials.current() {
            Some(current) => current,
            None => return Err(ClientError::SessionEnded),
        };

        if failed_token.as_deref() != Some(current.access_token.as_str()) {
            return Ok(current);
        }

        let client = self.client.clone();
        let url = self.url("/auth/refresh");
        let credentials = self.credentials.clone();

        return self
            .refresh_flight
            .run((), move || {
                return Gateway::refresh_once(client, url, credentials, failed_token);
            })
            .await;
    }

    /// Body of the shared refresh. The credential may have been replaced
    /// between a caller's check and joining the flight, so it is checked again.
    async fn refresh_once(
        client: reqwest::Client,
        url: String,
        credentials: Arc<CredentialStore>,
        failed_token: Option<String>,
    ) -> Result<Credential, ClientError> {
        let current = match credentials.current() {
            Some(current) => current,
            None => return Err(ClientError::SessionEnded),
        };

        if failed_token.as_deref() != Some(current.access_token.as_str()) {
            tracing::debug!("Credentials already refreshed");
            return Ok(current);
        }

        let res = client
            .post(url)
            .json(&RefreshRequest {
                refresh_token: current.refresh_token,
            })
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(ClientError::Transport(format!(
                "refresh rejected with status {}",
                res.status().as_u16()
            )));
        }

        let credential = Credential::from(res.json::<TokenResponse>().await?);
        credentials.replace(credential.clone());
        tracing::info!("Refreshed credentials");

        return Ok(credential);
    }

    fn end_session(&self) -> ClientError {
        self.credentials.clear();
        let _ = self.session_ended.send(());

        return ClientError::SessionEnded;
    }
}
