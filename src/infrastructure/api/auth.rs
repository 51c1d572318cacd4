#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use super::decode;
use crate::domain::models::ClientError;
use crate::domain::models::Credential;
use crate::domain::models::LoginRequest;
use crate::domain::models::RegisterRequest;
use crate::domain::models::RequestSpec;
use crate::domain::models::TokenResponse;
use crate::domain::models::User;
use crate::infrastructure::gateway::Gateway;

pub struct AuthApi {
    gateway: Arc<Gateway>,
    timeout: Option<Duration>,
}

impl AuthApi {
    pub fn new(gateway: Arc<Gateway>, timeout: Option<Duration>) -> AuthApi {
        return AuthApi { gateway, timeout };
    }

    /// Exchanges a username and password for a token pair and keeps it.
    pub async fn login(&self, username: &str, password: &str) -> Result<Credential, ClientError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ClientError::Validation(
                "username and password are required".to_string(),
            ));
        }

        let spec = RequestSpec::post("/auth/login")
            .anonymous()
            .timeout(self.timeout)
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })?;

        let res = self.gateway.execute(&spec).await?;
        let credential = Credential::from(decode::<TokenResponse>(res).await?);
        self.gateway.credentials().replace(credential.clone());
        tracing::info!(username = username, "Logged in");

        return Ok(credential);
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<User, ClientError> {
        if req.username.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty()
        {
            return Err(ClientError::Validation(
                "username, email and password are required".to_string(),
            ));
        }

        let spec = RequestSpec::post("/auth/register")
            .anonymous()
            .timeout(self.timeout)
            .json(req)?;

        let res = self.gateway.execute(&spec).await?;
        return decode::<User>(res).await;
    }

    pub async fn current_user(&self) -> Result<User, ClientError> {
        let spec = RequestSpec::get("/users/me").timeout(self.timeout);
        let res = self.gateway.execute(&spec).await?;

        return decode::<User>(res).await;
    }

    pub fn logout(&self) {
        self.gateway.credentials().clear();
        tracing::info!("Logged out");
    }
}
