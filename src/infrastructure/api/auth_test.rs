use std::sync::Arc;

use anyhow::Result;
use mockito::Matcher;
use serde_json::json;

use super::AuthApi;
use crate::domain::models::ClientError;
use crate::domain::models::Credential;
use crate::domain::models::CredentialPersistence;
use crate::domain::models::RegisterRequest;
use crate::domain::services::CredentialStore;
use crate::infrastructure::gateway::Gateway;
use crate::infrastructure::persistence::MemoryCredentials;

fn auth_api(url: &str, persistence: &MemoryCredentials) -> AuthApi {
    let store = CredentialStore::load(Box::new(persistence.clone())).unwrap();
    let gateway = Gateway::new(url, Arc::new(store));

    return AuthApi::new(Arc::new(gateway), None);
}

#[tokio::test]
async fn it_logs_in_and_stores_credentials() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/login")
        .match_body(Matcher::Json(
            json!({"username": "ada", "password": "hunter2"}),
        ))
        .with_status(200)
        .with_body(
            json!({
                "access_token": "access",
                "refresh_token": "refresh",
                "token_type": "bearer"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let persistence = MemoryCredentials::default();
    let api = auth_api(&server.url(), &persistence);
    let credential = api.login("ada", "hunter2").await?;

    assert_eq!(credential, Credential::new("access", "refresh"));
    assert_eq!(persistence.load()?, Some(Credential::new("access", "refresh")));
    mock.assert_async().await;

    return Ok(());
}

#[tokio::test]
async fn it_reports_rejected_logins() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/login")
        .with_status(401)
        .with_body(r#"{"detail": "Incorrect username or password"}"#)
        .create_async()
        .await;

    let persistence = MemoryCredentials::default();
    let api = auth_api(&server.url(), &persistence);
    let res = api.login("ada", "wrong").await;

    assert_eq!(
        res.err(),
        Some(ClientError::Transport(
            "request failed with status 401: Incorrect username or password".to_string()
        ))
    );
    assert_eq!(persistence.load()?, None);
    mock.assert_async().await;

    return Ok(());
}

#[tokio::test]
async fn it_validates_login_input_before_any_request() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/login")
        .expect(0)
        .create_async()
        .await;

    let api = auth_api(&server.url(), &MemoryCredentials::default());
    let res = api.login("  ", "secret").await;

    assert!(matches!(res, Err(ClientError::Validation(_))));
    mock.assert_async().await;

    return Ok(());
}

#[tokio::test]
async fn it_registers_users() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/register")
        .match_body(Matcher::Json(json!({
            "username": "ada",
            "email": "ada@example.com",
            "password": "hunter2"
        })))
        .with_status(201)
        .with_body(
            json!({
                "id": "u1",
                "email": "ada@example.com",
                "username": "ada",
                "is_active": true,
                "created_at": "2024-05-01T10:00:00"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let api = auth_api(&server.url(), &MemoryCredentials::default());
    let user = api
        .register(&RegisterRequest {
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
            full_name: None,
        })
        .await?;

    assert_eq!(user.id, "u1");
    assert!(user.is_active);
    mock.assert_async().await;

    return Ok(());
}

#[tokio::test]
async fn it_fetches_the_current_user() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/users/me")
        .match_header("Authorization", "Bearer access")
        .with_status(200)
        .with_body(
            json!({
                "id": "u1",
                "email": "ada@example.com",
                "username": "ada",
                "full_name": "Ada Lovelace",
                "is_active": true,
                "created_at": "2024-05-01T10:00:00"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let persistence = MemoryCredentials::with(Credential::new("access", "refresh"));
    let api = auth_api(&server.url(), &persistence);
    let user = api.current_user().await?;

    assert_eq!(user.full_name, Some("Ada Lovelace".to_string()));
    mock.assert_async().await;

    return Ok(());
}

#[tokio::test]
async fn it_logs_out() -> Result<()> {
    let persistence = MemoryCredentials::with(Credential::new("access", "refresh"));
    let api = auth_api("http://localhost:1", &persistence);

    api.logout();

    assert_eq!(persistence.load()?, None);

    return Ok(());
}
