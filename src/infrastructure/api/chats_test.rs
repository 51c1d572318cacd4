use std::sync::Arc;

use anyhow::Result;
use mockito::Matcher;
use serde_json::json;
use test_utils::conversation_json;
use test_utils::message_page_json;

use super::ChatsApi;
use crate::domain::models::ClientError;
use crate::domain::models::ConversationSource;
use crate::domain::models::ConversationUpdate;
use crate::domain::models::Credential;
use crate::domain::models::NewConversation;
use crate::domain::services::CredentialStore;
use crate::infrastructure::gateway::Gateway;
use crate::infrastructure::persistence::MemoryCredentials;

fn chats_api(url: &str) -> ChatsApi {
    let persistence = MemoryCredentials::with(Credential::new("access", "refresh"));
    let store = CredentialStore::load(Box::new(persistence)).unwrap();
    let gateway = Gateway::new(url, Arc::new(store));

    return ChatsApi::new(Arc::new(gateway), None);
}

#[tokio::test]
async fn it_creates_chats() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chats")
        .match_header("Authorization", "Bearer access")
        .match_body(Matcher::Json(json!({"title": "Greetings"})))
        .with_status(201)
        .with_body(conversation_json("c1", "Greetings"))
        .create_async()
        .await;

    let api = chats_api(&server.url());
    let chat = api
        .create_chat(&NewConversation {
            title: "Greetings".to_string(),
            ..NewConversation::default()
        })
        .await?;

    assert_eq!(chat.id, "c1");
    assert_eq!(chat.title, "Greetings");
    mock.assert_async().await;

    return Ok(());
}

#[tokio::test]
async fn it_lists_chats_with_pagination() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let body = format!(
        r#"{{"items": [{}], "total": 1, "page": 2, "page_size": 5, "total_pages": 1}}"#,
        conversation_json("c1", "Greetings")
    );
    let mock = server
        .mock("GET", "/chats")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".to_string(), "2".to_string()),
            Matcher::UrlEncoded("page_size".to_string(), "5".to_string()),
        ]))
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let api = chats_api(&server.url());
    let page = api.fetch_conversations(2, 5).await?;

    assert_eq!(page.total, 1);
    assert_eq!(page.page, 2);
    assert_eq!(page.items[0].id, "c1");
    mock.assert_async().await;

    return Ok(());
}

#[tokio::test]
async fn it_gets_renames_and_deletes_chats() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let get_mock = server
        .mock("GET", "/chats/c1")
        .with_status(200)
        .with_body(conversation_json("c1", "Greetings"))
        .create_async()
        .await;
    let update_mock = server
        .mock("PUT", "/chats/c1")
        .match_body(Matcher::Json(json!({"title": "Farewells"})))
        .with_status(200)
        .with_body(conversation_json("c1", "Farewells"))
        .create_async()
        .await;
    let delete_mock = server
        .mock("DELETE", "/chats/c1")
        .with_status(204)
        .create_async()
        .await;

    let api = chats_api(&server.url());
    assert_eq!(api.get_chat("c1").await?.title, "Greetings");

    let renamed = api
        .update_chat(
            "c1",
            &ConversationUpdate {
                title: Some("Farewells".to_string()),
                ..ConversationUpdate::default()
            },
        )
        .await?;
    assert_eq!(renamed.title, "Farewells");

    api.delete_chat("c1").await?;

    get_mock.assert_async().await;
    update_mock.assert_async().await;
    delete_mock.assert_async().await;

    return Ok(());
}

#[tokio::test]
async fn it_fetches_message_pages() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/messages/chat/c1")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".to_string(), "1".to_string()),
            Matcher::UrlEncoded("page_size".to_string(), "50".to_string()),
        ]))
        .with_status(200)
        .with_body(message_page_json(
            "c1",
            &[("user", "Hello"), ("assistant", "Hi there")],
        ))
        .create_async()
        .await;

    let api = chats_api(&server.url());
    let page = api.fetch_messages("c1", 1, 50).await?;

    assert_eq!(page.total, 2);
    assert_eq!(page.items[1].content, "Hi there");
    mock.assert_async().await;

    return Ok(());
}

#[tokio::test]
async fn it_reports_missing_chats() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/chats/missing")
        .with_status(404)
        .with_body(r#"{"detail": "Chat not found"}"#)
        .create_async()
        .await;

    let api = chats_api(&server.url());
    let res = api.get_chat("missing").await;

    assert_eq!(
        res.err(),
        Some(ClientError::Transport(
            "request failed with status 404: Chat not found".to_string()
        ))
    );
    mock.assert_async().await;

    return Ok(());
}
