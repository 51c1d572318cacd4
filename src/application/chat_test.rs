use std::time::Duration;

use anyhow::Result;
use mockito::Matcher;
use serde_json::json;
use test_utils::conversation_json;

use super::create_conversation;
use super::format_conversation;
use super::format_message;
use super::format_model;
use super::unprinted;
use crate::application::AppContext;
use crate::application::ContextOptions;
use crate::domain::models::ChatModel;
use crate::domain::models::Conversation;
use crate::domain::models::Credential;
use crate::domain::models::Message;
use crate::domain::models::NewConversation;
use crate::domain::models::Role;
use crate::infrastructure::persistence::MemoryCredentials;

fn context(url: &str) -> AppContext {
    let opts = ContextOptions {
        api_url: url.to_string(),
        request_timeout: Duration::from_secs(5),
        stream_idle_timeout: Duration::from_secs(5),
        messages_page_size: 50,
        chats_page_size: 20,
    };
    let persistence = MemoryCredentials::with(Credential::new("access", "refresh"));

    return AppContext::new(opts, Box::new(persistence)).unwrap();
}

fn conversation(model: &str) -> Conversation {
    return Conversation {
        id: "c1".to_string(),
        user_id: "u1".to_string(),
        title: "Greetings".to_string(),
        model: model.to_string(),
        system_prompt: None,
        created_at: "2024-05-01T10:00:00".to_string(),
        updated_at: "2024-05-01T10:00:01".to_string(),
        message_count: 2,
    };
}

#[test]
fn it_returns_only_unprinted_text() {
    assert_eq!(unprinted("Hi there", 0), "Hi there");
    assert_eq!(unprinted("Hi there", 2), " there");
    assert_eq!(unprinted("Hi", 2), "");
    assert_eq!(unprinted("Hi", 10), "");
}

#[test]
fn it_formats_conversations() {
    insta::assert_snapshot!(format_conversation(&conversation("llama3")), @"- (ID: c1) Greetings, Model: llama3, Messages: 2, Updated: 2024-05-01T10:00:01");
    insta::assert_snapshot!(format_conversation(&conversation("")), @"- (ID: c1) Greetings, Messages: 2, Updated: 2024-05-01T10:00:01");
}

#[test]
fn it_marks_pending_messages() {
    let mut message = Message::provisional("c1", Role::User, "Hello");
    message.created_at = "2024-05-01T10:00:00.000Z".to_string();

    insta::assert_snapshot!(format_message(&message), @r###"
    You (2024-05-01T10:00:00.000Z) [pending]
    Hello
    "###);
}

#[test]
fn it_formats_models() {
    let model = ChatModel {
        name: "llama3:latest".to_string(),
        model: "llama3".to_string(),
        size: 4_661_224_676,
    };

    insta::assert_snapshot!(format_model(&model, true), @"- llama3 (llama3:latest, 4.7 GB) [default]");
    insta::assert_snapshot!(format_model(&model, false), @"- llama3 (llama3:latest, 4.7 GB)");
}

#[tokio::test]
async fn it_creates_conversations_with_the_first_listed_model() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let models = server
        .mock("GET", "/ollama/models")
        .with_status(200)
        .with_body(r#"[{"name": "mistral:latest", "model": "mistral", "size": 1}, {"name": "llama3:latest", "model": "llama3", "size": 2}]"#)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/chats")
        .match_body(Matcher::Json(json!({"title": "Greetings", "model": "mistral"})))
        .with_status(201)
        .with_body(conversation_json("c1", "Greetings"))
        .create_async()
        .await;

    let ctx = context(&server.url());
    let chat = create_conversation(
        &ctx,
        NewConversation {
            title: "Greetings".to_string(),
            ..NewConversation::default()
        },
    )
    .await?;

    assert_eq!(chat.id, "c1");
    models.assert_async().await;
    create.assert_async().await;

    return Ok(());
}

#[tokio::test]
async fn it_keeps_an_explicitly_chosen_model() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let models = server
        .mock("GET", "/ollama/models")
        .expect(0)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/chats")
        .match_body(Matcher::Json(json!({"title": "Greetings", "model": "llama3"})))
        .with_status(201)
        .with_body(conversation_json("c1", "Greetings"))
        .create_async()
        .await;

    let ctx = context(&server.url());
    create_conversation(
        &ctx,
        NewConversation {
            title: "Greetings".to_string(),
            model: Some("llama3".to_string()),
            system_prompt: None,
        },
    )
    .await?;

    models.assert_async().await;
    create.assert_async().await;

    return Ok(());
}
