use anyhow::Result;

use super::Message;
use super::MessagePage;
use super::Provenance;
use super::Role;

#[test]
fn it_creates_provisional_messages() {
    let msg = Message::provisional("c1", Role::User, "Hello");
    assert_eq!(msg.conversation_id, "c1");
    assert_eq!(msg.role, Role::User);
    assert_eq!(msg.content, "Hello");
    assert!(msg.is_provisional());
    assert_eq!(msg.id.len(), 36);
}

#[test]
fn it_gives_provisional_messages_unique_ids() {
    let first = Message::provisional("c1", Role::User, "Hello");
    let second = Message::provisional("c1", Role::User, "Hello");
    assert_ne!(first.id, second.id);
}

#[test]
fn it_decodes_server_messages_as_authoritative() -> Result<()> {
    let payload = r#"{
        "items": [
            {
                "id": "m1",
                "chat_id": "c1",
                "role": "assistant",
                "content": "Hi there",
                "tokens": 3,
                "created_at": "2024-05-01T10:00:00"
            }
        ],
        "total": 1
    }"#;

    let page: MessagePage = serde_json::from_str(payload)?;
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].conversation_id, "c1");
    assert_eq!(page.items[0].role, Role::Assistant);
    assert_eq!(page.items[0].provenance, Provenance::Authoritative);

    return Ok(());
}

#[test]
fn it_displays_roles_lowercase() {
    insta::assert_snapshot!(Role::Assistant.to_string(), @"assistant");
}
