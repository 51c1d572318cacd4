#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use chrono::SecondsFormat;
use chrono::Utc;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use uuid::Uuid;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Provenance {
    /// Created locally at send time, not yet confirmed by the server.
    Provisional,
    #[default]
    Authoritative,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(rename = "chat_id")]
    pub conversation_id: String,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub tokens: u64,
    pub created_at: String,
    #[serde(skip)]
    pub provenance: Provenance,
}

impl Message {
    pub fn provisional(conversation_id: &str, role: Role, content: &str) -> Message {
        return Message {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            role,
            content: content.to_string(),
            tokens: 0,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            provenance: Provenance::Provisional,
        };
    }

    pub fn is_provisional(&self) -> bool {
        return self.provenance == Provenance::Provisional;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePage {
    pub items: Vec<Message>,
    pub total: u64,
}

/// Body of the streaming send endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamMessageRequest {
    pub conversation_id: String,
    pub message: String,
}
