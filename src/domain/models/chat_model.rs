use serde::Deserialize;
use serde::Serialize;

/// A model the backend can answer with. `model` is the identifier chats refer to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatModel {
    pub name: String,
    pub model: String,
    #[serde(default)]
    pub size: u64,
}
