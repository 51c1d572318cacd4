#[cfg(test)]
#[path = "chats_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::decode;
use super::ensure_success;
use crate::domain::models::ClientError;
use crate::domain::models::Conversation;
use crate::domain::models::ConversationPage;
use crate::domain::models::ConversationSource;
use crate::domain::models::ConversationUpdate;
use crate::domain::models::MessagePage;
use crate::domain::models::NewConversation;
use crate::domain::models::RequestSpec;
use crate::infrastructure::gateway::Gateway;

/// Plain request/response calls for conversations and their message pages.
pub struct ChatsApi {
    gateway: Arc<Gateway>,
    timeout: Option<Duration>,
}

impl ChatsApi {
    pub fn new(
        gateway: Arc<Gateway>,
        timeout: Option<Duration>,
    ) -> ChatsApi {
        return ChatsApi { gateway, timeout };
    }

    pub async fn create_chat(&self, chat: &NewConversation) -> Result<Conversation, ClientError> {
        if chat.title.trim().is_empty() {
            return Err(ClientError::Validation("title is required".to_string()));
        }

        let spec = RequestSpec::post("/chats").timeout(self.timeout).json(chat)?;
        let res = self.gateway.execute(&spec).await?;

        return decode::<Conversation>(res).await;
    }

    pub async fn list_chats(&self, page: u32, page_size: u32) -> Result<ConversationPage, ClientError> {
        let spec = RequestSpec::get("/chats")
            .query("page", &page.to_string())
            .query("page_size", &page_size.to_string())
            .timeout(self.timeout);
        let res = self.gateway.execute(&spec).await?;

        return decode::<ConversationPage>(res).await;
    }

    pub async fn get_chat(&self, chat_id: &str) -> Result<Conversation, ClientError> {
        let spec = RequestSpec::get(&format!("/chats/{chat_id}")).timeout(self.timeout);
        let res = self.gateway.execute(&spec).await?;

        return decode::<Conversation>(res).await;
    }

    pub async fn update_chat(
        &self,
        chat_id: &str,
        update: &ConversationUpdate,
    ) -> Result<Conversation, ClientError> {
        let spec = RequestSpec::put(&format!("/chats/{chat_id}"))
            .timeout(self.timeout)
            .json(update)?;
        let res = self.gateway.execute(&spec).await?;

        return decode::<Conversation>(res).await;
    }

    pub async fn delete_chat(&self, chat_id: &str) -> Result<(), ClientError> {
        let spec = RequestSpec::delete(&format!("/chats/{chat_id}")).timeout(self.timeout);
        let res = self.gateway.execute(&spec).await?;
        ensure_success(res).await?;

        return Ok(());
    }

    pub async fn chat_messages(
        &self,
        chat_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<MessagePage, ClientError> {
        let spec = RequestSpec::get(&format!("/messages/chat/{chat_id}"))
            .query("page", &page.to_string())
            .query("page_size", &page_size.to_string())
            .timeout(self.timeout);
        let res = self.gateway.execute(&spec).await?;

        return decode::<MessagePage>(res).await;
    }
}

#[async_trait]
impl ConversationSource for ChatsApi {
    #[allow(clippy::implicit_return)]
    async fn fetch_messages(
        &self,
        conversation_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<MessagePage, ClientError> {
        return self.chat_messages(conversation_id, page, page_size).await;
    }

    #[allow(clippy::implicit_return)]
    async fn fetch_conversations(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<ConversationPage, ClientError> {
        return self.list_chats(page, page_size).await;
    }
}
