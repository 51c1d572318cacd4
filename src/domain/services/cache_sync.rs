#[cfg(test)]
#[path = "cache_sync_test.rs"]
mod tests;

use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use dashmap::DashMap;

use super::SingleFlight;
use crate::domain::models::ClientError;
use crate::domain::models::Conversation;
use crate::domain::models::ConversationPage;
use crate::domain::models::ConversationSource;
use crate::domain::models::Message;
use crate::domain::models::MessagePage;

#[derive(Clone, Debug, Default)]
struct CachedConversation {
    authoritative: Option<Vec<Message>>,
    total: u64,
    provisional: Vec<Message>,
}

/// Client-side view of conversations: the last fetched page of messages per
/// conversation with an overlay of provisional messages on top.
pub struct CacheSync {
    source: Arc<dyn ConversationSource>,
    messages_page_size: u32,
    chats_page_size: u32,
    conversations: DashMap<String, CachedConversation>,
    summary: RwLock<Option<ConversationPage>>,
    message_flights: SingleFlight<String, Result<MessagePage, ClientError>>,
    summary_flights: SingleFlight<(), Result<ConversationPage, ClientError>>,
}

impl CacheSync {
    pub fn new(
        source: Arc<dyn ConversationSource>,
        messages_page_size: u32,
        chats_page_size: u32,
    ) -> CacheSync {
        return CacheSync {
            source,
            messages_page_size,
            chats_page_size,
            conversations: DashMap::new(),
            summary: RwLock::new(None),
            message_flights: SingleFlight::default(),
            summary_flights: SingleFlight::default(),
        };
    }

    pub fn insert_provisional(&self, message: Message) {
        let mut entry = self
            .conversations
            .entry(message.conversation_id.clone())
            .or_default();

        entry.total += 1;
        entry.provisional.push(message);
    }

    /// Refetches the first page of a conversation and replaces the cached entry
    /// wholesale, dropping the provisional overlay. Concurrent reconciles of the
    /// same conversation share one fetch.
    pub async fn reconcile(&self, conversation_id: &str) -> Result<(), ClientError> {
        let source = self.source.clone();
        let id = conversation_id.to_string();
        let page_size = self.messages_page_size;

        let page = self
            .message_flights
            .run(id.clone(), move || {
                return async move {
                    return source.fetch_messages(&id, 1, page_size).await;
                };
            })
            .await?;

        tracing::debug!(
            conversation_id = conversation_id,
            messages = page.items.len(),
            total = page.total,
            "Reconciled conversation"
        );

        self.conversations.insert(
            conversation_id.to_string(),
            CachedConversation {
                authoritative: Some(page.items),
                total: page.total,
                provisional: vec![],
            },
        );

        return Ok(());
    }

    pub async fn reconcile_conversations(&self) -> Result<(), ClientError> {
        let source = self.source.clone();
        let page_size = self.chats_page_size;

        let page = self
            .summary_flights
            .run((), move || {
                return async move {
                    return source.fetch_conversations(1, page_size).await;
                };
            })
            .await?;

        *self.summary.write().unwrap_or_else(PoisonError::into_inner) = Some(page);

        return Ok(());
    }

    /// Authoritative messages followed by provisional ones not yet superseded.
    pub fn messages(&self, conversation_id: &str) -> Vec<Message> {
        let entry = match self.conversations.get(conversation_id) {
            Some(entry) => entry,
            None => return vec![],
        };

        let mut messages = entry.authoritative.clone().unwrap_or_default();
        messages.extend(entry.provisional.iter().cloned());

        return messages;
    }

    pub fn total(&self, conversation_id: &str) -> u64 {
        return self
            .conversations
            .get(conversation_id)
            .map(|entry| return entry.total)
            .unwrap_or(0);
    }

    pub fn is_loaded(&self, conversation_id: &str) -> bool {
        return self
            .conversations
            .get(conversation_id)
            .map(|entry| return entry.authoritative.is_some())
            .unwrap_or(false);
    }

    pub fn conversations(&self) -> Vec<Conversation> {
        return self
            .summary
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|page| return page.items.clone())
            .unwrap_or_default();
    }
}
