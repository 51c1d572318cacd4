#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;

use anyhow::Result;
use tokio::io;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use yansi::Paint;

use super::AppContext;
use crate::domain::models::ChatModel;
use crate::domain::models::Conversation;
use crate::domain::models::Message;
use crate::domain::models::NewConversation;
use crate::domain::models::Role;
use crate::domain::models::StreamEvent;
use crate::domain::services::SendOutcome;

/// The part of `content` not yet written, given `printed` bytes already were.
pub fn unprinted(content: &str, printed: usize) -> &str {
    return content.get(printed..).unwrap_or("");
}

pub fn format_conversation(conversation: &Conversation) -> String {
    let mut res = format!("- (ID: {}) {}", conversation.id, conversation.title);
    if !conversation.model.is_empty() {
        res = format!("{res}, Model: {}", conversation.model);
    }

    return format!(
        "{res}, Messages: {}, Updated: {}",
        conversation.message_count, conversation.updated_at
    );
}

pub fn format_model(model: &ChatModel, default: bool) -> String {
    let mut res = format!("- {} ({}, {:.1} GB)", model.model, model.name, model.size as f64 / 1e9);
    if default {
        res = format!("{res} [default]");
    }

    return res;
}

pub fn format_message(message: &Message) -> String {
    let author = match message.role {
        Role::User => "You".to_string(),
        Role::Assistant => "Assistant".to_string(),
        Role::System => "System".to_string(),
    };

    let mut header = format!("{author} ({})", message.created_at);
    if message.is_provisional() {
        header = format!("{header} [pending]");
    }

    return format!("{header}\n{}", message.content);
}

async fn print_events(mut rx: mpsc::UnboundedReceiver<StreamEvent>) -> Result<()> {
    let mut stdout = io::stdout();
    let mut printed = 0;

    while let Some(event) = rx.recv().await {
        match event {
            StreamEvent::Started { conversation_id } => {
                tracing::debug!(conversation_id = conversation_id, "Reply started");
            }
            StreamEvent::Fragment { content } => {
                stdout
                    .write_all(unprinted(&content, printed).as_bytes())
                    .await?;
                stdout.flush().await?;
                printed = content.len();
            }
            StreamEvent::Completed { content } => {
                stdout
                    .write_all(format!("{}\n", unprinted(&content, printed)).as_bytes())
                    .await?;
                stdout.flush().await?;
            }
            StreamEvent::Failed { .. } => {
                if printed > 0 {
                    stdout.write_all(b"\n").await?;
                    stdout.flush().await?;
                }
            }
        }
    }

    return Ok(());
}

/// Sends `text` to a conversation, writing the reply to stdout as it streams.
pub async fn send_message(ctx: &AppContext, chat_id: &str, text: &str) -> Result<()> {
    let (tx, rx) = mpsc::unbounded_channel::<StreamEvent>();
    let printer = tokio::spawn(print_events(rx));

    let res = ctx.consumer.send(chat_id, text, &tx).await;
    drop(tx);
    printer.await??;

    if res? == SendOutcome::Skipped {
        println!("{}", Paint::yellow("Nothing to send."));
    }

    return Ok(());
}

pub async fn print_messages(ctx: &AppContext, chat_id: &str) -> Result<()> {
    ctx.cache.reconcile(chat_id).await?;

    let messages = ctx.cache.messages(chat_id);
    if messages.is_empty() {
        println!("This conversation has no messages yet.");
        return Ok(());
    }

    let total = ctx.cache.total(chat_id);
    let formatted = messages
        .iter()
        .map(format_message)
        .collect::<Vec<String>>()
        .join("\n\n");

    println!("{formatted}");
    if total > messages.len() as u64 {
        println!(
            "\n{}",
            Paint::new(format!("Showing the first {} of {total} messages.", messages.len())).dimmed()
        );
    }

    return Ok(());
}

pub async fn print_conversations(ctx: &AppContext, page: u32) -> Result<()> {
    let conversations = match page {
        1 => {
            ctx.cache.reconcile_conversations().await?;
            ctx.cache.conversations()
        }
        _ => ctx.chats.list_chats(page, ctx.chats_page_size).await?.items,
    };

    if conversations.is_empty() {
        println!("There are no conversations available. You should start your first one!");
        return Ok(());
    }

    let formatted = conversations
        .iter()
        .map(format_conversation)
        .collect::<Vec<String>>()
        .join("\n");
    println!("{formatted}");

    return Ok(());
}

pub async fn print_models(ctx: &AppContext) -> Result<()> {
    let models = ctx.models.list_models().await?;
    if models.is_empty() {
        println!("The server has no models available.");
        return Ok(());
    }

    let formatted = models
        .iter()
        .enumerate()
        .map(|(idx, model)| return format_model(model, idx == 0))
        .collect::<Vec<String>>()
        .join("\n");
    println!("{formatted}");

    return Ok(());
}

/// Creates a conversation, answering with the server's first listed model
/// when none was picked.
pub async fn create_conversation(ctx: &AppContext, mut chat: NewConversation) -> Result<Conversation> {
    if chat.model.is_none() {
        chat.model = ctx.models.default_model().await?;
        tracing::debug!(model = ?chat.model, "Using default model");
    }

    return Ok(ctx.chats.create_chat(&chat).await?);
}
