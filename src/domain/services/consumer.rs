#[cfg(test)]
#[path = "consumer_test.rs"]
mod tests;

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;

use super::CacheSync;
use super::FrameParser;
use crate::domain::models::ClientError;
use crate::domain::models::ConsumerState;
use crate::domain::models::Message;
use crate::domain::models::RequestSpec;
use crate::domain::models::Role;
use crate::domain::models::StreamEvent;
use crate::domain::models::StreamFrame;
use crate::domain::models::StreamMessageRequest;
use crate::domain::models::StreamingSession;
use crate::infrastructure::api::ensure_success;
use crate::infrastructure::gateway::Gateway;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing was sent because the text was blank.
    Skipped,
    Completed { content: String },
}

/// Sends a user message and reads the assistant's reply off the stream as it
/// arrives. Serves one send at a time.
pub struct StreamingConsumer {
    gateway: Arc<Gateway>,
    cache: Arc<CacheSync>,
    idle_timeout: Duration,
    state: Mutex<ConsumerState>,
    live: Mutex<String>,
}

fn into_transport(err: ClientError) -> ClientError {
    return match err {
        ClientError::SessionEnded | ClientError::Transport(_) => err,
        other => ClientError::Transport(other.to_string()),
    };
}

impl StreamingConsumer {
    pub fn new(gateway: Arc<Gateway>, cache: Arc<CacheSync>, idle_timeout: Duration) -> StreamingConsumer {
        return StreamingConsumer {
            gateway,
            cache,
            idle_timeout,
            state: Mutex::new(ConsumerState::Idle),
            live: Mutex::new("".to_string()),
        };
    }

    pub fn state(&self) -> ConsumerState {
        return *self.state.lock().unwrap_or_else(PoisonError::into_inner);
    }

    /// Reply text received so far for the send in progress. Empty once it settles.
    pub fn live_text(&self) -> String {
        return self
            .live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
    }

    pub async fn send(
        &self,
        conversation_id: &str,
        text: &str,
        tx: &mpsc::UnboundedSender<StreamEvent>,
    ) -> Result<SendOutcome, ClientError> {
        if conversation_id.trim().is_empty() {
            return Err(ClientError::Validation(
                "conversation id is required".to_string(),
            ));
        }
        if text.trim().is_empty() {
            tracing::debug!(conversation_id = conversation_id, "Skipping blank message");
            return Ok(SendOutcome::Skipped);
        }

        self.begin()?;
        self.cache
            .insert_provisional(Message::provisional(conversation_id, Role::User, text));

        let mut session = StreamingSession::new(conversation_id);
        if let Err(err) = self.consume(&mut session, text, tx).await {
            session.fail();
            self.settle(ConsumerState::Failed);
            tracing::error!(conversation_id = conversation_id, error = %err, "Stream failed");
            let _ = tx.send(StreamEvent::Failed {
                reason: err.to_string(),
            });

            return Err(err);
        }

        self.settle(ConsumerState::Completed);
        let content = session.content().to_string();
        tracing::debug!(
            conversation_id = conversation_id,
            length = content.len(),
            "Stream completed"
        );

        if let Err(err) = self.cache.reconcile(conversation_id).await {
            tracing::warn!(conversation_id = conversation_id, error = %err, "Failed to reconcile messages");
        }
        if let Err(err) = self.cache.reconcile_conversations().await {
            tracing::warn!(error = %err, "Failed to reconcile conversations");
        }

        let _ = tx.send(StreamEvent::Completed {
            content: content.clone(),
        });

        return Ok(SendOutcome::Completed { content });
    }

    fn begin(&self) -> Result<(), ClientError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.is_active() {
            return Err(ClientError::SessionActive);
        }

        *state = ConsumerState::Sending;
        return Ok(());
    }

    fn set_state(&self, next: ConsumerState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    fn settle(&self, next: ConsumerState) {
        self.set_state(next);
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Drives the stream until a terminal frame. Ok only on completion.
    async fn consume(
        &self,
        session: &mut StreamingSession,
        text: &str,
        tx: &mpsc::UnboundedSender<StreamEvent>,
    ) -> Result<(), ClientError> {
        let spec = RequestSpec::post("/messages/stream").json(&StreamMessageRequest {
            conversation_id: session.conversation_id().to_string(),
            message: text.to_string(),
        })?;

        let res = self.gateway.execute(&spec).await.map_err(into_transport)?;
        let res = ensure_success(res).await?;

        self.set_state(ConsumerState::Streaming);
        let _ = tx.send(StreamEvent::Started {
            conversation_id: session.conversation_id().to_string(),
        });

        let mut parser = FrameParser::new();
        let mut stream = res.bytes_stream();

        loop {
            let chunk = match tokio::time::timeout(self.idle_timeout, stream.next()).await {
                Ok(Some(Ok(chunk))) => chunk,
                Ok(Some(Err(err))) => return Err(ClientError::Transport(err.to_string())),
                Ok(None) => {
                    let reason = match parser.finish() {
                        Some(StreamFrame::Failed(reason)) => reason,
                        _ => "stream ended without completion".to_string(),
                    };
                    return Err(ClientError::Transport(reason));
                }
                Err(_) => {
                    return Err(ClientError::Transport(format!(
                        "no data received for {}ms",
                        self.idle_timeout.as_millis()
                    )));
                }
            };

            for frame in parser.push(&chunk) {
                tracing::debug!(frame = ?frame, "Received frame");
                match frame {
                    StreamFrame::Fragment(fragment) => {
                        let content = session.append(&fragment).to_string();
                        *self.live.lock().unwrap_or_else(PoisonError::into_inner) = content.clone();
                        let _ = tx.send(StreamEvent::Fragment { content });
                    }
                    StreamFrame::Completed => {
                        session.complete();
                        return Ok(());
                    }
                    StreamFrame::Failed(reason) => {
                        return Err(ClientError::Stream(reason));
                    }
                }
            }
        }
    }
}
