#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ConsumerState {
    #[default]
    Idle,
    Sending,
    Streaming,
    Completed,
    Failed,
}

impl ConsumerState {
    /// True while a send owns the consumer.
    pub fn is_active(&self) -> bool {
        return matches!(self, ConsumerState::Sending | ConsumerState::Streaming);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
    Failed,
}

/// State of one in-flight send. Accumulated text only ever grows by append.
#[derive(Debug)]
pub struct StreamingSession {
    conversation_id: String,
    accumulated: String,
    status: SessionStatus,
}

impl StreamingSession {
    pub fn new(conversation_id: &str) -> StreamingSession {
        return StreamingSession {
            conversation_id: conversation_id.to_string(),
            accumulated: "".to_string(),
            status: SessionStatus::Active,
        };
    }

    pub fn conversation_id(&self) -> &str {
        return &self.conversation_id;
    }

    pub fn content(&self) -> &str {
        return &self.accumulated;
    }

    pub fn status(&self) -> SessionStatus {
        return self.status;
    }

    /// Appends a fragment and returns everything received so far. Ignored once
    /// the session has settled.
    pub fn append(&mut self, fragment: &str) -> &str {
        if self.status == SessionStatus::Active {
            self.accumulated += fragment;
        }

        return &self.accumulated;
    }

    pub fn complete(&mut self) {
        if self.status == SessionStatus::Active {
            self.status = SessionStatus::Completed;
        }
    }

    pub fn fail(&mut self) {
        if self.status == SessionStatus::Active {
            self.status = SessionStatus::Failed;
        }
    }
}
