/// Lifecycle of a single send, published to observers as it happens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    Started { conversation_id: String },
    /// Carries the full reply accumulated so far, not only the newest fragment.
    Fragment { content: String },
    Completed { content: String },
    Failed { reason: String },
}
