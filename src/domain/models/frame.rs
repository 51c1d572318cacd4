/// One decoded unit of a streamed reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamFrame {
    Fragment(String),
    Completed,
    Failed(String),
}

impl StreamFrame {
    pub fn is_terminal(&self) -> bool {
        return !matches!(self, StreamFrame::Fragment(_));
    }
}
