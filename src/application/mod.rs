pub mod chat;
pub mod cli;
mod context;

pub use context::*;
