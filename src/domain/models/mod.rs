mod chat_model;
mod conversation;
mod credential;
mod error;
mod event;
mod frame;
mod message;
mod request;
mod session;
mod user;

pub use chat_model::*;
pub use conversation::*;
pub use credential::*;
pub use error::*;
pub use event::*;
pub use frame::*;
pub use message::*;
pub use request::*;
pub use session::*;
pub use user::*;
