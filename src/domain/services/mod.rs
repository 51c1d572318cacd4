mod cache_sync;
mod consumer;
mod credential_store;
mod frame_parser;
mod single_flight;

pub use cache_sync::*;
pub use consumer::*;
pub use credential_store::*;
pub use frame_parser::*;
pub use single_flight::*;
