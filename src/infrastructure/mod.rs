pub mod api;
pub mod gateway;
pub mod persistence;
