pub mod config;
pub mod constants;
pub mod conversation;
pub mod error;
pub mod exchange;
pub mod message;
pub mod session;
pub mod sources;
