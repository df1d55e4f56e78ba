pub mod codec;
pub mod commands;
pub mod config;
pub mod connection;
pub mod context;
pub mod dispatch;
pub mod matcher;
pub mod query;
pub mod record;
pub mod response;
pub mod schema;
pub mod server;
pub mod source;
pub mod store;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, Error>;
