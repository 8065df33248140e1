pub mod access_log;
pub mod attachments;
pub mod auth;
pub mod connection;
pub mod details;
pub mod emails;
pub mod listings;
pub mod neighborhoods;

pub use connection::Database;
