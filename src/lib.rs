pub mod client;
pub mod command;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod row;
pub mod schema;
pub mod server;
pub mod session;
pub mod table;

// Re-export commonly used types for tests and consumers
pub use client::*;
pub use command::*;
pub use config::*;
pub use database::*;
pub use error::*;
pub use handlers::*;
pub use row::*;
pub use schema::*;
pub use server::*;
pub use session::*;
pub use table::*;
