pub mod classify;
pub mod compose;
pub mod config;
pub mod crud;
pub mod error;
pub mod generate;
pub mod image;
pub mod llm;
pub mod server;
pub mod utils;
pub mod website;
