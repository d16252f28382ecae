pub mod client;
pub mod generator;
pub mod secrets;

pub use client::{ensure_client, test_configured_api_key};
pub use generator::{DEFAULT_MODEL, OpenAiGenerator, TextGenerator};
pub use secrets::{ApiKeySource, ApiKeyStore};
