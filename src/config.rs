use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueHint};

use crate::image::{DEFAULT_IMAGE_BASE, UrlImageRenderer};
use crate::llm::{ApiKeyStore, DEFAULT_MODEL, OpenAiGenerator, ensure_client};

#[derive(Args, Debug, Clone)]
pub struct GeneratorConfig {
    /// Model used for text generation
    #[arg(long, env = "TOPICPRESS_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,
    /// Base URL of an OpenAI-compatible API. Defaults to OpenAI.
    #[arg(long, value_name = "URL", env = "TOPICPRESS_API_BASE")]
    pub api_base: Option<String>,
    /// Image service the prompt is appended to as a path segment
    #[arg(
        long,
        value_name = "URL",
        env = "TOPICPRESS_IMAGE_BASE",
        default_value = DEFAULT_IMAGE_BASE
    )]
    pub image_base: String,
}

impl GeneratorConfig {
    pub fn text_generator(&self, store: &ApiKeyStore) -> Result<OpenAiGenerator> {
        let client = ensure_client(store, self.api_base.as_deref())?;
        Ok(OpenAiGenerator::new(client, self.model.clone()))
    }

    pub fn image_renderer(&self) -> Result<UrlImageRenderer> {
        UrlImageRenderer::new(&self.image_base)
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    /// Address to listen on
    #[arg(long, env = "TOPICPRESS_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,
    /// SQLite file holding published websites. Defaults to the data directory.
    #[arg(
        long,
        value_name = "PATH",
        env = "TOPICPRESS_DATABASE",
        value_hint = ValueHint::FilePath
    )]
    pub database: Option<PathBuf>,
    #[command(flatten)]
    pub generator: GeneratorConfig,
}
