use anyhow::{Context, Result, anyhow};

use async_openai::{Client, config::OpenAIConfig};

use super::secrets::{API_KEY_ENV, ApiKey, ApiKeySource, ApiKeyStore};

pub fn ensure_client(store: &ApiKeyStore, api_base: Option<&str>) -> Result<Client<OpenAIConfig>> {
    let api_key = require_api_key(store)?;
    tracing::debug!(source = api_key.source.description(), "using text generation API key");
    Ok(initialize_client(&api_key.key, api_base))
}

pub async fn test_configured_api_key(
    store: &ApiKeyStore,
    api_base: Option<&str>,
) -> Result<ApiKeySource> {
    let api_key = require_api_key(store)?;
    let client = initialize_client(&api_key.key, api_base);
    healthcheck_client(&client).await?;
    Ok(api_key.source)
}

fn require_api_key(store: &ApiKeyStore) -> Result<ApiKey> {
    store.resolve()?.ok_or_else(|| {
        anyhow!(
            "Text generation is not configured. Set {} or run `topicpress llm --set <KEY>`.",
            API_KEY_ENV
        )
    })
}

fn initialize_client(api_key: &str, api_base: Option<&str>) -> Client<OpenAIConfig> {
    let mut config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base) = api_base {
        config = config.with_api_base(base);
    }

    Client::with_config(config)
}

async fn healthcheck_client(client: &Client<OpenAIConfig>) -> Result<()> {
    client
        .models()
        .list()
        .await
        .context("Failed to validate API key with the text generation API")?;
    Ok(())
}
