use anyhow::{Context, Result, bail};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::responses::{
        CreateResponseArgs, InputMessage, InputRole, OutputItem, OutputMessageContent,
    },
};
use async_trait::async_trait;

pub const DEFAULT_MODEL: &str = "gpt-5-nano";

const MAX_OUTPUT_TOKENS: u32 = 5000;

const SYSTEM_PROMPT: &str = r#"
You are a patient English teacher helping Turkish-speaking students with their homework.
Follow the instructions in the request exactly, including the requested language and length.
"#;

/// Something that turns a composed instruction into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Text generation over an OpenAI-compatible Responses API.
pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(client: Client<OpenAIConfig>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = CreateResponseArgs::default()
            .model(self.model.as_str())
            .max_output_tokens(MAX_OUTPUT_TOKENS)
            .input(vec![
                InputMessage {
                    role: InputRole::System,
                    content: vec![SYSTEM_PROMPT.into()],
                    status: None,
                },
                InputMessage {
                    role: InputRole::User,
                    content: vec![prompt.into()],
                    status: None,
                },
            ])
            .build()?;

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "requesting text");
        let response = self
            .client
            .responses()
            .create(request)
            .await
            .with_context(|| format!("Failed to get a response from {}", self.model))?;

        first_text(response.output)
    }
}

fn first_text(output: Vec<OutputItem>) -> Result<String> {
    let text = output
        .into_iter()
        .filter_map(|item| match item {
            OutputItem::Message(message) => Some(message.content),
            _ => None,
        })
        .flatten()
        .find_map(|content| match content {
            OutputMessageContent::OutputText(text) => {
                Some(text.text.trim().to_string()).filter(|text| !text.is_empty())
            }
            _ => None,
        });

    match text {
        Some(text) => Ok(text),
        None => bail!("No text output returned from model"),
    }
}
