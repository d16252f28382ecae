use serde::{Deserialize, Serialize};

use crate::classify::{Classification, classify};
use crate::compose::{compose_image_prompt, compose_prompt};
use crate::error::AppError;
use crate::image::ImageRenderer;
use crate::llm::TextGenerator;
use crate::website::ValidationError;

pub const IMAGE_WARNING: &str = "The image could not be generated, but the text was created successfully.";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub title: Option<String>,
    /// Browsers send `null` when the checkbox was never touched.
    #[serde(default)]
    pub generate_image: Option<bool>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTopic {
    pub content: String,
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_warning: Option<String>,
}

/// Everything decided about a title before any API is called.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationPlan {
    pub classification: Classification,
    pub prompt: String,
    pub image_prompt: Option<String>,
}

impl GenerationPlan {
    pub fn for_title(title: &str) -> Result<Self, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let classification = classify(title);
        let prompt = compose_prompt(title, &classification);
        let image_prompt = compose_image_prompt(title, &classification);
        Ok(Self {
            classification,
            prompt,
            image_prompt,
        })
    }
}

pub async fn generate_topic(
    text: &dyn TextGenerator,
    images: &dyn ImageRenderer,
    request: &GenerateRequest,
) -> Result<GeneratedTopic, AppError> {
    let plan = GenerationPlan::for_title(request.title.as_deref().unwrap_or_default())?;
    tracing::info!(
        intent = ?plan.classification.intent,
        content_type = %plan.classification.content_type,
        difficulty = %plan.classification.difficulty,
        word_count = ?plan.classification.word_count,
        "generating topic"
    );

    let content = text
        .generate(&plan.prompt)
        .await
        .map_err(AppError::Generation)?;

    let mut topic = GeneratedTopic {
        content,
        image_url: None,
        image_warning: None,
    };

    if !request.generate_image.unwrap_or(false) {
        return Ok(topic);
    }
    let Some(image_prompt) = plan.image_prompt else {
        tracing::debug!("skipping image for an explanation request");
        return Ok(topic);
    };

    match images.render(&image_prompt).await {
        Ok(url) => topic.image_url = Some(url),
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "image generation failed, returning text only");
            topic.image_warning = Some(IMAGE_WARNING.to_string());
        }
    }

    Ok(topic)
}


#[cfg(test)]
mod tests {
    use super::stubs::{CannedText, FixedImage};
    use super::*;

    fn request(title: &str, generate_image: bool) -> GenerateRequest {
        GenerateRequest {
            title: Some(title.to_string()),
            generate_image: Some(generate_image),
        }
    }

    #[tokio::test]
    async fn returns_text_and_image() {
        let text = CannedText::default();
        let topic = generate_topic(
            &text,
            &FixedImage::default(),
            &request("Write a story about the sea", true),
        )
        .await
        .unwrap();

        assert_eq!(topic.content, "Generated answer.");
        assert_eq!(
            topic.image_url.as_deref(),
            Some("https://images.example.com/1.png")
        );
        assert_eq!(topic.image_warning, None);

        let prompts = text.prompts.lock().unwrap();
        assert!(prompts[0].contains("English story assignment"));
    }

    #[tokio::test]
    async fn image_failure_degrades_to_text_only() {
        let topic = generate_topic(
            &CannedText::default(),
            &FixedImage { fail: true },
            &request("Write an essay about school", true),
        )
        .await
        .unwrap();

        assert_eq!(topic.content, "Generated answer.");
        assert_eq!(topic.image_url, None);
        assert_eq!(topic.image_warning.as_deref(), Some(IMAGE_WARNING));
    }

    #[tokio::test]
    async fn explanations_skip_the_image() {
        let topic = generate_topic(
            &CannedText::default(),
            &FixedImage::default(),
            &request("Present perfect nedir?", true),
        )
        .await
        .unwrap();

        assert_eq!(topic.image_url, None);
        assert_eq!(topic.image_warning, None);
    }

    #[tokio::test]
    async fn image_is_only_built_on_request() {
        let topic = generate_topic(
            &CannedText::default(),
            &FixedImage::default(),
            &request("Write an essay about school", false),
        )
        .await
        .unwrap();
        assert_eq!(topic.image_url, None);
    }

    #[tokio::test]
    async fn blank_title_is_rejected_before_generation() {
        let text = CannedText::default();
        let err = generate_topic(&text, &FixedImage::default(), &request("   ", false))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Validation(ValidationError::EmptyTitle)
        ));
        assert!(text.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn text_failure_fails_the_request() {
        let err = generate_topic(
            &CannedText {
                fail: true,
                ..Default::default()
            },
            &FixedImage::default(),
            &request("Write an essay about school", true),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Generation(_)));
    }

    #[test]
    fn plan_trims_the_title() {
        let plan = GenerationPlan::for_title("  Write 250 words about school  ").unwrap();
        assert_eq!(plan.classification.word_count, Some(250));
        assert!(plan.prompt.contains("\"Write 250 words about school\""));
    }
}
