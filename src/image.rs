use anyhow::{Result, anyhow};
use async_trait::async_trait;
use rand::Rng;
use reqwest::Url;

pub const DEFAULT_IMAGE_BASE: &str = "https://image.pollinations.ai/prompt/";

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;
const MAX_SEED: u32 = 1000;

/// Produces a link to an illustration for a prompt.
#[async_trait]
pub trait ImageRenderer: Send + Sync {
    async fn render(&self, prompt: &str) -> Result<String>;
}

/// Renders by URL: the prompt becomes the last path segment of a templated
/// image service address and the image is drawn when the link is opened.
pub struct UrlImageRenderer {
    base: Url,
}

impl UrlImageRenderer {
    pub fn new(base: &str) -> Result<Self> {
        let base = Url::parse(base).map_err(|err| anyhow!("Invalid image base URL {base}: {err}"))?;
        Ok(Self { base })
    }

    pub fn url_for(&self, prompt: &str, seed: u32) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Image base URL {} cannot take a path", self.base))?
            .pop_if_empty()
            .push(prompt);
        url.query_pairs_mut()
            .append_pair("width", &WIDTH.to_string())
            .append_pair("height", &HEIGHT.to_string())
            .append_pair("seed", &seed.to_string());
        Ok(url)
    }
}

#[async_trait]
impl ImageRenderer for UrlImageRenderer {
    async fn render(&self, prompt: &str) -> Result<String> {
        let seed = rand::rng().random_range(0..MAX_SEED);
        let url = self.url_for(prompt, seed)?;
        tracing::debug!(%url, "built image url");
        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_is_percent_encoded_into_the_path() {
        let renderer = UrlImageRenderer::new(DEFAULT_IMAGE_BASE).unwrap();
        let url = renderer.url_for("a cat / \"dog\"", 42).unwrap();
        assert_eq!(
            url.as_str(),
            "https://image.pollinations.ai/prompt/a%20cat%20%2F%20%22dog%22?width=800&height=600&seed=42"
        );
    }

    #[test]
    fn base_without_trailing_slash_works() {
        let renderer = UrlImageRenderer::new("https://images.example.com/render").unwrap();
        let url = renderer.url_for("sea", 7).unwrap();
        assert_eq!(
            url.as_str(),
            "https://images.example.com/render/sea?width=800&height=600&seed=7"
        );
    }

    #[tokio::test]
    async fn render_uses_seed_in_range() {
        let renderer = UrlImageRenderer::new(DEFAULT_IMAGE_BASE).unwrap();
        let url = Url::parse(&renderer.render("school").await.unwrap()).unwrap();
        let seed: u32 = url
            .query_pairs()
            .find(|(key, _)| key == "seed")
            .map(|(_, value)| value.parse().unwrap())
            .unwrap();
        assert!(seed < MAX_SEED);
    }

    #[tokio::test]
    async fn opaque_base_fails_to_render() {
        let renderer = UrlImageRenderer::new("mailto:art@example.com").unwrap();
        assert!(renderer.render("school").await.is_err());
    }
}
