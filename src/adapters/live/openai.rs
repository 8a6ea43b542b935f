//! Live adapter for the `OpenAI` image generation API.

use base64::Engine;
use reqwest::Client;
use serde::Deserialize;

use crate::error::ServiceError;
use crate::ports::image_service::{GenerateFuture, ImageRequest, ImageService};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/images/generations";

/// Default model when none is configured.
pub const DEFAULT_OPENAI_MODEL: &str = "dall-e-3";

/// Portrait size used for phrase cards.
const CARD_SIZE: &str = "1024x1792";

/// Live `OpenAI` image backend.
pub struct OpenAiImageService {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiImageService {
    /// Create a new `OpenAI` backend with the given API key and model.
    #[must_use]
    pub fn new(api_key: String, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.into(),
            endpoint: OPENAI_API_URL.to_string(),
        }
    }

    /// Point the backend at a different endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn request_body(&self, request: &ImageRequest) -> serde_json::Value {
        // gpt-image models only return base64 and use different portrait sizes.
        let gpt_image = self.model.starts_with("gpt-image");
        let size = if gpt_image { "1024x1536" } else { CARD_SIZE };
        let mut body = serde_json::json!({
            "model": self.model,
            "prompt": image_prompt(request),
            "n": 1,
            "size": size,
        });
        if !gpt_image {
            body["response_format"] = serde_json::json!("url");
        }
        body
    }
}

/// Build the text prompt sent to the model.
fn image_prompt(request: &ImageRequest) -> String {
    if request.tags.is_empty() {
        format!("A background image for the phrase: {}", request.text)
    } else {
        format!(
            "A background image for the phrase: {} (mood: {})",
            request.text,
            request.tags.join(", ")
        )
    }
}

impl ImageService for OpenAiImageService {
    fn name(&self) -> &str {
        "openai"
    }

    fn generate(&self, request: &ImageRequest) -> GenerateFuture<'_> {
        let body = self.request_body(request);
        Box::pin(async move {
            let response = self
                .client
                .post(&self.endpoint)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            let response_text = response.text().await?;

            if !status.is_success() {
                return Err(ServiceError::Api {
                    status: status.as_u16(),
                    message: response_text,
                });
            }

            let parsed: OpenAiResponse =
                serde_json::from_str(&response_text).map_err(|e| ServiceError::Api {
                    status: 200,
                    message: format!("Failed to parse response: {e}"),
                })?;

            for item in parsed.data {
                if let Some(locator) = item.into_locator()? {
                    return Ok(Some(locator));
                }
            }
            Ok(None)
        })
    }
}

// --- OpenAI API response types ---

#[derive(Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    data: Vec<OpenAiImageData>,
}

#[derive(Deserialize)]
struct OpenAiImageData {
    url: Option<String>,
    b64_json: Option<String>,
}

impl OpenAiImageData {
    /// Prefer the hosted URL; fall back to the inline payload as a data URL.
    fn into_locator(self) -> Result<Option<String>, ServiceError> {
        match (self.url, self.b64_json) {
            (Some(url), _) if !url.is_empty() => Ok(Some(url)),
            (_, Some(b64)) if !b64.is_empty() => {
                base64::engine::general_purpose::STANDARD
                    .decode(&b64)
                    .map_err(|e| ServiceError::Api {
                        status: 200,
                        message: format!("Failed to decode base64: {e}"),
                    })?;
                Ok(Some(format!("data:image/png;base64,{b64}")))
            }
            _ => Ok(None),
        }
    }
}
