//! Fixed-URL image backend, usually the last entry of a chain.

use crate::ports::image_service::{GenerateFuture, ImageRequest, ImageService};

/// Default placeholder image when none is configured.
pub const DEFAULT_PLACEHOLDER_URL: &str = "https://placehold.co/1080x1920.png";

/// Backend that answers every request with the same URL.
#[derive(Debug, Clone)]
pub struct PlaceholderImageService {
    url: String,
}

impl PlaceholderImageService {
    /// Create a placeholder backend for the given URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for PlaceholderImageService {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER_URL)
    }
}

impl ImageService for PlaceholderImageService {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn generate(&self, _request: &ImageRequest) -> GenerateFuture<'_> {
        let url = self.url.clone();
        Box::pin(async move { Ok(Some(url)) })
    }
}
