//! No-op image backend.

use crate::ports::image_service::{GenerateFuture, ImageRequest, ImageService};

/// Backend that never has an image. Safe default for an unconfigured chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyImageService;

impl ImageService for DummyImageService {
    fn name(&self) -> &str {
        "dummy"
    }

    fn generate(&self, _request: &ImageRequest) -> GenerateFuture<'_> {
        Box::pin(async { Ok(None) })
    }
}
