//! Service context: the image chain and phrase store, wired from config.

use std::sync::Arc;

use crate::adapters::dummy::DummyImageService;
use crate::adapters::fallback::FallbackImageService;
use crate::adapters::live::openai::OpenAiImageService;
use crate::adapters::live::pixabay::PixabayImageService;
use crate::adapters::placeholder::PlaceholderImageService;
use crate::adapters::store::{MemoryPhraseStore, SqlitePhraseStore};
use crate::backend::BackendKind;
use crate::config::Config;
use crate::error::ServiceError;
use crate::params::{validate_image_url, validate_text};
use crate::ports::{ImageRequest, ImageService, Page, Phrase, PhraseStore};

/// Bundles the image chain and the phrase store shared by every request.
#[derive(Clone)]
pub struct ServiceContext {
    /// Image backends in priority order.
    pub images: Arc<FallbackImageService>,
    /// Phrase persistence.
    pub store: Arc<dyn PhraseStore>,
}

impl ServiceContext {
    /// Bundle an existing chain and store.
    #[must_use]
    pub fn new(images: FallbackImageService, store: Arc<dyn PhraseStore>) -> Self {
        Self {
            images: Arc::new(images),
            store,
        }
    }

    /// Build the chain and open the store described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if a backend is unknown or lacks its API key, or if
    /// the store cannot be opened.
    pub fn from_config(config: &Config) -> Result<Self, ServiceError> {
        let images = build_image_chain(config)?;
        let store = open_store(config)?;
        Ok(Self::new(images, store))
    }

    /// Validate the text, look up an image and store the new phrase.
    ///
    /// A chain that finds nothing, or fails, leaves `image_url` empty rather
    /// than rejecting the phrase.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is invalid or the store fails.
    pub async fn create_phrase(&self, text: &str) -> Result<Phrase, ServiceError> {
        let text = validate_text(text).map_err(ServiceError::InvalidArgument)?;

        let request = ImageRequest::new(text.clone());
        let image_url = match self.images.generate(&request).await {
            Ok(url) => Some(url),
            Err(ServiceError::NoImageAvailable { tried }) => {
                tracing::info!(tried, "no image for phrase");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "image lookup failed, storing phrase without image");
                None
            }
        };

        let phrase = Phrase::new(text, image_url);
        self.store.insert(phrase.clone()).await?;
        tracing::info!(
            phrase_id = %phrase.phrase_id,
            has_image = phrase.image_url.is_some(),
            "phrase created"
        );
        Ok(phrase)
    }

    /// All phrases, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn list_phrases(&self) -> Result<Vec<Phrase>, ServiceError> {
        self.store.list().await
    }

    /// Fetch one phrase.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for an unknown id.
    pub async fn get_phrase(&self, phrase_id: &str) -> Result<Phrase, ServiceError> {
        let phrase = self.store.get(phrase_id).await?;
        phrase.ok_or_else(|| not_found(phrase_id))
    }

    /// Replace the text of a phrase. The image is kept as is.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is invalid or the id is unknown.
    pub async fn update_phrase(&self, phrase_id: &str, text: &str) -> Result<Phrase, ServiceError> {
        let text = validate_text(text).map_err(ServiceError::InvalidArgument)?;
        self.store
            .update_text(phrase_id, &text)
            .await?
            .ok_or_else(|| not_found(phrase_id))
    }

    /// One page of background candidates for a stored phrase.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for an unknown id, or the first
    /// hard failure raised by a backend.
    pub async fn image_candidates(
        &self,
        phrase_id: &str,
        page: Page,
    ) -> Result<Vec<String>, ServiceError> {
        let phrase = self.get_phrase(phrase_id).await?;
        let images = self
            .images
            .candidates(&ImageRequest::new(phrase.text), page)
            .await?;
        tracing::debug!(
            phrase_id,
            page = page.number,
            count = images.len(),
            "candidates listed"
        );
        Ok(images)
    }

    /// Set or clear the background image of a phrase.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidArgument`] for an unusable locator and
    /// [`ServiceError::NotFound`] for an unknown id.
    pub async fn set_phrase_image(
        &self,
        phrase_id: &str,
        image_url: Option<&str>,
    ) -> Result<Phrase, ServiceError> {
        let image_url = image_url
            .map(validate_image_url)
            .transpose()
            .map_err(ServiceError::InvalidArgument)?;
        let phrase = self
            .store
            .update_image(phrase_id, image_url)
            .await?
            .ok_or_else(|| not_found(phrase_id))?;
        tracing::info!(
            phrase_id,
            has_image = phrase.image_url.is_some(),
            "phrase image set"
        );
        Ok(phrase)
    }
}

fn not_found(phrase_id: &str) -> ServiceError {
    ServiceError::NotFound(phrase_id.to_string())
}

/// Build the fallback chain from the configured backend names.
///
/// # Errors
///
/// Returns an error if a backend name is unknown or its API key is missing.
pub fn build_image_chain(config: &Config) -> Result<FallbackImageService, ServiceError> {
    let kinds = config.backend_kinds().map_err(ServiceError::Config)?;
    let backends = kinds
        .into_iter()
        .map(|kind| build_backend(kind, config))
        .collect::<Result<Vec<_>, _>>()?;

    let chain = FallbackImageService::new(backends);
    Ok(match config.backend_timeout() {
        Some(limit) => chain.with_timeout(limit),
        None => chain,
    })
}

fn build_backend(
    kind: BackendKind,
    config: &Config,
) -> Result<Box<dyn ImageService>, ServiceError> {
    let backend: Box<dyn ImageService> = match kind {
        BackendKind::Dummy => Box::new(DummyImageService),
        BackendKind::Placeholder => {
            let url = config.images.placeholder_url.clone();
            Box::new(PlaceholderImageService::new(url))
        }
        BackendKind::Pixabay => {
            let key = config.pixabay_key().ok_or(ServiceError::MissingApiKey {
                backend: "Pixabay".into(),
                env_var: "PIXABAY_API_KEY".into(),
            })?;
            Box::new(PixabayImageService::new(key))
        }
        BackendKind::OpenAi => {
            let key = config.openai_key().ok_or(ServiceError::MissingApiKey {
                backend: "OpenAI".into(),
                env_var: "OPENAI_API_KEY".into(),
            })?;
            let model = config.images.openai_model.clone();
            Box::new(OpenAiImageService::new(key, model))
        }
    };
    Ok(backend)
}

/// Open `SQLite` storage when a path is configured, memory otherwise.
///
/// # Errors
///
/// Returns an error if the database cannot be opened.
pub fn open_store(config: &Config) -> Result<Arc<dyn PhraseStore>, ServiceError> {
    match config.storage.path {
        Some(ref path) => {
            tracing::info!(path = %path.display(), "using sqlite phrase store");
            Ok(Arc::new(SqlitePhraseStore::open(path)?))
        }
        None => Ok(Arc::new(MemoryPhraseStore::new())),
    }
}
