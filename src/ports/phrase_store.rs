//! Phrase store port and the phrase record it persists.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// A stored phrase with its optional background image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phrase {
    /// Generated identifier (UUID v4).
    pub phrase_id: String,
    /// The phrase text.
    pub text: String,
    /// Image locator, `None` when no backend produced one.
    pub image_url: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Phrase {
    /// Create a new phrase with a fresh identifier and the current time.
    #[must_use]
    pub fn new(text: impl Into<String>, image_url: Option<String>) -> Self {
        Self {
            phrase_id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            image_url,
            created_at: Utc::now(),
        }
    }
}

/// Boxed future type returned by [`PhraseStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ServiceError>> + Send + 'a>>;

/// Persistence for phrases.
pub trait PhraseStore: Send + Sync {
    /// Persist a new phrase.
    fn insert(&self, phrase: Phrase) -> StoreFuture<'_, ()>;

    /// All phrases, oldest first.
    fn list(&self) -> StoreFuture<'_, Vec<Phrase>>;

    /// Fetch one phrase by id.
    fn get(&self, phrase_id: &str) -> StoreFuture<'_, Option<Phrase>>;

    /// Replace the text of a phrase, returning the updated record.
    fn update_text(&self, phrase_id: &str, text: &str) -> StoreFuture<'_, Option<Phrase>>;

    /// Replace or clear the background image of a phrase, returning the updated record.
    fn update_image(
        &self,
        phrase_id: &str,
        image_url: Option<String>,
    ) -> StoreFuture<'_, Option<Phrase>>;
}
