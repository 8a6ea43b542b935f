//! In-memory phrase store.

use tokio::sync::RwLock;

use crate::ports::phrase_store::{Phrase, PhraseStore, StoreFuture};

/// Keeps phrases in insertion order for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryPhraseStore {
    phrases: RwLock<Vec<Phrase>>,
}

impl MemoryPhraseStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn modify(&self, phrase_id: &str, apply: impl FnOnce(&mut Phrase)) -> Option<Phrase> {
        let mut phrases = self.phrases.write().await;
        let phrase = phrases.iter_mut().find(|p| p.phrase_id == phrase_id)?;
        apply(phrase);
        Some(phrase.clone())
    }
}

impl PhraseStore for MemoryPhraseStore {
    fn insert(&self, phrase: Phrase) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.phrases.write().await.push(phrase);
            Ok(())
        })
    }

    fn list(&self) -> StoreFuture<'_, Vec<Phrase>> {
        Box::pin(async move { Ok(self.phrases.read().await.clone()) })
    }

    fn get(&self, phrase_id: &str) -> StoreFuture<'_, Option<Phrase>> {
        let phrase_id = phrase_id.to_string();
        Box::pin(async move {
            let phrases = self.phrases.read().await;
            Ok(phrases.iter().find(|p| p.phrase_id == phrase_id).cloned())
        })
    }

    fn update_text(&self, phrase_id: &str, text: &str) -> StoreFuture<'_, Option<Phrase>> {
        let phrase_id = phrase_id.to_string();
        let text = text.to_string();
        Box::pin(async move {
            let updated = self.modify(&phrase_id, |p| p.text = text).await;
            Ok(updated)
        })
    }

    fn update_image(
        &self,
        phrase_id: &str,
        image_url: Option<String>,
    ) -> StoreFuture<'_, Option<Phrase>> {
        let phrase_id = phrase_id.to_string();
        Box::pin(async move {
            let updated = self.modify(&phrase_id, |p| p.image_url = image_url).await;
            Ok(updated)
        })
    }
}
