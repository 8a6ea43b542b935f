//! Phrasebook - phrase cards with background images.
//!
//! Images come from a [`FallbackImageService`]: an ordered chain of
//! [`ImageService`] backends tried one at a time until one has a result.

pub mod adapters;
pub mod backend;
pub mod config;
pub mod context;
pub mod error;
pub mod params;
pub mod ports;
pub mod server;

pub use adapters::dummy::DummyImageService;
pub use adapters::fallback::FallbackImageService;
pub use adapters::placeholder::PlaceholderImageService;
pub use adapters::store::{MemoryPhraseStore, SqlitePhraseStore};
pub use config::Config;
pub use context::ServiceContext;
pub use error::ServiceError;
pub use ports::{ImageRequest, ImageService, Phrase, PhraseStore};
pub use server::build_router;
