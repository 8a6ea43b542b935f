//! Phrase store implementations.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryPhraseStore;
pub use sqlite::SqlitePhraseStore;
