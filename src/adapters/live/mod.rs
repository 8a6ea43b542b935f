//! Backends that call real HTTP APIs.

pub mod openai;
pub mod pixabay;
