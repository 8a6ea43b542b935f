//! Adapter implementations for port traits.
//!
//! - `dummy`, `placeholder` - local image backends
//! - `live/` - image backends backed by real APIs
//! - `fallback` - ordered chain over any image backends
//! - `store/` - phrase store implementations

pub mod dummy;
pub mod fallback;
pub mod live;
pub mod placeholder;
pub mod store;
