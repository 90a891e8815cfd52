//! folio - page text extraction on top of a native text engine.
//!
//! Provides rectangle-bounded text aggregation and full-text search with
//! character geometry, over any engine implementing the traits in [`engine`].

pub mod api;
pub mod document;
pub mod engine;
pub mod error;
pub mod layout;
pub mod utils;

pub use api::high_level;

pub use document::{TextPage, TextSearch};
pub use engine::{
    EngineError, MemoryDocument, MemoryPage, SearchCursor, SearchFlags, TextEngine,
    TextPageBackend,
};
pub use error::{Result, TextError};
pub use layout::{AggregateParams, DetailLevel, TextItem};
pub use utils::Rect;
