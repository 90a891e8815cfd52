//! Page text sessions.
//!
//! This module contains:
//! - `page` - the per-page session owning the engine handle and character cache (TextPage)
//! - `search` - incremental and one-shot text search on a session (TextSearch)

pub mod page;
pub mod search;

pub use page::TextPage;
pub use search::TextSearch;
