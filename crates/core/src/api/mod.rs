//! High-level API module for page text extraction.
//!
//! # Example
//!
//! ```ignore
//! use folio_core::api::extract_text;
//! use folio_core::MemoryDocument;
//!
//! let doc = MemoryDocument::from_path("dump.json")?;
//! let text = extract_text(&doc, 0)?;
//! ```

pub mod high_level;

pub use high_level::{
    BoundedTextOptions, PAGE_SEPARATOR, extract_bounded_text, extract_document_text, extract_text,
    find_text, with_text_page,
};
