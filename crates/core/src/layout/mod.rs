//! Text layout module.
//!
//! This module contains:
//! - The text item type shared by aggregation and search (TextItem)
//! - Aggregation parameters (AggregateParams)
//! - The bounded text aggregator and its detail levels

pub mod aggregate;
pub mod item;
pub mod params;

pub use aggregate::{
    DetailLevel, aggregate_bounded_text, aggregate_lines, collect_segments, merge_lines,
    sort_reading_order,
};
pub use item::TextItem;
pub use params::AggregateParams;
