//! Aggregation parameters.
//!
//! Contains AggregateParams for controlling how bounded text is selected and merged.

use crate::error::{Result, TextError};

/// Parameters for bounded text aggregation.
///
/// The defaults select characters that overlap the query by at least half their
/// area, merge segments into a line when they overlap it by at least half their
/// own height, and join lines with CRLF.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateParams {
    /// Minimum share of a character box, in percent, that must fall inside the
    /// query rectangle for the character to be selected.
    pub min_char_overlap_percent: f64,

    /// A segment continues the current line when its top edge is above the line's
    /// bottom edge by at least this fraction of the segment's own height.
    pub line_overlap_ratio: f64,

    /// Separator inserted between lines when everything is aggregated.
    /// One zero-area placeholder box is added per separator character.
    pub line_separator: String,
}

impl Default for AggregateParams {
    fn default() -> Self {
        Self {
            min_char_overlap_percent: 50.0,
            line_overlap_ratio: 0.5,
            line_separator: "\r\n".to_string(),
        }
    }
}

impl AggregateParams {
    /// Creates aggregation parameters, rejecting values outside their valid range.
    pub fn new(
        min_char_overlap_percent: f64,
        line_overlap_ratio: f64,
        line_separator: impl Into<String>,
    ) -> Result<Self> {
        if !(0.0..=100.0).contains(&min_char_overlap_percent) {
            return Err(TextError::InvalidArgument(format!(
                "min_char_overlap_percent must be between 0 and 100, got {min_char_overlap_percent}"
            )));
        }
        if !(0.0..=1.0).contains(&line_overlap_ratio) {
            return Err(TextError::InvalidArgument(format!(
                "line_overlap_ratio must be between 0 and 1, got {line_overlap_ratio}"
            )));
        }
        Ok(Self {
            min_char_overlap_percent,
            line_overlap_ratio,
            line_separator: line_separator.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = AggregateParams::default();
        assert_eq!(params.min_char_overlap_percent, 50.0);
        assert_eq!(params.line_overlap_ratio, 0.5);
        assert_eq!(params.line_separator, "\r\n");
    }

    #[test]
    fn test_new_validates_ranges() {
        assert!(AggregateParams::new(50.0, 0.5, "\n").is_ok());
        assert!(AggregateParams::new(0.0, 0.0, "").is_ok());
        assert!(AggregateParams::new(100.5, 0.5, "\n").is_err());
        assert!(AggregateParams::new(-1.0, 0.5, "\n").is_err());
        assert!(AggregateParams::new(50.0, 1.5, "\n").is_err());
        assert!(AggregateParams::new(f64::NAN, 0.5, "\n").is_err());
    }
}
