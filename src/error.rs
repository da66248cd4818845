//! Error types for the span algebra, document, and provenance graph.
//!
//! Everything here fails fast and propagates to the caller. Offsets and
//! lineage are never silently clamped, truncated, or defaulted: a quietly
//! wrong offset corrupts every annotation derived downstream, so a
//! malformed input is an error at the call that received it.

use thiserror::Error;

use crate::id::ItemId;

/// Errors raised by the core types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A span with `start >= end`.
    #[error("malformed span: start {start} is not below end {end}")]
    MalformedSpan { start: usize, end: usize },

    /// A requested range with `start > end`.
    #[error("reversed range: {start}..{end}")]
    ReversedRange { start: usize, end: usize },

    /// A requested range reaching past the end of the text.
    #[error("range {start}..{end} is out of bounds for text of length {len}")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },

    /// Ranges not given in increasing, non-overlapping order.
    #[error("ranges out of order: {start}..{end} begins before offset {previous_end}")]
    UnorderedRanges {
        start: usize,
        end: usize,
        previous_end: usize,
    },

    /// An offset that does not fall on a UTF-8 character boundary.
    #[error("offset {offset} is not a character boundary")]
    NotCharBoundary { offset: usize },

    /// Spans that do not cover their text exactly.
    #[error("spans cover {span_total} bytes but the text is {text_len} bytes")]
    SpanTextMismatch { span_total: usize, text_len: usize },

    /// A range that would cut a modified span part-way through.
    ///
    /// Replacement text has no interior alignment with the sub-spans it
    /// consumed, so a cut inside it cannot be attributed to either side.
    #[error("cannot split a modified span of length {length} at interior offset {offset}")]
    AmbiguousSplit { length: usize, offset: usize },

    /// `replace` called with differing range and replacement counts.
    #[error("{ranges} ranges paired with {replacements} replacement strings")]
    ReplacementCountMismatch { ranges: usize, replacements: usize },

    /// Lookup of an annotation id the document has never seen.
    #[error("no annotation with id {0}")]
    AnnotationNotFound(ItemId),

    /// An annotation id registered a second time.
    #[error("annotation {0} is already in the document")]
    DuplicateAnnotation(ItemId),

    /// An annotation trying to use the label reserved for the raw segment.
    #[error("label {0:?} is reserved for the raw text segment")]
    ReservedLabel(String),

    /// Lookup of an id the provenance graph has never seen.
    #[error("no provenance recorded for {0}")]
    ProvNotFound(ItemId),

    /// Provenance recorded a second time for the same produced item.
    #[error("provenance for {0} was already recorded")]
    DuplicateProv(ItemId),

    /// An item reported as its own (transitive) source.
    #[error("provenance cycle through {0}")]
    ProvCycle(ItemId),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_offsets() {
        let err = CoreError::RangeOutOfBounds {
            start: 3,
            end: 9,
            len: 5,
        };
        insta::assert_snapshot!(
            err.to_string(),
            @"range 3..9 is out of bounds for text of length 5"
        );

        let err = CoreError::AmbiguousSplit {
            length: 4,
            offset: 2,
        };
        insta::assert_snapshot!(
            err.to_string(),
            @"cannot split a modified span of length 4 at interior offset 2"
        );
    }
}
