//! Span types anchoring annotation text to the original document.
//!
//! A [`Span`] is a half-open byte range into one reference text. A
//! [`ModifiedSpan`] stands for text that replaced one or more original
//! sub-spans (cleanup, normalization, insertion) and remembers which
//! sub-spans it consumed. [`AnySpan`] is the closed union the rest of the
//! crate works with.
//!
//! Offsets are byte offsets and must land on UTF-8 character boundaries;
//! the functions in [`span_ops`](crate::span_ops) validate this at every
//! public edge.

use serde::{Deserialize, Serialize};

/// Half-open byte range `start..end` into a reference text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Creates a span. Stored spans always satisfy `start < end`.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start < end, "span {}..{} is reversed or empty", start, end);
        Span { start, end }
    }

    /// Byte length of the denoted text.
    pub fn length(&self) -> usize {
        self.end - self.start
    }
}

/// Text that replaced one or more sub-spans of the original.
///
/// `length` is the byte length of the replacement text. `replaced_spans`
/// lists, left to right, the original sub-spans the replacement consumed,
/// with `None` marking inserted text that has no source counterpart. The
/// lengths of the replaced spans need not sum to `length`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiedSpan {
    pub length: usize,
    pub replaced_spans: Vec<Option<Span>>,
}

impl ModifiedSpan {
    /// Creates a modified span directly from simple replaced sub-spans.
    pub fn new(length: usize, replaced_spans: Vec<Option<Span>>) -> Self {
        ModifiedSpan {
            length,
            replaced_spans,
        }
    }

    /// Creates a modified span covering `consumed`, flattening any
    /// modified spans among them so the result references only simple
    /// spans or `None` — never a span of spans. Covering nothing records
    /// a single `None`: a pure insertion.
    pub fn covering(length: usize, consumed: &[AnySpan]) -> Self {
        if consumed.is_empty() {
            return ModifiedSpan {
                length,
                replaced_spans: vec![None],
            };
        }
        let mut replaced_spans = Vec::new();
        for span in consumed {
            match span {
                AnySpan::Simple(simple) => replaced_spans.push(Some(*simple)),
                AnySpan::Modified(modified) => {
                    replaced_spans.extend(modified.replaced_spans.iter().copied());
                }
            }
        }
        ModifiedSpan {
            length,
            replaced_spans,
        }
    }
}

/// Either kind of span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnySpan {
    Simple(Span),
    Modified(ModifiedSpan),
}

impl AnySpan {
    /// Byte length of the denoted text.
    pub fn length(&self) -> usize {
        match self {
            AnySpan::Simple(span) => span.length(),
            AnySpan::Modified(span) => span.length,
        }
    }
}

impl From<Span> for AnySpan {
    fn from(span: Span) -> Self {
        AnySpan::Simple(span)
    }
}

impl From<ModifiedSpan> for AnySpan {
    fn from(span: ModifiedSpan) -> Self {
        AnySpan::Modified(span)
    }
}
