//! Annotation, span-tracking, and provenance substrate for text pipelines.
//!
//! Documents are immutable raw text plus a growing set of derived
//! annotations. Every derived annotation stays anchored: its spans are
//! computed from its sources' spans through [`span_ops`], never by
//! searching the document, so any stretch of annotation text can be
//! mapped back to raw-text offsets even after arbitrary chains of
//! extraction and replacement. Alongside the anchoring, a provenance
//! graph records which operation produced which item from which sources.
//!
//! ## Core Types
//!
//! - [`TextDocument`] - Raw text plus label-indexed annotations
//! - [`Segment`] / [`Entity`] / [`Relation`] / [`Attribute`] - Annotation values
//! - [`Span`] / [`ModifiedSpan`] - Anchoring into the original text
//! - [`ProvTracer`] / [`ProvGraph`] - Lineage of every produced item
//! - [`Operation`] - The contract producers implement
//!
//! ## Example
//!
//! ```
//! use anchored_nlp::{span_ops, OperationDescription, ProvTracer, Segment, TextDocument};
//!
//! let mut doc = TextDocument::new("Sentence testing the dot. And more.");
//!
//! // derive a sentence from the raw segment, through the span algebra
//! let raw = doc.raw_segment().clone();
//! let (text, spans) = span_ops::extract(&raw.text, &raw.spans, &[(0, 24)]).unwrap();
//! let sentence = Segment::new("SENTENCE", text, spans);
//! let sentence_id = sentence.id;
//!
//! // record where it came from, then add it to the document
//! let tracer = ProvTracer::new();
//! let op = OperationDescription::new("sentence_splitter");
//! tracer.add_prov(sentence_id, &op, &[raw.id]).unwrap();
//! doc.add_annotation(sentence).unwrap();
//!
//! assert_eq!(
//!     doc.segments_with_label("SENTENCE")[0].text,
//!     "Sentence testing the dot"
//! );
//! assert_eq!(tracer.ancestors(sentence_id).unwrap(), vec![raw.id]);
//! ```

mod annotation;
mod display;
mod document;
mod error;
mod id;
mod operation;
mod prov;
mod span;
pub mod span_ops;

// Identifiers
pub use id::{ItemId, OperationId};

// Errors
pub use error::{CoreError, CoreResult};

// Span model
pub use span::{AnySpan, ModifiedSpan, Span};

// Annotation model
pub use annotation::{Annotation, AnnotationKind, Attribute, Entity, Relation, Segment};

// Document
pub use document::TextDocument;

// Provenance
pub use prov::{ProvGraph, ProvNode, ProvTracer};

// Operation contract
pub use operation::{Operation, OperationDescription};

// Debug rendering
pub use display::DocumentDisplay;
