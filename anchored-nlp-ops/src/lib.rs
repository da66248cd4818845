//! Ready-made operations for [`anchored_nlp`] documents.
//!
//! Everything here runs through the span algebra, so whatever an operation
//! produces still points back at the exact bytes of the original document,
//! and every produced item can be recorded in a provenance graph by handing
//! the operation a [`ProvTracer`](anchored_nlp::ProvTracer).
//!
//! ## Operations
//!
//! - [`TextCleaner`]: pattern-based text normalization that keeps offsets
//! - [`SentenceSplitter`]: punctuation-driven sentence segmentation
//! - [`Pipeline`]: presets that wire the operations onto a document
//!
//! ## Example
//!
//! ```
//! use anchored_nlp::{ProvTracer, TextDocument};
//! use anchored_nlp_ops::Pipeline;
//!
//! # fn main() -> anchored_nlp::CoreResult<()> {
//! let tracer = ProvTracer::new();
//! let mut document = TextDocument::new("One sentence. And another.");
//!
//! let pipeline = Pipeline::sentences_only().with_tracer(tracer.clone());
//! let created = pipeline.run_on_document(&mut document)?;
//!
//! assert_eq!(created.len(), 2);
//! assert_eq!(document.annotation(created[0])?.text(), Some("One sentence"));
//! // every sentence traces back to the raw text
//! assert_eq!(tracer.ancestors(created[0])?, vec![document.raw_segment().id]);
//! # Ok(())
//! # }
//! ```

mod cleanup;
mod error;
mod pipeline;
mod sentence_split;

// Text cleanup
pub use cleanup::{TextCleaner, CLEAN_TEXT_LABEL};

// Sentence segmentation
pub use sentence_split::{SentenceSplitter, DEFAULT_PUNCT_CHARS, SENTENCE_LABEL};

// Pipelines
pub use pipeline::Pipeline;

// Errors
pub use error::{OpError, OpResult};

#[cfg(test)]
mod tests {
    mod pipeline_flow;
    mod segmentation;
}
