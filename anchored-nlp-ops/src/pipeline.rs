//! Pipeline presets that wire operations onto a document in order.

use anchored_nlp::{CoreResult, ItemId, Operation, ProvTracer, Segment, TextDocument};

use crate::cleanup::{TextCleaner, CLEAN_TEXT_LABEL};
use crate::sentence_split::SentenceSplitter;

/// Runs a fixed sequence of operations over a [`TextDocument`].
///
/// Each step reads the document's segments under one label and adds its
/// outputs back, so later steps can pick them up by the label the earlier
/// step produced. Presets cover the common arrangements:
/// - [`standard()`](Pipeline::standard) - clean the raw text, then split the
///   cleaned text into sentences
/// - [`sentences_only()`](Pipeline::sentences_only) - split the raw text
///   directly
#[derive(Debug, Clone)]
pub struct Pipeline {
    steps: Vec<Step>,
}

#[derive(Debug, Clone)]
enum Step {
    Clean { input_label: String, op: TextCleaner },
    Split { input_label: String, op: SentenceSplitter },
}

impl Step {
    fn input_label(&self) -> &str {
        match self {
            Step::Clean { input_label, .. } | Step::Split { input_label, .. } => input_label,
        }
    }
}

impl Pipeline {
    /// A pipeline with no steps; add them with the `then_*` builders.
    pub fn new() -> Self {
        Pipeline { steps: Vec::new() }
    }

    /// Clean the raw text, then split the cleaned text into sentences.
    pub fn standard() -> Self {
        Pipeline::new()
            .then_clean(TextDocument::RAW_LABEL, TextCleaner::new())
            .then_split(CLEAN_TEXT_LABEL, SentenceSplitter::new())
    }

    /// Split the raw text into sentences, without any cleanup.
    pub fn sentences_only() -> Self {
        Pipeline::new().then_split(TextDocument::RAW_LABEL, SentenceSplitter::new())
    }

    /// Appends a cleanup step reading the segments labeled `input_label`.
    pub fn then_clean(mut self, input_label: impl Into<String>, op: TextCleaner) -> Self {
        self.steps.push(Step::Clean {
            input_label: input_label.into(),
            op,
        });
        self
    }

    /// Appends a splitting step reading the segments labeled `input_label`.
    pub fn then_split(mut self, input_label: impl Into<String>, op: SentenceSplitter) -> Self {
        self.steps.push(Step::Split {
            input_label: input_label.into(),
            op,
        });
        self
    }

    /// Attaches `tracer` to every step, current and preset alike.
    pub fn with_tracer(mut self, tracer: ProvTracer) -> Self {
        self.steps = self
            .steps
            .into_iter()
            .map(|step| match step {
                Step::Clean { input_label, op } => Step::Clean {
                    input_label,
                    op: op.with_tracer(tracer.clone()),
                },
                Step::Split { input_label, op } => Step::Split {
                    input_label,
                    op: op.with_tracer(tracer.clone()),
                },
            })
            .collect();
        self
    }

    /// Runs every step in order, adding outputs to `document`.
    ///
    /// Returns the ids of the annotations the run created, in creation
    /// order. The document already holds them when this returns.
    pub fn run_on_document(&self, document: &mut TextDocument) -> CoreResult<Vec<ItemId>> {
        let mut created = Vec::new();
        for step in &self.steps {
            let inputs: Vec<Segment> = document
                .segments_with_label(step.input_label())
                .into_iter()
                .cloned()
                .collect();
            log::debug!(
                "pipeline step reading {} segment(s) labeled {:?}",
                inputs.len(),
                step.input_label()
            );
            let outputs = match step {
                Step::Clean { op, .. } => op.run(&inputs)?,
                Step::Split { op, .. } => op.run(&inputs)?,
            };
            for segment in outputs {
                created.push(document.add_annotation(segment)?);
            }
        }
        Ok(created)
    }

    /// Builds a document from `text` and runs every step on it.
    pub fn run_on_text(&self, text: &str) -> CoreResult<TextDocument> {
        let mut document = TextDocument::new(text);
        self.run_on_document(&mut document)?;
        Ok(document)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Pipeline::new()
    }
}
