//! Sentence segmentation driven by a configurable set of boundary characters.

use anchored_nlp::{span_ops, CoreResult, Operation, OperationDescription, ProvTracer, Segment};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{OpError, OpResult};

/// Label given to the segments a [`SentenceSplitter`] produces.
pub const SENTENCE_LABEL: &str = "SENTENCE";

/// Characters treated as sentence boundaries out of the box.
pub const DEFAULT_PUNCT_CHARS: [char; 6] = ['\r', '\n', '.', ';', '?', '!'];

static DEFAULT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\r\n.;?!]+").unwrap());

/// Splits segments into sentences at punctuation characters.
///
/// A sentence is a maximal run of non-boundary characters with its leading
/// whitespace dropped. Runs that are empty after the trim (stray whitespace
/// between two boundary characters) produce nothing. With `keep_punct` the
/// sentence also absorbs the whole run of boundary characters that follows
/// it, so `"Really?!"` stays one piece.
///
/// Each sentence keeps spans into the source segment's origin, and when a
/// tracer is attached every produced segment is recorded against the segment
/// it was cut from before [`run`](Operation::run) returns.
#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    punct_chars: Vec<char>,
    keep_punct: bool,
    output_label: String,
    attrs_to_copy: Vec<String>,
    pattern: Regex,
    description: OperationDescription,
    tracer: Option<ProvTracer>,
}

impl SentenceSplitter {
    pub fn new() -> Self {
        let mut splitter = SentenceSplitter {
            punct_chars: DEFAULT_PUNCT_CHARS.to_vec(),
            keep_punct: false,
            output_label: SENTENCE_LABEL.to_owned(),
            attrs_to_copy: Vec::new(),
            pattern: DEFAULT_PATTERN.clone(),
            description: OperationDescription::new("sentence_splitter"),
            tracer: None,
        };
        splitter.refresh_description();
        splitter
    }

    /// Replaces the boundary character set. Fails on an empty set.
    pub fn with_punct_chars(mut self, punct_chars: &[char]) -> OpResult<Self> {
        self.pattern = compile_pattern(punct_chars)?;
        self.punct_chars = punct_chars.to_vec();
        self.refresh_description();
        Ok(self)
    }

    /// Keeps the trailing boundary characters inside each sentence.
    pub fn with_keep_punct(mut self, keep_punct: bool) -> Self {
        self.keep_punct = keep_punct;
        self.refresh_description();
        self
    }

    pub fn with_output_label(mut self, label: impl Into<String>) -> Self {
        self.output_label = label.into();
        self.refresh_description();
        self
    }

    /// Copies every source attribute carrying one of `labels` onto each
    /// sentence, as a fresh attribute with its own lineage.
    pub fn with_attrs_to_copy(mut self, labels: &[&str]) -> Self {
        self.attrs_to_copy = labels.iter().map(|label| (*label).to_owned()).collect();
        self.refresh_description();
        self
    }

    pub fn with_tracer(mut self, tracer: ProvTracer) -> Self {
        self.tracer = Some(tracer);
        self
    }

    // Builders change the configuration, not the operation's identity.
    fn refresh_description(&mut self) {
        let id = self.description.id;
        let mut description = OperationDescription::new("sentence_splitter")
            .with_param("punct_chars", self.punct_chars.iter().collect::<String>())
            .with_param("keep_punct", self.keep_punct)
            .with_param("output_label", self.output_label.clone())
            .with_param("attrs_to_copy", self.attrs_to_copy.clone());
        description.id = id;
        self.description = description;
    }

    fn split_segment(&self, source: &Segment, outputs: &mut Vec<Segment>) -> CoreResult<()> {
        for found in self.pattern.find_iter(&source.text) {
            let body = found.as_str();
            let trimmed = body.trim_start();
            if trimmed.is_empty() {
                continue;
            }
            let start = found.start() + (body.len() - trimmed.len());
            let end = if self.keep_punct {
                found.end() + boundary_run_len(&source.text[found.end()..], &self.punct_chars)
            } else {
                found.end()
            };
            let (text, spans) = span_ops::extract(&source.text, &source.spans, &[(start, end)])?;
            let sentence = Segment::new(self.output_label.clone(), text, spans);
            self.emit(sentence, source, outputs)?;
        }
        Ok(())
    }

    /// Single exit for produced segments: attaches copied attributes and
    /// records provenance, then hands the sentence over.
    fn emit(
        &self,
        mut sentence: Segment,
        source: &Segment,
        outputs: &mut Vec<Segment>,
    ) -> CoreResult<()> {
        for label in &self.attrs_to_copy {
            for attr in source.attrs_with_label(label) {
                let copy = attr.duplicated();
                if let Some(tracer) = &self.tracer {
                    tracer.add_prov(copy.id, &self.description, &[attr.id])?;
                }
                sentence.add_attr(copy);
            }
        }
        if let Some(tracer) = &self.tracer {
            tracer.add_prov(sentence.id, &self.description, &[source.id])?;
        }
        outputs.push(sentence);
        Ok(())
    }
}

impl Default for SentenceSplitter {
    fn default() -> Self {
        SentenceSplitter::new()
    }
}

impl Operation for SentenceSplitter {
    type Input = Segment;
    type Output = Segment;

    fn description(&self) -> &OperationDescription {
        &self.description
    }

    fn run(&self, inputs: &[Segment]) -> CoreResult<Vec<Segment>> {
        let mut outputs = Vec::new();
        for source in inputs {
            self.split_segment(source, &mut outputs)?;
        }
        log::debug!(
            "split {} segment(s) into {} sentence(s)",
            inputs.len(),
            outputs.len()
        );
        Ok(outputs)
    }
}

fn compile_pattern(punct_chars: &[char]) -> OpResult<Regex> {
    let mut class = String::new();
    for &c in punct_chars {
        escape_into_class(c, &mut class);
    }
    let pattern = format!("[^{class}]+");
    Regex::new(&pattern).map_err(|source| OpError::InvalidPattern { pattern, source })
}

fn escape_into_class(c: char, class: &mut String) {
    match c {
        '\r' => class.push_str(r"\r"),
        '\n' => class.push_str(r"\n"),
        '\t' => class.push_str(r"\t"),
        '^' | ']' | '\\' | '-' | '&' | '~' => {
            class.push('\\');
            class.push(c);
        }
        c => class.push(c),
    }
}

/// Byte length of the boundary-character run at the start of `rest`.
fn boundary_run_len(rest: &str, punct_chars: &[char]) -> usize {
    rest.chars()
        .take_while(|c| punct_chars.contains(c))
        .map(char::len_utf8)
        .sum()
}
