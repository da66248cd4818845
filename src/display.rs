//! Debug rendering of a document and its annotations.

use std::fmt;
use std::fmt::Write;

use unicode_width::UnicodeWidthStr;

use crate::document::TextDocument;
use crate::span_ops;

// Sentence one. And two.
// ╰───────────╯ SENTENCE
//               ╰──────╯ SENTENCE
//
// Underlines sit below where each annotation projects back onto the raw
// text; a discontiguous projection draws one underline per piece. Control
// characters are substituted with width-one symbols so columns line up:
//
// one␊two
// ╰─╯ WORD
//     ╰─╯ WORD
/// Renders the raw text with box-drawing underlines beneath every
/// included annotation, one line per annotation, in insertion order.
///
/// Annotations without an anchoring (relations, pure insertions) are
/// skipped. A debug aid; the exact glyphs carry no stability guarantee.
pub struct DocumentDisplay<'a> {
    document: &'a TextDocument,
    include_labels: Vec<String>,
}

impl<'a> DocumentDisplay<'a> {
    pub fn new(document: &'a TextDocument) -> Self {
        DocumentDisplay {
            document,
            include_labels: Vec::new(),
        }
    }

    pub fn include_label(&mut self, label: impl Into<String>) {
        self.include_labels.push(label.into());
    }

    /// Takes self
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.include_label(label);
        self
    }

    fn column_at(&self, byte_offset: usize) -> usize {
        match self.document.text().get(..byte_offset) {
            Some(prefix) => {
                let sanitized: String = prefix.chars().map(substitute_control).collect();
                UnicodeWidthStr::width(sanitized.as_str())
            }
            None => byte_offset,
        }
    }
}

impl fmt::Display for DocumentDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sanitized: String = self
            .document
            .text()
            .chars()
            .map(substitute_control)
            .collect();
        f.write_str(&sanitized)?;

        for annotation in self.document.annotations() {
            if !self
                .include_labels
                .iter()
                .any(|label| label == annotation.label())
            {
                continue;
            }
            let spans = match annotation.spans() {
                Some(spans) => spans,
                None => continue,
            };
            let mut projected = span_ops::source_spans(spans);
            if projected.is_empty() {
                continue;
            }
            projected.sort_by_key(|span| span.start);

            f.write_char('\n')?;
            let mut column = 0;
            for span in &projected {
                let start_col = self.column_at(span.start);
                let end_col = self.column_at(span.end);
                while column < start_col {
                    f.write_char(' ')?;
                    column += 1;
                }
                f.write_char('╰')?;
                column += 1;
                while column + 1 < end_col {
                    f.write_char('─')?;
                    column += 1;
                }
                if end_col > start_col + 1 {
                    f.write_char('╯')?;
                    column += 1;
                }
            }
            write!(f, " {}", annotation.label())?;
        }
        Ok(())
    }
}

fn substitute_control(c: char) -> char {
    match c {
        '\r' => '␍',
        '\n' => '␊',
        '\t' => '␉',
        c => c,
    }
}
