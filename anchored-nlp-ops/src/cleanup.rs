//! Text normalization that keeps every byte traceable to the original.

use anchored_nlp::{span_ops, CoreResult, Operation, OperationDescription, ProvTracer, Segment};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{OpError, OpResult};

/// Label given to the segments a [`TextCleaner`] produces.
pub const CLEAN_TEXT_LABEL: &str = "CLEAN_TEXT";

static DEFAULT_RULES: Lazy<Vec<(Regex, String)>> = Lazy::new(|| {
    vec![
        // a line break plus the whitespace hugging it becomes one space
        (Regex::new(r"[ \t]*\r?\n[ \t]*").unwrap(), " ".to_owned()),
        (Regex::new(r"[ \t]{2,}").unwrap(), " ".to_owned()),
    ]
});

/// Rewrites segment text through an ordered list of pattern replacements.
///
/// Rules run in order, each over the output of the previous one, and every
/// replacement goes through the span algebra, so the cleaned text still knows
/// where each of its bytes came from. The default rules collapse line breaks
/// and runs of blanks into single spaces, which turns hard-wrapped input into
/// one line per paragraph without losing the original offsets.
#[derive(Debug, Clone)]
pub struct TextCleaner {
    rules: Vec<(Regex, String)>,
    output_label: String,
    description: OperationDescription,
    tracer: Option<ProvTracer>,
}

impl TextCleaner {
    pub fn new() -> Self {
        let mut cleaner = TextCleaner {
            rules: DEFAULT_RULES.clone(),
            output_label: CLEAN_TEXT_LABEL.to_owned(),
            description: OperationDescription::new("text_cleaner"),
            tracer: None,
        };
        cleaner.refresh_description();
        cleaner
    }

    /// Replaces the rule list with `(pattern, replacement)` pairs.
    pub fn with_rules(mut self, rules: &[(&str, &str)]) -> OpResult<Self> {
        let mut compiled = Vec::with_capacity(rules.len());
        for (pattern, replacement) in rules {
            let regex = Regex::new(pattern).map_err(|source| OpError::InvalidPattern {
                pattern: (*pattern).to_owned(),
                source,
            })?;
            compiled.push((regex, (*replacement).to_owned()));
        }
        self.rules = compiled;
        self.refresh_description();
        Ok(self)
    }

    pub fn with_output_label(mut self, label: impl Into<String>) -> Self {
        self.output_label = label.into();
        self.refresh_description();
        self
    }

    pub fn with_tracer(mut self, tracer: ProvTracer) -> Self {
        self.tracer = Some(tracer);
        self
    }

    fn refresh_description(&mut self) {
        let id = self.description.id;
        let rules: Vec<Vec<String>> = self
            .rules
            .iter()
            .map(|(regex, replacement)| vec![regex.as_str().to_owned(), replacement.clone()])
            .collect();
        let mut description = OperationDescription::new("text_cleaner")
            .with_param("rules", rules)
            .with_param("output_label", self.output_label.clone());
        description.id = id;
        self.description = description;
    }

    fn clean_segment(&self, source: &Segment, outputs: &mut Vec<Segment>) -> CoreResult<()> {
        let mut text = source.text.clone();
        let mut spans = source.spans.clone();
        for (regex, replacement) in &self.rules {
            let ranges: Vec<(usize, usize)> = regex
                .find_iter(&text)
                .map(|found| (found.start(), found.end()))
                .collect();
            if ranges.is_empty() {
                continue;
            }
            let replacements = vec![replacement.as_str(); ranges.len()];
            let (next_text, next_spans) = span_ops::replace(&text, &spans, &ranges, &replacements)?;
            text = next_text;
            spans = next_spans;
        }
        let clean = Segment::new(self.output_label.clone(), text, spans);
        if let Some(tracer) = &self.tracer {
            tracer.add_prov(clean.id, &self.description, &[source.id])?;
        }
        outputs.push(clean);
        Ok(())
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        TextCleaner::new()
    }
}

impl Operation for TextCleaner {
    type Input = Segment;
    type Output = Segment;

    fn description(&self) -> &OperationDescription {
        &self.description
    }

    fn run(&self, inputs: &[Segment]) -> CoreResult<Vec<Segment>> {
        let mut outputs = Vec::new();
        for source in inputs {
            self.clean_segment(source, &mut outputs)?;
        }
        log::debug!("cleaned {} segment(s)", inputs.len());
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchored_nlp::Span;

    fn clean_one(cleaner: &TextCleaner, text: &str) -> Segment {
        let source = Segment::new("PAGE", text, vec![Span::new(0, text.len()).into()]);
        let mut outputs = cleaner.run(std::slice::from_ref(&source)).unwrap();
        assert_eq!(outputs.len(), 1);
        outputs.remove(0)
    }

    #[test]
    fn test_line_breaks_collapse_to_single_spaces() {
        let clean = clean_one(&TextCleaner::new(), "Line one\n  line two");
        assert_eq!(clean.text, "Line one line two");
        assert_eq!(clean.label, CLEAN_TEXT_LABEL);
    }

    #[test]
    fn test_cleaned_text_still_projects_into_the_original() {
        let original = "Line one\n  line two";
        let clean = clean_one(&TextCleaner::new(), original);

        // "line two" sits at 9..17 in the cleaned text
        let (word, spans) = span_ops::extract(&clean.text, &clean.spans, &[(9, 17)]).unwrap();
        assert_eq!(word, "line two");
        assert_eq!(span_ops::source_spans(&spans), vec![Span::new(11, 19)]);
        assert_eq!(&original[11..19], "line two");
    }

    #[test]
    fn test_blank_runs_collapse_even_without_line_breaks() {
        let clean = clean_one(&TextCleaner::new(), "a  \t b");
        assert_eq!(clean.text, "a b");
    }

    #[test]
    fn test_rules_apply_in_order_over_each_other_s_output() {
        let cleaner = TextCleaner::new()
            .with_rules(&[("ab", "X"), ("Xc", "Y")])
            .unwrap();
        let clean = clean_one(&cleaner, "abc");
        assert_eq!(clean.text, "Y");
        assert_eq!(clean.source_spans(), vec![Span::new(0, 3)]);
    }

    #[test]
    fn test_bad_rule_pattern_is_rejected_at_construction() {
        let result = TextCleaner::new().with_rules(&[("(", "x")]);
        assert!(matches!(
            result,
            Err(OpError::InvalidPattern { pattern, .. }) if pattern == "("
        ));
    }

    #[test]
    fn test_description_records_the_rules() {
        let cleaner = TextCleaner::new().with_rules(&[("foo", "bar")]).unwrap();
        assert_eq!(
            cleaner.description().config["rules"],
            serde_json::json!([["foo", "bar"]])
        );
    }
}
