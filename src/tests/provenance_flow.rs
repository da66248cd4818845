//! The operation contract end to end: a producer whose every output is
//! recorded before `run` returns.

use crate::span_ops;
use crate::{
    CoreResult, Operation, OperationDescription, ProvTracer, Segment, TextDocument,
};

/// Splits segments on a literal separator character.
///
/// Outputs only leave through [`emit`](LiteralSplitter::emit), so an
/// output without a provenance record cannot exist.
struct LiteralSplitter {
    separator: char,
    description: OperationDescription,
    tracer: Option<ProvTracer>,
}

impl LiteralSplitter {
    fn new(separator: char) -> Self {
        LiteralSplitter {
            separator,
            description: OperationDescription::new("literal_splitter")
                .with_param("separator", separator.to_string()),
            tracer: None,
        }
    }

    fn with_tracer(mut self, tracer: ProvTracer) -> Self {
        self.tracer = Some(tracer);
        self
    }

    fn emit(&self, piece: Segment, source: &Segment) -> CoreResult<Segment> {
        if let Some(tracer) = &self.tracer {
            tracer.add_prov(piece.id, &self.description, &[source.id])?;
        }
        Ok(piece)
    }

    fn split_one(&self, source: &Segment, outputs: &mut Vec<Segment>) -> CoreResult<()> {
        let mut cursor = 0;
        for (index, _) in source.text.match_indices(self.separator) {
            if index > cursor {
                let (text, spans) =
                    span_ops::extract(&source.text, &source.spans, &[(cursor, index)])?;
                outputs.push(self.emit(Segment::new("PIECE", text, spans), source)?);
            }
            cursor = index + self.separator.len_utf8();
        }
        if cursor < source.text.len() {
            let (text, spans) =
                span_ops::extract(&source.text, &source.spans, &[(cursor, source.text.len())])?;
            outputs.push(self.emit(Segment::new("PIECE", text, spans), source)?);
        }
        Ok(())
    }
}

impl Operation for LiteralSplitter {
    type Input = Segment;
    type Output = Segment;

    fn description(&self) -> &OperationDescription {
        &self.description
    }

    fn run(&self, inputs: &[Segment]) -> CoreResult<Vec<Segment>> {
        let mut outputs = Vec::new();
        for source in inputs {
            self.split_one(source, &mut outputs)?;
        }
        Ok(outputs)
    }
}

#[test]
fn test_every_output_is_recorded_before_run_returns() {
    let document = TextDocument::new("alpha;beta;gamma");
    let tracer = ProvTracer::new();
    let splitter = LiteralSplitter::new(';').with_tracer(tracer.clone());

    let pieces = splitter
        .run(std::slice::from_ref(document.raw_segment()))
        .unwrap();
    assert_eq!(pieces.len(), 3);
    for piece in &pieces {
        let node = tracer.node(piece.id).unwrap();
        assert_eq!(node.operation_id, Some(splitter.id()));
        assert_eq!(node.source_ids, vec![document.raw_segment().id]);
    }

    let registered = tracer.operation(splitter.id()).unwrap();
    assert_eq!(
        registered.config.get("separator"),
        Some(&serde_json::json!(";"))
    );
}

#[test]
fn test_outputs_recover_their_text_from_the_raw_document() {
    let mut document = TextDocument::new("alpha;beta;gamma");
    let splitter = LiteralSplitter::new(';');

    let pieces = splitter
        .run(std::slice::from_ref(document.raw_segment()))
        .unwrap();
    let texts: Vec<&str> = pieces.iter().map(|piece| piece.text.as_str()).collect();
    assert_eq!(texts, vec!["alpha", "beta", "gamma"]);

    for piece in pieces {
        let recovered: String = piece
            .source_spans()
            .iter()
            .map(|span| &document.text()[span.start..span.end])
            .collect();
        assert_eq!(recovered, piece.text);
        document.add_annotation(piece).unwrap();
    }
    assert_eq!(document.annotations_with_label("PIECE").len(), 3);
}

#[test]
fn test_running_without_a_tracer_still_produces() {
    let document = TextDocument::new("alpha;beta");
    let splitter = LiteralSplitter::new(';');
    let pieces = splitter
        .run(std::slice::from_ref(document.raw_segment()))
        .unwrap();
    assert_eq!(pieces.len(), 2);
}

#[test]
fn test_second_stage_chains_lineage_back_to_the_raw_segment() {
    let document = TextDocument::new("one two;three");
    let tracer = ProvTracer::new();
    let semicolons = LiteralSplitter::new(';').with_tracer(tracer.clone());
    let spaces = LiteralSplitter::new(' ').with_tracer(tracer.clone());

    let halves = semicolons
        .run(std::slice::from_ref(document.raw_segment()))
        .unwrap();
    let words = spaces.run(&halves).unwrap();
    assert_eq!(words.len(), 3);

    let first_word = &words[0];
    assert_eq!(first_word.text, "one");
    assert_eq!(
        tracer.ancestors(first_word.id).unwrap(),
        vec![halves[0].id, document.raw_segment().id]
    );
}
