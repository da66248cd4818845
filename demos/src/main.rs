use anchored_nlp::{
    Attribute, CoreResult, DocumentDisplay, Entity, ProvTracer, Relation, Span, TextDocument,
};
use anchored_nlp_ops::{Pipeline, SENTENCE_LABEL};
use tracing::{info, Level};

const SAMPLE: &str =
    "The quick brown fox\njumps over the lazy dog. It was not amused.  Thanks;\ngoodbye!";

fn main() -> CoreResult<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    let tracer = ProvTracer::new();
    let mut document = TextDocument::new(SAMPLE);

    // Clean the raw text, then cut the cleaned text into sentences
    let created = Pipeline::standard()
        .with_tracer(tracer.clone())
        .run_on_document(&mut document)?;
    info!("pipeline created {} annotation(s)", created.len());

    for sentence in document.segments_with_label(SENTENCE_LABEL) {
        let origins: Vec<String> = sentence
            .source_spans()
            .iter()
            .map(|span| format!("{}..{}", span.start, span.end))
            .collect();
        println!(
            "{:10} {:?} <- bytes {}",
            sentence.label,
            sentence.text,
            origins.join(", ")
        );
    }

    // Hand-made annotations sit next to pipeline output
    if let Some(start) = document.text().find("fox") {
        let fox = Entity::new("ANIMAL", "fox", vec![Span::new(start, start + 3).into()])
            .with_attr(Attribute::new("species", "vulpes"));
        let fox_id = document.add_annotation(fox)?;

        let sentence_id = document
            .segments_with_label(SENTENCE_LABEL)
            .first()
            .map(|sentence| sentence.id);
        if let Some(sentence_id) = sentence_id {
            document.add_annotation(Relation::new("mentioned_in", fox_id, sentence_id))?;
        }
    }

    println!();
    println!(
        "{}",
        DocumentDisplay::new(&document)
            .with_label(SENTENCE_LABEL)
            .with_label("ANIMAL")
    );

    println!();
    println!("lineage:");
    for id in &created {
        let node = tracer.node(*id)?;
        let producer = node
            .operation_id
            .and_then(|operation| tracer.operation(operation))
            .map(|operation| operation.name)
            .unwrap_or_else(|| "unknown".to_owned());
        let chain: Vec<String> = tracer
            .ancestors(*id)?
            .iter()
            .map(|ancestor| ancestor.to_string())
            .collect();
        println!("  {id} ({producer}) <- {}", chain.join(" <- "));
    }

    Ok(())
}
