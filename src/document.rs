//! The document: immutable raw text plus every annotation derived from it.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::annotation::{Annotation, Entity, Relation, Segment};
use crate::error::{CoreError, CoreResult};
use crate::id::ItemId;
use crate::span::{AnySpan, Span};

/// A text document accumulating annotations.
///
/// The raw text is set at construction and never changes; everything else
/// is appended through [`add_annotation`](TextDocument::add_annotation).
/// A distinguished segment labeled [`RAW_LABEL`](TextDocument::RAW_LABEL)
/// covers the whole text and is the root every derived segment traces
/// back to; it is addressable but not listed among the document's
/// annotations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextDocument {
    id: ItemId,
    text: String,
    raw_segment: Segment,
    annotations: HashMap<ItemId, Annotation>,
    order: Vec<ItemId>,
    by_label: HashMap<String, Vec<ItemId>>,
    metadata: BTreeMap<String, Value>,
}

impl TextDocument {
    /// Label reserved for the raw text segment.
    pub const RAW_LABEL: &'static str = "RAW_TEXT";

    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let spans = if text.is_empty() {
            Vec::new()
        } else {
            vec![AnySpan::Simple(Span::new(0, text.len()))]
        };
        let raw_segment = Segment::new(Self::RAW_LABEL, text.clone(), spans);
        TextDocument {
            id: ItemId::generate(),
            text,
            raw_segment,
            annotations: HashMap::new(),
            order: Vec::new(),
            by_label: HashMap::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    /// The immutable raw text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The segment covering the whole raw text.
    pub fn raw_segment(&self) -> &Segment {
        &self.raw_segment
    }

    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    /// Adds an annotation and indexes it by label.
    ///
    /// Fails without touching the document if the id is already present
    /// or the label is reserved; the main map and the label index are
    /// never observed in disagreement.
    pub fn add_annotation(&mut self, annotation: impl Into<Annotation>) -> CoreResult<ItemId> {
        let annotation = annotation.into();
        let id = annotation.id();
        if annotation.label() == Self::RAW_LABEL {
            return Err(CoreError::ReservedLabel(annotation.label().to_owned()));
        }
        if self.annotations.contains_key(&id) || id == self.raw_segment.id {
            return Err(CoreError::DuplicateAnnotation(id));
        }
        self.by_label
            .entry(annotation.label().to_owned())
            .or_default()
            .push(id);
        self.order.push(id);
        self.annotations.insert(id, annotation);
        Ok(id)
    }

    /// Looks an annotation up by id, failing loudly when absent.
    pub fn annotation(&self, id: ItemId) -> CoreResult<&Annotation> {
        self.annotations
            .get(&id)
            .ok_or(CoreError::AnnotationNotFound(id))
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.annotations.contains_key(&id)
    }

    /// All annotations in insertion order. The raw segment is not listed.
    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> + '_ {
        self.order.iter().filter_map(move |id| self.annotations.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Annotations carrying `label`, in insertion order; empty when none.
    pub fn annotations_with_label(&self, label: &str) -> Vec<&Annotation> {
        self.by_label
            .get(label)
            .into_iter()
            .flatten()
            .filter_map(|id| self.annotations.get(id))
            .collect()
    }

    /// Segments carrying `label`. [`RAW_LABEL`](Self::RAW_LABEL) resolves
    /// to the raw segment.
    pub fn segments_with_label(&self, label: &str) -> Vec<&Segment> {
        if label == Self::RAW_LABEL {
            return vec![&self.raw_segment];
        }
        self.annotations_with_label(label)
            .into_iter()
            .filter_map(Annotation::as_segment)
            .collect()
    }

    pub fn segments(&self) -> Vec<&Segment> {
        self.annotations().filter_map(Annotation::as_segment).collect()
    }

    pub fn entities(&self) -> Vec<&Entity> {
        self.annotations().filter_map(Annotation::as_entity).collect()
    }

    pub fn relations(&self) -> Vec<&Relation> {
        self.annotations().filter_map(Annotation::as_relation).collect()
    }

    /// Resolves a relation's endpoints, failing loudly if either is
    /// missing. Relations may be added before the annotations they point
    /// at; integrity is checked here, at lookup time.
    pub fn relation_endpoints(
        &self,
        relation: &Relation,
    ) -> CoreResult<(&Annotation, &Annotation)> {
        Ok((
            self.annotation(relation.source_id)?,
            self.annotation(relation.target_id)?,
        ))
    }
}
