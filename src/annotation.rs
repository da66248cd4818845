//! Annotation value types: segments, entities, relations, attributes.
//!
//! The three annotation kinds form one closed enum, [`Annotation`], with
//! the common id/label/attribute surface on it. Segments and entities
//! anchor text through spans; relations connect two other annotations by
//! id and carry no spans of their own.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::ItemId;
use crate::span::{AnySpan, Span};
use crate::span_ops;

/// A labeled value attached to exactly one owning annotation.
///
/// The value is opaque JSON: a normalized code, a boolean flag, a score.
/// `metadata` carries free-form context such as the producing algorithm's
/// version. Attributes are never shared; propagating one onto another
/// annotation goes through [`duplicated`](Attribute::duplicated).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: ItemId,
    pub label: String,
    pub value: Value,
    pub metadata: BTreeMap<String, Value>,
}

impl Attribute {
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Attribute {
            id: ItemId::generate(),
            label: label.into(),
            value: value.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// A fresh-id copy carrying the same label, value, and metadata.
    ///
    /// The copy is a new data item; record its provenance against the
    /// attribute it came from.
    pub fn duplicated(&self) -> Attribute {
        Attribute {
            id: ItemId::generate(),
            label: self.label.clone(),
            value: self.value.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

/// A stretch of document text under a category label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: ItemId,
    pub label: String,
    pub text: String,
    pub spans: Vec<AnySpan>,
    pub attrs: Vec<Attribute>,
}

impl Segment {
    /// Creates a segment. `spans` must cover `text` exactly.
    pub fn new(label: impl Into<String>, text: impl Into<String>, spans: Vec<AnySpan>) -> Self {
        let text = text.into();
        debug_assert_eq!(
            spans.iter().map(AnySpan::length).sum::<usize>(),
            text.len(),
            "segment spans must cover its text"
        );
        Segment {
            id: ItemId::generate(),
            label: label.into(),
            text,
            spans,
            attrs: Vec::new(),
        }
    }

    pub fn with_attr(mut self, attr: Attribute) -> Self {
        self.attrs.push(attr);
        self
    }

    pub fn add_attr(&mut self, attr: Attribute) {
        self.attrs.push(attr);
    }

    /// Attributes carrying `label`, in attachment order.
    pub fn attrs_with_label<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a Attribute> {
        self.attrs.iter().filter(move |attr| attr.label == label)
    }

    /// Where this segment's text sits in the original document.
    pub fn source_spans(&self) -> Vec<Span> {
        span_ops::source_spans(&self.spans)
    }
}

/// A mention of something, found in the text by a producer.
///
/// Same anchoring shape as [`Segment`]; the two kinds differ in role, not
/// in structure — segments partition text for further processing,
/// entities are findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: ItemId,
    pub label: String,
    pub text: String,
    pub spans: Vec<AnySpan>,
    pub attrs: Vec<Attribute>,
}

impl Entity {
    /// Creates an entity. `spans` must cover `text` exactly.
    pub fn new(label: impl Into<String>, text: impl Into<String>, spans: Vec<AnySpan>) -> Self {
        let text = text.into();
        debug_assert_eq!(
            spans.iter().map(AnySpan::length).sum::<usize>(),
            text.len(),
            "entity spans must cover its text"
        );
        Entity {
            id: ItemId::generate(),
            label: label.into(),
            text,
            spans,
            attrs: Vec::new(),
        }
    }

    pub fn with_attr(mut self, attr: Attribute) -> Self {
        self.attrs.push(attr);
        self
    }

    pub fn add_attr(&mut self, attr: Attribute) {
        self.attrs.push(attr);
    }

    /// Attributes carrying `label`, in attachment order.
    pub fn attrs_with_label<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a Attribute> {
        self.attrs.iter().filter(move |attr| attr.label == label)
    }

    /// Where this entity's text sits in the original document.
    pub fn source_spans(&self) -> Vec<Span> {
        span_ops::source_spans(&self.spans)
    }
}

/// A labeled, directed connection between two annotations.
///
/// Endpoints are referenced by id and resolved lazily; see
/// [`TextDocument::relation_endpoints`](crate::TextDocument::relation_endpoints).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub id: ItemId,
    pub label: String,
    pub source_id: ItemId,
    pub target_id: ItemId,
    pub attrs: Vec<Attribute>,
}

impl Relation {
    pub fn new(label: impl Into<String>, source_id: ItemId, target_id: ItemId) -> Self {
        Relation {
            id: ItemId::generate(),
            label: label.into(),
            source_id,
            target_id,
            attrs: Vec::new(),
        }
    }

    pub fn with_attr(mut self, attr: Attribute) -> Self {
        self.attrs.push(attr);
        self
    }

    pub fn add_attr(&mut self, attr: Attribute) {
        self.attrs.push(attr);
    }
}

/// Which kind an [`Annotation`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationKind {
    Segment,
    Entity,
    Relation,
}

/// Any annotation a document can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Annotation {
    Segment(Segment),
    Entity(Entity),
    Relation(Relation),
}

impl Annotation {
    pub fn id(&self) -> ItemId {
        match self {
            Annotation::Segment(segment) => segment.id,
            Annotation::Entity(entity) => entity.id,
            Annotation::Relation(relation) => relation.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Annotation::Segment(segment) => &segment.label,
            Annotation::Entity(entity) => &entity.label,
            Annotation::Relation(relation) => &relation.label,
        }
    }

    pub fn kind(&self) -> AnnotationKind {
        match self {
            Annotation::Segment(_) => AnnotationKind::Segment,
            Annotation::Entity(_) => AnnotationKind::Entity,
            Annotation::Relation(_) => AnnotationKind::Relation,
        }
    }

    pub fn attrs(&self) -> &[Attribute] {
        match self {
            Annotation::Segment(segment) => &segment.attrs,
            Annotation::Entity(entity) => &entity.attrs,
            Annotation::Relation(relation) => &relation.attrs,
        }
    }

    pub fn attrs_mut(&mut self) -> &mut Vec<Attribute> {
        match self {
            Annotation::Segment(segment) => &mut segment.attrs,
            Annotation::Entity(entity) => &mut entity.attrs,
            Annotation::Relation(relation) => &mut relation.attrs,
        }
    }

    /// The denoted text; `None` for relations.
    pub fn text(&self) -> Option<&str> {
        match self {
            Annotation::Segment(segment) => Some(&segment.text),
            Annotation::Entity(entity) => Some(&entity.text),
            Annotation::Relation(_) => None,
        }
    }

    /// The anchoring spans; `None` for relations.
    pub fn spans(&self) -> Option<&[AnySpan]> {
        match self {
            Annotation::Segment(segment) => Some(&segment.spans),
            Annotation::Entity(entity) => Some(&entity.spans),
            Annotation::Relation(_) => None,
        }
    }

    pub fn as_segment(&self) -> Option<&Segment> {
        match self {
            Annotation::Segment(segment) => Some(segment),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Annotation::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn as_relation(&self) -> Option<&Relation> {
        match self {
            Annotation::Relation(relation) => Some(relation),
            _ => None,
        }
    }
}

impl From<Segment> for Annotation {
    fn from(segment: Segment) -> Self {
        Annotation::Segment(segment)
    }
}

impl From<Entity> for Annotation {
    fn from(entity: Entity) -> Self {
        Annotation::Entity(entity)
    }
}

impl From<Relation> for Annotation {
    fn from(relation: Relation) -> Self {
        Annotation::Relation(relation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    #[test]
    fn test_duplicated_attribute_is_a_new_item_with_the_same_content() {
        let attr = Attribute::new("negated", true).with_metadata("detector_version", "2.1");
        let copy = attr.duplicated();
        assert_ne!(copy.id, attr.id);
        assert_eq!(copy.label, attr.label);
        assert_eq!(copy.value, attr.value);
        assert_eq!(copy.metadata, attr.metadata);
    }

    #[test]
    fn test_attrs_with_label_filters_in_attachment_order() {
        let segment = Segment::new("SENTENCE", "abc", vec![AnySpan::Simple(Span::new(0, 3))])
            .with_attr(Attribute::new("score", 0.5))
            .with_attr(Attribute::new("negated", false))
            .with_attr(Attribute::new("score", 0.9));
        let scores: Vec<_> = segment.attrs_with_label("score").collect();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].value, serde_json::json!(0.5));
        assert_eq!(scores[1].value, serde_json::json!(0.9));
    }

    #[test]
    fn test_annotation_kind_accessors() {
        let entity = Entity::new("DISEASE", "flu", vec![AnySpan::Simple(Span::new(10, 13))]);
        let relation = Relation::new("caused_by", entity.id, entity.id);

        let ann: Annotation = entity.clone().into();
        assert_eq!(ann.kind(), AnnotationKind::Entity);
        assert_eq!(ann.label(), "DISEASE");
        assert_eq!(ann.text(), Some("flu"));
        assert!(ann.as_entity().is_some());
        assert!(ann.as_relation().is_none());

        let ann: Annotation = relation.into();
        assert_eq!(ann.kind(), AnnotationKind::Relation);
        assert_eq!(ann.text(), None);
        assert_eq!(ann.spans(), None);
    }
}
