//! Provenance: which operation produced which item, from which sources.
//!
//! The graph stores nothing but opaque ids and the audit descriptions of
//! the operations that appended to it. It is append-only: nodes are
//! inserted when an item is produced or first mentioned as a source, and
//! edges never change once written.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::id::{ItemId, OperationId};
use crate::operation::OperationDescription;

/// One data item's lineage record.
///
/// `operation_id` is `None` while the item is only known as a source of
/// other items (a stub), or when it was created outside any operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvNode {
    pub data_item_id: ItemId,
    pub operation_id: Option<OperationId>,
    pub source_ids: Vec<ItemId>,
    pub derived_ids: Vec<ItemId>,
}

impl ProvNode {
    fn stub(id: ItemId) -> Self {
        ProvNode {
            data_item_id: id,
            operation_id: None,
            source_ids: Vec::new(),
            derived_ids: Vec::new(),
        }
    }
}

/// Append-only lineage graph keyed by item id.
///
/// Cycles are impossible under the construction protocol — an item is
/// recorded once, when produced — and the traversal still checks for
/// them in case a producer misreports its inputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvGraph {
    nodes: HashMap<ItemId, ProvNode>,
    order: Vec<ItemId>,
    operations: HashMap<OperationId, OperationDescription>,
}

impl ProvGraph {
    pub fn new() -> Self {
        ProvGraph::default()
    }

    /// Records that `operation` produced `item` from `sources`.
    ///
    /// Unseen sources get stub nodes immediately, so they resolve the
    /// moment they are mentioned; a stub is promoted in place when its
    /// own producer reports later. Fails if `item` was already produced,
    /// or lists itself among its sources.
    pub fn add_node(
        &mut self,
        item: ItemId,
        operation: &OperationDescription,
        sources: &[ItemId],
    ) -> CoreResult<()> {
        if sources.contains(&item) {
            return Err(CoreError::ProvCycle(item));
        }
        match self.nodes.get_mut(&item) {
            Some(node) if node.operation_id.is_some() => {
                return Err(CoreError::DuplicateProv(item));
            }
            Some(node) => {
                node.operation_id = Some(operation.id);
                node.source_ids = sources.to_vec();
            }
            None => {
                self.order.push(item);
                let mut node = ProvNode::stub(item);
                node.operation_id = Some(operation.id);
                node.source_ids = sources.to_vec();
                self.nodes.insert(item, node);
            }
        }
        self.operations
            .entry(operation.id)
            .or_insert_with(|| operation.clone());
        for &source in sources {
            if !self.nodes.contains_key(&source) {
                self.order.push(source);
                self.nodes.insert(source, ProvNode::stub(source));
            }
            if let Some(node) = self.nodes.get_mut(&source) {
                node.derived_ids.push(item);
            }
        }
        Ok(())
    }

    /// Looks a node up by item id.
    ///
    /// Succeeds with empty `source_ids` for stubs; fails only for ids the
    /// graph has never seen at all.
    pub fn node(&self, id: ItemId) -> CoreResult<&ProvNode> {
        self.nodes.get(&id).ok_or(CoreError::ProvNotFound(id))
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Nodes in first-mention order.
    pub fn nodes(&self) -> impl Iterator<Item = &ProvNode> + '_ {
        self.order.iter().filter_map(move |id| self.nodes.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The description an operation registered when it first produced.
    pub fn operation(&self, id: OperationId) -> Option<&OperationDescription> {
        self.operations.get(&id)
    }

    /// Every transitive source of `id`, depth first in source order, each
    /// listed once.
    ///
    /// Iterative, so chains of arbitrary depth terminate without
    /// exhausting the stack. Fails with [`CoreError::ProvCycle`] if an id
    /// turns up on its own ancestor path.
    pub fn ancestors(&self, id: ItemId) -> CoreResult<Vec<ItemId>> {
        self.node(id)?;
        let mut ancestors = Vec::new();
        let mut seen: HashSet<ItemId> = HashSet::new();
        let mut on_path: HashSet<ItemId> = HashSet::new();
        on_path.insert(id);
        let mut stack: Vec<(ItemId, usize)> = vec![(id, 0)];
        while let Some(frame) = stack.last_mut() {
            let (current, next_index) = (frame.0, frame.1);
            let node = self.node(current)?;
            if next_index < node.source_ids.len() {
                frame.1 += 1;
                let source = node.source_ids[next_index];
                if on_path.contains(&source) {
                    return Err(CoreError::ProvCycle(source));
                }
                if seen.insert(source) {
                    ancestors.push(source);
                    on_path.insert(source);
                    stack.push((source, 0));
                }
            } else {
                on_path.remove(&current);
                stack.pop();
            }
        }
        Ok(ancestors)
    }
}

/// Cloneable handle to a provenance graph shared across producers.
///
/// Every operation in a pipeline holds a clone of one tracer and appends
/// through its mutex, so a pipeline that fans work out over threads still
/// builds a single graph. Reads return owned copies; no lock is held
/// across caller code.
#[derive(Debug, Clone, Default)]
pub struct ProvTracer {
    graph: Arc<Mutex<ProvGraph>>,
}

impl ProvTracer {
    pub fn new() -> Self {
        ProvTracer::default()
    }

    fn lock(&self) -> MutexGuard<'_, ProvGraph> {
        // append-only data: a poisoned graph is still whole
        self.graph.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records that `operation` produced `item` from `sources`.
    pub fn add_prov(
        &self,
        item: ItemId,
        operation: &OperationDescription,
        sources: &[ItemId],
    ) -> CoreResult<()> {
        self.lock().add_node(item, operation, sources)
    }

    /// Owned copy of the node for `item`.
    pub fn node(&self, item: ItemId) -> CoreResult<ProvNode> {
        self.lock().node(item).map(ProvNode::clone)
    }

    pub fn contains(&self, item: ItemId) -> bool {
        self.lock().contains(item)
    }

    /// Transitive sources of `item`; see [`ProvGraph::ancestors`].
    pub fn ancestors(&self, item: ItemId) -> CoreResult<Vec<ItemId>> {
        self.lock().ancestors(item)
    }

    /// Owned copy of a registered operation description.
    pub fn operation(&self, id: OperationId) -> Option<OperationDescription> {
        self.lock().operation(id).cloned()
    }

    /// A point-in-time copy of the whole graph.
    pub fn snapshot(&self) -> ProvGraph {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids<const N: usize>() -> [ItemId; N] {
        [(); N].map(|_| ItemId::generate())
    }

    #[test]
    fn test_sources_become_stubs_and_resolve_immediately() {
        let mut graph = ProvGraph::new();
        let op = OperationDescription::new("splitter");
        let [sentence, raw] = ids();
        graph.add_node(sentence, &op, &[raw]).unwrap();

        let stub = graph.node(raw).unwrap();
        assert_eq!(stub.operation_id, None);
        assert_eq!(stub.source_ids, vec![]);
        assert_eq!(stub.derived_ids, vec![sentence]);

        let produced = graph.node(sentence).unwrap();
        assert_eq!(produced.operation_id, Some(op.id));
        assert_eq!(produced.source_ids, vec![raw]);
    }

    #[test]
    fn test_never_mentioned_id_is_not_found() {
        let graph = ProvGraph::new();
        let ghost = ItemId::generate();
        assert_eq!(
            graph.node(ghost).unwrap_err(),
            CoreError::ProvNotFound(ghost)
        );
    }

    #[test]
    fn test_stub_promotion_keeps_derived_ids() {
        let mut graph = ProvGraph::new();
        let cleaner = OperationDescription::new("cleaner");
        let splitter = OperationDescription::new("splitter");
        let [raw, clean, sentence] = ids();

        // the splitter reports first; the cleaner's output is a stub
        graph.add_node(sentence, &splitter, &[clean]).unwrap();
        graph.add_node(clean, &cleaner, &[raw]).unwrap();

        let promoted = graph.node(clean).unwrap();
        assert_eq!(promoted.operation_id, Some(cleaner.id));
        assert_eq!(promoted.source_ids, vec![raw]);
        assert_eq!(promoted.derived_ids, vec![sentence]);
    }

    #[test]
    fn test_nodes_iterate_in_first_mention_order() {
        let mut graph = ProvGraph::new();
        let [sentence, raw] = ids();
        // raw enters as a stub right after the item that mentioned it
        graph
            .add_node(sentence, &OperationDescription::new("splitter"), &[raw])
            .unwrap();
        graph
            .add_node(raw, &OperationDescription::new("loader"), &[])
            .unwrap();

        let listed: Vec<ItemId> = graph.nodes().map(|node| node.data_item_id).collect();
        assert_eq!(listed, vec![sentence, raw]);
    }

    #[test]
    fn test_an_item_is_produced_exactly_once() {
        let mut graph = ProvGraph::new();
        let op = OperationDescription::new("op");
        let [item, source] = ids();
        graph.add_node(item, &op, &[source]).unwrap();
        assert_eq!(
            graph.add_node(item, &op, &[source]).unwrap_err(),
            CoreError::DuplicateProv(item)
        );
    }

    #[test]
    fn test_self_sourcing_is_rejected_at_insertion() {
        let mut graph = ProvGraph::new();
        let op = OperationDescription::new("op");
        let [item, other] = ids();
        assert_eq!(
            graph.add_node(item, &op, &[other, item]).unwrap_err(),
            CoreError::ProvCycle(item)
        );
        // nothing was recorded
        assert!(graph.is_empty());
    }

    #[test]
    fn test_ancestors_walk_a_chain() {
        let mut graph = ProvGraph::new();
        let op = OperationDescription::new("op");
        let [raw, clean, sentence, entity] = ids();
        graph.add_node(clean, &op, &[raw]).unwrap();
        graph.add_node(sentence, &op, &[clean]).unwrap();
        graph.add_node(entity, &op, &[sentence]).unwrap();
        assert_eq!(graph.ancestors(entity).unwrap(), vec![sentence, clean, raw]);
        assert_eq!(graph.ancestors(raw).unwrap(), vec![]);
    }

    #[test]
    fn test_ancestors_list_a_diamond_once_without_a_false_cycle() {
        let mut graph = ProvGraph::new();
        let op = OperationDescription::new("op");
        let [root, left, right, joined] = ids();
        graph.add_node(left, &op, &[root]).unwrap();
        graph.add_node(right, &op, &[root]).unwrap();
        graph.add_node(joined, &op, &[left, right]).unwrap();
        assert_eq!(
            graph.ancestors(joined).unwrap(),
            vec![left, root, right]
        );
    }

    #[test]
    fn test_a_corrupted_graph_reports_the_cycle() {
        let mut graph = ProvGraph::new();
        let op = OperationDescription::new("op");
        let [a, b] = ids();
        graph.add_node(b, &op, &[a]).unwrap();
        // wire the cycle in behind the API's back
        graph.nodes.get_mut(&a).unwrap().source_ids.push(b);
        assert_eq!(graph.ancestors(b).unwrap_err(), CoreError::ProvCycle(b));
    }

    #[test]
    fn test_operation_description_is_registered_once() {
        let mut graph = ProvGraph::new();
        let op = OperationDescription::new("splitter").with_param("keep_punct", true);
        let [a, b, source] = ids();
        graph.add_node(a, &op, &[source]).unwrap();
        graph.add_node(b, &op, &[source]).unwrap();
        assert_eq!(graph.operation(op.id), Some(&op));
    }

    #[test]
    fn test_tracer_clones_share_one_graph() {
        let tracer = ProvTracer::new();
        let worker = tracer.clone();
        let op = OperationDescription::new("op");
        let [item, source] = ids();
        worker.add_prov(item, &op, &[source]).unwrap();
        assert!(tracer.contains(item));
        assert_eq!(tracer.node(item).unwrap().source_ids, vec![source]);
        assert_eq!(tracer.len(), 2);
    }

    #[test]
    fn test_snapshot_is_detached_from_later_writes() {
        let tracer = ProvTracer::new();
        let op = OperationDescription::new("op");
        let [first, source, second] = ids();
        tracer.add_prov(first, &op, &[source]).unwrap();

        let snapshot = tracer.snapshot();
        tracer.add_prov(second, &op, &[first]).unwrap();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.node(first).unwrap().source_ids, vec![source]);
        assert!(!snapshot.contains(second));
        assert!(tracer.contains(second));
    }

    #[test]
    fn test_tracer_serializes_parallel_writers() {
        let tracer = ProvTracer::new();
        let op = OperationDescription::new("op");
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracer = tracer.clone();
                let op = op.clone();
                std::thread::spawn(move || {
                    let item = ItemId::generate();
                    let source = ItemId::generate();
                    tracer.add_prov(item, &op, &[source]).unwrap();
                    item
                })
            })
            .collect();
        let items: Vec<ItemId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for item in items {
            assert!(tracer.contains(item));
        }
        assert_eq!(tracer.len(), 16);
    }
}
