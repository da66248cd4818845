//! The contract every producer satisfies to take part in provenance.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreResult;
use crate::id::OperationId;

/// Reproducibility record for one operation instance: a stable id, a
/// human-readable name, and enough configuration to reconstruct an
/// equivalent instance.
///
/// Audit data. The provenance graph stores it next to the nodes an
/// operation produced, but never consults it for correctness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDescription {
    pub id: OperationId,
    pub name: String,
    pub config: BTreeMap<String, Value>,
}

impl OperationDescription {
    pub fn new(name: impl Into<String>) -> Self {
        OperationDescription {
            id: OperationId::generate(),
            name: name.into(),
            config: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(name.into(), value.into());
        self
    }
}

/// A producer of derived data items.
///
/// Implementations hold their configuration and, optionally, a
/// [`ProvTracer`](crate::ProvTracer) injected at construction; `run` is
/// pure with respect to its inputs apart from pushing provenance. When a
/// tracer is attached, every returned item must have been recorded before
/// `run` returns. The shipped operations funnel construction and
/// recording through a single helper so an unrecorded output cannot slip
/// out; new producers should do the same.
pub trait Operation {
    type Input;
    type Output;

    /// The audit description; stable for the lifetime of the instance.
    fn description(&self) -> &OperationDescription;

    /// This instance's id.
    fn id(&self) -> OperationId {
        self.description().id
    }

    /// Transforms inputs into newly constructed outputs.
    fn run(&self, inputs: &[Self::Input]) -> CoreResult<Vec<Self::Output>>;
}
