//! Node sequence with a lazily derived, invalidated-on-change leg plan.

use std::sync::OnceLock;

use crate::error::ItineraryError;
use crate::node::TrajectoryNode;
use crate::plan::{self, ItineraryPlan, TrajectoryLeg};

/// An ordered list of [`TrajectoryNode`]s.
///
/// The derived [`ItineraryPlan`] (legs and design-vector layout) is computed on first use
/// and discarded whenever the node sequence changes. Structural errors are cached too, so
/// an invalid itinerary keeps reporting the same error until it is edited.
#[derive(Debug, Clone, Default)]
pub struct Itinerary {
    nodes: Vec<TrajectoryNode>,
    plan: OnceLock<Result<ItineraryPlan, ItineraryError>>,
}

impl Itinerary {
    /// Wrap a node sequence without checking it; see [`Itinerary::try_new`].
    pub fn new(nodes: Vec<TrajectoryNode>) -> Self {
        Self {
            nodes,
            plan: OnceLock::new(),
        }
    }

    /// Wrap a node sequence and check its structure immediately.
    pub fn try_new(nodes: Vec<TrajectoryNode>) -> Result<Self, ItineraryError> {
        let itinerary = Self::new(nodes);
        itinerary.plan()?;
        Ok(itinerary)
    }

    pub fn nodes(&self) -> &[TrajectoryNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn push(&mut self, node: TrajectoryNode) {
        self.nodes.push(node);
        self.invalidate();
    }

    pub fn insert(&mut self, index: usize, node: TrajectoryNode) -> Result<(), ItineraryError> {
        if index > self.nodes.len() {
            return Err(ItineraryError::NodeIndexOutOfRange {
                index,
                len: self.nodes.len(),
            });
        }
        self.nodes.insert(index, node);
        self.invalidate();
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<TrajectoryNode, ItineraryError> {
        self.check_index(index)?;
        let node = self.nodes.remove(index);
        self.invalidate();
        Ok(node)
    }

    /// Replace the node at `index` with one of the same kind, returning the old node.
    pub fn set_node(
        &mut self,
        index: usize,
        node: TrajectoryNode,
    ) -> Result<TrajectoryNode, ItineraryError> {
        self.check_index(index)?;
        let expected = self.nodes[index].kind();
        if node.kind() != expected {
            return Err(ItineraryError::NodeKindMismatch {
                index,
                expected,
                found: node.kind(),
            });
        }
        let old = std::mem::replace(&mut self.nodes[index], node);
        self.invalidate();
        Ok(old)
    }

    /// Legs and slot layout, derived on first use.
    pub fn plan(&self) -> Result<&ItineraryPlan, ItineraryError> {
        self.plan
            .get_or_init(|| plan::build(&self.nodes))
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn legs(&self) -> Result<&[TrajectoryLeg], ItineraryError> {
        self.plan().map(ItineraryPlan::legs)
    }

    pub fn design_vector_len(&self) -> Result<usize, ItineraryError> {
        self.plan().map(ItineraryPlan::design_vector_len)
    }

    /// Design vector built from the nodes' own values, checked like any other.
    pub fn nominal_design_vector(&self) -> Result<Vec<f64>, ItineraryError> {
        let plan = self.plan()?;
        let vector = plan.nominal_design_vector(&self.nodes)?;
        plan.validate(&vector)?;
        Ok(vector)
    }

    pub fn validate_design_vector(&self, design_vector: &[f64]) -> Result<(), ItineraryError> {
        self.plan()?.validate(design_vector)
    }

    fn check_index(&self, index: usize) -> Result<(), ItineraryError> {
        if index < self.nodes.len() {
            Ok(())
        } else {
            Err(ItineraryError::NodeIndexOutOfRange {
                index,
                len: self.nodes.len(),
            })
        }
    }

    fn invalidate(&mut self) {
        self.plan = OnceLock::new();
    }
}

impl From<Vec<TrajectoryNode>> for Itinerary {
    fn from(nodes: Vec<TrajectoryNode>) -> Self {
        Self::new(nodes)
    }
}
