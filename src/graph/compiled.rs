//! The compiled, immutable form of a frame graph.

use anyhow::Result;
use petgraph::dot::Dot;
use petgraph::graph::EdgeReference;
use petgraph::graph::NodeIndex;
use petgraph::Direction;
use static_assertions::assert_impl_all;

use crate::error::Error;
use crate::graph::frame_graph::{GraphInner, GraphNode, NodeId};
use crate::graph::transition::AttachmentTransition;
use crate::graph::visitor::GraphVisitor;
use crate::resource::ResourceRegistry;

/// Everything the executor must synchronize before recording one node:
/// the aggregate of all incoming [`AttachmentTransition`]s of that node.
#[derive(Debug, Clone)]
pub struct RenderPassDependencies {
    node: NodeId,
    transitions: Vec<AttachmentTransition>,
}

impl RenderPassDependencies {
    pub(crate) fn new(node: NodeId) -> Self {
        Self {
            node,
            transitions: vec![],
        }
    }

    pub(crate) fn push(&mut self, transition: AttachmentTransition) {
        self.transitions.push(transition);
    }

    pub(crate) fn sort(&mut self) {
        self.transitions
            .sort_by_key(|t| (t.from_node, t.image.index()));
    }

    /// The node these dependencies belong to.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// All incoming transitions, no-op entries included.
    pub fn transitions(&self) -> &[AttachmentTransition] {
        &self.transitions
    }

    /// Only the transitions that require an actual barrier or queue
    /// ownership transfer.
    pub fn barriers(&self) -> impl Iterator<Item = &AttachmentTransition> {
        self.transitions.iter().filter(|t| !t.is_noop())
    }

    /// Whether this node has no incoming transitions at all.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

/// A completely compiled frame graph, ready for traversal by an executor.
///
/// The graph is immutable: it is discarded and rebuilt wholesale when the
/// frame topology changes, never patched. Being immutable it is also safe
/// to share read-only across threads, e.g. one thread recording commands
/// while another inspects dependency metadata.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct CompiledGraph<'cb, C = ()> {
    graph: GraphInner<'cb, C>,
    order: Vec<NodeId>,
    dependencies: Vec<RenderPassDependencies>,
    resources: ResourceRegistry,
}

assert_impl_all!(CompiledGraph<'static, ()>: Send, Sync);

impl<'cb, C> CompiledGraph<'cb, C> {
    pub(crate) fn new(
        graph: GraphInner<'cb, C>,
        order: Vec<NodeId>,
        dependencies: Vec<RenderPassDependencies>,
        resources: ResourceRegistry,
    ) -> Self {
        Self {
            graph,
            order,
            dependencies,
            resources,
        }
    }

    /// The passes in a valid execution order: for every edge, the producer
    /// appears strictly before the consumer. The synthetic external root is
    /// elided; transitions sourced from it show up in each node's
    /// dependencies with [`NodeId::EXTERNAL`] as producer.
    pub fn execution_order(&self) -> &[NodeId] {
        &self.order
    }

    /// Number of passes in the compiled graph.
    pub fn num_passes(&self) -> usize {
        self.order.len()
    }

    /// Look up a node.
    /// # Errors
    /// * [`Error::NodeNotFound`] if the id does not belong to this graph.
    pub fn node(&self, id: NodeId) -> Result<&GraphNode<'cb, C>> {
        self.graph
            .node_weight(id.node_index())
            .ok_or_else(|| Error::NodeNotFound.into())
    }

    /// The synchronization required before recording `id`.
    /// # Errors
    /// * [`Error::NodeNotFound`] if the id does not belong to this graph.
    pub fn dependencies(&self, id: NodeId) -> Result<&RenderPassDependencies> {
        self.dependencies
            .get(id.node_index().index())
            .ok_or_else(|| Error::NodeNotFound.into())
    }

    /// Direct predecessors of a node, deduplicated and in declaration order.
    pub fn predecessors(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Direct successors of a node, deduplicated and in declaration order.
    pub fn successors(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// The frozen registry snapshot this graph was compiled against.
    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    /// Walk the compiled graph in execution order, handing the visitor each
    /// node together with its dependencies. This is the sanctioned way for
    /// an executor to consume the graph; internal storage stays opaque and
    /// is never mutated by traversal.
    pub fn visit<V: GraphVisitor<'cb, C> + ?Sized>(&self, visitor: &mut V) {
        for id in &self.order {
            // These unwraps cannot fail, the order only holds live nodes.
            let node = self.graph.node_weight(id.node_index()).unwrap();
            let dependencies = self.dependencies.get(id.node_index().index()).unwrap();
            visitor.visit(node, dependencies);
        }
    }

    fn neighbors(&self, id: NodeId, direction: Direction) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self
            .graph
            .neighbors_directed(id.node_index(), direction)
            .map(NodeId::from_node_index)
            .collect();
        nodes.sort();
        nodes.dedup();
        nodes
    }

    fn get_edge_attributes(_: &GraphInner<'cb, C>, _: EdgeReference<AttachmentTransition>) -> String {
        String::from("")
    }

    fn get_node_attributes(_: &GraphInner<'cb, C>, node: (NodeIndex, &GraphNode<'cb, C>)) -> String {
        match node.0.index() {
            0 => String::from("fillcolor = \"#f75e70\" shape=box"),
            _ => String::from("fillcolor = \"#5e6df7\""),
        }
    }
}

/// Trait that is implemented for the compiled graph to help with debugging and visualizing it.
pub trait GraphViz {
    /// Get the string representation of this graph in `dot` format.
    fn dot(&self) -> Result<String>;
}

impl<'cb, C> GraphViz for CompiledGraph<'cb, C> {
    fn dot(&self) -> Result<String> {
        Ok(format!(
            "{}",
            Dot::with_attr_getters(
                &self.graph,
                &[],
                &Self::get_edge_attributes,
                &Self::get_node_attributes
            )
        ))
    }
}
