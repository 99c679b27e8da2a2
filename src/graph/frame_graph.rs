//! The frame graph module holds the render graph compiler implementation.

use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};

use anyhow::Result;
use petgraph::graph::{Graph, NodeIndex};

use crate::error::Error;
use crate::graph::compiled::{CompiledGraph, RenderPassDependencies};
use crate::graph::pass::{Attachment, EmptyPassRecorder, QueueClass, RenderPass, StoreOp};
use crate::graph::schedule;
use crate::graph::transition::{attachment_state, AttachmentTransition, ResourceState};
use crate::resource::{ImageId, ResourceRegistry};

/// Stable identity of a node inside one graph. Indexes the graph's node
/// arena, so edges and lookups never go through raw references.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The synthetic root that stands in as producer for every resource
    /// whose initial content comes from outside the graph.
    pub const EXTERNAL: NodeId = NodeId(0);

    /// Whether this is the synthetic external root.
    pub fn is_external(self) -> bool {
        self == Self::EXTERNAL
    }

    pub(crate) fn from_node_index(index: NodeIndex) -> Self {
        NodeId(index.index() as u32)
    }

    pub(crate) fn node_index(self) -> NodeIndex {
        NodeIndex::new(self.0 as usize)
    }
}

/// A pass together with its resolved place in the compiled graph.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct GraphNode<'cb, C = ()> {
    pub(crate) pass: RenderPass<'cb, C>,
    pub(crate) rank: u32,
}

impl<'cb, C> GraphNode<'cb, C> {
    /// The declared pass this node wraps.
    pub fn pass(&self) -> &RenderPass<'cb, C> {
        &self.pass
    }

    /// Topological rank after scheduling. Rank 0 is the synthetic external
    /// root; real passes start at 1.
    pub fn rank(&self) -> u32 {
        self.rank
    }
}

impl<C> Display for GraphNode<'_, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("Pass: {}", &self.pass.name))
    }
}

pub(crate) type GraphInner<'cb, C> = Graph<GraphNode<'cb, C>, AttachmentTransition>;

const EXTERNAL_PASS_NAME: &str = "_external";

/// Declaration-phase render graph. Passes are added in author order; all
/// linking, hazard resolution and ordering happens in [`FrameGraph::compile`].
///
/// See the [`graph`](crate::graph) module level documentation for usage.
pub struct FrameGraph<'cb, C = ()> {
    graph: GraphInner<'cb, C>,
    // Note that this is guaranteed to be stable: the graph only ever grows,
    // and the root is always the first node.
    source: NodeIndex,
}

// Declaration metadata pulled out of the node arena so linking can add
// edges without fighting the borrow on the node weights.
struct PassDecl {
    node: NodeIndex,
    name: String,
    queue: QueueClass,
    attachments: Vec<Attachment>,
    images: Vec<ImageId>,
}

// A recorded read that a later write may conflict with.
#[derive(Copy, Clone)]
struct Reader {
    node: NodeIndex,
    attachment: usize,
    // The writer this read was bound to, None for external content.
    bound_to: Option<NodeIndex>,
}

#[derive(Default)]
struct ImageHistory {
    last_writer: Option<(NodeIndex, usize)>,
    readers: Vec<Reader>,
}

impl<'cb, C> Default for FrameGraph<'cb, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'cb, C> FrameGraph<'cb, C> {
    /// Create a new, empty frame graph.
    pub fn new() -> Self {
        let mut graph = Graph::new();
        // Insert the dummy external root. It produces all initial inputs and
        // is always scheduled first.
        let source = graph.add_node(GraphNode {
            pass: RenderPass {
                name: EXTERNAL_PASS_NAME.to_string(),
                queue: QueueClass::Graphics,
                color: None,
                attachments: vec![],
                record: EmptyPassRecorder::new_boxed(),
            },
            rank: 0,
        });
        FrameGraph {
            graph,
            source,
        }
    }

    /// Add a pass to the graph. To obtain a pass, use the
    /// [`PassBuilder`](crate::PassBuilder). Declaration order matters: a read
    /// binds to the most recently declared prior writer of the same image,
    /// and ties in the final schedule break towards declaration order.
    pub fn add_pass(&mut self, pass: RenderPass<'cb, C>) -> NodeId {
        let node = self.graph.add_node(GraphNode {
            pass,
            rank: 0,
        });
        NodeId::from_node_index(node)
    }

    /// Number of passes added so far.
    pub fn num_passes(&self) -> usize {
        self.graph.node_count() - 1
    }

    /// Compile the declared passes into an immutable, ordered graph.
    ///
    /// This resolves every read to its producer, emits hazard edges
    /// (read-after-write, write-after-write, write-after-read) labelled with
    /// the required [`AttachmentTransition`]s, and linearizes the result with
    /// a stable topological sort. No partial graph is ever exposed: either a
    /// fully valid [`CompiledGraph`] is returned, or the registry and any
    /// previously compiled graph are left untouched.
    ///
    /// # Errors
    /// * [`Error::EmptyGraph`] if no passes were added.
    /// * [`Error::DanglingResource`] if an attachment references a resource the registry does not know.
    /// * [`Error::UndefinedResourceRead`] if a pass reads content its producer discards, including
    ///   content discarded by the final writer of a previously compiled graph.
    /// * [`Error::CyclicDependency`] if the passes cannot be ordered.
    pub fn compile(self, resources: &mut ResourceRegistry) -> Result<CompiledGraph<'cb, C>> {
        let FrameGraph {
            mut graph,
            source,
        } = self;

        if graph.node_count() == 1 {
            return Err(anyhow::Error::from(Error::EmptyGraph));
        }

        let decls = Self::resolve_decls(&graph, resources)?;
        let writers = Self::collect_writers(&decls);

        let mut history: HashMap<ImageId, ImageHistory> = HashMap::new();
        let mut linked: HashSet<(NodeIndex, NodeIndex, ImageId)> = HashSet::new();

        for decl in &decls {
            for (index, attachment) in decl.attachments.iter().enumerate() {
                let image = decl.images[index];
                let entry = history.entry(image).or_default();
                let required = attachment_state(attachment, decl.queue);

                if attachment.access.reads() {
                    // Bind to the most recent prior writer. A resource only
                    // written later in declaration order still binds to that
                    // writer (the read consumes its product); only a resource
                    // no pass writes is externally provided.
                    let producer = entry.last_writer.or_else(|| {
                        writers
                            .get(&image)
                            .and_then(|w| w.iter().copied().find(|(node, _)| *node > decl.node))
                    });
                    let transition = match producer {
                        Some((writer, written)) => {
                            let writer_decl = &decls[writer.index() - 1];
                            let written = &writer_decl.attachments[written];
                            if written.store_op == StoreOp::Discard {
                                return Err(Error::UndefinedResourceRead(
                                    decl.name.clone(),
                                    resources.describe_image(image)?.name.clone(),
                                )
                                .into());
                            }
                            AttachmentTransition {
                                from_node: NodeId::from_node_index(writer),
                                to_node: NodeId::from_node_index(decl.node),
                                image,
                                view: attachment.view,
                                from: attachment_state(written, writer_decl.queue),
                                to: required,
                                queue_transfer: writer_decl.queue != decl.queue,
                            }
                        }
                        None => {
                            if resources.is_undefined(image) {
                                return Err(Error::UndefinedResourceRead(
                                    decl.name.clone(),
                                    resources.describe_image(image)?.name.clone(),
                                )
                                .into());
                            }
                            AttachmentTransition {
                                from_node: NodeId::EXTERNAL,
                                to_node: NodeId::from_node_index(decl.node),
                                image,
                                view: attachment.view,
                                from: ResourceState::UNDEFINED,
                                to: required,
                                queue_transfer: false,
                            }
                        }
                    };
                    Self::link_once(&mut graph, &mut linked, transition);
                    entry.readers.push(Reader {
                        node: decl.node,
                        attachment: index,
                        bound_to: producer.map(|(node, _)| node),
                    });
                }

                if attachment.access.writes() {
                    // Reads of older content must complete before the
                    // overwrite; readers bound to this very writer consume
                    // its product instead and stay tracked.
                    let war: Vec<Reader> = entry
                        .readers
                        .iter()
                        .filter(|r| r.node != decl.node && r.bound_to != Some(decl.node))
                        .copied()
                        .collect();
                    if war.is_empty() {
                        if let Some((writer, written)) = entry.last_writer {
                            if writer != decl.node {
                                // Write-after-write with no read between:
                                // emitted anyway so the two writes stay ordered.
                                let writer_decl = &decls[writer.index() - 1];
                                let written = &writer_decl.attachments[written];
                                Self::link_once(&mut graph, &mut linked, AttachmentTransition {
                                    from_node: NodeId::from_node_index(writer),
                                    to_node: NodeId::from_node_index(decl.node),
                                    image,
                                    view: attachment.view,
                                    from: attachment_state(written, writer_decl.queue),
                                    to: required,
                                    queue_transfer: writer_decl.queue != decl.queue,
                                });
                            }
                        }
                    }
                    for reader in war {
                        let reader_decl = &decls[reader.node.index() - 1];
                        let read = &reader_decl.attachments[reader.attachment];
                        Self::link_once(&mut graph, &mut linked, AttachmentTransition {
                            from_node: NodeId::from_node_index(reader.node),
                            to_node: NodeId::from_node_index(decl.node),
                            image,
                            view: attachment.view,
                            from: attachment_state(read, reader_decl.queue),
                            to: required,
                            queue_transfer: reader_decl.queue != decl.queue,
                        });
                    }
                    entry
                        .readers
                        .retain(|r| r.node != decl.node && r.bound_to == Some(decl.node));
                    entry.last_writer = Some((decl.node, index));
                }
            }
        }

        let order = schedule::topological_order(&graph).map_err(|offender| {
            let name = graph
                .node_weight(offender)
                .map(|node| node.pass.name.clone())
                .unwrap_or_default();
            anyhow::Error::from(Error::CyclicDependency(name))
        })?;

        for (rank, node) in order.iter().enumerate() {
            // This unwrap() cannot fail, the order only contains live nodes.
            graph.node_weight_mut(*node).unwrap().rank = rank as u32;
        }

        // Validation is done; from here on the registry may be touched.
        for (image, entry) in &history {
            if let Some((writer, written)) = entry.last_writer {
                let writer_decl = &decls[writer.index() - 1];
                match writer_decl.attachments[written].store_op {
                    StoreOp::Discard => resources.mark_undefined(*image),
                    StoreOp::Store => resources.mark_defined(*image),
                }
            }
        }

        let mut dependencies: Vec<RenderPassDependencies> = graph
            .node_indices()
            .map(|node| RenderPassDependencies::new(NodeId::from_node_index(node)))
            .collect();
        for edge in graph.raw_edges() {
            dependencies[edge.target().index()].push(edge.weight.clone());
        }
        for deps in &mut dependencies {
            deps.sort();
        }

        let execution_order: Vec<NodeId> = order
            .iter()
            .copied()
            .filter(|node| *node != source)
            .map(NodeId::from_node_index)
            .collect();

        debug!(
            "Compiled graph: {} passes, {} transitions ({} barriers)",
            execution_order.len(),
            graph.edge_count(),
            graph
                .raw_edges()
                .iter()
                .filter(|edge| !edge.weight.is_noop())
                .count()
        );

        Ok(CompiledGraph::new(
            graph,
            execution_order,
            dependencies,
            resources.clone(),
        ))
    }

    fn resolve_decls(
        graph: &GraphInner<'cb, C>,
        resources: &ResourceRegistry,
    ) -> Result<Vec<PassDecl>> {
        let mut decls = Vec::with_capacity(graph.node_count() - 1);
        for node in graph.node_indices().skip(1) {
            let weight = graph.node_weight(node).ok_or(Error::NodeNotFound)?;
            let mut images = Vec::with_capacity(weight.pass.attachments.len());
            for attachment in &weight.pass.attachments {
                let image = resources
                    .image_of(attachment.view)
                    .map_err(|_| Error::DanglingResource(weight.pass.name.clone()))?;
                images.push(image);
            }
            decls.push(PassDecl {
                node,
                name: weight.pass.name.clone(),
                queue: weight.pass.queue,
                attachments: weight.pass.attachments.clone(),
                images,
            });
        }
        Ok(decls)
    }

    fn collect_writers(decls: &[PassDecl]) -> HashMap<ImageId, Vec<(NodeIndex, usize)>> {
        let mut writers: HashMap<ImageId, Vec<(NodeIndex, usize)>> = HashMap::new();
        for decl in decls {
            let mut seen = HashSet::new();
            for (index, attachment) in decl.attachments.iter().enumerate() {
                if attachment.access.writes() && seen.insert(decl.images[index]) {
                    writers
                        .entry(decl.images[index])
                        .or_default()
                        .push((decl.node, index));
                }
            }
        }
        writers
    }

    fn link_once(
        graph: &mut GraphInner<'cb, C>,
        linked: &mut HashSet<(NodeIndex, NodeIndex, ImageId)>,
        transition: AttachmentTransition,
    ) {
        let from = transition.from_node.node_index();
        let to = transition.to_node.node_index();
        if linked.insert((from, to, transition.image)) {
            trace!(
                "Linking node {} -> node {} over image #{}",
                from.index(),
                to.index(),
                transition.image.index()
            );
            graph.add_edge(from, to, transition);
        }
    }
}
