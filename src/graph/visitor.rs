//! The read-only traversal contract over a compiled graph.

use crate::graph::compiled::RenderPassDependencies;
use crate::graph::frame_graph::GraphNode;

/// Receives each node of a compiled graph in execution order, together with
/// the synchronization that must be inserted before recording it.
///
/// The visitor never mutates the graph. Implemented for any matching
/// closure, so an executor can be as small as:
///
/// ```ignore
/// compiled.visit(&mut |node: &GraphNode, deps: &RenderPassDependencies| {
///     for barrier in deps.barriers() {
///         // translate into vkCmdPipelineBarrier2 / queue transfer
///     }
///     // begin rendering, then invoke the pass callback
/// });
/// ```
pub trait GraphVisitor<'cb, C = ()> {
    /// Called once per node, in execution order.
    fn visit(&mut self, node: &GraphNode<'cb, C>, dependencies: &RenderPassDependencies);
}

impl<'cb, C, F> GraphVisitor<'cb, C> for F
where
    F: FnMut(&GraphNode<'cb, C>, &RenderPassDependencies),
{
    /// Visit the node by calling the given function.
    fn visit(&mut self, node: &GraphNode<'cb, C>, dependencies: &RenderPassDependencies) {
        self(node, dependencies)
    }
}
