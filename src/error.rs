//! Exposes the charon error type

use thiserror::Error;

/// Error type that charon can return.
///
/// All failures are surfaced synchronously to the caller of the failing
/// operation and never corrupt the resource registry or a previously
/// compiled graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A resource id was not produced by the registry it was used with.
    #[error("Unknown resource id. Was it created by a different registry?")]
    UnknownResource,
    /// A view's subresource range escapes the mip or layer extents of its parent image.
    #[error("Invalid subresource range for a view of image `{0}`.")]
    InvalidSubresource(String),
    /// `compile()` was called on a graph with no passes.
    #[error("Graph contains no passes.")]
    EmptyGraph,
    /// A pass declared an attachment over a resource id the registry does not know.
    #[error("Pass `{0}` references a resource not known to the registry.")]
    DanglingResource(String),
    /// A pass reads a resource whose last writer discarded its content.
    #[error("Pass `{0}` reads `{1}`, but its last writer discarded the content.")]
    UndefinedResourceRead(String, String),
    /// The pass graph contains a cycle and is impossible to order.
    #[error("Graph contains a dependency cycle through pass `{0}`.")]
    CyclicDependency(String),
    /// No clear value was specified even though one was required.
    #[error("No clear value specified for an attachment with `LoadOp::Clear`.")]
    NoClearValue,
    /// Node not found in graph. Generally this should not happen.
    #[error("Implementation error. Node not found. Please open an issue.")]
    NodeNotFound,
}
