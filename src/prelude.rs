//! Re-exports the entire public API surface.

pub use ash::vk;

pub use crate::error::Error;

pub use crate::graph::compiled::{CompiledGraph, GraphViz, RenderPassDependencies};
pub use crate::graph::frame_graph::{FrameGraph, GraphNode, NodeId};
pub use crate::graph::pass::{
    AccessKind, Attachment, AttachmentRole, ClearColor, ClearDepthStencil, EmptyPassRecorder,
    LoadOp, PassBuilder, QueueClass, RecordPass, RenderPass, StoreOp,
};
pub use crate::graph::transition::{AttachmentTransition, ResourceState};
pub use crate::graph::visitor::GraphVisitor;

pub use crate::resource::{
    ImageDescription, ImageId, ImageViewDescription, ImageViewId, ResourceId, ResourceRegistry,
};

pub use crate::util::to_vk::IntoVulkanType;
