//! Derivation of synchronization state between passes.
//!
//! Every attachment implies one [`ResourceState`]: the layout, stage mask
//! and access mask the resource must be in while the declaring pass runs.
//! An [`AttachmentTransition`] labels a dependency edge with the producer's
//! state and the consumer's state; the external executor turns every
//! non-trivial transition into a pipeline barrier, or into a release/acquire
//! pair when the edge crosses queue classes.

use std::fmt::{Display, Formatter};

use ash::vk;

use crate::graph::frame_graph::NodeId;
use crate::graph::pass::{Attachment, AttachmentRole, LoadOp, QueueClass};
use crate::resource::{ImageId, ImageViewId};

/// Access, stage and layout of a resource at one point of the graph.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ResourceState {
    /// Access mask.
    pub access: vk::AccessFlags2,
    /// Pipeline stages that perform the access.
    pub stage: vk::PipelineStageFlags2,
    /// Image layout.
    pub layout: vk::ImageLayout,
}

impl ResourceState {
    /// State of content provided from outside the graph: nothing is known
    /// about it, so consumers transition away from an undefined layout.
    pub const UNDEFINED: Self = Self {
        access: vk::AccessFlags2::NONE,
        stage: vk::PipelineStageFlags2::TOP_OF_PIPE,
        layout: vk::ImageLayout::UNDEFINED,
    };
}

/// The state implied by one attachment declaration.
///
/// Load and clear operations on color attachments happen in
/// `COLOR_ATTACHMENT_OUTPUT`; depth/stencil loads happen in
/// `EARLY_FRAGMENT_TESTS` and stores in `LATE_FRAGMENT_TESTS`, so depth
/// states carry both test stages. Shader reads resolve to the fragment or
/// compute stage depending on the declaring pass's queue class.
pub(crate) fn attachment_state(attachment: &Attachment, queue: QueueClass) -> ResourceState {
    let shader_stage = match queue {
        QueueClass::Compute => vk::PipelineStageFlags2::COMPUTE_SHADER,
        _ => vk::PipelineStageFlags2::FRAGMENT_SHADER,
    };
    match attachment.role {
        AttachmentRole::Color => {
            let mut access = vk::AccessFlags2::NONE;
            if attachment.access.writes() {
                access |= vk::AccessFlags2::COLOR_ATTACHMENT_WRITE;
            }
            if attachment.access.reads() || attachment.load_op == LoadOp::Preserve {
                access |= vk::AccessFlags2::COLOR_ATTACHMENT_READ;
            }
            ResourceState {
                access,
                stage: vk::PipelineStageFlags2::COLOR_ATTACHMENT_OUTPUT,
                layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            }
        }
        AttachmentRole::DepthStencil => {
            let mut access = vk::AccessFlags2::NONE;
            if attachment.access.writes() {
                access |= vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_WRITE;
            }
            if attachment.access.reads() || attachment.load_op == LoadOp::Preserve {
                access |= vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_READ;
            }
            ResourceState {
                access,
                stage: vk::PipelineStageFlags2::EARLY_FRAGMENT_TESTS
                    | vk::PipelineStageFlags2::LATE_FRAGMENT_TESTS,
                layout: if attachment.access.writes() {
                    vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL
                } else {
                    vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL
                },
            }
        }
        AttachmentRole::Input => ResourceState {
            access: vk::AccessFlags2::INPUT_ATTACHMENT_READ,
            stage: vk::PipelineStageFlags2::FRAGMENT_SHADER,
            layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        },
        AttachmentRole::Sampled => ResourceState {
            access: vk::AccessFlags2::SHADER_SAMPLED_READ,
            stage: shader_stage,
            layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        },
        AttachmentRole::Resolve => ResourceState {
            access: vk::AccessFlags2::COLOR_ATTACHMENT_WRITE,
            stage: vk::PipelineStageFlags2::COLOR_ATTACHMENT_OUTPUT,
            layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        },
    }
}

/// Synchronization requirement on one dependency edge, for one resource.
/// Computed during compilation, never hand-authored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentTransition {
    /// Producing node. [`NodeId::EXTERNAL`] for content provided from
    /// outside the graph.
    pub from_node: NodeId,
    /// Consuming node.
    pub to_node: NodeId,
    /// Image both passes touch.
    pub image: ImageId,
    /// View through which the consumer accesses the image.
    pub view: ImageViewId,
    /// State the producer leaves the resource in.
    pub from: ResourceState,
    /// State the consumer requires.
    pub to: ResourceState,
    /// Whether the edge crosses queue classes, requiring a release/acquire
    /// pair instead of a single in-queue barrier.
    pub queue_transfer: bool,
}

impl AttachmentTransition {
    /// A transition that requires no barrier. Still recorded, so the
    /// executor sees the complete dependency picture.
    pub fn is_noop(&self) -> bool {
        self.from == self.to && !self.queue_transfer
    }
}

impl Display for AttachmentTransition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "img#{}\n({:?} => {:?})\n({:?} => {:?})",
            self.image.index(),
            self.from.layout,
            self.to.layout,
            self.from.access,
            self.to.access,
        ))
    }
}
