//! This module mainly exposes the [`PassBuilder`] struct, used for correctly defining passes in a
//! [`FrameGraph`](crate::FrameGraph).
//!
//! For documentation on how to use the frame graph, refer to the [`graph`](crate::graph) module level documentation.
//! Each pass declares every resource it touches as an [`Attachment`]; the graph compiler derives
//! hazards and transitions from those declarations alone, so an undeclared access is invisible to
//! synchronization. Optionally a pass carries a closure that the external executor invokes to
//! record the pass's native commands, and a color which can show up in debuggers like
//! [*RenderDoc*](https://renderdoc.org/).
//!
//! # Example
//!
//! Two passes: one renders into an offscreen texture, the next samples it.
//!
//! ```
//! use charon::prelude::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut resources = ResourceRegistry::new();
//! let offscreen = resources.register_image(ImageDescription::new(
//!     "offscreen",
//!     vk::Format::R8G8B8A8_UNORM,
//!     1920,
//!     1080,
//! ));
//! let offscreen = resources.register_view(ImageViewDescription::color_2d(offscreen))?;
//! let swapchain = resources.register_image(ImageDescription::new(
//!     "swapchain",
//!     vk::Format::B8G8R8A8_SRGB,
//!     1920,
//!     1080,
//! ));
//! let swapchain = resources.register_view(ImageViewDescription::color_2d(swapchain))?;
//!
//! let offscreen_pass: RenderPass = PassBuilder::new("offscreen")
//!     .clear_color_attachment(offscreen, ClearColor::Float([1.0, 0.0, 0.0, 1.0]))?
//!     .build();
//! let sample_pass = PassBuilder::new("sample")
//!     .clear_color_attachment(swapchain, ClearColor::Float([0.0; 4]))?
//!     .sample_image(offscreen)
//!     .record_fn(|_ctx: &mut ()| {
//!         // Record a fullscreen quad here with whatever backend owns `ctx`.
//!         Ok(())
//!     })
//!     .build();
//! # let _ = (offscreen_pass, sample_pass);
//! # Ok(())
//! # }
//! ```

use anyhow::Result;
use ash::vk;

use crate::error::Error;
use crate::resource::ImageViewId;
use crate::util::to_vk::IntoVulkanType;

/// How a pass accesses an attached resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// The pass only reads the resource.
    Read,
    /// The pass only writes the resource.
    Write,
    /// The pass reads and writes the resource.
    ReadWrite,
}

impl AccessKind {
    /// Whether this access reads previously produced content.
    pub fn reads(self) -> bool {
        matches!(self, AccessKind::Read | AccessKind::ReadWrite)
    }

    /// Whether this access produces new content.
    pub fn writes(self) -> bool {
        matches!(self, AccessKind::Write | AccessKind::ReadWrite)
    }
}

/// Role a resource plays within the pass that attached it. Together with
/// [`AccessKind`] and the load/store intents this fully determines the
/// layout, stage and access masks of the derived transitions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AttachmentRole {
    /// Color render target.
    Color,
    /// Depth/stencil target.
    DepthStencil,
    /// Subpass input attachment, read per-fragment.
    Input,
    /// Destination of a multisample resolve.
    Resolve,
    /// Sampled in a shader through a descriptor.
    Sampled,
}

/// What happens to an attachment's content when the pass begins.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LoadOp {
    /// Content is cleared to a constant value.
    Clear,
    /// Previous content is loaded.
    Preserve,
    /// Previous content is irrelevant and may be dropped.
    Discard,
}

/// What happens to an attachment's content when the pass ends.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// Content is written out and stays valid after the pass.
    Store,
    /// Content becomes undefined after the pass.
    Discard,
}

/// Queue class a pass executes on. Passes on different classes that share a
/// resource require a queue ownership transfer instead of an in-queue
/// barrier.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum QueueClass {
    /// Graphics queue. Also supports transfer operations.
    #[default]
    Graphics,
    /// Compute queue.
    Compute,
    /// Dedicated transfer queue.
    Transfer,
}

/// One usage of a resource within a pass.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct Attachment {
    /// View this attachment goes through.
    pub view: ImageViewId,
    /// Read/write kind.
    pub access: AccessKind,
    /// Role within the pass.
    pub role: AttachmentRole,
    /// Entry intent.
    pub load_op: LoadOp,
    /// Exit intent.
    pub store_op: StoreOp,
    /// Clear value, required when `load_op` is [`LoadOp::Clear`].
    #[derivative(Debug = "ignore")]
    pub clear_value: Option<vk::ClearValue>,
}

/// Clear value for color attachments.
#[derive(Copy, Clone, Debug)]
pub enum ClearColor {
    /// Clear to a float value, used for normalized formats.
    Float([f32; 4]),
    /// Clear to a signed integer value.
    Int([i32; 4]),
    /// Clear to an unsigned integer value.
    Uint([u32; 4]),
}

/// Clear value for depth/stencil attachments.
#[derive(Copy, Clone, Default, Debug)]
pub struct ClearDepthStencil {
    /// Depth clear value.
    pub depth: f32,
    /// Stencil clear value.
    pub stencil: u32,
}

impl IntoVulkanType for ClearColor {
    type Output = vk::ClearColorValue;

    fn into_vulkan(self) -> Self::Output {
        match self {
            ClearColor::Float(values) => vk::ClearColorValue {
                float32: values,
            },
            ClearColor::Int(values) => vk::ClearColorValue {
                int32: values,
            },
            ClearColor::Uint(values) => vk::ClearColorValue {
                uint32: values,
            },
        }
    }
}

impl IntoVulkanType for ClearDepthStencil {
    type Output = vk::ClearDepthStencilValue;

    fn into_vulkan(self) -> Self::Output {
        vk::ClearDepthStencilValue {
            depth: self.depth,
            stencil: self.stencil,
        }
    }
}

/// Defines the callback invoked when the external executor records a pass.
///
/// The callback is a capability object stored per pass. It receives the
/// executor's context type `C` and nothing else; per-frame mutable state
/// belongs in `C`, which keeps a compiled graph shareable across threads.
pub trait RecordPass<C> {
    /// Record this pass into the executor context.
    fn record(&self, ctx: &mut C) -> Result<()>;
}

impl<C, F> RecordPass<C> for F
where
    F: Fn(&mut C) -> Result<()>,
{
    /// Record this pass by calling the given function.
    fn record(&self, ctx: &mut C) -> Result<()> {
        self(ctx)
    }
}

pub(crate) type BoxedRecordFn<'cb, C> = Box<dyn RecordPass<C> + Send + Sync + 'cb>;

/// A pass recorder that does nothing.
pub struct EmptyPassRecorder;

impl EmptyPassRecorder {
    /// Creates an empty pass recorder.
    pub fn new() -> Self {
        Self {}
    }

    /// Create a new empty pass recorder in a [`Box`].
    pub fn new_boxed() -> Box<Self> {
        Box::new(Self::new())
    }
}

impl Default for EmptyPassRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> RecordPass<C> for EmptyPassRecorder {
    /// Record nothing.
    fn record(&self, _ctx: &mut C) -> Result<()> {
        Ok(())
    }
}

/// Represents one pass in a frame graph. You can obtain one using a [`PassBuilder`].
///
/// A pass never reads or writes resources it has not declared as
/// attachments; the graph compiler relies on the declarations being
/// complete to detect hazards.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct RenderPass<'cb, C = ()> {
    pub(crate) name: String,
    pub(crate) queue: QueueClass,
    pub(crate) color: Option<[f32; 4]>,
    pub(crate) attachments: Vec<Attachment>,
    #[derivative(Debug = "ignore")]
    pub(crate) record: BoxedRecordFn<'cb, C>,
}

impl<'cb, C> RenderPass<'cb, C> {
    /// Get the pass name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the queue class this pass executes on.
    pub fn queue(&self) -> QueueClass {
        self.queue
    }

    /// Get the debug color of this pass, if set.
    pub fn debug_color(&self) -> Option<[f32; 4]> {
        self.color
    }

    /// Get the declared attachments, in declaration order.
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Invoke the caller-supplied record callback.
    pub fn record(&self, ctx: &mut C) -> Result<()> {
        self.record.record(ctx)
    }
}

/// Used to create [`RenderPass`] objects correctly.
/// # Example
/// See the [`pass`](crate::graph::pass) module level documentation.
pub struct PassBuilder<'cb, C = ()> {
    inner: RenderPass<'cb, C>,
}

impl<'cb, C> PassBuilder<'cb, C> {
    /// Create a new pass executing on the graphics queue.
    pub fn new(name: impl Into<String>) -> Self {
        PassBuilder {
            inner: RenderPass {
                name: name.into(),
                queue: QueueClass::Graphics,
                color: None,
                attachments: vec![],
                record: EmptyPassRecorder::new_boxed(),
            },
        }
    }

    /// Select the queue class this pass executes on.
    pub fn queue(mut self, queue: QueueClass) -> Self {
        self.inner.queue = queue;
        self
    }

    /// Set the color of this pass. This can show up in graphics debuggers like RenderDoc.
    pub fn color(mut self, color: [f32; 4]) -> Self {
        self.inner.color = Some(color);
        self
    }

    /// Add a fully specified attachment. The convenience methods below cover
    /// the common shapes.
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.inner.attachments.push(attachment);
        self
    }

    /// Adds a color attachment to this pass. If [`LoadOp::Clear`] was specified, `clear` must not be [`None`].
    /// With [`LoadOp::Preserve`] the previous content is loaded, making the access a read-write.
    /// # Errors
    /// * Fails if `load_op` was [`LoadOp::Clear`], but `clear` was [`None`].
    pub fn color_attachment(
        mut self,
        view: ImageViewId,
        load_op: LoadOp,
        store_op: StoreOp,
        clear: Option<ClearColor>,
    ) -> Result<Self> {
        if load_op == LoadOp::Clear && clear.is_none() {
            return Err(anyhow::Error::from(Error::NoClearValue));
        }
        self.inner.attachments.push(Attachment {
            view,
            access: if load_op == LoadOp::Preserve {
                AccessKind::ReadWrite
            } else {
                AccessKind::Write
            },
            role: AttachmentRole::Color,
            load_op,
            store_op,
            clear_value: clear.map(|c| vk::ClearValue {
                color: c.into_vulkan(),
            }),
        });
        Ok(self)
    }

    /// Clear a color attachment with the specified clear color.
    pub fn clear_color_attachment(self, view: ImageViewId, color: ClearColor) -> Result<Self> {
        self.color_attachment(view, LoadOp::Clear, StoreOp::Store, Some(color))
    }

    /// Load a color attachment and render on top of its previous content.
    pub fn load_color_attachment(self, view: ImageViewId) -> Result<Self> {
        self.color_attachment(view, LoadOp::Preserve, StoreOp::Store, None)
    }

    /// Adds a depth/stencil attachment to this pass. If [`LoadOp::Clear`] was specified, `clear` must not be [`None`].
    /// # Errors
    /// * Fails if `load_op` was [`LoadOp::Clear`], but `clear` was [`None`].
    pub fn depth_attachment(
        mut self,
        view: ImageViewId,
        load_op: LoadOp,
        store_op: StoreOp,
        clear: Option<ClearDepthStencil>,
    ) -> Result<Self> {
        if load_op == LoadOp::Clear && clear.is_none() {
            return Err(anyhow::Error::from(Error::NoClearValue));
        }
        self.inner.attachments.push(Attachment {
            view,
            access: if load_op == LoadOp::Preserve {
                AccessKind::ReadWrite
            } else {
                AccessKind::Write
            },
            role: AttachmentRole::DepthStencil,
            load_op,
            store_op,
            clear_value: clear.map(|c| vk::ClearValue {
                depth_stencil: c.into_vulkan(),
            }),
        });
        Ok(self)
    }

    /// Clear the depth attachment with the specified clear values.
    pub fn clear_depth_attachment(
        self,
        view: ImageViewId,
        clear: ClearDepthStencil,
    ) -> Result<Self> {
        self.depth_attachment(view, LoadOp::Clear, StoreOp::Store, Some(clear))
    }

    /// Load a depth attachment, keeping its previous content.
    pub fn load_depth_attachment(self, view: ImageViewId) -> Result<Self> {
        self.depth_attachment(view, LoadOp::Preserve, StoreOp::Store, None)
    }

    /// Attach a depth buffer for testing only, without writing to it.
    pub fn read_depth_attachment(mut self, view: ImageViewId) -> Self {
        self.inner.attachments.push(Attachment {
            view,
            access: AccessKind::Read,
            role: AttachmentRole::DepthStencil,
            load_op: LoadOp::Preserve,
            store_op: StoreOp::Store,
            clear_value: None,
        });
        self
    }

    /// Declare that a resource will be sampled in a shader during this pass.
    pub fn sample_image(mut self, view: ImageViewId) -> Self {
        self.inner.attachments.push(Attachment {
            view,
            access: AccessKind::Read,
            role: AttachmentRole::Sampled,
            load_op: LoadOp::Preserve,
            store_op: StoreOp::Store,
            clear_value: None,
        });
        self
    }

    /// Declare a per-fragment input attachment read.
    pub fn input_attachment(mut self, view: ImageViewId) -> Self {
        self.inner.attachments.push(Attachment {
            view,
            access: AccessKind::Read,
            role: AttachmentRole::Input,
            load_op: LoadOp::Preserve,
            store_op: StoreOp::Store,
            clear_value: None,
        });
        self
    }

    /// Declare `view` as the destination of a multisample resolve. The
    /// previous content of the destination is irrelevant.
    pub fn resolve_into(mut self, view: ImageViewId) -> Self {
        self.inner.attachments.push(Attachment {
            view,
            access: AccessKind::Write,
            role: AttachmentRole::Resolve,
            load_op: LoadOp::Discard,
            store_op: StoreOp::Store,
            clear_value: None,
        });
        self
    }

    /// Set the recorder to be called when the executor records this pass.
    pub fn recorder(mut self, recorder: impl RecordPass<C> + Send + Sync + 'cb) -> Self {
        self.inner.record = Box::new(recorder);
        self
    }

    /// Set the recorder to be called when the executor records this pass. This method can be used
    /// to deduce types when a closure is used as a pass recorder.
    pub fn record_fn<F>(mut self, record: F) -> Self
    where
        F: Fn(&mut C) -> Result<()> + Send + Sync + 'cb, {
        self.inner.record = Box::new(record);
        self
    }

    /// Obtain a built [`RenderPass`] object.
    pub fn build(self) -> RenderPass<'cb, C> {
        self.inner
    }
}
