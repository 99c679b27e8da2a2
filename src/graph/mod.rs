//! The frame graph system compiles a declarative description of render
//! passes into a safe execution order. Each pass declares every resource it
//! reads and writes as an [`Attachment`](crate::Attachment); the compiler
//! links passes that share a resource, derives the layout/access/stage
//! transition for every link, and linearizes the result with a stable
//! topological sort. The compiled graph is then traversed by an external
//! executor which translates each transition into a pipeline barrier (or a
//! queue ownership transfer) and invokes each pass's record callback.
//!
//! Resources are identified by typed ids from a
//! [`ResourceRegistry`](crate::ResourceRegistry); the graph compiler never
//! allocates device memory and issues no API calls, so graphs are cheap to
//! rebuild whenever the frame topology changes (e.g. on a window resize).
//!
//! # Example
//!
//! ```
//! use charon::prelude::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut resources = ResourceRegistry::new();
//! let depth = resources.register_image(
//!     ImageDescription::new("depth", vk::Format::D32_SFLOAT, 1920, 1080)
//!         .usage(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT | vk::ImageUsageFlags::SAMPLED),
//! );
//! let depth = resources.register_view(ImageViewDescription::depth_2d(depth))?;
//! let color = resources.register_image(ImageDescription::new(
//!     "color",
//!     vk::Format::R16G16B16A16_SFLOAT,
//!     1920,
//!     1080,
//! ));
//! let color = resources.register_view(ImageViewDescription::color_2d(color))?;
//!
//! let mut graph = FrameGraph::new();
//! graph.add_pass(
//!     PassBuilder::new("depth prepass")
//!         .clear_depth_attachment(depth, ClearDepthStencil { depth: 1.0, stencil: 0 })?
//!         .build(),
//! );
//! graph.add_pass(
//!     PassBuilder::new("opaque")
//!         .clear_color_attachment(color, ClearColor::Float([0.0; 4]))?
//!         .read_depth_attachment(depth)
//!         .build(),
//! );
//!
//! let compiled = graph.compile(&mut resources)?;
//! compiled.visit(&mut |node: &GraphNode, deps: &RenderPassDependencies| {
//!     for barrier in deps.barriers() {
//!         // insert a pipeline barrier here
//!         let _ = (barrier.from, barrier.to);
//!     }
//!     // then record the pass
//!     let _ = node.pass();
//! });
//! # Ok(())
//! # }
//! ```

pub mod compiled;
pub mod frame_graph;
pub mod pass;
pub mod transition;
pub mod visitor;

pub(crate) mod schedule;
