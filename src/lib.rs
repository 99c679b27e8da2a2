//! Render graph compiler with automatic pass ordering and barrier derivation
//!
//! Charon takes a declarative description of a frame's render passes and the
//! image resources they touch, and compiles it into a dependency graph an
//! executor can walk to issue native graphics-API calls: nodes come out in a
//! safe, deterministic execution order, and every edge carries the exact
//! layout/access/stage transition (or queue ownership transfer) the backend
//! must insert between the two passes.
//!
//! The crate deliberately stops at the compiled graph. It never creates a
//! device, allocates memory or records command buffers; windowing, pipeline
//! objects and submission belong to the calling application, which interacts
//! with the compiler only through resource ids and the graph traversal.
//!
//! To get started, import the prelude:
//! ```
//! use charon::prelude::*;
//! ```
//!
//! # Example
//!
//! A graph is declared in three steps: register resources, declare passes,
//! compile.
//!
//! ```
//! use charon::prelude::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! // 1. Register the logical resources. No memory is allocated; the
//! //    registry only assigns identities and deduplicates descriptions.
//! let mut resources = ResourceRegistry::new();
//! let shadow_map = resources.register_image(
//!     ImageDescription::new("shadow map", vk::Format::D32_SFLOAT, 2048, 2048)
//!         .usage(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT | vk::ImageUsageFlags::SAMPLED),
//! );
//! let shadow_map = resources.register_view(ImageViewDescription::depth_2d(shadow_map))?;
//! let backbuffer = resources.register_image(ImageDescription::new(
//!     "backbuffer",
//!     vk::Format::B8G8R8A8_SRGB,
//!     1920,
//!     1080,
//! ));
//! let backbuffer = resources.register_view(ImageViewDescription::color_2d(backbuffer))?;
//!
//! // 2. Declare the passes. Order of declaration is the author's intended
//! //    order; the compiler only deviates where dependencies force it.
//! let mut graph = FrameGraph::new();
//! let shadow = graph.add_pass(
//!     PassBuilder::new("shadow")
//!         .clear_depth_attachment(shadow_map, ClearDepthStencil { depth: 1.0, stencil: 0 })?
//!         .build(),
//! );
//! let lighting = graph.add_pass(
//!     PassBuilder::new("lighting")
//!         .clear_color_attachment(backbuffer, ClearColor::Float([0.0, 0.0, 0.0, 1.0]))?
//!         .sample_image(shadow_map)
//!         .record_fn(|_ctx: &mut ()| Ok(()))
//!         .build(),
//! );
//!
//! // 3. Compile. The result is immutable; rebuild from scratch when the
//! //    frame topology changes.
//! let compiled = graph.compile(&mut resources)?;
//! assert_eq!(compiled.execution_order(), &[shadow, lighting]);
//! let deps = compiled.dependencies(lighting)?;
//! assert!(deps.barriers().count() > 0);
//! # Ok(())
//! # }
//! ```
//!
//! For more detail, check out the following modules:
//! - [`graph`] for declaring passes and compiling and traversing the graph.
//! - [`resource`] for registering images and views.

#[macro_use]
extern crate derivative;
#[macro_use]
extern crate log;

pub mod prelude;
pub use crate::prelude::*;

pub mod error;
pub mod graph;
pub mod resource;
pub mod util;
