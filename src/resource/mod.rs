//! The resource registry assigns canonical identities to logical images and
//! image views. Nothing in this module ever touches device memory: the
//! registry only tracks descriptions and identity, and the graph compiler
//! consults it to resolve attachments.
//!
//! Registration is idempotent. Registering two structurally equal
//! descriptions yields the same id, so resource identity can be established
//! from independent call sites without threading handles through them.
//!
//! ```
//! use charon::prelude::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut resources = ResourceRegistry::new();
//! let color = resources.register_image(ImageDescription::new(
//!     "color",
//!     vk::Format::R8G8B8A8_UNORM,
//!     1920,
//!     1080,
//! ));
//! let view = resources.register_view(ImageViewDescription::color_2d(color))?;
//! assert_eq!(view, resources.register_view(ImageViewDescription::color_2d(color))?);
//! # Ok(())
//! # }
//! ```

pub mod description;
pub mod id;
pub mod registry;

pub use description::{ImageDescription, ImageViewDescription};
pub use id::{ImageId, ImageViewId, ResourceId};
pub use registry::ResourceRegistry;
