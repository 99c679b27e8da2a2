use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::Result;

use crate::error::Error;
use crate::resource::description::{ImageDescription, ImageViewDescription};
use crate::resource::id::{ImageId, ImageViewId, ResourceId};

// Registries are independently instantiable; the tag lets lookups reject
// ids minted by a different registry instead of silently aliasing a slot.
static NEXT_REGISTRY_TAG: AtomicU32 = AtomicU32::new(1);

/// Owns canonical identities for logical images and image views.
///
/// The registry never materializes device memory; it only tracks
/// descriptions and identity. Registration is idempotent: structurally
/// equal descriptions map to the same id regardless of call site.
///
/// A registry is mutated only during the declaration phase preceding
/// [`FrameGraph::compile()`](crate::FrameGraph::compile). The compiled graph
/// keeps a frozen snapshot; the live registry stays with the caller so ids
/// remain valid across graph rebuilds.
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    tag: u32,
    images: Vec<ImageDescription>,
    image_ids: HashMap<ImageDescription, ImageId>,
    views: Vec<ImageViewDescription>,
    view_ids: HashMap<ImageViewDescription, ImageViewId>,
    // Images whose content a compiled graph's final writer discarded.
    // Reads that would resolve to the external root fail on these.
    undefined: HashSet<ImageId>,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tag: NEXT_REGISTRY_TAG.fetch_add(1, Ordering::Relaxed),
            images: Vec::new(),
            image_ids: HashMap::new(),
            views: Vec::new(),
            view_ids: HashMap::new(),
            undefined: HashSet::new(),
        }
    }

    /// Register an image description and return its canonical id.
    ///
    /// Registering a structurally equal description twice returns the same
    /// id.
    pub fn register_image(&mut self, description: ImageDescription) -> ImageId {
        if let Some(id) = self.image_ids.get(&description) {
            return *id;
        }
        let id = ResourceId::new(self.tag, self.images.len() as u32);
        trace!("Registered image `{}` as {:?}", description.name, id);
        self.images.push(description.clone());
        self.image_ids.insert(description, id);
        id
    }

    /// Register a view description and return its canonical id.
    ///
    /// Like images, equal view descriptions deduplicate to one id.
    /// # Errors
    /// * [`Error::UnknownResource`] if the parent image id was not produced by this registry.
    /// * [`Error::InvalidSubresource`] if the mip or layer range is empty or escapes the parent.
    pub fn register_view(&mut self, description: ImageViewDescription) -> Result<ImageViewId> {
        let parent = self.describe_image(description.image)?;
        let mips_in_range = description
            .base_mip
            .checked_add(description.mip_count)
            .map(|end| end <= parent.mip_levels)
            .unwrap_or(false);
        let layers_in_range = description
            .base_layer
            .checked_add(description.layer_count)
            .map(|end| end <= parent.array_layers)
            .unwrap_or(false);
        if description.mip_count == 0
            || description.layer_count == 0
            || !mips_in_range
            || !layers_in_range
        {
            return Err(Error::InvalidSubresource(parent.name.clone()).into());
        }

        if let Some(id) = self.view_ids.get(&description) {
            return Ok(*id);
        }
        let id = ResourceId::new(self.tag, self.views.len() as u32);
        trace!("Registered view {:?} of image `{}`", id, parent.name);
        self.views.push(description.clone());
        self.view_ids.insert(description, id);
        Ok(id)
    }

    /// Look up the description behind an image id.
    /// # Errors
    /// * [`Error::UnknownResource`] if the id was not produced by this registry.
    pub fn describe_image(&self, id: ImageId) -> Result<&ImageDescription> {
        if id.tag() != self.tag {
            return Err(Error::UnknownResource.into());
        }
        self.images
            .get(id.index())
            .ok_or_else(|| Error::UnknownResource.into())
    }

    /// Look up the description behind a view id.
    /// # Errors
    /// * [`Error::UnknownResource`] if the id was not produced by this registry.
    pub fn describe_view(&self, id: ImageViewId) -> Result<&ImageViewDescription> {
        if id.tag() != self.tag {
            return Err(Error::UnknownResource.into());
        }
        self.views
            .get(id.index())
            .ok_or_else(|| Error::UnknownResource.into())
    }

    /// Parent image of a registered view.
    pub fn image_of(&self, view: ImageViewId) -> Result<ImageId> {
        Ok(self.describe_view(view)?.image)
    }

    /// Number of registered images.
    pub fn num_images(&self) -> usize {
        self.images.len()
    }

    /// Number of registered views.
    pub fn num_views(&self) -> usize {
        self.views.len()
    }

    /// Whether an image's content was discarded by the final writer of a
    /// previously compiled graph. Such an image must be written again
    /// before any pass may read it.
    pub fn is_undefined(&self, image: ImageId) -> bool {
        self.undefined.contains(&image)
    }

    pub(crate) fn mark_undefined(&mut self, image: ImageId) {
        self.undefined.insert(image);
    }

    pub(crate) fn mark_defined(&mut self, image: ImageId) {
        self.undefined.remove(&image);
    }
}
