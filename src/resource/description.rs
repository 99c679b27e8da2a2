use ash::vk;

use crate::resource::id::ImageId;

/// Description of a logical image. Immutable once registered.
///
/// The name participates in identity: two logical attachments with
/// identical formats and extents remain distinct resources. All other
/// fields describe the shape the executor must eventually allocate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageDescription {
    /// Human readable name, also used in diagnostics.
    pub name: String,
    /// Pixel format.
    pub format: vk::Format,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Depth in pixels, `1` for 2D images.
    pub depth: u32,
    /// Number of mip levels.
    pub mip_levels: u32,
    /// Number of array layers.
    pub array_layers: u32,
    /// Sample count for multisampled images.
    pub samples: vk::SampleCountFlags,
    /// Usage flags the backing allocation must support.
    pub usage: vk::ImageUsageFlags,
}

impl ImageDescription {
    /// Create a 2D single-mip, single-layer image description. Usage flags
    /// default to color attachment plus sampled, the most common shape for
    /// an intermediate render target.
    pub fn new(name: impl Into<String>, format: vk::Format, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            format,
            width,
            height,
            depth: 1,
            mip_levels: 1,
            array_layers: 1,
            samples: vk::SampleCountFlags::TYPE_1,
            usage: vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::SAMPLED,
        }
    }

    /// Override the usage flags.
    pub fn usage(mut self, usage: vk::ImageUsageFlags) -> Self {
        self.usage = usage;
        self
    }

    /// Override the mip level count.
    pub fn mip_levels(mut self, mip_levels: u32) -> Self {
        self.mip_levels = mip_levels;
        self
    }

    /// Override the array layer count.
    pub fn array_layers(mut self, array_layers: u32) -> Self {
        self.array_layers = array_layers;
        self
    }

    /// Override the sample count.
    pub fn samples(mut self, samples: vk::SampleCountFlags) -> Self {
        self.samples = samples;
        self
    }
}

/// Description of a view over a registered image. Immutable once registered.
///
/// A view holds a non-owning relation to its parent image id plus the
/// subresource range it exposes. The registry refuses ranges that escape
/// the parent's mip or layer extents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageViewDescription {
    /// Parent image this view reads from or writes to.
    pub image: ImageId,
    /// Dimensionality of the view.
    pub view_type: vk::ImageViewType,
    /// Aspects of the parent exposed by this view.
    pub aspect: vk::ImageAspectFlags,
    /// First mip level of the range.
    pub base_mip: u32,
    /// Number of mip levels in the range.
    pub mip_count: u32,
    /// First array layer of the range.
    pub base_layer: u32,
    /// Number of array layers in the range.
    pub layer_count: u32,
}

impl ImageViewDescription {
    /// A 2D view over the first mip and layer of `image`.
    pub fn new(image: ImageId, aspect: vk::ImageAspectFlags) -> Self {
        Self {
            image,
            view_type: vk::ImageViewType::TYPE_2D,
            aspect,
            base_mip: 0,
            mip_count: 1,
            base_layer: 0,
            layer_count: 1,
        }
    }

    /// A 2D color view over the first mip and layer of `image`.
    pub fn color_2d(image: ImageId) -> Self {
        Self::new(image, vk::ImageAspectFlags::COLOR)
    }

    /// A 2D depth view over the first mip and layer of `image`.
    pub fn depth_2d(image: ImageId) -> Self {
        Self::new(image, vk::ImageAspectFlags::DEPTH)
    }

    /// Select the mip range exposed by this view.
    pub fn mips(mut self, base: u32, count: u32) -> Self {
        self.base_mip = base;
        self.mip_count = count;
        self
    }

    /// Select the layer range exposed by this view.
    pub fn layers(mut self, base: u32, count: u32) -> Self {
        self.base_layer = base;
        self.layer_count = count;
        self
    }

    /// Override the view type.
    pub fn view_type(mut self, view_type: vk::ImageViewType) -> Self {
        self.view_type = view_type;
        self
    }
}
