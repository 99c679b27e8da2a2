#![allow(dead_code)]

use anyhow::Result;
use charon::prelude::*;

/// Initialize logging for a test. Safe to call more than once.
pub fn init_logging() {
    let _ = pretty_env_logger::try_init();
}

/// Register a standard 1080p color render target and a 2D view over it.
pub fn color_target(resources: &mut ResourceRegistry, name: &str) -> Result<ImageViewId> {
    let image = resources.register_image(ImageDescription::new(
        name,
        vk::Format::R8G8B8A8_UNORM,
        1920,
        1080,
    ));
    resources.register_view(ImageViewDescription::color_2d(image))
}

/// Register a standard 1080p depth target and a 2D view over it.
pub fn depth_target(resources: &mut ResourceRegistry, name: &str) -> Result<ImageViewId> {
    let image = resources.register_image(
        ImageDescription::new(name, vk::Format::D32_SFLOAT, 1920, 1080).usage(
            vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT | vk::ImageUsageFlags::SAMPLED,
        ),
    );
    resources.register_view(ImageViewDescription::depth_2d(image))
}

/// A pass that clears `target` and writes nothing else.
pub fn write_pass(name: &str, target: ImageViewId) -> Result<RenderPass<'static>> {
    Ok(PassBuilder::new(name)
        .clear_color_attachment(target, ClearColor::Float([0.0; 4]))?
        .build())
}

/// A pass that samples `source` while clearing `target`.
pub fn read_write_pass(
    name: &str,
    source: ImageViewId,
    target: ImageViewId,
) -> Result<RenderPass<'static>> {
    Ok(PassBuilder::new(name)
        .clear_color_attachment(target, ClearColor::Float([0.0; 4]))?
        .sample_image(source)
        .build())
}
