use anyhow::Result;
use charon::prelude::*;

mod framework;

fn sample_image(name: &str) -> ImageDescription {
    ImageDescription::new(name, vk::Format::R8G8B8A8_UNORM, 1920, 1080)
        .mip_levels(4)
        .array_layers(2)
}

#[test]
fn image_registration_is_idempotent() {
    framework::init_logging();
    let mut resources = ResourceRegistry::new();
    let first = resources.register_image(sample_image("gbuffer"));
    let second = resources.register_image(sample_image("gbuffer"));
    assert_eq!(first, second);
    assert_eq!(resources.num_images(), 1);
}

#[test]
fn images_with_equal_shapes_but_different_names_stay_distinct() {
    let mut resources = ResourceRegistry::new();
    let albedo = resources.register_image(sample_image("albedo"));
    let normal = resources.register_image(sample_image("normal"));
    assert_ne!(albedo, normal);
    assert_eq!(resources.num_images(), 2);
}

#[test]
fn view_registration_is_idempotent() -> Result<()> {
    let mut resources = ResourceRegistry::new();
    let image = resources.register_image(sample_image("gbuffer"));
    let first = resources.register_view(ImageViewDescription::color_2d(image))?;
    let second = resources.register_view(ImageViewDescription::color_2d(image))?;
    assert_eq!(first, second);
    assert_eq!(resources.num_views(), 1);

    let other = resources.register_view(ImageViewDescription::color_2d(image).mips(1, 1))?;
    assert_ne!(first, other);
    Ok(())
}

#[test]
fn describe_returns_the_registered_description() -> Result<()> {
    let mut resources = ResourceRegistry::new();
    let image = resources.register_image(sample_image("gbuffer"));
    let description = resources.describe_image(image)?;
    assert_eq!(description.name, "gbuffer");
    assert_eq!(description.mip_levels, 4);

    let view = resources.register_view(ImageViewDescription::color_2d(image).layers(0, 2))?;
    assert_eq!(resources.describe_view(view)?.layer_count, 2);
    assert_eq!(resources.image_of(view)?, image);
    Ok(())
}

#[test]
fn layer_range_must_fit_the_parent() {
    let mut resources = ResourceRegistry::new();
    let image = resources.register_image(sample_image("gbuffer"));
    let err = resources
        .register_view(ImageViewDescription::color_2d(image).layers(0, 3))
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<Error>(),
        Some(&Error::InvalidSubresource("gbuffer".into()))
    );
}

#[test]
fn mip_range_must_fit_the_parent() {
    let mut resources = ResourceRegistry::new();
    let image = resources.register_image(sample_image("gbuffer"));
    for description in [
        ImageViewDescription::color_2d(image).mips(4, 1),
        ImageViewDescription::color_2d(image).mips(2, 3),
        ImageViewDescription::color_2d(image).mips(0, 0),
    ] {
        let err = resources.register_view(description).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidSubresource(_))
        ));
    }
}

#[test]
fn foreign_ids_are_rejected() {
    let mut resources = ResourceRegistry::new();
    let mut other = ResourceRegistry::new();
    let foreign = other.register_image(sample_image("gbuffer"));

    let err = resources.describe_image(foreign).unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(), Some(&Error::UnknownResource));

    let err = resources
        .register_view(ImageViewDescription::color_2d(foreign))
        .unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(), Some(&Error::UnknownResource));
}

#[test]
fn equal_descriptions_in_different_registries_get_distinct_ids() {
    let mut resources = ResourceRegistry::new();
    let mut other = ResourceRegistry::new();
    let a = resources.register_image(sample_image("gbuffer"));
    let b = other.register_image(sample_image("gbuffer"));
    assert_ne!(a, b);
}
