//! Defines a simple utility trait to convert charon datastructures into Vulkan datastructures

/// Implemented for charon types that have a Vulkan equivalent.
pub trait IntoVulkanType {
    /// The Vulkan type this type converts into.
    type Output;

    /// Convert this into a Vulkan type.
    fn into_vulkan(self) -> Self::Output;
}
