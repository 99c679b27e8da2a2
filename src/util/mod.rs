//! Utility functionality that doesn't quite fit anywhere else

pub mod to_vk;
