//! WGPU utility functions and helpers
//!
//! Typed buffer wrappers and bind group layout shorthands.

pub mod binding_types;
pub mod uniform_buffer;

pub use uniform_buffer::{DynamicBuffer, UniformBuffer};
