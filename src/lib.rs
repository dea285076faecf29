//! quadview
//!
//! Four viewports onto one textured model, each rendered into its own
//! offscreen target and composited into a single window. A transform gizmo
//! in whichever viewport holds the pointer edits the transform all four share.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod logging;
pub mod prelude;
pub mod timing;
pub mod viewport;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::QuadviewApp;
pub use config::{AppConfig, Rgba8};
pub use error::{QuadviewError, Result};
