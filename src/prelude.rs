//! # Quadview Prelude
//!
//! Commonly used types in one import:
//!
//! ```no_run
//! use quadview::prelude::*;
//!
//! fn main() -> quadview::Result<()> {
//!     init_logging(LoggingConfig::default());
//!     QuadviewApp::new(AppConfig::default().with_gizmo_mode(GizmoMode::Scale)).run()
//! }
//! ```

// Application and configuration
pub use crate::app::QuadviewApp;
pub use crate::config::{AppConfig, Rgba8};
pub use crate::error::{QuadviewError, Result};
pub use crate::logging::{init_logging, LoggingConfig};

// Scene, cameras and gizmos
pub use crate::gfx::camera::{Projection, ViewCamera};
pub use crate::gfx::gizmos::{GizmoMode, GizmoView, Manipulator, TransformGizmo};
pub use crate::gfx::scene::Transform;

// Viewports
pub use crate::viewport::{select_active, PointerState, Rect, ViewportLayout};

// Common external dependencies
pub use cgmath::{Quaternion, Vector2, Vector3};
