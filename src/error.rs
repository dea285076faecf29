//! Error types for the quadview crate
//!
//! Every failure the crate can report happens at startup: window and GPU
//! acquisition, asset loading and render target allocation. Once the frame
//! loop runs, rendering and compositing are assumed to succeed.

use std::path::PathBuf;

/// Startup failures. All of them are fatal: the frame loop never starts.
#[derive(Debug, thiserror::Error)]
pub enum QuadviewError {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create rendering surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(String),

    #[error("failed to acquire GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("failed to load texture '{}': {source}", path.display())]
    TextureLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to load model '{}': {source}", path.display())]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("model '{}' contains no meshes", path.display())]
    EmptyModel { path: PathBuf },

    #[error("failed to acquire frame: {0}")]
    Present(wgpu::SurfaceError),

    #[error("failed to build render pipelines: {0}")]
    Pipeline(String),

    #[error("invalid viewport layout: {0}")]
    InvalidLayout(String),

    #[error("failed to allocate render target {width}x{height}: {reason}")]
    RenderTarget {
        width: u32,
        height: u32,
        reason: String,
    },
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, QuadviewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_error_message() {
        let err = QuadviewError::InvalidLayout("window has zero area".into());
        assert_eq!(
            err.to_string(),
            "invalid viewport layout: window has zero area"
        );
    }

    #[test]
    fn test_render_target_error_message() {
        let err = QuadviewError::RenderTarget {
            width: 0,
            height: 270,
            reason: "zero extent".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to allocate render target 0x270: zero extent"
        );
    }

    #[test]
    fn test_empty_model_mentions_path() {
        let err = QuadviewError::EmptyModel {
            path: PathBuf::from("assets/models/crate_model.obj"),
        };
        assert!(err.to_string().contains("crate_model.obj"));
    }
}
