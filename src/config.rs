//! Application configuration
//!
//! [`AppConfig`] carries every constant of the four-viewport scene. The defaults
//! reproduce the reference layout: a 960x540 window split into four quadrants,
//! each with its own camera and background colour, all looking at one crate.

use std::path::PathBuf;

use cgmath::Vector3;

use crate::gfx::{camera::Projection, gizmos::GizmoMode};
use crate::logging::LoggingConfig;

/// 8-bit RGBA colour, converted to `wgpu::Color` when a pass is cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Rgba8 = Rgba8::new(0, 0, 0, 255);
    pub const WHITE: Rgba8 = Rgba8::new(255, 255, 255, 255);
    pub const PURPLE: Rgba8 = Rgba8::new(200, 122, 255, 255);
    pub const ORANGE: Rgba8 = Rgba8::new(255, 161, 0, 255);
    pub const RED: Rgba8 = Rgba8::new(230, 41, 55, 255);
    pub const MIDNIGHT: Rgba8 = Rgba8::new(0, 0, 25, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Normalized channels in `[0, 1]`
    pub fn to_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    pub fn to_wgpu(self) -> wgpu::Color {
        let [r, g, b, a] = self.to_array();
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        }
    }
}

/// Top-level configuration for [`QuadviewApp`](crate::QuadviewApp)
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Logical window size in pixels. The window is not resizable.
    pub window_size: (u32, u32),
    pub title: String,
    /// Colour behind the composited viewports
    pub background: Rgba8,

    pub viewport_count: usize,
    /// Grid columns; rows are derived from `viewport_count`
    pub columns: usize,
    /// One eye position per viewport, in registry order
    pub camera_positions: Vec<Vector3<f32>>,
    /// One clear colour per viewport, in registry order
    pub clear_colors: Vec<Rgba8>,
    pub camera_target: Vector3<f32>,
    pub fovy_degrees: f32,
    pub projection: Projection,

    /// Offscreen target size relative to its screen rectangle
    pub target_scale: f32,
    /// 1 disables multisampling, 4 matches the reference MSAA hint
    pub msaa_samples: u32,

    pub gizmo_size: f32,
    pub gizmo_mode: GizmoMode,

    /// Frame-rate cap; 0 renders as fast as the event loop allows
    pub target_fps: u32,

    pub asset_dir: PathBuf,
    /// Relative to `asset_dir`
    pub model_path: PathBuf,
    /// Relative to `asset_dir`
    pub texture_path: PathBuf,

    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_size: (960, 540),
            title: "quadview | Gizmo With Render Targets".to_string(),
            background: Rgba8::MIDNIGHT,
            viewport_count: 4,
            columns: 2,
            camera_positions: vec![
                Vector3::new(-5.5, 5.5, 2.0),
                Vector3::new(5.5, 5.5, 2.0),
                Vector3::new(-2.5, 2.5, 2.0),
                Vector3::new(2.5, 2.5, 2.0),
            ],
            clear_colors: vec![Rgba8::BLACK, Rgba8::PURPLE, Rgba8::ORANGE, Rgba8::RED],
            camera_target: Vector3::new(0.0, 0.0, 0.0),
            fovy_degrees: 45.0,
            projection: Projection::Perspective,
            target_scale: 1.0,
            msaa_samples: 4,
            gizmo_size: 4.0,
            gizmo_mode: GizmoMode::Translate,
            target_fps: 60,
            asset_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets"),
            model_path: PathBuf::from("models/crate_model.obj"),
            texture_path: PathBuf::from("textures/crate_texture.png"),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_owned();
        self
    }

    pub fn with_target_scale(mut self, scale: f32) -> Self {
        self.target_scale = scale;
        self
    }

    /// Only 1 and 4 samples are portable without adapter-specific format
    /// features; anything else snaps to the nearer of the two.
    pub fn with_msaa_samples(mut self, samples: u32) -> Self {
        let snapped = if samples >= 4 { 4 } else { 1 };
        if snapped != samples {
            log::warn!("{}x MSAA is not supported, using {}x", samples, snapped);
        }
        self.msaa_samples = snapped;
        self
    }

    pub fn with_gizmo_size(mut self, size: f32) -> Self {
        self.gizmo_size = size;
        self
    }

    pub fn with_gizmo_mode(mut self, mode: GizmoMode) -> Self {
        self.gizmo_mode = mode;
        self
    }

    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_asset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.asset_dir = dir.into();
        self
    }

    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Applies `QUADVIEW_ASSET_DIR`, `QUADVIEW_TARGET_FPS` and `QUADVIEW_MSAA`
    /// when set. Unparseable values are logged and ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var("QUADVIEW_ASSET_DIR") {
            self.asset_dir = PathBuf::from(dir);
        }
        if let Ok(fps) = std::env::var("QUADVIEW_TARGET_FPS") {
            match fps.parse() {
                Ok(fps) => self.target_fps = fps,
                Err(_) => log::warn!("ignoring QUADVIEW_TARGET_FPS='{}'", fps),
            }
        }
        if let Ok(samples) = std::env::var("QUADVIEW_MSAA") {
            match samples.parse::<u32>() {
                Ok(s) if s == 1 || s == 4 => self.msaa_samples = s,
                _ => log::warn!("ignoring QUADVIEW_MSAA='{}' (expected 1 or 4)", samples),
            }
        }
        self
    }

    pub fn model_file(&self) -> PathBuf {
        self.asset_dir.join(&self.model_path)
    }

    pub fn texture_file(&self) -> PathBuf {
        self.asset_dir.join(&self.texture_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_scene() {
        let config = AppConfig::default();
        assert_eq!(config.window_size, (960, 540));
        assert_eq!(config.viewport_count, 4);
        assert_eq!(config.camera_positions.len(), config.viewport_count);
        assert_eq!(config.clear_colors.len(), config.viewport_count);
        assert_eq!(config.clear_colors[1], Rgba8::PURPLE);
        assert_eq!(config.gizmo_mode, GizmoMode::Translate);
        assert_eq!(config.gizmo_size, 4.0);
        assert_eq!(config.target_fps, 60);
    }

    #[test]
    fn test_builder_methods() {
        let config = AppConfig::default()
            .with_window_size(640, 480)
            .with_target_scale(2.0)
            .with_msaa_samples(1)
            .with_asset_dir("/tmp/assets");
        assert_eq!(config.window_size, (640, 480));
        assert_eq!(config.target_scale, 2.0);
        assert_eq!(config.msaa_samples, 1);
        assert_eq!(
            config.model_file(),
            PathBuf::from("/tmp/assets/models/crate_model.obj")
        );
    }

    #[test]
    fn test_rgba8_normalization() {
        let [r, g, b, a] = Rgba8::MIDNIGHT.to_array();
        assert_eq!((r, g, a), (0.0, 0.0, 1.0));
        assert!((b - 25.0 / 255.0).abs() < 1e-6);
        assert_eq!(Rgba8::WHITE.to_wgpu(), wgpu::Color::WHITE);
    }

    #[test]
    fn test_msaa_samples_snap_to_portable_counts() {
        assert_eq!(AppConfig::default().with_msaa_samples(8).msaa_samples, 4);
        assert_eq!(AppConfig::default().with_msaa_samples(4).msaa_samples, 4);
        assert_eq!(AppConfig::default().with_msaa_samples(2).msaa_samples, 1);
        assert_eq!(AppConfig::default().with_msaa_samples(0).msaa_samples, 1);
    }
}
