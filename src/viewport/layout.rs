//! Screen-space viewport layout
//!
//! Everything here is CPU-only: the grid split of the window and the
//! per-viewport camera/colour specs the registry allocates GPU targets from.

use cgmath::{Deg, Vector2};

use crate::config::{AppConfig, Rgba8};
use crate::error::{QuadviewError, Result};
use crate::gfx::camera::ViewCamera;

/// Window-space rectangle, top-left origin, +y down
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Vector2<f32> {
        Vector2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vector2<f32> {
        Vector2::new(self.width, self.height)
    }

    /// Half-open containment: a point on an edge shared by two neighbours
    /// belongs to the right/lower one only.
    pub fn contains(&self, p: Vector2<f32>) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Pixel size of an offscreen target covering this rectangle at `scale`
    pub fn target_size(&self, scale: f32) -> (u32, u32) {
        (
            ((self.width * scale).floor() as u32).max(1),
            ((self.height * scale).floor() as u32).max(1),
        )
    }
}

/// Everything needed to allocate one viewport
#[derive(Debug, Clone)]
pub struct ViewportSpec {
    pub rect: Rect,
    pub camera: ViewCamera,
    pub clear_color: Rgba8,
}

pub struct ViewportLayout;

impl ViewportLayout {
    /// Splits the window into `count` equal cells, `columns` wide, filled row
    /// by row: cell `i` sits at column `i % columns`, row `i / columns`.
    pub fn grid(window_size: (u32, u32), count: usize, columns: usize) -> Result<Vec<Rect>> {
        let (w, h) = window_size;
        if w == 0 || h == 0 {
            return Err(QuadviewError::InvalidLayout(format!(
                "window has zero area ({}x{})",
                w, h
            )));
        }
        if count == 0 || columns == 0 {
            return Err(QuadviewError::InvalidLayout(format!(
                "cannot split into {} viewports over {} columns",
                count, columns
            )));
        }

        let rows = count.div_ceil(columns);
        let cell_w = w as f32 / columns as f32;
        let cell_h = h as f32 / rows as f32;

        Ok((0..count)
            .map(|i| {
                let col = (i % columns) as f32;
                let row = (i / columns) as f32;
                Rect::new(col * cell_w, row * cell_h, cell_w, cell_h)
            })
            .collect())
    }

    /// Grid cells paired with the configured cameras and clear colours
    pub fn specs(config: &AppConfig, window_size: (u32, u32)) -> Result<Vec<ViewportSpec>> {
        let count = config.viewport_count;
        if config.camera_positions.len() != count || config.clear_colors.len() != count {
            return Err(QuadviewError::InvalidLayout(format!(
                "{} viewports need as many cameras and clear colours (got {} and {})",
                count,
                config.camera_positions.len(),
                config.clear_colors.len()
            )));
        }

        let rects = Self::grid(window_size, count, config.columns)?;
        Ok(rects
            .into_iter()
            .zip(config.camera_positions.iter().zip(&config.clear_colors))
            .map(|(rect, (&position, &clear_color))| {
                let mut camera = ViewCamera::new(position, config.camera_target)
                    .with_fovy(Deg(config.fovy_degrees))
                    .with_projection(config.projection);
                let (tw, th) = rect.target_size(config.target_scale);
                camera.resize_projection(tw, th);
                ViewportSpec {
                    rect,
                    camera,
                    clear_color,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window_splits_into_quadrants() {
        let rects = ViewportLayout::grid((960, 540), 4, 2).unwrap();
        assert_eq!(
            rects,
            vec![
                Rect::new(0.0, 0.0, 480.0, 270.0),
                Rect::new(480.0, 0.0, 480.0, 270.0),
                Rect::new(0.0, 270.0, 480.0, 270.0),
                Rect::new(480.0, 270.0, 480.0, 270.0),
            ]
        );
    }

    #[test]
    fn test_grid_tiles_window_without_gaps_or_overlaps() {
        for &(w, h) in &[(960, 540), (800, 600), (1280, 720), (2, 2)] {
            let rects = ViewportLayout::grid((w, h), 4, 2).unwrap();
            let total: f32 = rects.iter().map(Rect::area).sum();
            assert!((total - (w * h) as f32).abs() < 1e-2);

            // Every pixel centre lies in exactly one rectangle
            for py in 0..h {
                for px in 0..w {
                    let p = Vector2::new(px as f32 + 0.5, py as f32 + 0.5);
                    assert_eq!(rects.iter().filter(|r| r.contains(p)).count(), 1);
                }
            }
        }
    }

    #[test]
    fn test_shared_edge_belongs_to_one_viewport() {
        let rects = ViewportLayout::grid((960, 540), 4, 2).unwrap();
        let on_corner = Vector2::new(480.0, 270.0);
        let owners: Vec<usize> = (0..4).filter(|&i| rects[i].contains(on_corner)).collect();
        assert_eq!(owners, vec![3]);
    }

    #[test]
    fn test_zero_sized_window_is_rejected() {
        assert!(matches!(
            ViewportLayout::grid((0, 540), 4, 2),
            Err(QuadviewError::InvalidLayout(_))
        ));
        assert!(ViewportLayout::grid((960, 540), 4, 0).is_err());
    }

    #[test]
    fn test_odd_count_leaves_last_row_partial() {
        let rects = ViewportLayout::grid((900, 600), 3, 2).unwrap();
        assert_eq!(rects[2], Rect::new(0.0, 300.0, 450.0, 300.0));
    }

    #[test]
    fn test_target_size_scales_and_never_hits_zero() {
        let rect = Rect::new(480.0, 270.0, 480.0, 270.0);
        assert_eq!(rect.target_size(1.0), (480, 270));
        assert_eq!(rect.target_size(2.0), (960, 540));
        assert_eq!(rect.target_size(0.0), (1, 1));
    }

    #[test]
    fn test_specs_pair_cameras_and_colours() {
        let config = AppConfig::default();
        let specs = ViewportLayout::specs(&config, config.window_size).unwrap();
        assert_eq!(specs.len(), 4);
        assert_eq!(specs[1].clear_color, Rgba8::PURPLE);
        assert_eq!(specs[2].camera.position, config.camera_positions[2]);
        assert!((specs[0].camera.aspect - 480.0 / 270.0).abs() < 1e-6);
    }

    #[test]
    fn test_specs_reject_mismatched_camera_count() {
        let mut config = AppConfig::default();
        config.camera_positions.pop();
        assert!(ViewportLayout::specs(&config, (960, 540)).is_err());
    }
}
