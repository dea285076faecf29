//! Compositing offscreen targets into the window
//!
//! Offscreen targets store their rows bottom-up, so each one is drawn into
//! its screen rectangle through a vertically flipped source rectangle
//! (negative height). The arithmetic lives in pure functions; [`Compositor`]
//! records the GPU blits.

use crate::error::Result;
use crate::gfx::rendering::shaders::BLIT_SHADER;
use crate::gfx::rendering::{PipelineConfig, RenderEngine};
use crate::gfx::resources::RenderTarget;
use crate::wgpu_utils::{binding_types, UniformBuffer};

use super::layout::Rect;

const BLIT_PIPELINE: &str = "Blit";

/// Source region of a texture in texels. A negative width or height
/// mirrors the region along that axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl SourceRect {
    /// The whole texture, flipped vertically
    pub fn flipped_full(size: (u32, u32)) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: size.0 as f32,
            height: -(size.1 as f32),
        }
    }
}

/// Maps destination uv in `[0, 1]` to source uv: `offset + uv * scale`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvTransform {
    pub offset: [f32; 2],
    pub scale: [f32; 2],
}

pub fn uv_transform(src: &SourceRect, texture_size: (u32, u32)) -> UvTransform {
    let (tw, th) = (texture_size.0 as f32, texture_size.1 as f32);
    UvTransform {
        offset: [
            (src.x + (-src.width).max(0.0)) / tw,
            (src.y + (-src.height).max(0.0)) / th,
        ],
        scale: [src.width / tw, src.height / th],
    }
}

/// Window position at which stored texel `(x, y)` of a `target_size` target
/// shows up when composited into `rect` with [`SourceRect::flipped_full`]
pub fn texel_to_window(rect: &Rect, target_size: (u32, u32), texel: (u32, u32)) -> (f32, f32) {
    let (tw, th) = (target_size.0 as f32, target_size.1 as f32);
    let (x, y) = (texel.0 as f32, texel.1 as f32);
    (
        rect.x + x * rect.width / tw,
        rect.y + (th - 1.0 - y) * rect.height / th,
    )
}

/// Whether `rect` is a valid render-pass viewport on a `surface_size` surface
pub fn fits_surface(rect: &Rect, surface_size: (u32, u32)) -> bool {
    rect.x >= 0.0
        && rect.y >= 0.0
        && rect.width > 0.0
        && rect.height > 0.0
        && rect.x + rect.width <= surface_size.0 as f32
        && rect.y + rect.height <= surface_size.1 as f32
}

/// Must match `BlitUniform` in the blit shader
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlitUniform {
    pub uv_offset: [f32; 2],
    pub uv_scale: [f32; 2],
}

impl From<UvTransform> for BlitUniform {
    fn from(t: UvTransform) -> Self {
        Self {
            uv_offset: t.offset,
            uv_scale: t.scale,
        }
    }
}

/// Draws viewport targets into the window surface
pub struct Compositor {
    pipeline: wgpu::RenderPipeline,
    blit_layout: wgpu::BindGroupLayout,
}

impl Compositor {
    pub fn new(engine: &mut RenderEngine) -> Result<Self> {
        let blit_layout = engine
            .device()
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Blit Bind Group Layout"),
                entries: &[
                    binding_types::entry(0, wgpu::ShaderStages::FRAGMENT, binding_types::texture_2d()),
                    binding_types::entry(
                        1,
                        wgpu::ShaderStages::FRAGMENT,
                        binding_types::sampler(wgpu::SamplerBindingType::Filtering),
                    ),
                    binding_types::entry(2, wgpu::ShaderStages::FRAGMENT, binding_types::uniform()),
                ],
            });

        let config = PipelineConfig::default_with_shader("blit")
            .with_label("Blit Pipeline")
            .with_bind_group_layouts(vec![blit_layout.clone()])
            .with_cull_mode(None)
            .with_color_format(engine.surface_format(), wgpu::BlendState::REPLACE);

        let pipelines = &mut engine.pipeline_manager;
        pipelines.load_shader("blit", BLIT_SHADER);
        pipelines.register_pipeline(BLIT_PIPELINE, config);
        pipelines.create_all_pipelines()?;

        Ok(Self {
            pipeline: pipelines.require(BLIT_PIPELINE)?,
            blit_layout,
        })
    }

    /// Bind group sampling `target` through `uniform`
    pub fn create_blit_bind_group(
        &self,
        device: &wgpu::Device,
        target: &RenderTarget,
        uniform: &UniformBuffer<BlitUniform>,
        label: &str,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Blit Bind Group", label)),
            layout: &self.blit_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&target.color.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&target.color.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniform.binding_resource(),
                },
            ],
        })
    }

    /// Clears the whole window to the background colour
    pub fn clear(&self, encoder: &mut wgpu::CommandEncoder, surface_view: &wgpu::TextureView, color: wgpu::Color) {
        let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Window Clear Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
    }

    /// Draws one viewport target into `rect` of the window. A rectangle
    /// that no longer fits the surface is skipped; wgpu rejects such
    /// viewports.
    pub fn composite(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        surface_size: (u32, u32),
        rect: &Rect,
        blit_bind_group: &wgpu::BindGroup,
    ) {
        if !fits_surface(rect, surface_size) {
            log::warn!("viewport {:?} lies outside the {:?} surface, skipped", rect, surface_size);
            return;
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Composite Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        pass.set_viewport(rect.x, rect.y, rect.width, rect.height, 0.0, 1.0);
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, blit_bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::layout::ViewportLayout;

    /// Texel the blit shader samples for window pixel `(wx, wy)` in `rect`,
    /// with nearest filtering at pixel centres
    fn sampled_texel(rect: &Rect, size: (u32, u32), uv: &UvTransform, wx: u32, wy: u32) -> (u32, u32) {
        let du = (wx as f32 + 0.5 - rect.x) / rect.width;
        let dv = (wy as f32 + 0.5 - rect.y) / rect.height;
        let u = uv.offset[0] + du * uv.scale[0];
        let v = uv.offset[1] + dv * uv.scale[1];
        ((u * size.0 as f32).floor() as u32, (v * size.1 as f32).floor() as u32)
    }

    #[test]
    fn test_flipped_source_maps_to_inverted_v() {
        let uv = uv_transform(&SourceRect::flipped_full((480, 270)), (480, 270));
        assert_eq!(uv.offset, [0.0, 1.0]);
        assert_eq!(uv.scale, [1.0, -1.0]);
    }

    #[test]
    fn test_unflipped_source_is_identity() {
        let src = SourceRect {
            x: 0.0,
            y: 0.0,
            width: 64.0,
            height: 32.0,
        };
        let uv = uv_transform(&src, (64, 32));
        assert_eq!(uv.offset, [0.0, 0.0]);
        assert_eq!(uv.scale, [1.0, 1.0]);
    }

    #[test]
    fn test_texel_lands_mirrored_in_its_rectangle() {
        let rects = ViewportLayout::grid((960, 540), 4, 2).unwrap();
        let size = (480, 270);

        assert_eq!(texel_to_window(&rects[0], size, (0, 0)), (0.0, 269.0));
        assert_eq!(texel_to_window(&rects[3], size, (0, 0)), (480.0, 539.0));
        assert_eq!(texel_to_window(&rects[3], size, (479, 269)), (959.0, 270.0));
        assert_eq!(texel_to_window(&rects[1], size, (10, 20)), (490.0, 249.0));
    }

    #[test]
    fn test_blit_sampling_agrees_with_texel_to_window() {
        let rects = ViewportLayout::grid((960, 540), 4, 2).unwrap();
        let size = (480, 270);
        let uv = uv_transform(&SourceRect::flipped_full(size), size);

        for rect in &rects {
            for &texel in &[(0, 0), (479, 0), (0, 269), (123, 45), (479, 269)] {
                let (wx, wy) = texel_to_window(rect, size, texel);
                assert_eq!(sampled_texel(rect, size, &uv, wx as u32, wy as u32), texel);
            }
        }
    }

    #[test]
    fn test_scaled_target_spreads_over_rectangle() {
        let rect = Rect::new(480.0, 270.0, 480.0, 270.0);
        // A 2x target: texel rows map back onto half-pixel steps
        assert_eq!(texel_to_window(&rect, (960, 540), (2, 0)), (481.0, 270.0 + 539.0 * 0.5));
    }

    #[test]
    fn test_rect_outside_shrunk_surface_is_rejected() {
        // Laid out for a 1920x1080 window, then the surface shrinks to 960x540
        let rects = ViewportLayout::grid((1920, 1080), 4, 2).unwrap();
        assert!(rects.iter().all(|r| fits_surface(r, (1920, 1080))));
        assert!(!fits_surface(&rects[3], (960, 540)));
        assert!(!fits_surface(&rects[1], (960, 540)));

        // Rebuilding the grid from the new size fits again
        let rebuilt = ViewportLayout::grid((960, 540), 4, 2).unwrap();
        assert!(rebuilt.iter().all(|r| fits_surface(r, (960, 540))));
    }

    #[test]
    fn test_blit_uniform_layout() {
        assert_eq!(std::mem::size_of::<BlitUniform>(), 16);
        let uniform = BlitUniform::from(uv_transform(&SourceRect::flipped_full((4, 4)), (4, 4)));
        assert_eq!(uniform.uv_offset, [0.0, 1.0]);
        assert_eq!(uniform.uv_scale, [1.0, -1.0]);
    }
}
