//! The fixed set of viewports
//!
//! [`ViewportRegistry`] owns every viewport's offscreen target together with
//! the uniforms and bind groups that render into it and composite from it.
//! Targets live until the window layout changes and are released exactly
//! once.

use cgmath::Vector2;

use super::compositor::{uv_transform, BlitUniform, Compositor, SourceRect};
use super::input::select_active;
use super::layout::{Rect, ViewportSpec};
use crate::config::Rgba8;
use crate::error::Result;
use crate::gfx::camera::ViewCamera;
use crate::gfx::gizmos::GizmoView;
use crate::gfx::rendering::{ScenePassInputs, SceneRenderer, SceneUniform};
use crate::gfx::resources::RenderTarget;
use crate::gfx::scene::Transform;
use crate::wgpu_utils::UniformBuffer;

/// One camera/target pair and the screen rectangle it is shown in
pub struct Viewport {
    pub rect: Rect,
    pub camera: ViewCamera,
    pub clear_color: Rgba8,
    pub target: RenderTarget,
    label: String,
    scene_uniform: UniformBuffer<SceneUniform>,
    scene_bind_group: wgpu::BindGroup,
    _blit_uniform: UniformBuffer<BlitUniform>,
    blit_bind_group: wgpu::BindGroup,
}

impl Viewport {
    pub fn target_size(&self) -> (u32, u32) {
        self.target.size()
    }

    /// What the gizmo needs to hit-test and draw in this viewport
    pub fn gizmo_view(&self) -> GizmoView {
        GizmoView::new(self.camera, self.target.size())
    }

    /// Recomputes the world matrix from `transform` and uploads it with this
    /// viewport's camera
    pub fn update_scene(&mut self, queue: &wgpu::Queue, transform: &Transform) {
        let uniform = SceneUniform::for_target(&self.camera, transform, SceneRenderer::TINT);
        self.scene_uniform.update_content(queue, uniform);
    }

    pub fn scene_pass_inputs(&self) -> ScenePassInputs<'_> {
        ScenePassInputs {
            target: &self.target,
            scene_bind_group: &self.scene_bind_group,
            clear_color: self.clear_color.to_wgpu(),
            label: &self.label,
        }
    }

    pub fn blit_bind_group(&self) -> &wgpu::BindGroup {
        &self.blit_bind_group
    }
}

pub struct ViewportRegistry {
    viewports: Vec<Viewport>,
    rects: Vec<Rect>,
    released: bool,
}

impl ViewportRegistry {
    /// Allocates one render target per spec, sized `rect * target_scale`.
    /// Any allocation failure aborts the whole registry.
    pub fn new(
        device: &wgpu::Device,
        specs: Vec<ViewportSpec>,
        scene_renderer: &SceneRenderer,
        compositor: &Compositor,
        color_format: wgpu::TextureFormat,
        target_scale: f32,
    ) -> Result<Self> {
        let sample_count = scene_renderer.sample_count();
        let mut viewports = Vec::with_capacity(specs.len());

        for (index, spec) in specs.into_iter().enumerate() {
            let label = format!("Viewport {}", index);
            let size = spec.rect.target_size(target_scale);
            let target = RenderTarget::new(device, size, color_format, sample_count, &label)?;

            let scene_uniform = UniformBuffer::new_with_data(
                device,
                &SceneUniform::for_target(&spec.camera, &Transform::IDENTITY, SceneRenderer::TINT),
            );
            let scene_bind_group = scene_renderer.create_scene_bind_group(device, &scene_uniform, &label);

            let blit_uniform =
                UniformBuffer::new_with_data(device, &BlitUniform::from(uv_transform(&SourceRect::flipped_full(size), size)));
            let blit_bind_group = compositor.create_blit_bind_group(device, &target, &blit_uniform, &label);

            log::debug!(
                "{}: rect {:?}, target {}x{} ({}x MSAA)",
                label,
                spec.rect,
                size.0,
                size.1,
                sample_count
            );

            viewports.push(Viewport {
                rect: spec.rect,
                camera: spec.camera,
                clear_color: spec.clear_color,
                target,
                label,
                scene_uniform,
                scene_bind_group,
                _blit_uniform: blit_uniform,
                blit_bind_group,
            });
        }

        let rects = viewports.iter().map(|v| v.rect).collect();
        log::info!("allocated {} viewport targets", viewports.len());

        Ok(Self {
            viewports,
            rects,
            released: false,
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Viewport> {
        self.viewports.iter_mut()
    }

    /// First viewport, in registry order, whose rectangle holds `pointer`
    pub fn select_active(&self, pointer: Option<Vector2<f32>>) -> Option<usize> {
        select_active(&self.rects, pointer)
    }

    /// Destroys every render target. Later calls do nothing.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        for viewport in &self.viewports {
            viewport.target.destroy();
        }
        self.released = true;
        log::info!("released {} viewport targets", self.viewports.len());
    }
}

impl Drop for ViewportRegistry {
    fn drop(&mut self) {
        self.release();
    }
}
