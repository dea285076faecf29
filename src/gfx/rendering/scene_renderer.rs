//! Per-viewport scene pass
//!
//! Draws the shared model (and, for the active viewport, the gizmo handles)
//! into a viewport's offscreen target. One pass per viewport per frame:
//! clear to the viewport colour, draw the model, draw the handles.

use super::pipeline_manager::{DepthConfig, PipelineConfig};
use super::render_engine::RenderEngine;
use super::shaders::{GIZMO_SHADER, MODEL_SHADER};
use crate::error::Result;
use crate::gfx::camera::ViewCamera;
use crate::gfx::gizmos::GizmoDrawData;
use crate::gfx::resources::{RenderTarget, TextureResource};
use crate::gfx::scene::{DrawModel, GizmoVertex, Model, Transform, Vertex3D};
use crate::wgpu_utils::{binding_types, DynamicBuffer, UniformBuffer};

const MODEL_PIPELINE: &str = "Model";
const GIZMO_PIPELINE: &str = "Gizmo";

/// Must match `SceneUniform` in the model and gizmo shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub tint: [f32; 4],
}

impl SceneUniform {
    /// Uniform for drawing `transform` into an offscreen target seen by `camera`
    pub fn for_target(camera: &ViewCamera, transform: &Transform, tint: [f32; 4]) -> Self {
        Self {
            view_proj: camera.target_view_projection_matrix().into(),
            model: transform.to_matrix().into(),
            tint,
        }
    }
}

/// The GPU state one viewport contributes to its scene pass
pub struct ScenePassInputs<'a> {
    pub target: &'a RenderTarget,
    pub scene_bind_group: &'a wgpu::BindGroup,
    pub clear_color: wgpu::Color,
    pub label: &'a str,
}

pub struct SceneRenderer {
    model_pipeline: wgpu::RenderPipeline,
    gizmo_pipeline: wgpu::RenderPipeline,
    scene_layout: wgpu::BindGroupLayout,
    model_bind_group: wgpu::BindGroup,
    gizmo_vertices: DynamicBuffer<GizmoVertex>,
    gizmo_indices: DynamicBuffer<u32>,
    sample_count: u32,
}

impl SceneRenderer {
    pub const TINT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    pub fn new(engine: &mut RenderEngine, model: &Model, sample_count: u32) -> Result<Self> {
        let device = engine.device();

        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[binding_types::entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                binding_types::uniform(),
            )],
        });
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Model Texture Bind Group Layout"),
            entries: &[
                binding_types::entry(0, wgpu::ShaderStages::FRAGMENT, binding_types::texture_2d()),
                binding_types::entry(
                    1,
                    wgpu::ShaderStages::FRAGMENT,
                    binding_types::sampler(wgpu::SamplerBindingType::Filtering),
                ),
            ],
        });

        let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Model Texture Bind Group"),
            layout: &texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&model.texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&model.texture.sampler),
                },
            ],
        });

        let gizmo_vertices = DynamicBuffer::new(device, 256, wgpu::BufferUsages::VERTEX);
        let gizmo_indices = DynamicBuffer::new(device, 1024, wgpu::BufferUsages::INDEX);

        // Targets store rows bottom-up, which mirrors winding
        let model_config = PipelineConfig::default_with_shader("model")
            .with_label("Model Pipeline")
            .with_bind_group_layouts(vec![scene_layout.clone(), texture_layout])
            .with_vertex_layouts(vec![Vertex3D::desc()])
            .with_front_face(wgpu::FrontFace::Cw)
            .with_depth(DepthConfig::standard(TextureResource::DEPTH_FORMAT))
            .with_sample_count(sample_count)
            .with_color_format(RenderEngine::TARGET_FORMAT, wgpu::BlendState::REPLACE);

        let gizmo_config = PipelineConfig::default_with_shader("gizmo")
            .with_label("Gizmo Pipeline")
            .with_bind_group_layouts(vec![scene_layout.clone()])
            .with_vertex_layouts(vec![GizmoVertex::desc()])
            .with_cull_mode(None)
            .with_depth(DepthConfig::overlay(TextureResource::DEPTH_FORMAT))
            .with_sample_count(sample_count)
            .with_color_format(RenderEngine::TARGET_FORMAT, wgpu::BlendState::ALPHA_BLENDING);

        let pipelines = &mut engine.pipeline_manager;
        pipelines.load_shader("model", MODEL_SHADER);
        pipelines.load_shader("gizmo", GIZMO_SHADER);
        pipelines.register_pipeline(MODEL_PIPELINE, model_config);
        pipelines.register_pipeline(GIZMO_PIPELINE, gizmo_config);
        pipelines.create_all_pipelines()?;

        Ok(Self {
            model_pipeline: pipelines.require(MODEL_PIPELINE)?,
            gizmo_pipeline: pipelines.require(GIZMO_PIPELINE)?,
            scene_layout,
            model_bind_group,
            gizmo_vertices,
            gizmo_indices,
            sample_count,
        })
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Bind group over a viewport's own uniform buffer
    pub fn create_scene_bind_group(
        &self,
        device: &wgpu::Device,
        uniform: &UniformBuffer<SceneUniform>,
        label: &str,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Scene Bind Group", label)),
            layout: &self.scene_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.binding_resource(),
            }],
        })
    }

    /// Stages handle geometry for the next [`render_viewport`](Self::render_viewport)
    /// call that asks for it. Empty data clears the handles.
    pub fn upload_gizmo(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &GizmoDrawData) {
        self.gizmo_vertices.write(device, queue, &data.vertices);
        self.gizmo_indices.write(device, queue, &data.indices);
    }

    /// Records the scene pass of one viewport
    pub fn render_viewport(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        inputs: &ScenePassInputs<'_>,
        model: &Model,
        draw_gizmo: bool,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(inputs.label),
            color_attachments: &[Some(inputs.target.color_attachment(inputs.clear_color))],
            depth_stencil_attachment: Some(inputs.target.depth_attachment()),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        pass.set_bind_group(0, inputs.scene_bind_group, &[]);

        pass.set_pipeline(&self.model_pipeline);
        pass.set_bind_group(1, &self.model_bind_group, &[]);
        pass.draw_model(model);

        if draw_gizmo && !self.gizmo_indices.is_empty() {
            pass.set_pipeline(&self.gizmo_pipeline);
            pass.set_vertex_buffer(0, self.gizmo_vertices.slice());
            pass.set_index_buffer(self.gizmo_indices.slice(), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..self.gizmo_indices.len() as u32, 0, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use cgmath::SquareMatrix;

    #[test]
    fn test_scene_uniform_layout() {
        // Two mat4 plus one vec4, no padding
        assert_eq!(std::mem::size_of::<SceneUniform>(), 144);
    }

    #[test]
    fn test_identity_transform_uploads_identity_model() {
        let identity: [[f32; 4]; 4] = cgmath::Matrix4::identity().into();
        let config = AppConfig::default();
        for &position in &config.camera_positions {
            let camera = ViewCamera::new(position, config.camera_target);
            let uniform = SceneUniform::for_target(&camera, &Transform::IDENTITY, SceneRenderer::TINT);
            assert_eq!(uniform.model, identity);
            assert_ne!(uniform.view_proj, identity);
        }
    }
}
