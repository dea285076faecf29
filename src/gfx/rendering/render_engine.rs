//! WGPU device and window surface ownership
//!
//! [`RenderEngine`] acquires the adapter, device and surface at startup and
//! hands out one [`Frame`] (surface texture + command encoder) per redraw.
//! What gets drawn is up to the scene renderer and compositor.

use std::sync::Arc;
use wgpu::TextureFormat;

use super::pipeline_manager::PipelineManager;
use crate::error::{QuadviewError, Result};
use crate::gfx::resources::TextureResource;

/// One frame in flight: the surface texture to present and the encoder all
/// passes of the frame record into
pub struct Frame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

/// Core rendering engine managing the GPU device and window surface
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    format: TextureFormat,
    target_format_features: wgpu::TextureFormatFeatureFlags,
    depth_format_features: wgpu::TextureFormatFeatureFlags,
    pub pipeline_manager: PipelineManager,
}

impl RenderEngine {
    /// Colour format of every offscreen viewport target
    pub const TARGET_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;

    /// Creates a new render engine for the given window
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| QuadviewError::Adapter(e.to_string()))?;

        let info = adapter.get_info();
        log::info!("using adapter '{}' ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| QuadviewError::Adapter("surface reports no formats".into()))?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!("surface configured {}x{} ({:?})", config.width, config.height, format);

        let target_format_features = adapter.get_texture_format_features(Self::TARGET_FORMAT).flags;
        let depth_format_features = adapter
            .get_texture_format_features(TextureResource::DEPTH_FORMAT)
            .flags;

        let device = Arc::new(device);
        let queue = Arc::new(queue);
        let pipeline_manager = PipelineManager::new(device.clone());

        Ok(Self {
            surface,
            device,
            queue,
            config,
            format,
            target_format_features,
            depth_format_features,
            pipeline_manager,
        })
    }

    /// 4 if both target formats support it, 1 otherwise
    pub fn resolve_sample_count(&self, requested: u32) -> u32 {
        if requested != 4 {
            if requested > 1 {
                log::warn!("{}x MSAA is not portable, rendering without it", requested);
            }
            return 1;
        }
        if self.target_format_features.sample_count_supported(requested)
            && self.depth_format_features.sample_count_supported(requested)
        {
            requested
        } else {
            log::warn!("{}x MSAA unsupported by adapter, rendering without it", requested);
            1
        }
    }

    /// Acquires the next surface texture.
    ///
    /// Returns `Ok(None)` when the frame should be skipped (surface lost,
    /// outdated or timed out); the surface is reconfigured where needed.
    pub fn begin_frame(&mut self) -> Result<Option<Frame>> {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                log::warn!("surface {}, reconfiguring", e);
                self.surface.configure(&self.device, &self.config);
                return Ok(None);
            }
            Err(e @ (wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other)) => {
                log::warn!("skipping frame: {}", e);
                return Ok(None);
            }
            Err(e) => return Err(QuadviewError::Present(e)),
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        Ok(Some(Frame {
            surface_texture,
            view,
            encoder,
        }))
    }

    /// Submits everything recorded into the frame and presents it
    pub fn end_frame(&self, frame: Frame) {
        self.queue.submit(std::iter::once(frame.encoder.finish()));
        frame.surface_texture.present();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}
