//! Offscreen render targets
//!
//! A [`RenderTarget`] is the colour + depth pair one viewport renders into.
//! With multisampling enabled the pass draws into `msaa` and resolves into
//! `color`; `color` is always the single-sampled texture the compositor reads.

use super::texture_resource::{Attachment, TextureResource};
use crate::error::{QuadviewError, Result};

pub struct RenderTarget {
    pub color: TextureResource,
    pub msaa: Option<Attachment>,
    pub depth: Attachment,
    size: (u32, u32),
}

impl RenderTarget {
    pub fn new(
        device: &wgpu::Device,
        size: (u32, u32),
        format: wgpu::TextureFormat,
        sample_count: u32,
        label: &str,
    ) -> Result<Self> {
        let (width, height) = size;
        if width == 0 || height == 0 {
            return Err(QuadviewError::RenderTarget {
                width,
                height,
                reason: "zero extent".into(),
            });
        }
        let max = device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            return Err(QuadviewError::RenderTarget {
                width,
                height,
                reason: format!("exceeds device limit of {}", max),
            });
        }

        let color = TextureResource::create_color_target(device, size, format, &format!("{} Color", label));
        let msaa = (sample_count > 1)
            .then(|| Attachment::multisampled(device, size, format, sample_count, &format!("{} MSAA", label)));
        let depth = Attachment::depth(device, size, sample_count, &format!("{} Depth", label));

        Ok(Self {
            color,
            msaa,
            depth,
            size,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Colour attachment for a pass that clears to `clear`
    pub fn color_attachment(&self, clear: wgpu::Color) -> wgpu::RenderPassColorAttachment<'_> {
        let (view, resolve_target) = match &self.msaa {
            Some(msaa) => (&msaa.view, Some(&self.color.view)),
            None => (&self.color.view, None),
        };
        wgpu::RenderPassColorAttachment {
            view,
            resolve_target,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear),
                store: wgpu::StoreOp::Store,
            },
        }
    }

    pub fn depth_attachment(&self) -> wgpu::RenderPassDepthStencilAttachment<'_> {
        wgpu::RenderPassDepthStencilAttachment {
            view: &self.depth.view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Discard,
            }),
            stencil_ops: None,
        }
    }

    /// Frees the GPU memory now rather than when the handles drop
    pub fn destroy(&self) {
        self.color.texture.destroy();
        if let Some(msaa) = &self.msaa {
            msaa.texture.destroy();
        }
        self.depth.texture.destroy();
    }
}
