//! Texture resource management for wgpu
//!
//! Provides utilities for creating GPU textures, views, and samplers: the
//! model's albedo texture (decoded with `image`, mipmapped on the CPU) and
//! the colour/depth attachments of offscreen render targets. Only textures
//! that get sampled carry a sampler; pure attachments are [`Attachment`]s.

use std::path::Path;

use image::{imageops::FilterType, RgbaImage};

use crate::error::{QuadviewError, Result};

/// GPU texture resource containing texture, view, and sampler
#[derive(Clone)]
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl TextureResource {
    /// Standard depth buffer format used throughout the engine
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Albedo textures are stored without sRGB decoding, matching the
    /// non-sRGB surface the engine presents to
    pub const ALBEDO_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Creates a sampleable single-sampled colour target. The compositor
    /// reads it back 1:1, so the sampler does no filtering between texels.
    pub fn create_color_target(
        device: &wgpu::Device,
        size: (u32, u32),
        format: wgpu::TextureFormat,
        label: &str,
    ) -> Self {
        let Attachment { texture, view } = Attachment::new(
            device,
            size,
            format,
            1,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            label,
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Decodes an image file and uploads it with a full mip chain and a
    /// trilinear sampler
    pub fn from_image_file(device: &wgpu::Device, queue: &wgpu::Queue, path: &Path) -> Result<Self> {
        let image = image::open(path)
            .map_err(|source| QuadviewError::TextureLoad {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();

        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "texture".to_string());
        let texture = Self::from_rgba_mipmapped(device, queue, &image, &label);
        log::info!(
            "loaded texture '{}' ({}x{}, {} mip levels)",
            path.display(),
            image.width(),
            image.height(),
            texture.texture.mip_level_count()
        );
        Ok(texture)
    }

    /// Uploads `image` and every level of its mip chain
    pub fn from_rgba_mipmapped(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        label: &str,
    ) -> Self {
        let levels = mip_chain(image);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width(),
                height: image.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: levels.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::ALBEDO_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, data) in levels.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                data.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * data.width()),
                    rows_per_image: Some(data.height()),
                },
                wgpu::Extent3d {
                    width: data.width(),
                    height: data.height(),
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

/// Render-only texture: a pass writes it, nothing samples it
pub struct Attachment {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Attachment {
    fn new(
        device: &wgpu::Device,
        size: (u32, u32),
        format: wgpu::TextureFormat,
        sample_count: u32,
        usage: wgpu::TextureUsages,
        label: &str,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// Depth buffer in [`TextureResource::DEPTH_FORMAT`]
    pub fn depth(device: &wgpu::Device, size: (u32, u32), sample_count: u32, label: &str) -> Self {
        Self::new(
            device,
            size,
            TextureResource::DEPTH_FORMAT,
            sample_count,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
            label,
        )
    }

    /// Multisampled colour buffer that resolves into a single-sampled target
    pub fn multisampled(
        device: &wgpu::Device,
        size: (u32, u32),
        format: wgpu::TextureFormat,
        sample_count: u32,
        label: &str,
    ) -> Self {
        Self::new(
            device,
            size,
            format,
            sample_count,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
            label,
        )
    }
}

/// Number of levels in a full mip chain down to 1x1
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Base image followed by successively halved copies, down to 1x1
pub fn mip_chain(image: &RgbaImage) -> Vec<RgbaImage> {
    let count = mip_level_count(image.width(), image.height());
    let mut levels = Vec::with_capacity(count as usize);
    levels.push(image.clone());

    for _ in 1..count {
        let Some(previous) = levels.last() else {
            break;
        };
        let width = (previous.width() / 2).max(1);
        let height = (previous.height() / 2).max(1);
        let next = image::imageops::resize(previous, width, height, FilterType::Triangle);
        levels.push(next);
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mip_level_count() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(300, 64), 9);
        assert_eq!(mip_level_count(0, 0), 1);
    }

    #[test]
    fn test_mip_chain_halves_down_to_one_pixel() {
        let image = RgbaImage::from_pixel(16, 4, image::Rgba([200, 100, 50, 255]));
        let chain = mip_chain(&image);

        let sizes: Vec<(u32, u32)> = chain.iter().map(|l| l.dimensions()).collect();
        assert_eq!(sizes, vec![(16, 4), (8, 2), (4, 1), (2, 1), (1, 1)]);

        // A flat colour stays flat at every level
        let last = chain[4].get_pixel(0, 0).0;
        for (channel, expected) in last.iter().zip([200u8, 100, 50, 255]) {
            assert!(channel.abs_diff(expected) <= 1);
        }
    }

    #[test]
    fn test_bundled_texture_decodes() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/textures/crate_texture.png");
        let image = image::open(&path).expect("bundled texture decodes").to_rgba8();
        assert!(image.width() > 0 && image.height() > 0);
    }
}
