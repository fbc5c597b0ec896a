//! GPU textures uploaded from the asset cache

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use prism_core::{AssetCache, AssetKey, CubeMapData, ImageData};

use crate::constants::placeholder;

/// How a 2D texture's texels are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TexelSpace {
    /// sRGB-encoded color (color maps, backgrounds)
    Color,
    /// Raw data (normal, roughness, metalness, ...)
    Data,
}

impl TexelSpace {
    fn format(self) -> wgpu::TextureFormat {
        match self {
            TexelSpace::Color => wgpu::TextureFormat::Rgba8UnormSrgb,
            TexelSpace::Data => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// A texture with its default view.
pub struct GpuTexture {
    #[allow(dead_code)] // Held for GPU resource lifetime
    texture: wgpu::Texture,
    /// View bound in shaders.
    pub view: wgpu::TextureView,
}

/// Texture uploads keyed by asset key
///
/// Only ready assets are uploaded; a pending or failed asset has no GPU
/// texture and the caller binds a placeholder instead.
pub struct TextureManager {
    images: HashMap<(AssetKey, TexelSpace), GpuTexture>,
    cubes: HashMap<AssetKey, GpuTexture>,
    white: GpuTexture,
    flat_normal: GpuTexture,
    black_cube: GpuTexture,
    sampler: wgpu::Sampler,
}

impl TextureManager {
    /// Create the manager and its placeholder textures
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let white = upload_pixel(device, queue, "White Placeholder", placeholder::WHITE);
        let flat_normal = upload_pixel(device, queue, "Normal Placeholder", placeholder::FLAT_NORMAL);
        let black_cube = upload_cube(
            device,
            queue,
            "Empty Cube Map",
            1,
            &[0, 0, 0, 255].repeat(6),
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            images: HashMap::new(),
            cubes: HashMap::new(),
            white,
            flat_normal,
            black_cube,
            sampler,
        }
    }

    /// Upload `key` if the asset is ready and not uploaded yet
    ///
    /// Returns whether a GPU texture exists for `key` afterwards.
    pub fn prepare_image(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        assets: &AssetCache,
        key: &AssetKey,
        space: TexelSpace,
    ) -> bool {
        let slot = (key.clone(), space);
        if self.images.contains_key(&slot) {
            return true;
        }
        let Some(image) = assets.image(key) else {
            return false;
        };
        tracing::debug!(
            "Uploading texture {} ({}x{})",
            key.label(),
            image.width,
            image.height
        );
        let texture = upload_image(device, queue, key.label(), &image, space.format());
        self.images.insert(slot, texture);
        true
    }

    /// Upload the cube map `key` if the asset is ready
    pub fn prepare_cube(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        assets: &AssetCache,
        key: &AssetKey,
    ) -> bool {
        if self.cubes.contains_key(key) {
            return true;
        }
        let Some(cube) = assets.cube_map(key) else {
            return false;
        };
        tracing::debug!("Uploading cube map {} ({}²)", key.label(), cube.size);
        let texture = upload_cube_map(device, queue, key.label(), &cube);
        self.cubes.insert(key.clone(), texture);
        true
    }

    /// View of an uploaded 2D texture
    pub fn image(&self, key: &AssetKey, space: TexelSpace) -> Option<&wgpu::TextureView> {
        self.images
            .get(&(key.clone(), space))
            .map(|texture| &texture.view)
    }

    /// View of an uploaded cube map
    pub fn cube(&self, key: &AssetKey) -> Option<&wgpu::TextureView> {
        self.cubes.get(key).map(|texture| &texture.view)
    }

    /// Opaque white 1x1 texture
    pub fn white(&self) -> &wgpu::TextureView {
        &self.white.view
    }

    /// Flat tangent-space normal 1x1 texture
    pub fn flat_normal(&self) -> &wgpu::TextureView {
        &self.flat_normal.view
    }

    /// Black 1x1 cube map
    pub fn black_cube(&self) -> &wgpu::TextureView {
        &self.black_cube.view
    }

    /// Repeating linear sampler
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// Drop textures whose asset no longer passes `keep`
    pub fn retain(&mut self, mut keep: impl FnMut(&AssetKey) -> bool) {
        self.images.retain(|(key, _), _| keep(key));
        self.cubes.retain(|key, _| keep(key));
    }

    /// Number of uploaded textures, cube maps included
    pub fn len(&self) -> usize {
        self.images.len() + self.cubes.len()
    }

    /// Whether nothing has been uploaded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn upload_pixel(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    texel: [u8; 4],
) -> GpuTexture {
    let image = ImageData {
        width: 1,
        height: 1,
        pixels: texel.to_vec(),
    };
    upload_image(device, queue, label, &image, wgpu::TextureFormat::Rgba8Unorm)
}

fn upload_image(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    image: &ImageData,
    format: wgpu::TextureFormat,
) -> GpuTexture {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width.max(1),
                height: image.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &image.pixels,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    GpuTexture { texture, view }
}

fn upload_cube_map(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    cube: &CubeMapData,
) -> GpuTexture {
    let data: Vec<u8> = cube
        .faces
        .iter()
        .flat_map(|face| face.pixels.iter().copied())
        .collect();
    upload_cube(device, queue, label, cube.size, &data)
}

/// Upload six square RGBA faces laid out +X, -X, +Y, -Y, +Z, -Z
fn upload_cube(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    size: u32,
    data: &[u8],
) -> GpuTexture {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.max(1),
                height: size.max(1),
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TexelSpace::Color.format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        data,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some(label),
        dimension: Some(wgpu::TextureViewDimension::Cube),
        ..Default::default()
    });
    GpuTexture { texture, view }
}
