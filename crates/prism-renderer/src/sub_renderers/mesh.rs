//! Primary object and ground renderer with shadow mapping support

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use prism_core::{AssetCache, AssetKey, Blending, DrawMode, Geometry, Material, Shading};

use crate::color::linear_rgb;
use crate::pipeline::{
    MULTIPLY_BLENDING, PipelineConfig, create_camera_bind_group, sampler_entry, texture_entry,
    uniform_entry,
};
use crate::resources::{GpuMesh, TexelSpace, TextureManager};
use crate::vertex::MeshVertex;

/// Bits of [`ObjectUniform::maps`] telling the shader which maps are bound
pub mod map_bits {
    /// Color map
    pub const COLOR: u32 = 1;
    /// Tangent-space normal map
    pub const NORMAL: u32 = 1 << 1;
    /// Ambient occlusion map
    pub const AMBIENT_OCCLUSION: u32 = 1 << 2;
    /// Specular strength map
    pub const SPECULAR: u32 = 1 << 3;
    /// Roughness map (green channel)
    pub const ROUGHNESS: u32 = 1 << 4;
    /// Metalness map (blue channel)
    pub const METALNESS: u32 = 1 << 5;
    /// Environment cube map
    pub const ENV: u32 = 1 << 6;
}

/// Per-object uniform data
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ObjectUniform {
    /// Model transformation matrix.
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of the model matrix.
    pub normal_matrix: [[f32; 4]; 4],
    /// Linear base color, alpha 1.
    pub color: [f32; 4],
    /// x: shading model, y: shininess, z: roughness, w: metalness.
    pub material: [f32; 4],
    /// x: [`map_bits`] of the bound maps, y: receives shadows.
    pub maps: [u32; 4],
    /// x: point size in world units.
    pub point: [f32; 4],
}

impl Default for ObjectUniform {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            normal_matrix: Mat4::IDENTITY.to_cols_array_2d(),
            color: [1.0; 4],
            material: [0.0; 4],
            maps: [0; 4],
            point: [0.0; 4],
        }
    }
}

impl ObjectUniform {
    /// Uniform for an object drawn with `material`
    ///
    /// `bound_maps` holds the [`map_bits`] of the maps whose textures are
    /// resident; the others are ignored by the shader.
    pub fn new(model: Mat4, material: &Material, receive_shadow: bool, bound_maps: u32) -> Self {
        let shading = match material.shading {
            Shading::Basic => 0.0,
            Shading::Lambert => 1.0,
            Shading::Phong => 2.0,
            Shading::Standard => 3.0,
        };
        let normal_matrix = if model.determinant().abs() > f32::EPSILON {
            model.inverse().transpose()
        } else {
            model
        };
        let [r, g, b] = linear_rgb(material.color);
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
            color: [r, g, b, 1.0],
            material: [
                shading,
                material.shininess,
                material.roughness,
                material.metalness,
            ],
            maps: [bound_maps, receive_shadow as u32, 0, 0],
            point: [material.point_size, 0.0, 0.0, 0.0],
        }
    }
}

/// Pipeline variant selected by a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    /// Primitive topology.
    pub draw: DrawMode,
    /// Color blending.
    pub blending: Blending,
    /// Whether back faces are drawn.
    pub double_sided: bool,
}

impl PipelineKey {
    /// Variant for `material`
    ///
    /// Culling only applies to triangles; points and lines always use the
    /// double-sided variant.
    pub fn for_material(material: &Material) -> Self {
        Self {
            draw: material.draw,
            blending: material.blending,
            double_sided: material.double_sided || material.draw != DrawMode::Triangles,
        }
    }

    fn all() -> impl Iterator<Item = Self> {
        [
            DrawMode::Triangles,
            DrawMode::Points,
            DrawMode::LineStrip,
            DrawMode::Wireframe,
        ]
        .into_iter()
        .flat_map(|draw| {
            [Blending::Normal, Blending::Multiply]
                .into_iter()
                .flat_map(move |blending| {
                    [false, true].into_iter().filter_map(move |double_sided| {
                        let key = Self {
                            draw,
                            blending,
                            double_sided,
                        };
                        (double_sided || draw == DrawMode::Triangles).then_some(key)
                    })
                })
        })
    }

    fn topology(&self) -> wgpu::PrimitiveTopology {
        match self.draw {
            DrawMode::Triangles | DrawMode::Points => wgpu::PrimitiveTopology::TriangleList,
            DrawMode::LineStrip => wgpu::PrimitiveTopology::LineStrip,
            DrawMode::Wireframe => wgpu::PrimitiveTopology::LineList,
        }
    }

    fn blend(&self) -> wgpu::BlendState {
        match self.blending {
            Blending::Normal => wgpu::BlendState::ALPHA_BLENDING,
            Blending::Multiply => MULTIPLY_BLENDING,
        }
    }

    fn cull_mode(&self) -> Option<wgpu::Face> {
        (!self.double_sided).then_some(wgpu::Face::Back)
    }
}

/// The map assets actually bound in a material bind group
///
/// A bind group is rebuilt when this changes, i.e. when a map finishes
/// loading or the material references other assets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialBinding {
    maps: [Option<AssetKey>; 6],
    env: Option<AssetKey>,
}

impl MaterialBinding {
    /// [`map_bits`] of the bound maps
    pub fn bits(&self) -> u32 {
        const BITS: [u32; 6] = [
            map_bits::COLOR,
            map_bits::NORMAL,
            map_bits::AMBIENT_OCCLUSION,
            map_bits::SPECULAR,
            map_bits::ROUGHNESS,
            map_bits::METALNESS,
        ];
        let maps = self
            .maps
            .iter()
            .zip(BITS)
            .filter(|(key, _)| key.is_some())
            .fold(0, |bits, (_, bit)| bits | bit);
        if self.env.is_some() {
            maps | map_bits::ENV
        } else {
            maps
        }
    }
}

/// Texel space of each map slot, in binding order
const MAP_SPACES: [TexelSpace; 6] = [
    TexelSpace::Color,
    TexelSpace::Data,
    TexelSpace::Data,
    TexelSpace::Data,
    TexelSpace::Data,
    TexelSpace::Data,
];

/// GPU state of one drawn object (the primary or the ground)
pub struct ObjectEntry {
    /// Geometry drawn.
    pub geometry: prism_core::GeometryId,
    /// Pipeline variant.
    pub key: PipelineKey,
    /// Whether the object is drawn in the shadow pass.
    pub cast_shadow: bool,
    uniform_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    binding: MaterialBinding,
    material_bind_group: wgpu::BindGroup,
}

/// An object to draw this frame
pub struct DrawItem<'a> {
    /// Geometry, already resident in the mesh manager.
    pub geometry: &'a Geometry,
    /// Material.
    pub material: &'a Material,
    /// Model matrix.
    pub model: Mat4,
    /// Whether the object is drawn into the shadow map.
    pub cast_shadow: bool,
    /// Whether the object is darkened by the shadow map.
    pub receive_shadow: bool,
}

/// Renderer for the primary object and the ground
pub struct MeshRenderer {
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    shadow_pipeline: wgpu::RenderPipeline,
    camera_bind_group: wgpu::BindGroup,
    object_bind_group_layout: wgpu::BindGroupLayout,
    material_bind_group_layout: wgpu::BindGroupLayout,
    light_bind_group_layout: wgpu::BindGroupLayout,
    shadow_light_bind_group_layout: wgpu::BindGroupLayout,
}

impl MeshRenderer {
    /// Creates the renderer and every pipeline variant
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        sample_count: u32,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        camera_buffer: &wgpu::Buffer,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/mesh.wgsl").into()),
        });
        let points_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Points Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/points.wgsl").into()),
        });
        let shadow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/shadow.wgsl").into()),
        });

        let camera_bind_group =
            create_camera_bind_group(device, camera_bind_group_layout, camera_buffer, "Mesh");

        let object_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Object Bind Group Layout"),
                entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
            });

        // Six 2D maps, the environment cube map and their sampler
        let d2 = wgpu::TextureViewDimension::D2;
        let material_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Material Bind Group Layout"),
                entries: &[
                    texture_entry(0, d2),
                    texture_entry(1, d2),
                    texture_entry(2, d2),
                    texture_entry(3, d2),
                    texture_entry(4, d2),
                    texture_entry(5, d2),
                    texture_entry(6, wgpu::TextureViewDimension::Cube),
                    sampler_entry(7),
                ],
            });

        let light_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Light Bind Group Layout"),
                entries: &[
                    uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                    // Shadow map texture
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Depth,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    // Shadow sampler (comparison)
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                        count: None,
                    },
                ],
            });

        let lit_layouts = [
            camera_bind_group_layout,
            &object_bind_group_layout,
            &material_bind_group_layout,
            &light_bind_group_layout,
        ];
        let point_layouts = [camera_bind_group_layout, &object_bind_group_layout];

        let pipelines = PipelineKey::all()
            .map(|key| {
                let label = format!("Mesh {:?} {:?}", key.draw, key.blending);
                let config = if key.draw == DrawMode::Points {
                    PipelineConfig::new(
                        &label,
                        &points_shader,
                        format,
                        depth_format,
                        &point_layouts,
                    )
                    .with_vertex_layouts(vec![MeshVertex::instance_layout()])
                } else {
                    PipelineConfig::new(&label, &shader, format, depth_format, &lit_layouts)
                        .with_vertex_layouts(vec![MeshVertex::layout()])
                };
                let pipeline = config
                    .with_topology(key.topology())
                    .with_cull_mode(key.cull_mode())
                    .with_blend(key.blend())
                    .with_sample_count(sample_count)
                    .build(device);
                (key, pipeline)
            })
            .collect();

        // Shadow pipeline - light uniform at group 0, object at group 1
        let shadow_light_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Shadow Light Bind Group Layout"),
                entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
            });

        let shadow_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Shadow Pipeline Layout"),
                bind_group_layouts: &[&shadow_light_bind_group_layout, &object_bind_group_layout],
                push_constant_ranges: &[],
            });

        let shadow_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Pipeline"),
            layout: Some(&shadow_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shadow_shader,
                entry_point: Some("vs_main"),
                buffers: &[MeshVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back), // Cull back faces for shadow pass
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: crate::constants::shadow::SHADOW_MAP_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(), // No MSAA for shadow map
            multiview: None,
            cache: None,
        });

        Self {
            pipelines,
            shadow_pipeline,
            camera_bind_group,
            object_bind_group_layout,
            material_bind_group_layout,
            light_bind_group_layout,
            shadow_light_bind_group_layout,
        }
    }

    /// Get the light bind group layout
    pub fn light_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.light_bind_group_layout
    }

    /// Get the shadow pass light bind group layout
    pub fn shadow_light_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.shadow_light_bind_group_layout
    }

    /// Upload the maps of `material` that are ready and return what can be bound
    pub fn prepare_maps(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        textures: &mut TextureManager,
        assets: &AssetCache,
        material: &Material,
    ) -> MaterialBinding {
        let maps = &material.maps;
        let slots = [
            &maps.color,
            &maps.normal,
            &maps.ambient_occlusion,
            &maps.specular,
            &maps.roughness,
            &maps.metalness,
        ];
        let mut binding = MaterialBinding::default();
        for ((slot, key), space) in binding.maps.iter_mut().zip(slots).zip(MAP_SPACES) {
            *slot = key
                .as_ref()
                .filter(|key| textures.prepare_image(device, queue, assets, key, space))
                .cloned();
        }
        binding.env = material
            .env_map
            .as_ref()
            .filter(|key| textures.prepare_cube(device, queue, assets, key))
            .cloned();
        binding
    }

    /// Create or update the GPU state of one object
    ///
    /// The uniform is rewritten every frame; the material bind group only
    /// when the set of bound maps changes.
    pub fn prepare_object(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        textures: &TextureManager,
        slot: &mut Option<ObjectEntry>,
        item: &DrawItem<'_>,
        binding: MaterialBinding,
    ) {
        let uniform = ObjectUniform::new(
            item.model,
            item.material,
            item.receive_shadow,
            binding.bits(),
        );
        let key = PipelineKey::for_material(item.material);

        match slot {
            Some(entry) => {
                queue.write_buffer(&entry.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
                if entry.binding != binding {
                    entry.material_bind_group =
                        self.create_material_bind_group(device, textures, &binding);
                    entry.binding = binding;
                }
                entry.geometry = item.geometry.id;
                entry.key = key;
                entry.cast_shadow = item.cast_shadow;
            }
            None => {
                let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Object Uniform Buffer"),
                    contents: bytemuck::cast_slice(&[uniform]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Object Bind Group"),
                    layout: &self.object_bind_group_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    }],
                });
                let material_bind_group =
                    self.create_material_bind_group(device, textures, &binding);
                *slot = Some(ObjectEntry {
                    geometry: item.geometry.id,
                    key,
                    cast_shadow: item.cast_shadow,
                    uniform_buffer,
                    object_bind_group,
                    binding,
                    material_bind_group,
                });
            }
        }
    }

    fn create_material_bind_group(
        &self,
        device: &wgpu::Device,
        textures: &TextureManager,
        binding: &MaterialBinding,
    ) -> wgpu::BindGroup {
        let views: Vec<&wgpu::TextureView> = binding
            .maps
            .iter()
            .zip(MAP_SPACES)
            .enumerate()
            .map(|(slot, (key, space))| {
                let fallback = if slot == 1 {
                    textures.flat_normal()
                } else {
                    textures.white()
                };
                key.as_ref()
                    .and_then(|key| textures.image(key, space))
                    .unwrap_or(fallback)
            })
            .collect();
        let env = binding
            .env
            .as_ref()
            .and_then(|key| textures.cube(key))
            .unwrap_or(textures.black_cube());

        let mut entries: Vec<wgpu::BindGroupEntry> = views
            .into_iter()
            .enumerate()
            .map(|(i, view)| wgpu::BindGroupEntry {
                binding: i as u32,
                resource: wgpu::BindingResource::TextureView(view),
            })
            .collect();
        entries.push(wgpu::BindGroupEntry {
            binding: 6,
            resource: wgpu::BindingResource::TextureView(env),
        });
        entries.push(wgpu::BindGroupEntry {
            binding: 7,
            resource: wgpu::BindingResource::Sampler(textures.sampler()),
        });

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material Bind Group"),
            layout: &self.material_bind_group_layout,
            entries: &entries,
        })
    }

    /// Render an object to the shadow map (depth-only pass)
    pub fn render_shadow<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        mesh: &'a GpuMesh,
        entry: &'a ObjectEntry,
        shadow_light_bind_group: &'a wgpu::BindGroup,
    ) {
        if entry.key.draw != DrawMode::Triangles || mesh.index_count == 0 {
            return;
        }
        render_pass.set_pipeline(&self.shadow_pipeline);
        render_pass.set_bind_group(0, shadow_light_bind_group, &[]);
        render_pass.set_bind_group(1, &entry.object_bind_group, &[]);
        render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
    }

    /// Render an object with lighting and shadows
    pub fn render<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        mesh: &'a GpuMesh,
        entry: &'a ObjectEntry,
        light_bind_group: &'a wgpu::BindGroup,
    ) {
        let Some(pipeline) = self.pipelines.get(&entry.key) else {
            return;
        };
        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        render_pass.set_bind_group(1, &entry.object_bind_group, &[]);

        if entry.key.draw == DrawMode::Points {
            if mesh.vertex_count > 0 {
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.draw(0..6, 0..mesh.vertex_count);
            }
            return;
        }

        render_pass.set_bind_group(2, &entry.material_bind_group, &[]);
        render_pass.set_bind_group(3, light_bind_group, &[]);
        render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        let (indices, count) = match entry.key.draw {
            DrawMode::Wireframe => (&mesh.edge_buffer, mesh.edge_count),
            _ => (&mesh.index_buffer, mesh.index_count),
        };
        if count > 0 {
            render_pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..count, 0, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use prism_core::{Color, MaterialKind};

    use super::*;

    #[test]
    fn test_pipeline_variants() {
        let keys: Vec<_> = PipelineKey::all().collect();
        // Triangles: 2 blendings x 2 sides; others: 2 blendings
        assert_eq!(keys.len(), 4 + 3 * 2);
        assert!(
            keys.iter()
                .all(|k| k.double_sided || k.draw == DrawMode::Triangles)
        );
    }

    #[test]
    fn test_key_for_material() {
        let mut material = Material::for_kind(MaterialKind::Phong, Color::from_hex(0x156289));
        material.double_sided = false;
        let key = PipelineKey::for_material(&material);
        assert_eq!(key.cull_mode(), Some(wgpu::Face::Back));
        assert!(PipelineKey::all().any(|k| k == key));

        material.draw = DrawMode::Wireframe;
        let key = PipelineKey::for_material(&material);
        assert!(key.double_sided);
        assert_eq!(key.topology(), wgpu::PrimitiveTopology::LineList);
        assert!(PipelineKey::all().any(|k| k == key));
    }

    #[test]
    fn test_object_uniform() {
        let mut material = Material::for_kind(MaterialKind::Phong, Color::from_hex(0xffffff));
        material.shading = Shading::Standard;
        material.roughness = 0.3;
        let model = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let uniform = ObjectUniform::new(model, &material, true, map_bits::COLOR | map_bits::ENV);

        assert_eq!(uniform.material[0], 3.0);
        assert_eq!(uniform.material[2], 0.3);
        assert_eq!(uniform.maps[0], map_bits::COLOR | map_bits::ENV);
        assert_eq!(uniform.maps[1], 1);
        assert_eq!(uniform.color, [1.0, 1.0, 1.0, 1.0]);
        // Non-uniform scale: normals shrink along the stretched axis
        assert_eq!(uniform.normal_matrix[0][0], 0.5);
    }

    #[test]
    fn test_degenerate_model_keeps_normal_matrix_finite() {
        let material = Material::for_kind(MaterialKind::Lambert, Color::from_hex(0xffffff));
        let uniform = ObjectUniform::new(Mat4::from_scale(Vec3::ZERO), &material, false, 0);
        assert!(uniform.normal_matrix.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_binding_bits() {
        let empty = MaterialBinding::default();
        assert_eq!(empty.bits(), 0);
        let binding = MaterialBinding {
            maps: [None, None, None, None, None, None],
            env: Some(AssetKey::CubeMap("textures/cube/pisa".into())),
        };
        assert_eq!(binding.bits(), map_bits::ENV);
    }
}
