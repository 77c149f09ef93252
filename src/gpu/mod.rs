//! wgpu renderer for particle meshes.
//!
//! [`ParticleRenderer`] is a [`RenderSurface`]: attaching a mesh builds a
//! render pipeline for its material plus one instance vertex buffer per
//! [`Attribute`]. Each frame the viewer uploads the engine's dirty
//! attribute arrays and draws every attached mesh as instanced quads.

mod camera;

pub use camera::Camera;

use std::sync::Arc;

use tracing::{debug, info, warn};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::buffers::{Attribute, AttributeBuffers};
use crate::config::BlendStyle;
use crate::error::GpuError;
use crate::render::{MeshId, ParticleMaterial, ParticleMesh, RenderSurface};
use crate::shader::{Uniforms, SPRITE_SHADER};
use crate::textures::TextureConfig;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Edge length of the built-in spark texture.
const SPARK_SIZE: u32 = 64;

/// Blend state for a particle blend style.
pub fn blend_state(style: BlendStyle) -> wgpu::BlendState {
    match style {
        BlendStyle::Normal => wgpu::BlendState::ALPHA_BLENDING,
        BlendStyle::Additive => wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        },
        BlendStyle::Multiply => wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::Dst,
                dst_factor: wgpu::BlendFactor::Zero,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent::OVER,
        },
    }
}

/// Depth state for a material. Untested sprites never write depth.
pub fn depth_state(material: &ParticleMaterial) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: false,
        depth_compare: if material.depth_test {
            wgpu::CompareFunction::Less
        } else {
            wgpu::CompareFunction::Always
        },
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

fn vertex_format(attribute: Attribute) -> wgpu::VertexFormat {
    match attribute.components() {
        3 => wgpu::VertexFormat::Float32x3,
        _ => wgpu::VertexFormat::Float32,
    }
}

/// GPU resources of one attached mesh.
struct GpuMesh {
    id: MeshId,
    mesh: ParticleMesh,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    /// Instance buffers in [`Attribute::ALL`] order.
    attributes: Vec<wgpu::Buffer>,
}

/// Window-backed particle renderer.
pub struct ParticleRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    shader: wgpu::ShaderModule,
    depth_texture: wgpu::TextureView,
    meshes: Vec<GpuMesh>,
    next_id: u32,
    pub camera: Camera,
}

impl ParticleRenderer {
    pub async fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        info!(adapter = %adapter.get_info().name, "Using GPU adapter");

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        // Particle colors are display-referred already, so prefer a
        // non-sRGB target to avoid encoding them twice.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, &config);

        let camera = Camera::default();
        let aspect = config.width as f32 / config.height as f32;
        let uniforms = Uniforms::new(
            camera.view_matrix(),
            camera.projection_matrix(aspect),
            config.width,
            config.height,
        );
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sprite Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sprite Shader"),
            source: wgpu::ShaderSource::Wgsl(SPRITE_SHADER.into()),
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            uniform_buffer,
            bind_group_layout,
            shader,
            depth_texture,
            meshes: Vec::new(),
            next_id: 0,
            camera,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = create_depth_texture(&self.device, &self.config);
        }
    }

    /// Number of attached meshes.
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Copy the dirty arrays of `buffers` into the GPU buffers of `id`,
    /// then clear the dirty flags.
    ///
    /// Fails without writing anything if `buffers` no longer matches the
    /// mesh capacity.
    pub fn upload(&mut self, id: MeshId, buffers: &mut AttributeBuffers) -> Result<(), GpuError> {
        let gpu_mesh = self
            .meshes
            .iter()
            .find(|m| m.id == id)
            .ok_or(GpuError::NoMesh)?;
        if !gpu_mesh.mesh.fits(buffers) {
            return Err(GpuError::CapacityMismatch {
                mesh: gpu_mesh.mesh.capacity,
                buffers: buffers.capacity(),
            });
        }

        for attribute in buffers.dirty() {
            let data = buffers.data(attribute);
            if data.is_empty() {
                continue;
            }
            let buffer = &gpu_mesh.attributes[attribute.location() as usize];
            self.queue.write_buffer(buffer, 0, bytemuck::cast_slice(data));
        }
        buffers.clear_dirty();
        Ok(())
    }

    fn update_uniforms(&mut self) {
        let aspect = self.config.width as f32 / self.config.height as f32;
        let uniforms = Uniforms::new(
            self.camera.view_matrix(),
            self.camera.projection_matrix(aspect),
            self.config.width,
            self.config.height,
        );
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.update_uniforms();

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for gpu_mesh in &self.meshes {
                if gpu_mesh.mesh.capacity == 0 {
                    continue;
                }
                render_pass.set_pipeline(&gpu_mesh.pipeline);
                render_pass.set_bind_group(0, &gpu_mesh.bind_group, &[]);
                for (slot, buffer) in gpu_mesh.attributes.iter().enumerate() {
                    render_pass.set_vertex_buffer(slot as u32, buffer.slice(..));
                }
                render_pass.draw(0..6, 0..gpu_mesh.mesh.capacity as u32);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn create_sprite_texture(&self, material: &ParticleMaterial) -> Result<wgpu::BindGroup, GpuError> {
        let image = match &material.texture {
            Some(path) => {
                debug!(path = %path.display(), "Loading particle texture");
                TextureConfig::from_file(path)?
            }
            None => TextureConfig::spark(SPARK_SIZE),
        };

        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Sprite Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Sprite Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Ok(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sprite Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        }))
    }

    fn create_pipeline(&self, material: &ParticleMaterial) -> wgpu::RenderPipeline {
        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Sprite Pipeline Layout"),
                bind_group_layouts: &[&self.bind_group_layout],
                push_constant_ranges: &[],
            });

        // One single-attribute instance buffer per shader location.
        let vertex_attributes: Vec<[wgpu::VertexAttribute; 1]> = Attribute::ALL
            .iter()
            .map(|&attribute| {
                [wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: attribute.location(),
                    format: vertex_format(attribute),
                }]
            })
            .collect();
        let vertex_buffers: Vec<wgpu::VertexBufferLayout> = Attribute::ALL
            .iter()
            .zip(&vertex_attributes)
            .map(|(&attribute, attributes)| wgpu::VertexBufferLayout {
                array_stride: (attribute.components() * std::mem::size_of::<f32>())
                    as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes,
            })
            .collect();

        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Sprite Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &self.shader,
                    entry_point: Some("vs_main"),
                    buffers: &vertex_buffers,
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &self.shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.config.format,
                        blend: Some(blend_state(material.blend)),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: Some(depth_state(material)),
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            })
    }
}

impl RenderSurface for ParticleRenderer {
    type Error = GpuError;

    fn add(&mut self, mesh: ParticleMesh) -> Result<MeshId, GpuError> {
        let bind_group = self.create_sprite_texture(&mesh.material)?;
        let pipeline = self.create_pipeline(&mesh.material);

        let attributes = Attribute::ALL
            .iter()
            .map(|&attribute| {
                let size = (mesh.capacity * attribute.components() * std::mem::size_of::<f32>())
                    .max(std::mem::size_of::<f32>());
                self.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(attribute.name()),
                    size: size as wgpu::BufferAddress,
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            })
            .collect();

        let id = MeshId(self.next_id);
        self.next_id += 1;
        info!(
            mesh = id.0,
            capacity = mesh.capacity,
            blend = ?mesh.material.blend,
            "Attached particle mesh"
        );
        self.meshes.push(GpuMesh {
            id,
            mesh,
            pipeline,
            bind_group,
            attributes,
        });
        Ok(id)
    }

    fn remove(&mut self, id: MeshId) -> Option<ParticleMesh> {
        let Some(index) = self.meshes.iter().position(|m| m.id == id) else {
            warn!(mesh = id.0, "Tried to remove a mesh that is not attached");
            return None;
        };
        let gpu_mesh = self.meshes.remove(index);
        for buffer in &gpu_mesh.attributes {
            buffer.destroy();
        }
        debug!(mesh = id.0, "Detached particle mesh");
        Some(gpu_mesh.mesh)
    }
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
