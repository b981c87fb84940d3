// renderer.rs — wgpu scene renderer: inward panorama sphere, instanced hotspot markers, egui overlay

use crate::hotspot::MarkerInstance;
use crate::mesh::{build_sphere, SphereMesh, Vertex};
use crate::panorama::Frame;
use anyhow::{anyhow, Context as _};
use image::{imageops, imageops::FilterType, Rgba, RgbaImage};
use wgpu::util::DeviceExt;
use winit::window::Window;

pub const PANORAMA_RADIUS: f32 = 50.0;
const PANORAMA_SEGMENTS: (usize, usize) = (60, 40);
const MARKER_SEGMENTS: (usize, usize) = (16, 16);
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct SceneUniform {
    view_proj: [[f32; 4]; 4],
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, mesh: &SphereMesh, label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} vertices")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} indices")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }
}

/// Scales `img` down to fit `max_dim` and pads it to a 2:1 equirectangular canvas.
///
/// Short images (partial panoramas) are centred vertically on black so the horizon stays
/// on the equator.
pub fn fit_equirect(img: RgbaImage, max_dim: u32) -> RgbaImage {
    let (w, h) = img.dimensions();
    let img = if w > max_dim || h > max_dim {
        let scale = max_dim as f32 / w.max(h) as f32;
        let (nw, nh) = (
            ((w as f32 * scale) as u32).max(1),
            ((h as f32 * scale) as u32).max(1),
        );
        log::warn!(
            "{}",
            crate::i18n::tr_with(
                "gpu.image_too_large_scaled",
                &[
                    ("src_w", w.to_string()),
                    ("src_h", h.to_string()),
                    ("max", max_dim.to_string()),
                    ("new_w", nw.to_string()),
                    ("new_h", nh.to_string()),
                ],
            )
        );
        image::imageops::resize(&img, nw, nh, FilterType::Lanczos3)
    } else {
        img
    };

    let (w, h) = img.dimensions();
    let target_h = w / 2;
    if target_h == 0 || h >= target_h {
        return img;
    }
    let mut canvas = RgbaImage::from_pixel(w, target_h, Rgba([0, 0, 0, 255]));
    imageops::overlay(&mut canvas, &img, 0, i64::from((target_h - h) / 2));
    canvas
}

fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

pub struct Renderer {
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    depth_view: wgpu::TextureView,

    scene_uniform: SceneUniform,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,

    panorama_pipeline: wgpu::RenderPipeline,
    panorama_mesh: GpuMesh,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    // None until the first image arrives; the sphere is not drawn before that
    panorama_bind_group: Option<wgpu::BindGroup>,

    marker_pipeline: wgpu::RenderPipeline,
    marker_mesh: GpuMesh,
    marker_buffer: wgpu::Buffer,
    marker_capacity: usize,
    marker_count: u32,

    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Renderer {
    pub async fn new(window: &Window, vsync: bool) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // SAFETY: the window outlives the renderer; both live for the whole event loop.
        let surface = unsafe { instance.create_surface(window) }.context("creating surface")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                },
                None,
            )
            .await
            .context("requesting device")?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow!("surface reports no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: present_mode(vsync),
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, &config);

        // --- scene uniform (group 0, shared) ---
        let scene_uniform = SceneUniform {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
        };
        let scene_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scene_uniform"),
            contents: bytemuck::cast_slice(&[scene_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let scene_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("scene_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });
        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &scene_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });

        // --- panorama texture (group 1) ---
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("panorama_bind_group_layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            // longitude wraps, latitude does not
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        // --- pipelines ---
        let panorama_shader = device.create_shader_module(wgpu::include_wgsl!("shader_panorama.wgsl"));
        let panorama_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("panorama_pipeline_layout"),
            bind_group_layouts: &[&scene_bind_group_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });
        let panorama_pipeline = create_pipeline(
            &device,
            "panorama_pipeline",
            &panorama_layout,
            &panorama_shader,
            &[Vertex::layout()],
            format,
        );

        let marker_shader = device.create_shader_module(wgpu::include_wgsl!("shader_marker.wgsl"));
        let marker_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("marker_pipeline_layout"),
            bind_group_layouts: &[&scene_bind_group_layout],
            push_constant_ranges: &[],
        });
        let marker_pipeline = create_pipeline(
            &device,
            "marker_pipeline",
            &marker_layout,
            &marker_shader,
            &[Vertex::layout(), MarkerInstance::layout()],
            format,
        );

        let (pw, ph) = PANORAMA_SEGMENTS;
        let panorama_mesh = GpuMesh::upload(
            &device,
            &build_sphere(PANORAMA_RADIUS, pw, ph).mirrored_x(),
            "panorama",
        );
        let (mw, mh) = MARKER_SEGMENTS;
        let marker_mesh = GpuMesh::upload(&device, &build_sphere(1.0, mw, mh), "marker");
        let marker_capacity = 8;
        let marker_buffer = create_marker_buffer(&device, marker_capacity);

        // --- egui ---
        let egui_ctx = egui::Context::default();
        crate::fonts::install_ui_font(&egui_ctx, &crate::i18n::current_lang());
        let mut egui_state = egui_winit::State::new(window);
        egui_state.set_pixels_per_point(window.scale_factor() as f32);
        let egui_renderer = egui_wgpu::Renderer::new(&device, format, None, 1);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            depth_view,
            scene_uniform,
            scene_buffer,
            scene_bind_group,
            panorama_pipeline,
            panorama_mesh,
            texture_bind_group_layout,
            sampler,
            panorama_bind_group: None,
            marker_pipeline,
            marker_mesh,
            marker_buffer,
            marker_capacity,
            marker_count: 0,
            egui_ctx,
            egui_state,
            egui_renderer,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, &self.config);
    }

    pub fn set_vsync(&mut self, enabled: bool) {
        self.config.present_mode = present_mode(enabled);
        self.surface.configure(&self.device, &self.config);
    }

    pub fn has_panorama(&self) -> bool {
        self.panorama_bind_group.is_some()
    }

    pub fn load_panorama(&mut self, img: RgbaImage) {
        let max_dim = self.device.limits().max_texture_dimension_2d;
        let img = fit_equirect(img, max_dim);
        let (width, height) = img.dimensions();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("panorama_texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &img,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.panorama_bind_group = Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("panorama_bind_group"),
            layout: &self.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        }));
    }

    fn upload_frame(&mut self, frame: &Frame) {
        self.scene_uniform.view_proj = frame.view_proj.to_cols_array_2d();
        self.queue
            .write_buffer(&self.scene_buffer, 0, bytemuck::cast_slice(&[self.scene_uniform]));

        if frame.markers.len() > self.marker_capacity {
            self.marker_capacity = frame.markers.len().next_power_of_two();
            self.marker_buffer = create_marker_buffer(&self.device, self.marker_capacity);
        }
        if !frame.markers.is_empty() {
            self.queue
                .write_buffer(&self.marker_buffer, 0, bytemuck::cast_slice(&frame.markers));
        }
        self.marker_count = frame.markers.len() as u32;
    }

    pub fn render_with_ui(
        &mut self,
        window: &Window,
        frame: &Frame,
        run_ui: impl FnOnce(&egui::Context),
    ) -> Result<(), wgpu::SurfaceError> {
        self.upload_frame(frame);

        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR),
                        store: true,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: false,
                    }),
                    stencil_ops: None,
                }),
            });

            pass.set_bind_group(0, &self.scene_bind_group, &[]);

            if let Some(bind_group) = &self.panorama_bind_group {
                pass.set_pipeline(&self.panorama_pipeline);
                pass.set_bind_group(1, bind_group, &[]);
                pass.set_vertex_buffer(0, self.panorama_mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(
                    self.panorama_mesh.index_buffer.slice(..),
                    wgpu::IndexFormat::Uint32,
                );
                pass.draw_indexed(0..self.panorama_mesh.index_count, 0, 0..1);
            }

            if self.marker_count > 0 {
                pass.set_pipeline(&self.marker_pipeline);
                pass.set_vertex_buffer(0, self.marker_mesh.vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, self.marker_buffer.slice(..));
                pass.set_index_buffer(
                    self.marker_mesh.index_buffer.slice(..),
                    wgpu::IndexFormat::Uint32,
                );
                pass.draw_indexed(0..self.marker_mesh.index_count, 0, 0..self.marker_count);
            }
        }

        let raw_input = self.egui_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, run_ui);
        self.egui_state
            .handle_platform_output(window, &self.egui_ctx, full_output.platform_output);
        let primitives = self.egui_ctx.tessellate(full_output.shapes);
        let screen = egui_wgpu::renderer::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        for (id, delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, delta);
        }
        self.egui_renderer
            .update_buffers(&self.device, &self.queue, &mut encoder, &primitives, &screen);

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });
            self.egui_renderer.render(&mut pass, &primitives, &screen);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

fn create_marker_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("marker_instances"),
        size: (capacity * std::mem::size_of::<MarkerInstance>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    buffers: &[wgpu::VertexBufferLayout],
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // the panorama is seen from inside; draw both faces
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_images_are_padded_to_two_to_one_and_centred() {
        let img = RgbaImage::from_pixel(8, 2, Rgba([255, 255, 255, 255]));
        let out = fit_equirect(img, 4096);
        assert_eq!(out.dimensions(), (8, 4));
        assert_eq!(out.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(out.get_pixel(0, 1), &Rgba([255, 255, 255, 255]));
        assert_eq!(out.get_pixel(0, 2), &Rgba([255, 255, 255, 255]));
        assert_eq!(out.get_pixel(0, 3), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn odd_height_gap_puts_the_extra_row_below() {
        let img = RgbaImage::from_pixel(10, 2, Rgba([9, 9, 9, 255]));
        let out = fit_equirect(img, 4096);
        assert_eq!(out.dimensions(), (10, 5));
        assert_eq!(out.get_pixel(9, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(out.get_pixel(9, 1), &Rgba([9, 9, 9, 255]));
        assert_eq!(out.get_pixel(9, 2), &Rgba([9, 9, 9, 255]));
        assert_eq!(out.get_pixel(9, 4), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn oversized_images_are_scaled_to_the_limit() {
        let img = RgbaImage::new(64, 32);
        let out = fit_equirect(img, 16);
        assert_eq!(out.dimensions(), (16, 8));
    }

    #[test]
    fn proper_equirect_passes_through() {
        let img = RgbaImage::new(20, 10);
        assert_eq!(fit_equirect(img, 4096).dimensions(), (20, 10));
    }
}
