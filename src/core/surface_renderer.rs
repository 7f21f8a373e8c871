use std::sync::Arc;

use wgpu::{BindGroup, Device, Queue, RenderPipeline, Surface, SurfaceConfiguration, Texture, TextureView};
use winit::window::Window;

use super::canvas::Canvas;
use crate::error::{Result, SceneError};
use crate::traits::RenderSurface;

/// GPU objects that live until [`RenderSurface::release`]
struct Gpu {
    device: Device,
    queue: Queue,
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    render_pipeline: RenderPipeline,
    texture_format: wgpu::TextureFormat,
    texture: Texture,
    bind_group: BindGroup,
}

/// Presents CPU canvases on a window surface
///
/// The canvas is uploaded into a texture every frame and drawn with a
/// fullscreen triangle. Adapter and device are requested here, so a host
/// without a usable GPU surfaces as [`SceneError::RenderUnavailable`].
pub struct SurfaceRenderer {
    gpu: Option<Gpu>,
    width: u32,
    height: u32,
}

impl SurfaceRenderer {
    /// Create a new surface renderer for a window
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|e| SceneError::RenderUnavailable(format!("failed to create surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| SceneError::RenderUnavailable(format!("no compatible adapter: {e:?}")))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Backdrop Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| SceneError::RenderUnavailable(format!("failed to create device: {e:?}")))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| SceneError::RenderUnavailable("surface reports no formats".into()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        // Canvas bytes are sRGB-encoded; match the surface so they are not
        // encoded twice.
        let texture_format = if surface_format.is_srgb() {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };
        let texture = Self::create_canvas_texture(&device, texture_format, width, height);
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let (render_pipeline, bind_group) = Self::create_render_pipeline(&device, &texture_view, surface_format);

        log::info!(
            "surface renderer ready: {}x{} {:?} on {}",
            width,
            height,
            surface_format,
            adapter.get_info().name
        );

        Ok(Self {
            gpu: Some(Gpu {
                device,
                queue,
                surface,
                surface_config,
                render_pipeline,
                texture_format,
                texture,
                bind_group,
            }),
            width,
            height,
        })
    }

    fn create_canvas_texture(device: &Device, format: wgpu::TextureFormat, width: u32, height: u32) -> Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Canvas Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        })
    }

    /// Create render pipeline for displaying texture on surface
    fn create_render_pipeline(
        device: &Device,
        texture_view: &TextureView,
        surface_format: wgpu::TextureFormat,
    ) -> (RenderPipeline, BindGroup) {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Canvas Display Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../display.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Canvas Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
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

        let bind_group = Self::create_bind_group(device, &bind_group_layout, texture_view);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Canvas Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Canvas Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        (pipeline, bind_group)
    }

    fn create_bind_group(device: &Device, layout: &wgpu::BindGroupLayout, texture_view: &TextureView) -> BindGroup {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Canvas Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Canvas Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        })
    }
}

impl RenderSurface for SurfaceRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        gpu.surface_config.width = width;
        gpu.surface_config.height = height;
        gpu.surface.configure(&gpu.device, &gpu.surface_config);

        gpu.texture = Self::create_canvas_texture(&gpu.device, gpu.texture_format, width, height);
        let view = gpu.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let layout = gpu.render_pipeline.get_bind_group_layout(0);
        gpu.bind_group = Self::create_bind_group(&gpu.device, &layout, &view);
    }

    fn present(&mut self, canvas: &Canvas) -> Result<()> {
        let gpu = self
            .gpu
            .as_ref()
            .ok_or_else(|| SceneError::Surface("surface already released".into()))?;

        let (width, height) = canvas.dimensions();
        if (width, height) != (self.width, self.height) {
            return Err(SceneError::Surface(format!(
                "canvas {}x{} does not match surface {}x{}",
                width, height, self.width, self.height
            )));
        }

        gpu.queue.write_texture(
            gpu.texture.as_image_copy(),
            canvas.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        let surface_texture = match gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                // skip this frame, the next one uses the fresh configuration
                gpu.surface.configure(&gpu.device, &gpu.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => return Ok(()),
            Err(e) => return Err(SceneError::Surface(e.to_string())),
        };
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Canvas Blit Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Canvas Blit Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&gpu.render_pipeline);
            render_pass.set_bind_group(0, &gpu.bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        gpu.queue.submit(Some(encoder.finish()));
        surface_texture.present();

        Ok(())
    }

    fn release(&mut self) {
        if self.gpu.take().is_some() {
            log::debug!("surface renderer released");
        }
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
