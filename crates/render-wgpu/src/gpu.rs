use crate::shaders;
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct Uniforms {
    scale: [f32; 2],
    _pad: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct Vertex {
    position: [f32; 2],
    uv: [f32; 2],
}

/// Unit quad covering clip space, with v pointing down like canvas rows.
fn quad_mesh() -> ([Vertex; 4], [u16; 6]) {
    #[rustfmt::skip]
    let vertices = [
        Vertex { position: [-1.0,  1.0], uv: [0.0, 0.0] },
        Vertex { position: [ 1.0,  1.0], uv: [1.0, 0.0] },
        Vertex { position: [ 1.0, -1.0], uv: [1.0, 1.0] },
        Vertex { position: [-1.0, -1.0], uv: [0.0, 1.0] },
    ];
    (vertices, [0, 1, 2, 2, 3, 0])
}

/// Clip-space scale that fits a canvas into a window without stretching.
///
/// One axis is always 1.0; the other shrinks to leave bars. Degenerate
/// sizes yield `[1.0, 1.0]`.
pub fn letterbox(canvas_w: u32, canvas_h: u32, window_w: u32, window_h: u32) -> [f32; 2] {
    if canvas_w == 0 || canvas_h == 0 || window_w == 0 || window_h == 0 {
        return [1.0, 1.0];
    }
    let canvas_aspect = canvas_w as f32 / canvas_h as f32;
    let window_aspect = window_w as f32 / window_h as f32;
    if window_aspect > canvas_aspect {
        [canvas_aspect / window_aspect, 1.0]
    } else {
        [1.0, window_aspect / canvas_aspect]
    }
}

struct CanvasTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

/// Uploads a finished RGBA canvas each frame and draws it letterboxed.
pub struct CanvasPresenter {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    canvas: CanvasTexture,
    texture_format: wgpu::TextureFormat,
    surface_format: wgpu::TextureFormat,
    window_size: (u32, u32),
}

impl CanvasPresenter {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        canvas_width: u32,
        canvas_height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("present_uniforms"),
            contents: bytemuck::bytes_of(&Uniforms {
                scale: [1.0, 1.0],
                _pad: [0.0; 2],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("present_bind_group_layout"),
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

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("present_sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("present_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("present_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::PRESENT_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("present_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x2,
                        1 => Float32x2,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let (vertices, indices) = quad_mesh();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("present_vertex_buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("present_index_buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        // canvas bytes are sRGB-encoded; match the surface so they pass through unchanged
        let texture_format = if surface_format.is_srgb() {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };

        let canvas = Self::create_canvas_texture(
            device,
            &bind_group_layout,
            &uniform_buffer,
            &sampler,
            texture_format,
            canvas_width,
            canvas_height,
        );

        Self {
            pipeline,
            bind_group_layout,
            uniform_buffer,
            sampler,
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            canvas,
            texture_format,
            surface_format,
            window_size: (canvas_width, canvas_height),
        }
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.canvas.width, self.canvas.height)
    }

    /// Record the window size and update the letterbox scale.
    pub fn resize(&mut self, queue: &wgpu::Queue, width: u32, height: u32) {
        self.window_size = (width, height);
        self.write_scale(queue);
    }

    /// Copy canvas pixels to the GPU. The texture is recreated when the
    /// canvas size changes. Returns false if `rgba` has the wrong length.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> bool {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            tracing::warn!(width, height, len = rgba.len(), "canvas upload size mismatch");
            return false;
        }
        if (width, height) != self.canvas_size() {
            tracing::debug!(width, height, "recreating canvas texture");
            self.canvas = Self::create_canvas_texture(
                device,
                &self.bind_group_layout,
                &self.uniform_buffer,
                &self.sampler,
                self.texture_format,
                width,
                height,
            );
            self.write_scale(queue);
        }
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.canvas.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        true
    }

    /// Draw the last uploaded canvas into `view`, clearing the bars to black.
    pub fn render(&self, device: &wgpu::Device, queue: &wgpu::Queue, view: &wgpu::TextureView) {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("present_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("present_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.canvas.bind_group, &[]);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..self.index_count, 0, 0..1);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn write_scale(&self, queue: &wgpu::Queue) {
        let (cw, ch) = self.canvas_size();
        let (ww, wh) = self.window_size;
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                scale: letterbox(cw, ch, ww, wh),
                _pad: [0.0; 2],
            }),
        );
    }

    fn create_canvas_texture(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniforms: &wgpu::Buffer,
        sampler: &wgpu::Sampler,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> CanvasTexture {
        let width = width.max(1);
        let height = height.max(1);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("canvas_texture"),
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
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("canvas_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        CanvasTexture {
            texture,
            bind_group,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_aspect_fills_window() {
        assert_eq!(letterbox(800, 600, 1600, 1200), [1.0, 1.0]);
    }

    #[test]
    fn wide_window_gets_side_bars() {
        let [sx, sy] = letterbox(400, 400, 800, 400);
        assert_eq!(sy, 1.0);
        assert!((sx - 0.5).abs() < 1e-6);
    }

    #[test]
    fn tall_window_gets_top_bars() {
        let [sx, sy] = letterbox(800, 400, 800, 800);
        assert_eq!(sx, 1.0);
        assert!((sy - 0.5).abs() < 1e-6);
    }

    #[test]
    fn degenerate_sizes_do_not_scale() {
        assert_eq!(letterbox(0, 10, 100, 100), [1.0, 1.0]);
        assert_eq!(letterbox(10, 10, 100, 0), [1.0, 1.0]);
    }

    #[test]
    fn quad_covers_clip_space_top_down() {
        let (vertices, indices) = quad_mesh();
        assert_eq!(indices.len(), 6);
        // top-left corner samples the first canvas row
        assert_eq!(vertices[0].position, [-1.0, 1.0]);
        assert_eq!(vertices[0].uv, [0.0, 0.0]);
        assert_eq!(vertices[2].uv, [1.0, 1.0]);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn uniforms_are_16_bytes() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 16);
    }
}
