//! GPU renderer for the canvas panels
//!
//! All panels share one triangle-list pipeline and one vertex buffer. Each
//! panel owns a contiguous range of that buffer and is drawn under a scissor
//! rect so nothing it emits leaks into a neighbour.

use std::ops::Range;

use common::{create_uniform_buffer, Camera2D, CameraUniform, GraphicsContext};

use crate::palette::{Rgba, PANEL};
use crate::showcase::Panel;
use crate::surface::{DrawList, Rect, RenderSurface};
use crate::tessellate::{tessellate, CanvasVertex};

/// Vertices the buffer starts with; grows on demand
const INITIAL_VERTICES: usize = 64 * 1024;

/// A panel's slice of the vertex buffer and its clip rect in window pixels
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub vertices: Range<u32>,
    pub clip: Rect,
}

/// Tessellate every panel into `out`, each preceded by its backdrop
pub fn build_batches(panels: &[&dyn Panel], out: &mut Vec<CanvasVertex>) -> Vec<Batch> {
    out.clear();
    let mut batches = Vec::with_capacity(panels.len());
    let mut backdrop = DrawList::new(glam::Vec2::ZERO);

    for panel in panels {
        let viewport = panel.viewport();
        let start = out.len() as u32;

        backdrop.resize(viewport.size);
        backdrop.clear();
        backdrop.fill_rect(Rect::from_size(viewport.size), PANEL.into());
        tessellate(&backdrop, viewport.min, out);
        tessellate(panel.draw_list(), viewport.min, out);

        batches.push(Batch {
            vertices: start..out.len() as u32,
            clip: viewport,
        });
    }
    batches
}

pub struct CanvasRenderer {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    max_vertices: usize,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
}

impl CanvasRenderer {
    pub fn new(ctx: &GraphicsContext) -> Self {
        let device = &ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Canvas Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/canvas.wgsl").into()),
        });

        let camera = Camera2D::new(ctx.size.width as f32, ctx.size.height as f32);
        let camera_buffer = create_uniform_buffer(device, &CameraUniform::from_camera_2d(&camera));

        let camera_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Camera Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Canvas Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Canvas Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[CanvasVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.config.format,
                    blend: Some(wgpu::BlendState {
                        color: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::SrcAlpha,
                            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                            operation: wgpu::BlendOperation::Add,
                        },
                        alpha: wgpu::BlendComponent::OVER,
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let vertex_buffer = Self::create_vertex_buffer(device, INITIAL_VERTICES);

        Self {
            pipeline,
            vertex_buffer,
            max_vertices: INITIAL_VERTICES,
            camera_buffer,
            camera_bind_group,
        }
    }

    fn create_vertex_buffer(device: &wgpu::Device, vertices: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Canvas Vertex Buffer"),
            size: (std::mem::size_of::<CanvasVertex>() * vertices) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    pub fn update_camera(&self, queue: &wgpu::Queue, camera: &Camera2D) {
        let uniform = CameraUniform::from_camera_2d(camera);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    /// Copy this frame's vertices to the GPU, growing the buffer if needed
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, vertices: &[CanvasVertex]) {
        if vertices.len() > self.max_vertices {
            let grown = vertices.len().next_power_of_two();
            log::debug!("Growing canvas vertex buffer to {} vertices", grown);
            self.vertex_buffer = Self::create_vertex_buffer(device, grown);
            self.max_vertices = grown;
        }
        if !vertices.is_empty() {
            queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(vertices));
        }
    }

    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        target_size: (u32, u32),
        batches: &[Batch],
        clear: Rgba,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Canvas Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: clear[0] as f64,
                        g: clear[1] as f64,
                        b: clear[2] as f64,
                        a: clear[3] as f64,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

        for batch in batches {
            if batch.vertices.is_empty() {
                continue;
            }
            let Some((x, y, w, h)) = scissor(batch.clip, target_size) else {
                continue;
            };
            render_pass.set_scissor_rect(x, y, w, h);
            render_pass.draw(batch.vertices.clone(), 0..1);
        }
    }
}

/// Clip rect in whole pixels, clamped to the render target
pub fn scissor(clip: Rect, target: (u32, u32)) -> Option<(u32, u32, u32, u32)> {
    let x0 = clip.min.x.max(0.0).floor() as u32;
    let y0 = clip.min.y.max(0.0).floor() as u32;
    let x1 = (clip.max().x.max(0.0).ceil() as u32).min(target.0);
    let y1 = (clip.max().y.max(0.0).ceil() as u32).min(target.1);
    (x1 > x0 && y1 > y0).then(|| (x0, y0, x1 - x0, y1 - y0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModuleKind, ShowcaseConfig};
    use crate::showcase::{Showcase, SurfaceMap};

    #[test]
    fn test_scissor_clamps_to_target() {
        assert_eq!(
            scissor(Rect::new(-10.0, 5.5, 100.0, 50.0), (80, 40)),
            Some((0, 5, 80, 35))
        );
        assert_eq!(scissor(Rect::new(200.0, 0.0, 10.0, 10.0), (80, 40)), None);
    }

    #[test]
    fn test_batches_cover_buffer_in_order() {
        let config = ShowcaseConfig {
            seed: Some(7),
            ..ShowcaseConfig::default()
        };
        let map = SurfaceMap::layout(Rect::new(0.0, 0.0, 800.0, 600.0), &ModuleKind::ALL);
        let mut showcase = Showcase::new(&config, &map);
        showcase.frame(1.0 / 60.0);

        let mut vertices = Vec::new();
        let batches = build_batches(&showcase.panels(), &mut vertices);

        assert_eq!(batches.len(), 5);
        let mut cursor = 0;
        for batch in &batches {
            assert_eq!(batch.vertices.start, cursor);
            // Backdrop alone is two triangles
            assert!(batch.vertices.len() > 6);
            cursor = batch.vertices.end;
        }
        assert_eq!(cursor as usize, vertices.len());
    }
}
