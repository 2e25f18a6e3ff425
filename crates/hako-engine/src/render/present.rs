use bytemuck::{Pod, Zeroable};

use crate::surface::Pixmap;

use super::{RenderCtx, RenderTarget};

/// Uploads a canvas pixmap and draws it aspect-correct onto the surface.
///
/// GPU objects are created lazily: the pipeline per surface format, the
/// texture per canvas size. Sampling is nearest-neighbour so pixel art stays
/// crisp at any window scale.
#[derive(Default)]
pub struct Presenter {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,

    texture: Option<wgpu::Texture>,
    texture_size: [u32; 2],
    sampler: Option<wgpu::Sampler>,
    uniform: Option<wgpu::Buffer>,
    bind_group: Option<wgpu::BindGroup>,
}

impl Presenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears `target` to black and draws `pixels` letterboxed into it.
    pub fn present(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, pixels: &Pixmap) {
        if pixels.width() == 0 || pixels.height() == 0 {
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_sampler(ctx);
        self.ensure_texture(ctx, [pixels.width(), pixels.height()]);
        self.ensure_bindings(ctx);

        self.upload(ctx, pixels);
        self.write_uniform(ctx, [pixels.width(), pixels.height()]);

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("hako present pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
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
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }

    fn upload(&self, ctx: &RenderCtx<'_>, pixels: &Pixmap) {
        let Some(texture) = self.texture.as_ref() else { return };
        let (w, h) = (pixels.width(), pixels.height());

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels.data(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * w),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 },
        );
    }

    fn write_uniform(&self, ctx: &RenderCtx<'_>, canvas: [u32; 2]) {
        let Some(ubo) = self.uniform.as_ref() else { return };
        let u = PresentUniform { scale: letterbox_scale(canvas, ctx.target_size), _pad: [0.0; 2] };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("hako present shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/present.wgsl").into()),
        });

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("hako present bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<PresentUniform>() as u64),
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

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("hako present pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("hako present pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
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
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bgl);
        self.bind_group = None;
    }

    fn ensure_sampler(&mut self, ctx: &RenderCtx<'_>) {
        if self.sampler.is_some() {
            return;
        }
        self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("hako present sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        }));
    }

    fn ensure_texture(&mut self, ctx: &RenderCtx<'_>, size: [u32; 2]) {
        if self.texture.is_some() && self.texture_size == size {
            return;
        }
        log::debug!("presenter: canvas texture {}x{}", size[0], size[1]);

        self.texture = Some(ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("hako canvas texture"),
            size: wgpu::Extent3d { width: size[0], height: size[1], depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            // Canvas bytes are sRGB-encoded.
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        }));
        self.texture_size = size;
        self.bind_group = None;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() && self.uniform.is_some() {
            return;
        }

        let Some(bgl) = self.bind_group_layout.as_ref() else { return };
        let Some(texture) = self.texture.as_ref() else { return };
        let Some(sampler) = self.sampler.as_ref() else { return };

        let uniform = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("hako present ubo"),
            size: std::mem::size_of::<PresentUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("hako present bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: uniform.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(&view) },
                wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::Sampler(sampler) },
            ],
        });

        self.uniform = Some(uniform);
        self.bind_group = Some(bind_group);
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct PresentUniform {
    scale: [f32; 2],
    _pad: [f32; 2],
}

/// Clip-space scale that fits `canvas` inside `target` keeping its aspect.
///
/// One axis is always `1.0`; the other shrinks to leave bars.
pub fn letterbox_scale(canvas: [u32; 2], target: [u32; 2]) -> [f32; 2] {
    if canvas.contains(&0) || target.contains(&0) {
        return [1.0, 1.0];
    }
    let (cw, ch) = (canvas[0] as f32, canvas[1] as f32);
    let (tw, th) = (target[0] as f32, target[1] as f32);
    let fit = (tw / cw).min(th / ch);
    [cw * fit / tw, ch * fit / th]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_aspect_fills_target() {
        assert_eq!(letterbox_scale([320, 240], [640, 480]), [1.0, 1.0]);
    }

    #[test]
    fn wide_target_gets_side_bars() {
        assert_eq!(letterbox_scale([100, 100], [200, 100]), [0.5, 1.0]);
    }

    #[test]
    fn tall_target_gets_top_bars() {
        assert_eq!(letterbox_scale([200, 100], [200, 200]), [1.0, 0.5]);
    }

    #[test]
    fn degenerate_sizes_fall_back_to_full() {
        assert_eq!(letterbox_scale([0, 10], [10, 10]), [1.0, 1.0]);
    }
}
