use crate::device::{Gpu, GpuFrame};

/// GPU handles a presenter needs for one frame.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    /// Swapchain size in physical pixels.
    pub target_size: [u32; 2],
}

impl<'a> RenderCtx<'a> {
    pub fn new(gpu: &'a Gpu<'_>) -> Self {
        let size = gpu.size();
        Self {
            device: gpu.device(),
            queue: gpu.queue(),
            surface_format: gpu.surface_format(),
            target_size: [size.width, size.height],
        }
    }
}

/// The acquired swapchain image and the encoder recording into it.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    pub fn new(frame: &'a mut GpuFrame) -> Self {
        Self { encoder: &mut frame.encoder, color_view: &frame.view }
    }
}
