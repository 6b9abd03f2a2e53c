/// FboDevice trait - native render pass and framebuffer object factory

use crate::error::Result;
use crate::graphics_device::{
    AttachmentLayout, FramebufferHandle, ImageViewHandle, RenderPassHandle,
};

/// Descriptor for creating a framebuffer
#[derive(Debug, Clone, Copy)]
pub struct FramebufferCreateDesc<'a> {
    /// The render pass this framebuffer is compatible with
    pub render_pass: RenderPassHandle,
    /// One image view per packed attachment slot
    pub attachments: &'a [ImageViewHandle],
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Number of layers
    pub layers: u32,
}

/// Device-level creation and destruction of render passes, framebuffers
/// and image views.
///
/// Implemented by backends (e.g. `VulkanFboDevice`). Failures are reported
/// as `Error::BackendError` carrying the failing call; they are never retried.
pub trait FboDevice: Send + Sync {
    /// Create a single-subpass render pass from a planned attachment layout
    fn create_render_pass(&self, layout: &AttachmentLayout) -> Result<RenderPassHandle>;

    /// Create a framebuffer
    fn create_framebuffer(&self, desc: &FramebufferCreateDesc) -> Result<FramebufferHandle>;

    /// Destroy a framebuffer
    fn destroy_framebuffer(&self, framebuffer: FramebufferHandle);

    /// Destroy an image view created through `RenderTexture::create_view`
    fn destroy_image_view(&self, view: ImageViewHandle);

    /// Destroy a render pass
    fn destroy_render_pass(&self, render_pass: RenderPassHandle);
}
