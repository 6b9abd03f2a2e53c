/// Creation and destruction of native render pass / framebuffer objects
/// for a planned attachment layout.

use crate::error::Result;
use crate::{engine_bail, engine_bail_config, engine_debug, engine_error};
use crate::graphics_device::{
    AttachmentLayout, AttachmentSource, FboDevice, FramebufferCreateDesc, FramebufferHandle,
    ImageViewDesc, ImageViewHandle, RenderPassHandle,
};
use super::target::{RenderPassColourTarget, RenderPassDepthTarget};

/// Native objects shared by every descriptor with the same attachment key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealizedFbo {
    pub render_pass: RenderPassHandle,
    /// One view per packed slot; the window slot stays null
    pub image_views: Vec<ImageViewHandle>,
    /// Swap-chain image views of the window target (empty if offscreen)
    pub window_image_views: Vec<ImageViewHandle>,
    pub window_attachment_index: Option<u32>,
    /// One framebuffer per swap-chain image (exactly one if offscreen)
    pub framebuffers: Vec<FramebufferHandle>,
    pub width: u32,
    pub height: u32,
}

impl RealizedFbo {
    pub fn is_window_backed(&self) -> bool {
        !self.window_image_views.is_empty()
    }

    /// Framebuffer to use while swap-chain image `image_index` is current
    pub fn framebuffer_for_image(&self, image_index: usize) -> Option<FramebufferHandle> {
        self.framebuffers.get(image_index).copied()
    }
}

pub struct FboRealizer;

impl FboRealizer {
    /// Create the render pass, image views and framebuffers for `layout`
    ///
    /// On any failure, whatever was created so far is destroyed before the
    /// error is returned.
    pub fn create(
        device: &dyn FboDevice,
        layout: &AttachmentLayout,
        colour: &[RenderPassColourTarget],
        depth: Option<&RenderPassDepthTarget>,
        width: u32,
        height: u32,
    ) -> Result<RealizedFbo> {
        let render_pass = device.create_render_pass(layout)?;

        let mut fbo = RealizedFbo {
            render_pass,
            image_views: vec![ImageViewHandle::NULL; layout.attachments.len()],
            window_attachment_index: layout.window_attachment_index,
            width,
            height,
            ..Default::default()
        };

        if let Err(e) = Self::create_views(&mut fbo, layout, colour, depth) {
            Self::destroy(device, &mut fbo);
            return Err(e);
        }

        let framebuffer_count = fbo.window_image_views.len().max(1);
        for image_index in 0..framebuffer_count {
            let window_view = fbo.window_image_views.get(image_index).copied();
            let created = with_window_view(
                &mut fbo.image_views,
                fbo.window_attachment_index,
                window_view,
                |attachments| {
                    device.create_framebuffer(&FramebufferCreateDesc {
                        render_pass,
                        attachments,
                        width,
                        height,
                        layers: 1,
                    })
                },
            );

            match created {
                Ok(framebuffer) => fbo.framebuffers.push(framebuffer),
                Err(e) => {
                    engine_error!("galaxy3d::FboRealizer",
                        "Framebuffer {} of {} failed, releasing partial objects",
                        image_index, framebuffer_count);
                    Self::destroy(device, &mut fbo);
                    return Err(e);
                }
            }
        }

        engine_debug!("galaxy3d::FboRealizer",
            "Realized render pass with {} attachment(s), {} framebuffer(s) at {}x{}",
            fbo.image_views.len(), fbo.framebuffers.len(), width, height);

        Ok(fbo)
    }

    fn create_views(
        fbo: &mut RealizedFbo,
        layout: &AttachmentLayout,
        colour: &[RenderPassColourTarget],
        depth: Option<&RenderPassDepthTarget>,
    ) -> Result<()> {
        for (slot, attachment) in layout.attachments.iter().enumerate() {
            let (texture, image) = match attachment.source {
                AttachmentSource::Colour { index, image } => match colour.get(index) {
                    Some(target) => (&target.texture, image),
                    None => engine_bail!("galaxy3d::FboRealizer",
                        "Colour entry {} missing for slot {}", index, slot),
                },
                AttachmentSource::Depth { image } => match depth {
                    Some(target) => (&target.texture, image),
                    None => engine_bail!("galaxy3d::FboRealizer",
                        "Depth entry missing for slot {}", slot),
                },
                AttachmentSource::WindowImage { index } => {
                    let window = colour.get(index).and_then(|target| target.texture.window());
                    match window {
                        Some(window) if window.swapchain_image_views().is_empty() => {
                            engine_bail_config!("galaxy3d::FboRealizer",
                                "Window of colour entry {} has no swap-chain images", index)
                        }
                        Some(window) => {
                            fbo.window_image_views = window.swapchain_image_views().to_vec();
                        }
                        None => engine_bail!("galaxy3d::FboRealizer",
                            "Colour entry {} is not backed by a window", index),
                    }
                    continue;
                }
            };

            fbo.image_views[slot] = texture.create_view(&ImageViewDesc {
                mip_level: 0,
                mip_count: 1,
                array_slice_start: 0,
                array_slice_count: 1,
                image,
            })?;
        }
        Ok(())
    }

    /// Destroy framebuffers, then views, then the render pass
    ///
    /// Leaves `fbo` empty; calling it again does nothing.
    pub fn destroy(device: &dyn FboDevice, fbo: &mut RealizedFbo) {
        for framebuffer in fbo.framebuffers.drain(..) {
            device.destroy_framebuffer(framebuffer);
        }

        for view in fbo.image_views.drain(..) {
            if !view.is_null() {
                device.destroy_image_view(view);
            }
        }

        if !fbo.render_pass.is_null() {
            device.destroy_render_pass(fbo.render_pass);
            fbo.render_pass = RenderPassHandle::NULL;
        }

        fbo.window_image_views.clear();
    }
}

/// Run `f` with the window slot of `views` set to `view`, then reset it to null
///
/// A window slot without a view is an error: the template would hand a null
/// attachment to the backend.
fn with_window_view<R>(
    views: &mut [ImageViewHandle],
    slot: Option<u32>,
    view: Option<ImageViewHandle>,
    f: impl FnOnce(&[ImageViewHandle]) -> Result<R>,
) -> Result<R> {
    match (slot.map(|s| s as usize), view) {
        (None, _) => f(views),
        (Some(slot), Some(view)) if slot < views.len() => {
            views[slot] = view;
            let result = f(views);
            views[slot] = ImageViewHandle::NULL;
            result
        }
        (Some(slot), _) => engine_bail!("galaxy3d::FboRealizer",
            "No swap-chain view for window slot {}", slot),
    }
}

#[cfg(test)]
#[path = "realizer_tests.rs"]
mod tests;
