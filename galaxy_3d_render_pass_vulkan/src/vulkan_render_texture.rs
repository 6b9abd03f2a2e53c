/// RenderTexture - Vulkan implementation of the render texture collaborator
///
/// Wraps images owned by the texture manager. Views created through
/// `create_view` are owned by the caller and destroyed through the
/// `FboDevice`.

use std::sync::Arc;
use ash::vk;
use ash::vk::Handle;
use galaxy_3d_render_pass::galaxy3d::Result;
use galaxy_3d_render_pass::galaxy3d::render::{
    ImageHandle, ImageViewDesc, ImageViewHandle, RenderTexture, TextureFormat, TextureId,
    WindowImages,
};

use crate::vulkan_mapping::{aspect_mask_for, format_to_vk};
use crate::vulkan_window_images::VulkanWindowImages;

/// Vulkan render texture
pub struct VulkanRenderTexture {
    /// Stable identity
    id: TextureId,
    /// Vulkan device (for view creation)
    device: Arc<ash::Device>,
    format: TextureFormat,
    samples: u32,
    width: u32,
    height: u32,
    /// Final (resolved) image, null for window-backed textures
    image: vk::Image,
    /// Separate MSAA surface, resolved into `image` at the end of a pass
    msaa_image: Option<vk::Image>,
    /// Swap-chain images, for the window back buffer
    window: Option<VulkanWindowImages>,
}

impl VulkanRenderTexture {
    /// Wrap an offscreen image
    pub fn new(
        id: TextureId,
        device: Arc<ash::Device>,
        image: vk::Image,
        format: TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            id,
            device,
            format,
            samples: 1,
            width,
            height,
            image,
            msaa_image: None,
            window: None,
        }
    }

    /// Wrap the window back buffer
    ///
    /// The swap-chain views stay owned by the swap chain.
    pub fn new_window(
        id: TextureId,
        device: Arc<ash::Device>,
        format: TextureFormat,
        width: u32,
        height: u32,
        window: VulkanWindowImages,
    ) -> Self {
        Self {
            id,
            device,
            format,
            samples: 1,
            width,
            height,
            image: vk::Image::null(),
            msaa_image: None,
            window: Some(window),
        }
    }

    /// Render into a separate multisampled image, resolved into the final one
    pub fn with_msaa_surface(mut self, msaa_image: vk::Image, samples: u32) -> Self {
        self.msaa_image = Some(msaa_image);
        self.samples = samples;
        self
    }
}

impl RenderTexture for VulkanRenderTexture {
    fn id(&self) -> TextureId {
        self.id
    }

    fn format(&self) -> TextureFormat {
        self.format
    }

    fn samples(&self) -> u32 {
        self.samples
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn final_image(&self) -> ImageHandle {
        ImageHandle::from_raw(self.image.as_raw())
    }

    fn msaa_image(&self) -> Option<ImageHandle> {
        self.msaa_image.map(|image| ImageHandle::from_raw(image.as_raw()))
    }

    fn create_view(&self, desc: &ImageViewDesc) -> Result<ImageViewHandle> {
        let view_type = if desc.array_slice_count > 1 {
            vk::ImageViewType::TYPE_2D_ARRAY
        } else {
            vk::ImageViewType::TYPE_2D
        };
        let level_count = if desc.mip_count == 0 {
            vk::REMAINING_MIP_LEVELS
        } else {
            desc.mip_count
        };

        let view_info = vk::ImageViewCreateInfo::default()
            .image(vk::Image::from_raw(desc.image.as_raw()))
            .view_type(view_type)
            .format(format_to_vk(self.format))
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: aspect_mask_for(self.format),
                base_mip_level: desc.mip_level,
                level_count,
                base_array_layer: desc.array_slice_start,
                layer_count: desc.array_slice_count.max(1),
            });

        let view = unsafe { self.device.create_image_view(&view_info, None) }
            .map_err(|e| vk_err!(e,
                "vkCreateImageView failed for texture {:?}: {:?}", self.id, e))?;

        Ok(ImageViewHandle::from_raw(view.as_raw()))
    }

    fn window(&self) -> Option<&dyn WindowImages> {
        self.window.as_ref().map(|w| w as &dyn WindowImages)
    }
}
