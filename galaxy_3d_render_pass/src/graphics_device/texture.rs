/// Render texture collaborator: format, multisample state, window backing
/// and image view creation for the textures a render pass draws into.
///
/// Textures are owned by the texture manager. The render pass subsystem
/// only holds shared references to them.

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{ImageHandle, ImageViewHandle, SemaphoreHandle};

/// Render target pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    /// No format. A colour entry with this format contributes no attachment.
    Unknown,

    // Colour formats (normalized / float)
    R8G8B8A8_SRGB,
    R8G8B8A8_UNORM,
    B8G8R8A8_SRGB,
    B8G8R8A8_UNORM,
    R16G16B16A16_SFLOAT,
    R32G32B32A32_SFLOAT,

    // Colour formats (integer)
    R8G8B8A8_UINT,
    R8G8B8A8_SINT,
    R32_UINT,
    R32_SINT,

    // Depth / stencil formats
    D16_UNORM,
    D32_FLOAT,
    D24_UNORM_S8_UINT,
    D32_FLOAT_S8_UINT,
}

impl TextureFormat {
    /// Whether the format stores integer (non-normalized) colour values
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            TextureFormat::R8G8B8A8_UINT
                | TextureFormat::R8G8B8A8_SINT
                | TextureFormat::R32_UINT
                | TextureFormat::R32_SINT
        )
    }

    /// Whether the format stores signed integer colour values
    pub fn is_signed_integer(self) -> bool {
        matches!(self, TextureFormat::R8G8B8A8_SINT | TextureFormat::R32_SINT)
    }

    /// Whether the format has a depth aspect
    pub fn is_depth(self) -> bool {
        matches!(
            self,
            TextureFormat::D16_UNORM
                | TextureFormat::D32_FLOAT
                | TextureFormat::D24_UNORM_S8_UINT
                | TextureFormat::D32_FLOAT_S8_UINT
        )
    }

    /// Whether the format has a stencil aspect
    pub fn has_stencil(self) -> bool {
        matches!(self, TextureFormat::D24_UNORM_S8_UINT | TextureFormat::D32_FLOAT_S8_UINT)
    }
}

/// Stable identity of a texture
///
/// Two attachments refer to the same physical image iff their ids are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureId(pub u64);

/// Parameters for creating an image view on a render texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageViewDesc {
    /// Mip level to view
    pub mip_level: u32,
    /// Number of mip levels (0 = all remaining levels)
    pub mip_count: u32,
    /// First array slice
    pub array_slice_start: u32,
    /// Number of array slices
    pub array_slice_count: u32,
    /// Image to view (MSAA surface or final image)
    pub image: ImageHandle,
}

/// Render texture trait
///
/// Implemented by backend textures (e.g. `VulkanRenderTexture`) and by the
/// window back-buffer texture.
pub trait RenderTexture: Send + Sync {
    /// Stable identity of this texture
    fn id(&self) -> TextureId;

    /// Pixel format
    fn format(&self) -> TextureFormat;

    /// Sample count (FSAA level). 1 means no multisampling.
    fn samples(&self) -> u32;

    /// Whether the texture is multisampled
    fn is_multisample(&self) -> bool {
        self.samples() > 1
    }

    /// Whether the texture renders into a separate MSAA surface that is
    /// implicitly resolved into the final image
    fn has_msaa_surface(&self) -> bool {
        self.msaa_image().is_some()
    }

    /// Whether the storage of this texture is the window's swap-chain image
    fn is_window_backed(&self) -> bool {
        self.window().is_some()
    }

    /// Width in pixels
    fn width(&self) -> u32;

    /// Height in pixels
    fn height(&self) -> u32;

    /// Final (single-sample / resolved) image
    fn final_image(&self) -> ImageHandle;

    /// MSAA surface, if the texture uses an implicit resolve
    fn msaa_image(&self) -> Option<ImageHandle>;

    /// Create an image view. The caller owns the view and destroys it
    /// through `FboDevice::destroy_image_view`.
    fn create_view(&self, desc: &ImageViewDesc) -> Result<ImageViewHandle>;

    /// Swap-chain images, for window-backed textures
    fn window(&self) -> Option<&dyn WindowImages> {
        None
    }
}

/// Swap-chain state of a window-backed texture
pub trait WindowImages: Send + Sync {
    /// Index of the swap-chain image acquired for the current frame
    fn current_image_index(&self) -> usize;

    /// One image view per swap-chain image (owned by the swap chain)
    fn swapchain_image_views(&self) -> &[ImageViewHandle];

    /// Semaphore signalled when the current image has been acquired
    /// (null if the image is already available)
    fn image_acquired_semaphore(&self) -> SemaphoreHandle;
}

/// On-screen surface whose textures a descriptor can adopt
pub trait BackingSurface: Send + Sync {
    /// Window back-buffer colour texture
    fn colour_texture(&self) -> Arc<dyn RenderTexture>;

    /// Depth buffer attached to the window, if any
    fn depth_texture(&self) -> Option<Arc<dyn RenderTexture>>;
}
