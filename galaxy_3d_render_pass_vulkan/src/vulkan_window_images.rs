/// WindowImages - swap-chain state of the window back buffer

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use ash::vk;
use ash::vk::Handle;
use galaxy_3d_render_pass::galaxy3d::Result;
use galaxy_3d_render_pass::galaxy3d::render::{ImageViewHandle, SemaphoreHandle, WindowImages};

/// Swap-chain images of the window
///
/// The current image index and its "image acquired" semaphore are updated
/// by `acquire_next_image` each frame and read by render pass descriptors.
pub struct VulkanWindowImages {
    /// One view per swap-chain image (owned by the swap chain)
    views: Vec<ImageViewHandle>,
    /// Index of the image acquired for the current frame
    current: AtomicUsize,
    /// Raw semaphore signalled when the current image is available
    acquired_semaphore: AtomicU64,
}

impl VulkanWindowImages {
    pub fn new(views: &[vk::ImageView]) -> Self {
        Self {
            views: views.iter().map(|v| ImageViewHandle::from_raw(v.as_raw())).collect(),
            current: AtomicUsize::new(0),
            acquired_semaphore: AtomicU64::new(0),
        }
    }

    /// Acquire the next swap-chain image, signalling `semaphore`
    ///
    /// Returns true if the swap chain is suboptimal.
    pub fn acquire_next_image(
        &self,
        loader: &ash::khr::swapchain::Device,
        swapchain: vk::SwapchainKHR,
        semaphore: vk::Semaphore,
    ) -> Result<bool> {
        let (index, suboptimal) = unsafe {
            loader.acquire_next_image(swapchain, u64::MAX, semaphore, vk::Fence::null())
        }
        .map_err(|e| vk_err!(e,
            "vkAcquireNextImageKHR failed: {:?}", e))?;

        self.set_current(index as usize, semaphore);
        Ok(suboptimal)
    }

    /// Record an image acquired outside of this type
    pub fn set_current(&self, index: usize, semaphore: vk::Semaphore) {
        self.current.store(index, Ordering::Release);
        self.acquired_semaphore.store(semaphore.as_raw(), Ordering::Release);
    }
}

impl WindowImages for VulkanWindowImages {
    fn current_image_index(&self) -> usize {
        self.current.load(Ordering::Acquire)
    }

    fn swapchain_image_views(&self) -> &[ImageViewHandle] {
        &self.views
    }

    fn image_acquired_semaphore(&self) -> SemaphoreHandle {
        SemaphoreHandle::from_raw(self.acquired_semaphore.load(Ordering::Acquire))
    }
}

#[cfg(test)]
#[path = "vulkan_window_images_tests.rs"]
mod tests;
