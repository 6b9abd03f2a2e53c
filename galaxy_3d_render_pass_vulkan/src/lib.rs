/*!
# Galaxy 3D Render Pass - Vulkan Backend

Vulkan implementation of the native collaborators consumed by
`galaxy_3d_render_pass`: render pass / framebuffer / image view creation,
render textures, swap-chain images and the recording command queue.

Native objects cross the core boundary as raw 64-bit handles
(`ash::vk::Handle::as_raw`).
*/

/// Log a failed Vulkan call and convert its `vk::Result` into an `Error`
///
/// Memory exhaustion becomes `Error::OutOfMemory`, anything else
/// `Error::BackendError` carrying the formatted message.
macro_rules! vk_err {
    ($result:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        galaxy_3d_render_pass::engine_error!("galaxy3d::vulkan", "{}", message);
        $crate::vulkan_mapping::vk_result_to_error($result, message)
    }};
}

mod vulkan_mapping;
mod vulkan_fbo_device;
mod vulkan_render_texture;
mod vulkan_window_images;
mod vulkan_command_queue;

pub use vulkan_fbo_device::VulkanFboDevice;
pub use vulkan_render_texture::VulkanRenderTexture;
pub use vulkan_window_images::VulkanWindowImages;
pub use vulkan_command_queue::VulkanCommandQueue;
pub use vulkan_mapping::{
    aspect_mask_for, attachment_reference_to_vk, clear_value_to_vk, format_to_vk,
    image_layout_to_vk, load_op_to_vk, sample_count_to_vk, store_op_to_vk, vk_result_to_error,
};
