/// CommandQueue - Vulkan implementation of the recording side of a graphics queue

use std::sync::Arc;
use ash::vk;
use ash::vk::Handle;
use galaxy_3d_render_pass::galaxy3d::{Error, Result};
use galaxy_3d_render_pass::galaxy3d::render::{
    CommandQueue, EncoderState, RenderPassBeginDesc, SemaphoreHandle,
};
use galaxy_3d_render_pass::engine_error;

use crate::vulkan_mapping::clear_value_to_vk;

/// Vulkan command queue
///
/// Records into a single primary command buffer and submits it to the
/// graphics queue, waiting on every window semaphore registered since the
/// last submission.
pub struct VulkanCommandQueue {
    /// Vulkan device
    device: Arc<ash::Device>,
    /// Graphics queue
    queue: vk::Queue,
    /// Command pool for allocating command buffers
    command_pool: vk::CommandPool,
    /// Command buffer for recording
    command_buffer: vk::CommandBuffer,
    /// Whether the command buffer is currently recording
    is_recording: bool,
    /// Open encoder
    encoder: EncoderState,
    /// Semaphores the next submission waits on
    wait_semaphores: Vec<vk::Semaphore>,
}

impl VulkanCommandQueue {
    /// Create a new command queue
    ///
    /// # Arguments
    ///
    /// * `device` - Vulkan logical device
    /// * `queue` - Graphics queue
    /// * `graphics_queue_family` - Graphics queue family index
    pub fn new(device: Arc<ash::Device>, queue: vk::Queue, graphics_queue_family: u32) -> Result<Self> {
        let command_pool_create_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(graphics_queue_family)
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

        let command_pool = unsafe { device.create_command_pool(&command_pool_create_info, None) }
            .map_err(|e| vk_err!(e, "Failed to create command pool: {:?}", e))?;

        let command_buffer_allocate_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);

        let command_buffers = match unsafe { device.allocate_command_buffers(&command_buffer_allocate_info) } {
            Ok(buffers) => buffers,
            Err(e) => {
                unsafe { device.destroy_command_pool(command_pool, None) };
                return Err(vk_err!(e,
                    "Failed to allocate command buffer: {:?}", e));
            }
        };

        Ok(Self {
            device,
            queue,
            command_pool,
            command_buffer: command_buffers[0],
            is_recording: false,
            encoder: EncoderState::Closed,
            wait_semaphores: Vec::new(),
        })
    }

    /// Get the underlying Vulkan command buffer
    pub fn command_buffer(&self) -> vk::CommandBuffer {
        self.command_buffer
    }

    /// Semaphores the next submission will wait on
    pub fn pending_wait_semaphores(&self) -> &[vk::Semaphore] {
        &self.wait_semaphores
    }

    /// Reset and begin recording
    pub fn begin(&mut self) -> Result<()> {
        if self.is_recording {
            return Err(Error::BackendError("Command queue already recording".to_string()));
        }

        unsafe {
            self.device
                .reset_command_buffer(self.command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(|e| vk_err!(e, "Failed to reset command buffer: {:?}", e))?;

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

            self.device
                .begin_command_buffer(self.command_buffer, &begin_info)
                .map_err(|e| vk_err!(e, "Failed to begin command buffer: {:?}", e))?;
        }

        self.is_recording = true;
        self.encoder = EncoderState::Closed;
        Ok(())
    }

    /// Close open encoders, end recording and submit
    ///
    /// The submission waits on the registered window semaphores at the
    /// colour attachment output stage and signals `signal` (if not null).
    pub fn submit(&mut self, signal: vk::Semaphore, fence: vk::Fence) -> Result<()> {
        if !self.is_recording {
            return Err(Error::BackendError("Command queue not recording".to_string()));
        }

        self.end_all_encoders(true);

        unsafe {
            self.device
                .end_command_buffer(self.command_buffer)
                .map_err(|e| vk_err!(e, "Failed to end command buffer: {:?}", e))?;
        }
        self.is_recording = false;

        let wait_stages = vec![vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT; self.wait_semaphores.len()];
        let signal_semaphores: Vec<vk::Semaphore> =
            if signal == vk::Semaphore::null() { Vec::new() } else { vec![signal] };
        let command_buffers = [self.command_buffer];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&self.wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe { self.device.queue_submit(self.queue, &[submit_info], fence) }
            .map_err(|e| vk_err!(e,
                "Failed to submit commands to GPU queue: {:?}", e))?;

        self.wait_semaphores.clear();
        Ok(())
    }
}

impl CommandQueue for VulkanCommandQueue {
    fn encoder_state(&self) -> EncoderState {
        self.encoder
    }

    fn add_window_to_wait_for(&mut self, semaphore: SemaphoreHandle) {
        let semaphore = vk::Semaphore::from_raw(semaphore.as_raw());
        if !self.wait_semaphores.contains(&semaphore) {
            self.wait_semaphores.push(semaphore);
        }
    }

    fn cmd_begin_render_pass(&mut self, desc: &RenderPassBeginDesc) -> Result<()> {
        if !self.is_recording {
            return Err(Error::BackendError("Command queue not recording".to_string()));
        }

        // A previous pass left open is closed before the next one begins
        self.end_all_encoders(true);

        let vk_clear_values: Vec<vk::ClearValue> =
            desc.clear_values.iter().map(clear_value_to_vk).collect();

        let render_pass_info = vk::RenderPassBeginInfo::default()
            .render_pass(vk::RenderPass::from_raw(desc.render_pass.as_raw()))
            .framebuffer(vk::Framebuffer::from_raw(desc.framebuffer.as_raw()))
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: desc.render_area.x, y: desc.render_area.y },
                extent: vk::Extent2D {
                    width: desc.render_area.width,
                    height: desc.render_area.height,
                },
            })
            .clear_values(&vk_clear_values);

        unsafe {
            self.device.cmd_begin_render_pass(
                self.command_buffer,
                &render_pass_info,
                vk::SubpassContents::INLINE,
            );
        }

        self.encoder = EncoderState::GraphicsOpen;
        Ok(())
    }

    fn cmd_end_render_pass(&mut self) -> Result<()> {
        if self.encoder != EncoderState::GraphicsOpen {
            return Err(Error::BackendError("Not inside a render pass".to_string()));
        }

        unsafe {
            self.device.cmd_end_render_pass(self.command_buffer);
        }
        Ok(())
    }

    fn end_all_encoders(&mut self, end_render_pass_encoder: bool) {
        if self.encoder == EncoderState::GraphicsOpen && end_render_pass_encoder {
            unsafe {
                self.device.cmd_end_render_pass(self.command_buffer);
            }
        }
        self.encoder = EncoderState::Closed;
    }
}

impl Drop for VulkanCommandQueue {
    fn drop(&mut self) {
        unsafe {
            if let Err(e) = self.device.device_wait_idle() {
                engine_error!("galaxy3d::vulkan", "device_wait_idle failed before destroying command pool: {:?}", e);
            }
            self.device.destroy_command_pool(self.command_pool, None);
        }
    }
}
