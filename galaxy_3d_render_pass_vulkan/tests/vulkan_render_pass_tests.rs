//! GPU tests for the Vulkan render pass collaborators
//!
//! A headless device (no surface) is created per test. All tests require a
//! GPU and are marked with #[ignore].
//!
//! Run with: cargo test --test vulkan_render_pass_tests -- --ignored

use std::sync::{Arc, Mutex};
use ash::vk;
use galaxy_3d_render_pass::galaxy3d::render::{
    CommandQueue, EncoderState, FboDevice, TextureFormat, TextureId,
};
use galaxy_3d_render_pass::galaxy3d::render_pass::{
    DescriptorState, FrameBufferCache, RenderPassColourTarget, RenderPassConfig,
    RenderPassDepthTarget, RenderPassDescriptor,
};
use galaxy_3d_render_pass_vulkan::{VulkanCommandQueue, VulkanFboDevice, VulkanRenderTexture};

/// Headless Vulkan context with one graphics queue
struct TestContext {
    _entry: ash::Entry,
    instance: ash::Instance,
    physical_device: vk::PhysicalDevice,
    device: Arc<ash::Device>,
    queue: vk::Queue,
    queue_family: u32,
    images: Vec<(vk::Image, vk::DeviceMemory)>,
}

impl TestContext {
    fn new() -> Self {
        let entry = unsafe { ash::Entry::load() }.expect("Vulkan loader not found");
        let app_info = vk::ApplicationInfo::default()
            .application_name(c"galaxy3d render pass tests")
            .api_version(vk::API_VERSION_1_1);
        let instance_info = vk::InstanceCreateInfo::default().application_info(&app_info);
        let instance = unsafe { entry.create_instance(&instance_info, None) }
            .expect("Failed to create instance");

        let physical_devices = unsafe { instance.enumerate_physical_devices() }
            .expect("Failed to enumerate physical devices");
        let (physical_device, queue_family) = physical_devices
            .iter()
            .find_map(|&pd| {
                let families = unsafe { instance.get_physical_device_queue_family_properties(pd) };
                families
                    .iter()
                    .position(|f| f.queue_flags.contains(vk::QueueFlags::GRAPHICS))
                    .map(|i| (pd, i as u32))
            })
            .expect("No graphics-capable device");

        let priorities = [1.0f32];
        let queue_info = vk::DeviceQueueCreateInfo::default()
            .queue_family_index(queue_family)
            .queue_priorities(&priorities);
        let device_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(std::slice::from_ref(&queue_info));
        let device = unsafe { instance.create_device(physical_device, &device_info, None) }
            .expect("Failed to create device");
        let queue = unsafe { device.get_device_queue(queue_family, 0) };

        Self {
            _entry: entry,
            instance,
            physical_device,
            device: Arc::new(device),
            queue,
            queue_family,
            images: Vec::new(),
        }
    }

    /// Create a device-local 2D image usable as an attachment
    fn create_image(&mut self, format: TextureFormat, width: u32, height: u32) -> vk::Image {
        let usage = if format.is_depth() {
            vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT
        } else {
            vk::ImageUsageFlags::COLOR_ATTACHMENT
        };
        let image_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .format(galaxy_3d_render_pass_vulkan::format_to_vk(format))
            .extent(vk::Extent3D { width, height, depth: 1 })
            .mip_levels(1)
            .array_layers(1)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(usage)
            .initial_layout(vk::ImageLayout::UNDEFINED);

        unsafe {
            let image = self.device.create_image(&image_info, None).unwrap();
            let requirements = self.device.get_image_memory_requirements(image);
            let properties = self.instance.get_physical_device_memory_properties(self.physical_device);
            let memory_type = (0..properties.memory_type_count)
                .find(|&i| {
                    requirements.memory_type_bits & (1 << i) != 0
                        && properties.memory_types[i as usize]
                            .property_flags
                            .contains(vk::MemoryPropertyFlags::DEVICE_LOCAL)
                })
                .unwrap();
            let alloc_info = vk::MemoryAllocateInfo::default()
                .allocation_size(requirements.size)
                .memory_type_index(memory_type);
            let memory = self.device.allocate_memory(&alloc_info, None).unwrap();
            self.device.bind_image_memory(image, memory, 0).unwrap();
            self.images.push((image, memory));
            image
        }
    }

    fn texture(&mut self, id: u64, format: TextureFormat) -> Arc<VulkanRenderTexture> {
        let image = self.create_image(format, 64, 64);
        Arc::new(VulkanRenderTexture::new(
            TextureId(id), Arc::clone(&self.device), image, format, 64, 64))
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        unsafe {
            self.device.device_wait_idle().ok();
            for (image, memory) in self.images.drain(..) {
                self.device.destroy_image(image, None);
                self.device.free_memory(memory, None);
            }
            self.device.destroy_device(None);
            self.instance.destroy_instance(None);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_vulkan_realize_and_release_offscreen_pass() {
    let mut ctx = TestContext::new();
    let colour = ctx.texture(1, TextureFormat::R8G8B8A8_UNORM);
    let depth = ctx.texture(2, TextureFormat::D32_FLOAT);

    let fbo_device: Arc<dyn FboDevice> = Arc::new(VulkanFboDevice::new(Arc::clone(&ctx.device)));
    let cache = Arc::new(Mutex::new(FrameBufferCache::new(fbo_device, RenderPassConfig::default())));
    let queue = Arc::new(Mutex::new(
        VulkanCommandQueue::new(Arc::clone(&ctx.device), ctx.queue, ctx.queue_family).unwrap()));
    let dyn_queue: Arc<Mutex<dyn CommandQueue>> = queue.clone();

    {
        let mut descriptor = RenderPassDescriptor::new(Arc::clone(&cache), dyn_queue).unwrap();
        descriptor.set_colour_attachment(0, RenderPassColourTarget::new(colour)).unwrap();
        descriptor.set_depth_attachment(Some(RenderPassDepthTarget::new(depth))).unwrap();
        assert_eq!(descriptor.state(), DescriptorState::Configured);

        {
            let cache = cache.lock().unwrap();
            let realized = cache.realized(descriptor.fbo_handle().unwrap()).unwrap();
            assert!(!realized.render_pass.is_null());
            assert_eq!(realized.framebuffers.len(), 1);
            assert_eq!(realized.image_views.len(), 2);
        }

        queue.lock().unwrap().begin().unwrap();
        descriptor.perform_load_actions().unwrap();
        assert_eq!(queue.lock().unwrap().encoder_state(), EncoderState::GraphicsOpen);
        descriptor.perform_store_actions().unwrap();
        assert_eq!(queue.lock().unwrap().encoder_state(), EncoderState::Closed);

        let fence = unsafe { ctx.device.create_fence(&vk::FenceCreateInfo::default(), None) }.unwrap();
        queue.lock().unwrap().submit(vk::Semaphore::null(), fence).unwrap();
        unsafe {
            ctx.device.wait_for_fences(&[fence], true, u64::MAX).unwrap();
            ctx.device.destroy_fence(fence, None);
        }
    }

    // Dropping the descriptor released the only reference
    assert!(cache.lock().unwrap().is_empty());
    drop(queue);
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_equal_targets_share_render_pass() {
    let mut ctx = TestContext::new();
    let colour = ctx.texture(1, TextureFormat::B8G8R8A8_UNORM);

    let fbo_device: Arc<dyn FboDevice> = Arc::new(VulkanFboDevice::new(Arc::clone(&ctx.device)));
    let cache = Arc::new(Mutex::new(FrameBufferCache::new(fbo_device, RenderPassConfig::default())));
    let queue: Arc<Mutex<dyn CommandQueue>> = Arc::new(Mutex::new(
        VulkanCommandQueue::new(Arc::clone(&ctx.device), ctx.queue, ctx.queue_family).unwrap()));

    let mut first = RenderPassDescriptor::new(Arc::clone(&cache), Arc::clone(&queue)).unwrap();
    let mut second = RenderPassDescriptor::new(Arc::clone(&cache), Arc::clone(&queue)).unwrap();
    first.set_colour_attachment(0, RenderPassColourTarget::new(colour.clone())).unwrap();
    second.set_colour_attachment(0, RenderPassColourTarget::new(colour)).unwrap();

    assert_eq!(first.fbo_handle(), second.fbo_handle());
    assert_eq!(cache.lock().unwrap().len(), 1);
    assert!(first.will_switch_to(Some(&second)).is_empty());
}
