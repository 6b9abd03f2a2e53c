//! Integration tests for render pass descriptors and the framebuffer cache
//!
//! Drives the subsystem through its public API with in-memory collaborators.
//! No GPU required.
//!
//! Run with: cargo test --test render_pass_integration_tests


use std::sync::{Arc, Mutex};
use galaxy_3d_render_pass::galaxy3d::Error;
use galaxy_3d_render_pass::galaxy3d::render::{
    ClearColor, ClearValue, CommandQueue, FboDevice, LoadOp, SemaphoreHandle, TextureFormat,
};
use galaxy_3d_render_pass::galaxy3d::render_pass::{
    DescriptorState, FlushMask, FrameBufferCache, RenderPassColourTarget, RenderPassConfig,
    RenderPassDepthTarget, RenderPassDescriptor,
};
use test_device_utils::{LiveObjects, TestDevice, TestQueue, TestSurface, TestTexture};

// ============================================================================
// HELPERS
// ============================================================================

struct Renderer {
    device: Arc<TestDevice>,
    cache: Arc<Mutex<FrameBufferCache>>,
    queue: Arc<Mutex<TestQueue>>,
}

impl Renderer {
    fn new(config: RenderPassConfig) -> Self {
        let device = Arc::new(TestDevice::default());
        let fbo_device: Arc<dyn FboDevice> = device.clone();
        Self {
            device,
            cache: Arc::new(Mutex::new(FrameBufferCache::new(fbo_device, config))),
            queue: Arc::new(Mutex::new(TestQueue::new())),
        }
    }

    fn descriptor(&self) -> RenderPassDescriptor {
        let queue: Arc<Mutex<dyn CommandQueue>> = self.queue.clone();
        RenderPassDescriptor::new(self.cache.clone(), queue).unwrap()
    }

    fn cached_entries(&self) -> usize {
        self.cache.lock().unwrap().len()
    }
}

// ============================================================================
// SHARING AND LIFETIME
// ============================================================================

#[test]
fn test_integration_descriptors_share_native_objects() {
    let renderer = Renderer::new(RenderPassConfig::default());
    let albedo = TestTexture::new(1, TextureFormat::R8G8B8A8_UNORM, 640, 360);
    let depth = TestTexture::new(2, TextureFormat::D32_FLOAT, 640, 360);

    let mut geometry = renderer.descriptor();
    geometry.set_colour_attachment(0, RenderPassColourTarget::new(albedo.clone())).unwrap();
    geometry.set_depth_attachment(Some(RenderPassDepthTarget::new(depth.clone()))).unwrap();

    let mut decals = renderer.descriptor();
    decals.set_colour_attachment(0, RenderPassColourTarget::new(albedo.clone())).unwrap();
    decals.set_depth_attachment(Some(RenderPassDepthTarget::new(depth.clone()))).unwrap();

    assert_eq!(geometry.fbo_handle(), decals.fbo_handle());
    assert_eq!(renderer.cached_entries(), 1);
    assert_eq!(renderer.device.live().render_passes, 1);
    assert_eq!(renderer.device.live().framebuffers, 1);
    assert!(geometry.will_switch_to(Some(&decals)).is_empty());

    drop(geometry);
    assert_eq!(renderer.device.live().render_passes, 1);

    drop(decals);
    assert_eq!(renderer.cached_entries(), 0);
    assert_eq!(
        renderer.device.live(),
        LiveObjects { render_passes: 0, framebuffers: 0, views_destroyed: 2 }
    );
}

#[test]
fn test_integration_load_action_splits_render_pass_but_not_flush() {
    let renderer = Renderer::new(RenderPassConfig::default());
    let albedo = TestTexture::new(1, TextureFormat::R8G8B8A8_UNORM, 640, 360);

    let mut clear = renderer.descriptor();
    clear.set_colour_attachment(0, RenderPassColourTarget::new(albedo.clone())).unwrap();

    let mut overlay = renderer.descriptor();
    overlay
        .set_colour_attachment(0, RenderPassColourTarget::new(albedo).with_load_action(LoadOp::Load))
        .unwrap();

    assert_ne!(clear.fbo_handle(), overlay.fbo_handle());
    assert_eq!(clear.flush_handle(), overlay.flush_handle());
    assert_eq!(renderer.cached_entries(), 2);
    assert!(clear.will_switch_to(Some(&overlay)).is_empty());
}

#[test]
fn test_integration_retargeting_releases_previous_entry() {
    let renderer = Renderer::new(RenderPassConfig::default());
    let small = TestTexture::new(1, TextureFormat::R16G16B16A16_SFLOAT, 256, 256);
    let large = TestTexture::new(2, TextureFormat::R16G16B16A16_SFLOAT, 1024, 1024);

    let mut bloom = renderer.descriptor();
    bloom.set_colour_attachment(0, RenderPassColourTarget::new(small)).unwrap();
    let first = bloom.fbo_handle();

    bloom.set_colour_attachment(0, RenderPassColourTarget::new(large)).unwrap();

    assert_ne!(bloom.fbo_handle(), first);
    assert_eq!(renderer.cached_entries(), 1);
    assert_eq!(renderer.device.live().render_passes, 1);
    assert_eq!((bloom.target_width(), bloom.target_height()), (1024, 1024));
}

#[test]
fn test_integration_different_targets_need_flush() {
    let renderer = Renderer::new(RenderPassConfig::default());
    let a = TestTexture::new(1, TextureFormat::R8G8B8A8_UNORM, 128, 128);
    let b = TestTexture::new(2, TextureFormat::R8G8B8A8_UNORM, 128, 128);

    let mut first = renderer.descriptor();
    let mut second = renderer.descriptor();
    first.set_colour_attachment(0, RenderPassColourTarget::new(a)).unwrap();
    second.set_colour_attachment(0, RenderPassColourTarget::new(b)).unwrap();

    assert_eq!(first.will_switch_to(Some(&second)), FlushMask::ALL);
    assert_eq!(first.will_switch_to(None), FlushMask::ALL);
}

// ============================================================================
// RECORDING
// ============================================================================

#[test]
fn test_integration_offscreen_pass_records_clear_values() {
    let renderer = Renderer::new(RenderPassConfig::default());
    let colour = TestTexture::new(1, TextureFormat::R8G8B8A8_UNORM, 800, 600);
    let ids = TestTexture::new(2, TextureFormat::R32_UINT, 800, 600);
    let depth = TestTexture::new(3, TextureFormat::D24_UNORM_S8_UINT, 800, 600);

    let mut pass = renderer.descriptor();
    pass.set_colour_attachments(vec![
        RenderPassColourTarget::new(colour).with_clear_colour([0.1, 0.2, 0.3, 1.0]),
        RenderPassColourTarget::new(ids),
    ])
    .unwrap();
    pass.set_depth_attachment(Some(RenderPassDepthTarget::new(depth))).unwrap();
    pass.set_clear_stencil(7);

    pass.perform_load_actions().unwrap();
    assert_eq!(pass.state(), DescriptorState::Active);
    pass.perform_store_actions().unwrap();
    assert_eq!(pass.state(), DescriptorState::Configured);

    let queue = renderer.queue.lock().unwrap();
    assert_eq!(queue.passes.len(), 1);
    assert_eq!(queue.ended, 1);
    assert!(queue.waits.is_empty());

    let recorded = &queue.passes[0];
    assert_eq!((recorded.width, recorded.height), (800, 600));
    assert_eq!(recorded.clear_values[0], ClearValue::Color(ClearColor::Float([0.1, 0.2, 0.3, 1.0])));
    assert_eq!(recorded.clear_values[1], ClearValue::Color(ClearColor::Uint([0, 0, 0, 1])));
    assert_eq!(recorded.clear_values[2], ClearValue::DepthStencil { depth: 1.0, stencil: 7 });
}

#[test]
fn test_integration_reverse_depth_clear() {
    let renderer = Renderer::new(RenderPassConfig { reverse_depth: true });
    let depth = TestTexture::new(1, TextureFormat::D32_FLOAT, 512, 512);

    let mut shadow = renderer.descriptor();
    shadow.set_depth_attachment(Some(RenderPassDepthTarget::new(depth))).unwrap();
    shadow.set_clear_depth(1.0);

    assert_eq!(shadow.clear_values()[0], ClearValue::DepthStencil { depth: 0.0, stencil: 0 });
    assert_eq!((shadow.target_width(), shadow.target_height()), (512, 512));
}

#[test]
fn test_integration_information_only_records_nothing() {
    let renderer = Renderer::new(RenderPassConfig::default());
    let colour = TestTexture::new(1, TextureFormat::R8G8B8A8_UNORM, 64, 64);

    let mut pass = renderer.descriptor();
    pass.set_colour_attachment(0, RenderPassColourTarget::new(colour)).unwrap();
    pass.set_information_only(true);

    pass.perform_load_actions().unwrap();
    pass.perform_store_actions().unwrap();

    assert!(renderer.queue.lock().unwrap().passes.is_empty());
}

// ============================================================================
// WINDOW TARGETS
// ============================================================================

#[test]
fn test_integration_window_pass_uses_current_swapchain_image() {
    let renderer = Renderer::new(RenderPassConfig::default());
    let window = TestTexture::new_window(10, 1280, 720, 3);
    let depth = TestTexture::new(11, TextureFormat::D32_FLOAT, 1280, 720);

    let mut main = renderer.descriptor();
    main.set_colour_attachment(0, RenderPassColourTarget::new(window.clone())).unwrap();
    main.set_depth_attachment(Some(RenderPassDepthTarget::new(depth))).unwrap();
    assert_eq!(renderer.device.live().framebuffers, 3);

    let framebuffers = {
        let cache = renderer.cache.lock().unwrap();
        cache.realized(main.fbo_handle().unwrap()).unwrap().framebuffers.clone()
    };

    for image in [2, 0] {
        window.window.as_ref().unwrap().set_current(image);
        main.perform_load_actions().unwrap();
        main.perform_store_actions().unwrap();
    }

    let queue = renderer.queue.lock().unwrap();
    assert_eq!(queue.passes[0].framebuffer, framebuffers[2]);
    assert_eq!(queue.passes[1].framebuffer, framebuffers[0]);
    assert_eq!(queue.waits, vec![SemaphoreHandle::from_raw(0x5E3A); 2]);
}

#[test]
fn test_integration_window_rejected_as_mrt() {
    let renderer = Renderer::new(RenderPassConfig::default());
    let window = TestTexture::new_window(10, 1280, 720, 2);
    let gbuffer = TestTexture::new(11, TextureFormat::R8G8B8A8_UNORM, 1280, 720);

    let mut pass = renderer.descriptor();
    pass.set_colour_attachment(0, RenderPassColourTarget::new(window.clone())).unwrap();

    let result = pass.set_colour_attachment(1, RenderPassColourTarget::new(gbuffer));
    assert!(matches!(result, Err(Error::InvalidConfiguration(_))));

    // The previous configuration is untouched
    assert_eq!(pass.num_colour_entries(), 1);
    assert_eq!(pass.state(), DescriptorState::Configured);
    assert_eq!(renderer.cached_entries(), 1);
}

#[test]
fn test_integration_backing_surface_recreation() {
    let renderer = Renderer::new(RenderPassConfig::default());
    let old_surface = TestSurface {
        colour: TestTexture::new_window(10, 800, 600, 2),
        depth: Some(TestTexture::new(11, TextureFormat::D32_FLOAT, 800, 600)),
    };

    let mut main = renderer.descriptor();
    main.on_backing_surface_created(&old_surface).unwrap();
    main.set_clear_colour(0, [0.0, 0.0, 1.0, 1.0]).unwrap();
    assert_eq!(renderer.device.live().framebuffers, 2);

    main.on_backing_surface_destroyed(&old_surface).unwrap();
    assert_eq!(main.state(), DescriptorState::Unconfigured);
    assert_eq!(renderer.cached_entries(), 0);
    assert_eq!(renderer.device.live().framebuffers, 0);

    let new_surface = TestSurface {
        colour: TestTexture::new_window(20, 1920, 1080, 3),
        depth: Some(TestTexture::new(21, TextureFormat::D32_FLOAT, 1920, 1080)),
    };
    main.on_backing_surface_created(&new_surface).unwrap();

    assert_eq!(main.state(), DescriptorState::Configured);
    assert_eq!((main.target_width(), main.target_height()), (1920, 1080));
    assert_eq!(renderer.device.live().framebuffers, 3);
    assert_eq!(main.clear_values()[0], ClearValue::Color(ClearColor::Float([0.0, 0.0, 1.0, 1.0])));
}

#[test]
fn test_integration_unrelated_surface_destruction_is_ignored() {
    let renderer = Renderer::new(RenderPassConfig::default());
    let surface = TestSurface { colour: TestTexture::new_window(10, 800, 600, 2), depth: None };
    let other = TestSurface { colour: TestTexture::new_window(30, 800, 600, 2), depth: None };

    let mut main = renderer.descriptor();
    main.on_backing_surface_created(&surface).unwrap();
    main.on_backing_surface_destroyed(&other).unwrap();

    assert_eq!(main.state(), DescriptorState::Configured);
    assert_eq!(renderer.cached_entries(), 1);
}
