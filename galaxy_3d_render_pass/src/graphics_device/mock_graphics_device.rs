/// Mock graphics device for unit tests (no GPU required)
///
/// Records every native call so tests can check creation/destruction
/// counts and ordering.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use crate::error::{Error, Result};
use crate::graphics_device::{
    AttachmentLayout, BackingSurface, ClearValue, CommandQueue, EncoderState, FboDevice,
    FramebufferCreateDesc, FramebufferHandle, ImageHandle, ImageViewDesc, ImageViewHandle,
    Rect2D, RenderPassBeginDesc, RenderPassHandle, RenderTexture, SemaphoreHandle,
    TextureFormat, TextureId, WindowImages,
};

/// Unique handle source shared by every mock object
static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1000);

fn next_handle() -> u64 {
    NEXT_HANDLE.fetch_add(1, Ordering::Relaxed)
}

// ============================================================================
// Mock Window Images
// ============================================================================

#[derive(Debug)]
pub struct MockWindowImages {
    pub views: Vec<ImageViewHandle>,
    pub current: AtomicUsize,
    pub semaphore: SemaphoreHandle,
}

impl WindowImages for MockWindowImages {
    fn current_image_index(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }

    fn swapchain_image_views(&self) -> &[ImageViewHandle] {
        &self.views
    }

    fn image_acquired_semaphore(&self) -> SemaphoreHandle {
        self.semaphore
    }
}

// ============================================================================
// Mock Texture
// ============================================================================

#[derive(Debug)]
pub struct MockTexture {
    pub id: TextureId,
    pub format: TextureFormat,
    pub samples: u32,
    pub width: u32,
    pub height: u32,
    pub final_image: ImageHandle,
    pub msaa_image: Option<ImageHandle>,
    pub window: Option<MockWindowImages>,
    pub views_created: Mutex<Vec<ImageViewDesc>>,
}

impl MockTexture {
    /// Single-sample offscreen texture
    pub fn new(format: TextureFormat, width: u32, height: u32) -> Self {
        Self {
            id: TextureId(next_handle()),
            format,
            samples: 1,
            width,
            height,
            final_image: ImageHandle(next_handle()),
            msaa_image: None,
            window: None,
            views_created: Mutex::new(Vec::new()),
        }
    }

    /// Multisampled texture with an implicit resolve into its final image
    pub fn with_msaa(mut self, samples: u32) -> Self {
        self.samples = samples;
        self.msaa_image = Some(ImageHandle(next_handle()));
        self
    }

    /// Window back-buffer with `image_count` swap-chain images
    pub fn new_window(format: TextureFormat, width: u32, height: u32, image_count: usize) -> Self {
        let mut texture = Self::new(format, width, height);
        texture.window = Some(MockWindowImages {
            views: (0..image_count).map(|_| ImageViewHandle(next_handle())).collect(),
            current: AtomicUsize::new(0),
            semaphore: SemaphoreHandle(next_handle()),
        });
        texture
    }

    pub fn arc(self) -> Arc<dyn RenderTexture> {
        Arc::new(self)
    }

    pub fn view_count(&self) -> usize {
        self.views_created.lock().unwrap().len()
    }
}

impl RenderTexture for MockTexture {
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
        self.final_image
    }

    fn msaa_image(&self) -> Option<ImageHandle> {
        self.msaa_image
    }

    fn create_view(&self, desc: &ImageViewDesc) -> Result<ImageViewHandle> {
        self.views_created.lock().unwrap().push(*desc);
        Ok(ImageViewHandle(next_handle()))
    }

    fn window(&self) -> Option<&dyn WindowImages> {
        self.window.as_ref().map(|w| w as &dyn WindowImages)
    }
}

// ============================================================================
// Mock Surface
// ============================================================================

pub struct MockSurface {
    pub colour: Arc<dyn RenderTexture>,
    pub depth: Option<Arc<dyn RenderTexture>>,
}

impl BackingSurface for MockSurface {
    fn colour_texture(&self) -> Arc<dyn RenderTexture> {
        self.colour.clone()
    }

    fn depth_texture(&self) -> Option<Arc<dyn RenderTexture>> {
        self.depth.clone()
    }
}

// ============================================================================
// Mock FboDevice
// ============================================================================

#[derive(Debug, Default)]
pub struct MockFboDeviceState {
    /// Ordered log of native calls
    pub calls: Vec<String>,
    pub layouts: Vec<AttachmentLayout>,
    pub framebuffer_attachments: Vec<Vec<ImageViewHandle>>,
    pub framebuffer_extents: Vec<(u32, u32)>,
    pub render_passes_created: u32,
    pub framebuffers_created: u32,
    pub render_passes_destroyed: Vec<RenderPassHandle>,
    pub framebuffers_destroyed: Vec<FramebufferHandle>,
    pub views_destroyed: Vec<ImageViewHandle>,
    /// Fail the n-th (0-based) framebuffer creation
    pub fail_framebuffer_at: Option<u32>,
    pub fail_render_pass: bool,
}

#[derive(Debug, Default)]
pub struct MockFboDevice {
    pub state: Mutex<MockFboDeviceState>,
}

impl MockFboDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn render_passes_created(&self) -> u32 {
        self.state.lock().unwrap().render_passes_created
    }

    pub fn render_passes_destroyed(&self) -> usize {
        self.state.lock().unwrap().render_passes_destroyed.len()
    }

    pub fn framebuffers_created(&self) -> u32 {
        self.state.lock().unwrap().framebuffers_created
    }

    pub fn framebuffers_destroyed(&self) -> usize {
        self.state.lock().unwrap().framebuffers_destroyed.len()
    }

    pub fn views_destroyed(&self) -> usize {
        self.state.lock().unwrap().views_destroyed.len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn last_layout(&self) -> Option<AttachmentLayout> {
        self.state.lock().unwrap().layouts.last().cloned()
    }
}

impl FboDevice for MockFboDevice {
    fn create_render_pass(&self, layout: &AttachmentLayout) -> Result<RenderPassHandle> {
        let mut state = self.state.lock().unwrap();
        if state.fail_render_pass {
            return Err(Error::BackendError("vkCreateRenderPass: ERROR_OUT_OF_DEVICE_MEMORY".to_string()));
        }
        state.render_passes_created += 1;
        state.layouts.push(layout.clone());
        state.calls.push("create_render_pass".to_string());
        Ok(RenderPassHandle(next_handle()))
    }

    fn create_framebuffer(&self, desc: &FramebufferCreateDesc) -> Result<FramebufferHandle> {
        let mut state = self.state.lock().unwrap();
        if state.fail_framebuffer_at == Some(state.framebuffers_created) {
            return Err(Error::BackendError("vkCreateFramebuffer: ERROR_OUT_OF_HOST_MEMORY".to_string()));
        }
        state.framebuffers_created += 1;
        state.framebuffer_attachments.push(desc.attachments.to_vec());
        state.framebuffer_extents.push((desc.width, desc.height));
        state.calls.push("create_framebuffer".to_string());
        Ok(FramebufferHandle(next_handle()))
    }

    fn destroy_framebuffer(&self, framebuffer: FramebufferHandle) {
        let mut state = self.state.lock().unwrap();
        state.framebuffers_destroyed.push(framebuffer);
        state.calls.push("destroy_framebuffer".to_string());
    }

    fn destroy_image_view(&self, view: ImageViewHandle) {
        let mut state = self.state.lock().unwrap();
        state.views_destroyed.push(view);
        state.calls.push("destroy_image_view".to_string());
    }

    fn destroy_render_pass(&self, render_pass: RenderPassHandle) {
        let mut state = self.state.lock().unwrap();
        state.render_passes_destroyed.push(render_pass);
        state.calls.push("destroy_render_pass".to_string());
    }
}

// ============================================================================
// Mock CommandQueue
// ============================================================================

#[derive(Debug, Clone)]
pub struct RecordedBegin {
    pub render_pass: RenderPassHandle,
    pub framebuffer: FramebufferHandle,
    pub render_area: Rect2D,
    pub clear_values: Vec<ClearValue>,
}

#[derive(Debug)]
pub struct MockQueue {
    pub commands: Vec<String>,
    pub state: EncoderState,
    pub waits: Vec<SemaphoreHandle>,
    pub begins: Vec<RecordedBegin>,
}

impl MockQueue {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            state: EncoderState::Closed,
            waits: Vec::new(),
            begins: Vec::new(),
        }
    }
}

impl CommandQueue for MockQueue {
    fn encoder_state(&self) -> EncoderState {
        self.state
    }

    fn add_window_to_wait_for(&mut self, semaphore: SemaphoreHandle) {
        self.commands.push("wait_for_window".to_string());
        self.waits.push(semaphore);
    }

    fn cmd_begin_render_pass(&mut self, desc: &RenderPassBeginDesc) -> Result<()> {
        self.commands.push("begin_render_pass".to_string());
        self.begins.push(RecordedBegin {
            render_pass: desc.render_pass,
            framebuffer: desc.framebuffer,
            render_area: desc.render_area,
            clear_values: desc.clear_values.to_vec(),
        });
        self.state = EncoderState::GraphicsOpen;
        Ok(())
    }

    fn cmd_end_render_pass(&mut self) -> Result<()> {
        self.commands.push("end_render_pass".to_string());
        Ok(())
    }

    fn end_all_encoders(&mut self, _end_render_pass_encoder: bool) {
        self.commands.push("end_all_encoders".to_string());
        self.state = EncoderState::Closed;
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
