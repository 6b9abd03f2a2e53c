/// CommandQueue trait - the recording side of a graphics queue

use crate::error::Result;
use crate::graphics_device::{FramebufferHandle, RenderPassHandle, SemaphoreHandle};

/// Which kind of encoder is currently open on the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderState {
    /// No encoder open
    Closed,
    /// A render pass is open
    GraphicsOpen,
}

/// Rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Colour clear value, typed after the attachment format
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearColor {
    Float([f32; 4]),
    Int([i32; 4]),
    Uint([u32; 4]),
}

/// Clear value of one packed attachment slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    /// Color clear value (RGBA)
    Color(ClearColor),
    /// Depth/stencil clear value
    DepthStencil { depth: f32, stencil: u32 },
}

impl Default for ClearValue {
    fn default() -> Self {
        ClearValue::Color(ClearColor::Float([0.0; 4]))
    }
}

/// Parameters of a "begin render pass" command
#[derive(Debug, Clone, Copy)]
pub struct RenderPassBeginDesc<'a> {
    pub render_pass: RenderPassHandle,
    pub framebuffer: FramebufferHandle,
    pub render_area: Rect2D,
    /// Clear values indexed by packed attachment slot
    pub clear_values: &'a [ClearValue],
}

/// Command queue collaborator
///
/// Owns the command buffer currently being recorded and tracks which
/// encoder is open on it.
pub trait CommandQueue: Send {
    /// Currently open encoder
    fn encoder_state(&self) -> EncoderState;

    /// Make the next submission wait on a swap-chain "image acquired"
    /// semaphore before any colour attachment output
    fn add_window_to_wait_for(&mut self, semaphore: SemaphoreHandle);

    /// Record a "begin render pass" command and open a graphics encoder
    fn cmd_begin_render_pass(&mut self, desc: &RenderPassBeginDesc) -> Result<()>;

    /// Record an "end render pass" command
    fn cmd_end_render_pass(&mut self) -> Result<()>;

    /// Close every open encoder
    ///
    /// `end_render_pass_encoder` is false when the caller has already
    /// recorded the end of the render pass itself.
    fn end_all_encoders(&mut self, end_render_pass_encoder: bool);
}
