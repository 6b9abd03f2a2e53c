/// Logical render pass attachments: what a descriptor draws into.

use std::sync::Arc;
use crate::graphics_device::{LoadOp, RenderTexture, StoreOp};

/// A colour attachment of a render pass descriptor
#[derive(Clone)]
pub struct RenderPassColourTarget {
    /// Texture rendered into (MSAA surface and resolve target come from it)
    pub texture: Arc<dyn RenderTexture>,
    /// What happens to the previous contents when the pass begins
    pub load_action: LoadOp,
    /// What happens to the rendered contents when the pass ends
    pub store_action: StoreOp,
    /// Clear colour (RGBA), used when `load_action` is `Clear`
    pub clear_colour: [f32; 4],
}

impl RenderPassColourTarget {
    /// Colour target that clears to opaque black and stores its result
    pub fn new(texture: Arc<dyn RenderTexture>) -> Self {
        Self {
            texture,
            load_action: LoadOp::Clear,
            store_action: StoreOp::Store,
            clear_colour: [0.0, 0.0, 0.0, 1.0],
        }
    }

    pub fn with_load_action(mut self, load_action: LoadOp) -> Self {
        self.load_action = load_action;
        self
    }

    pub fn with_store_action(mut self, store_action: StoreOp) -> Self {
        self.store_action = store_action;
        self
    }

    pub fn with_clear_colour(mut self, clear_colour: [f32; 4]) -> Self {
        self.clear_colour = clear_colour;
        self
    }
}

/// The depth/stencil attachment of a render pass descriptor
#[derive(Clone)]
pub struct RenderPassDepthTarget {
    pub texture: Arc<dyn RenderTexture>,
    /// Clear depth in the standard (non-reversed) convention
    pub clear_depth: f32,
    pub clear_stencil: u32,
}

impl RenderPassDepthTarget {
    pub fn new(texture: Arc<dyn RenderTexture>) -> Self {
        Self {
            texture,
            clear_depth: 1.0,
            clear_stencil: 0,
        }
    }
}
