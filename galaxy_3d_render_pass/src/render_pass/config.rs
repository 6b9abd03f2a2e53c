/// Render-system wide settings read by the render pass subsystem

/// Configuration shared by every descriptor of a frame buffer cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderPassConfig {
    /// Depth buffer uses the reversed (1 = near, 0 = far) convention
    pub reverse_depth: bool,
}

impl RenderPassConfig {
    /// Clear depth as written into the native clear value
    ///
    /// Callers always express clear depth in the standard convention.
    pub fn native_clear_depth(&self, clear_depth: f32) -> f32 {
        if self.reverse_depth {
            1.0 - clear_depth
        } else {
            clear_depth
        }
    }
}
