/// Graphics device module - the collaborators the render pass subsystem consumes

// Module declarations
pub mod handles;
pub mod texture;
pub mod render_pass;
pub mod device;
pub mod command_queue;

// Re-export everything
pub use handles::*;
pub use texture::*;
pub use render_pass::*;
pub use device::*;
pub use command_queue::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
