/*!
# Galaxy 3D Render Pass

Backend-agnostic render pass and framebuffer caching for the Galaxy 3D
engine, plus the triplanar texturing shader fragment.

Backend implementations (Vulkan) provide the native collaborators through
the traits of `graphics_device`; this crate decides what to create, when to
share it and when to destroy it.

## Architecture

- **RenderPassDescriptor**: what a pass draws into, load/store actions
- **FrameBufferCache**: reference-counted registry of realized render
  passes / framebuffers, shared by descriptors with equal attachment keys
- **AttachmentPlanner**: packs logical targets into native attachment slots
- **FboRealizer**: creates and destroys the native objects
- **TriplanarTexturing**: shader sub-render state and its script factory
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod render_pass;
pub mod shader_fragment;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine services (logging)
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Native collaborator traits and handles
    pub mod render {
        pub use crate::graphics_device::*;
    }

    // Render pass descriptors and the framebuffer cache
    pub mod render_pass {
        pub use crate::render_pass::*;
    }

    // Shader fragments
    pub mod shader {
        pub use crate::shader_fragment::*;
    }
}

// Re-export math library at crate root
pub use glam;
