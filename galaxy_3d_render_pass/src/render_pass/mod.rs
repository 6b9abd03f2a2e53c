/// Render pass module - shared render pass / framebuffer caching and the
/// descriptors that use it

pub mod target;
pub mod attachment_key;
pub mod config;
pub mod registry;
pub mod planner;
pub mod realizer;
pub mod frame_buffer_cache;
pub mod descriptor;

pub use target::{RenderPassColourTarget, RenderPassDepthTarget};
pub use attachment_key::{AttachmentKey, ColourKeyEntry, DepthKeyEntry, FlushKey};
pub use config::RenderPassConfig;
pub use registry::{Released, SharedRegistry};
pub use planner::AttachmentPlanner;
pub use realizer::{FboRealizer, RealizedFbo};
pub use frame_buffer_cache::{FboHandle, FlushHandle, FrameBufferCache};
pub use descriptor::{
    DescriptorState, FlushMask, RenderPassDescriptor, MAX_ATTACHMENT_SLOTS, MAX_COLOUR_ATTACHMENTS,
};
