/// Native render pass description records
///
/// Backend-neutral mirror of VkAttachmentDescription / VkAttachmentReference /
/// VkSubpassDescription. Produced by the attachment planner and consumed by
/// `FboDevice::create_render_pass`.

use crate::graphics_device::{ImageHandle, TextureFormat};

/// Sentinel attachment index for "no attachment" (VK_ATTACHMENT_UNUSED)
pub const ATTACHMENT_UNUSED: u32 = u32::MAX;

/// Load operation for an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoadOp {
    /// Load existing content
    Load,
    /// Clear the content
    Clear,
    /// Don't care about existing content
    DontCare,
}

/// Store operation for an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StoreOp {
    /// Store the rendered content
    Store,
    /// Don't care about storing the content
    DontCare,
}

/// Image layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImageLayout {
    /// Undefined layout (contents may be discarded)
    Undefined,
    /// Layout for color attachment
    ColorAttachment,
    /// Layout for depth/stencil attachment
    DepthStencilAttachment,
    /// Layout for presenting to swapchain
    PresentSrc,
}

/// Description of a single packed attachment slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentDesc {
    /// Pixel format
    pub format: TextureFormat,
    /// Number of samples (1 = no MSAA)
    pub samples: u32,
    /// Load operation (colour / depth aspect)
    pub load_op: LoadOp,
    /// Store operation (colour / depth aspect)
    pub store_op: StoreOp,
    /// Load operation (stencil aspect)
    pub stencil_load_op: LoadOp,
    /// Store operation (stencil aspect)
    pub stencil_store_op: StoreOp,
    /// Layout the attachment is in when the pass begins
    pub initial_layout: ImageLayout,
    /// Layout the attachment is transitioned to when the pass ends
    pub final_layout: ImageLayout,
}

/// Reference from the subpass to a packed attachment slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentReference {
    /// Packed slot index, or ATTACHMENT_UNUSED
    pub attachment: u32,
    /// Layout during the subpass
    pub layout: ImageLayout,
}

impl AttachmentReference {
    /// Reference marking an absent attachment
    pub const UNUSED: Self = Self {
        attachment: ATTACHMENT_UNUSED,
        layout: ImageLayout::Undefined,
    };

    /// Whether this reference marks an absent attachment
    pub fn is_unused(&self) -> bool {
        self.attachment == ATTACHMENT_UNUSED
    }
}

/// Where the image view of a packed slot comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentSource {
    /// View of `image`, owned by colour entry `index`
    Colour { index: usize, image: ImageHandle },
    /// View of `image`, owned by the depth entry
    Depth { image: ImageHandle },
    /// Swap-chain image of colour entry `index`, patched per framebuffer
    WindowImage { index: usize },
}

/// A packed attachment slot: its description and its image source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedAttachment {
    pub desc: AttachmentDesc,
    pub source: AttachmentSource,
}

/// Complete single-subpass attachment layout
///
/// `colour_refs` and `resolve_refs` are parallel: one entry per colour
/// target that takes part in the pass (targets with an `Unknown` format are
/// absent). Colour targets without a resolve slot carry
/// `AttachmentReference::UNUSED` in `resolve_refs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentLayout {
    /// Packed attachment slots: colour, its resolve (if any), ..., depth last
    pub attachments: Vec<PlannedAttachment>,
    /// Subpass colour references
    pub colour_refs: Vec<AttachmentReference>,
    /// Subpass resolve references (parallel to colour_refs)
    pub resolve_refs: Vec<AttachmentReference>,
    /// Subpass depth/stencil reference
    pub depth_ref: Option<AttachmentReference>,
    /// Whether any resolve reference is used
    pub uses_resolve_attachments: bool,
    /// Packed slot that receives the window's swap-chain image
    pub window_attachment_index: Option<u32>,
    /// Packed slot of each logical colour entry (None if skipped)
    pub logical_to_packed: Vec<Option<u32>>,
}

impl AttachmentLayout {
    /// Number of packed attachment slots
    pub fn attachment_count(&self) -> u32 {
        self.attachments.len() as u32
    }

    /// Packed slot of the depth attachment, if any
    pub fn depth_slot(&self) -> Option<u32> {
        self.depth_ref.map(|r| r.attachment)
    }
}
