/// Attachment planning: logical colour/depth targets to a packed,
/// single-subpass attachment layout.
///
/// Packing rules:
/// - every colour entry with a known format takes one slot;
/// - an entry with an MSAA surface takes a second, resolve slot right after;
/// - the depth entry (if any) takes the last slot.
///
/// Entries whose texture format is `Unknown` take no slot at all.

use crate::error::Result;
use crate::engine_bail_config;
use crate::graphics_device::{
    AttachmentDesc, AttachmentLayout, AttachmentReference, AttachmentSource, ImageLayout,
    LoadOp, PlannedAttachment, StoreOp, TextureFormat,
};
use super::target::{RenderPassColourTarget, RenderPassDepthTarget};

pub struct AttachmentPlanner;

impl AttachmentPlanner {
    /// Plan the primary (`resolve == false`) or resolve slot of a colour entry
    ///
    /// Returns `None` for the resolve slot of an entry without MSAA surface.
    ///
    /// Layouts:
    /// - window image rendered directly: `PresentSrc` at the end, starting
    ///   from `Undefined` (or `PresentSrc` when loading previous contents);
    /// - resolve slot: `Undefined` to `PresentSrc` (window) or `ColorAttachment`;
    /// - anything else stays in `ColorAttachment`.
    pub fn plan_colour(
        index: usize,
        target: &RenderPassColourTarget,
        resolve: bool,
    ) -> Option<PlannedAttachment> {
        let texture = &target.texture;
        let has_msaa_surface = texture.has_msaa_surface();
        if resolve && !has_msaa_surface {
            return None;
        }

        let window_backed = texture.is_window_backed();
        let renders_to_msaa = has_msaa_surface && !resolve;

        let samples = if resolve { 1 } else { texture.samples().max(1) };
        let load_op = if resolve { LoadOp::DontCare } else { target.load_action };

        let (initial_layout, final_layout) = if resolve {
            let final_layout = if window_backed {
                ImageLayout::PresentSrc
            } else {
                ImageLayout::ColorAttachment
            };
            (ImageLayout::Undefined, final_layout)
        } else if window_backed && !texture.is_multisample() {
            let initial_layout = if target.load_action == LoadOp::Load {
                ImageLayout::PresentSrc
            } else {
                ImageLayout::Undefined
            };
            (initial_layout, ImageLayout::PresentSrc)
        } else {
            (ImageLayout::ColorAttachment, ImageLayout::ColorAttachment)
        };

        let source = if !window_backed || renders_to_msaa {
            let image = if renders_to_msaa {
                texture.msaa_image().unwrap_or_else(|| texture.final_image())
            } else {
                texture.final_image()
            };
            AttachmentSource::Colour { index, image }
        } else {
            AttachmentSource::WindowImage { index }
        };

        Some(PlannedAttachment {
            desc: AttachmentDesc {
                format: texture.format(),
                samples,
                load_op,
                store_op: target.store_action,
                stencil_load_op: LoadOp::DontCare,
                stencil_store_op: StoreOp::DontCare,
                initial_layout,
                final_layout,
            },
            source,
        })
    }

    /// Plan the depth slot
    ///
    /// Depth contents are always cleared and discarded; stencil is unused.
    pub fn plan_depth(target: &RenderPassDepthTarget) -> PlannedAttachment {
        let texture = &target.texture;
        let image = texture.msaa_image().unwrap_or_else(|| texture.final_image());

        PlannedAttachment {
            desc: AttachmentDesc {
                format: texture.format(),
                samples: texture.samples().max(1),
                load_op: LoadOp::Clear,
                store_op: StoreOp::DontCare,
                stencil_load_op: LoadOp::DontCare,
                stencil_store_op: StoreOp::DontCare,
                initial_layout: ImageLayout::Undefined,
                final_layout: ImageLayout::DepthStencilAttachment,
            },
            source: AttachmentSource::Depth { image },
        }
    }

    /// Plan the full layout
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if more than one colour entry is window-backed.
    pub fn plan(
        colour: &[RenderPassColourTarget],
        depth: Option<&RenderPassDepthTarget>,
    ) -> Result<AttachmentLayout> {
        let mut layout = AttachmentLayout::default();
        let mut slot = 0u32;

        for (index, target) in colour.iter().enumerate() {
            let texture = &target.texture;
            if texture.format() == TextureFormat::Unknown {
                layout.logical_to_packed.push(None);
                continue;
            }

            if texture.is_window_backed() {
                if layout.window_attachment_index.is_some() {
                    engine_bail_config!("galaxy3d::RenderPassDescriptor",
                        "Only one window can be used as a render pass target");
                }
                let offset = if texture.has_msaa_surface() { 1 } else { 0 };
                layout.window_attachment_index = Some(slot + offset);
            }

            let Some(primary) = Self::plan_colour(index, target, false) else {
                layout.logical_to_packed.push(None);
                continue;
            };
            layout.logical_to_packed.push(Some(slot));
            layout.attachments.push(primary);
            layout.colour_refs.push(AttachmentReference {
                attachment: slot,
                layout: ImageLayout::ColorAttachment,
            });
            slot += 1;

            match Self::plan_colour(index, target, true) {
                Some(resolve) => {
                    layout.attachments.push(resolve);
                    layout.resolve_refs.push(AttachmentReference {
                        attachment: slot,
                        layout: ImageLayout::ColorAttachment,
                    });
                    layout.uses_resolve_attachments = true;
                    slot += 1;
                }
                None => layout.resolve_refs.push(AttachmentReference::UNUSED),
            }
        }

        if let Some(depth) = depth {
            layout.attachments.push(Self::plan_depth(depth));
            layout.depth_ref = Some(AttachmentReference {
                attachment: slot,
                layout: ImageLayout::DepthStencilAttachment,
            });
        }

        Ok(layout)
    }

    /// Packed slot of colour entry `index` in the clear value array
    ///
    /// Walks the entries before `index`: +1 per participating entry, +1 more
    /// per MSAA surface. `None` when `index` is out of range or the entry
    /// takes no slot.
    pub fn packed_clear_slot(colour: &[RenderPassColourTarget], index: usize) -> Option<u32> {
        let target = colour.get(index)?;
        if target.texture.format() == TextureFormat::Unknown {
            return None;
        }
        Some(Self::colour_slot_count(&colour[..index]))
    }

    /// Number of packed slots taken by `colour` (the depth slot index)
    pub fn colour_slot_count(colour: &[RenderPassColourTarget]) -> u32 {
        colour
            .iter()
            .filter(|c| c.texture.format() != TextureFormat::Unknown)
            .map(|c| if c.texture.has_msaa_surface() { 2 } else { 1 })
            .sum()
    }
}

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;
