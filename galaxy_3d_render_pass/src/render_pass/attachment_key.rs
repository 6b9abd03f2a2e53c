/// Cache keys for shared render pass / framebuffer objects.
///
/// `AttachmentKey` holds every field that changes the native render pass or
/// framebuffer creation parameters, so two descriptors with equal keys can
/// share one realized object. `FlushKey` keeps only the identity of the
/// physical targets, which is all a pass switch needs to compare.

use crate::graphics_device::{LoadOp, StoreOp, TextureFormat, TextureId};
use super::target::{RenderPassColourTarget, RenderPassDepthTarget};

/// Key fields of one colour attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColourKeyEntry {
    pub texture: TextureId,
    pub format: TextureFormat,
    pub samples: u32,
    pub has_msaa_surface: bool,
    pub window_backed: bool,
    pub load_action: LoadOp,
    pub store_action: StoreOp,
}

/// Key fields of the depth attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DepthKeyEntry {
    pub texture: TextureId,
    pub format: TextureFormat,
    pub samples: u32,
    pub window_backed: bool,
}

/// Key of a realized render pass + framebuffer set
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttachmentKey {
    colour: Vec<ColourKeyEntry>,
    depth: Option<DepthKeyEntry>,
    width: u32,
    height: u32,
}

impl AttachmentKey {
    pub fn new(
        colour: &[RenderPassColourTarget],
        depth: Option<&RenderPassDepthTarget>,
        width: u32,
        height: u32,
    ) -> Self {
        let colour = colour
            .iter()
            .map(|target| {
                let texture = &target.texture;
                ColourKeyEntry {
                    texture: texture.id(),
                    format: texture.format(),
                    samples: texture.samples(),
                    has_msaa_surface: texture.has_msaa_surface(),
                    window_backed: texture.is_window_backed(),
                    load_action: target.load_action,
                    store_action: target.store_action,
                }
            })
            .collect();

        let depth = depth.map(|target| DepthKeyEntry {
            texture: target.texture.id(),
            format: target.texture.format(),
            samples: target.texture.samples(),
            window_backed: target.texture.is_window_backed(),
        });

        Self { colour, depth, width, height }
    }

    /// Number of colour entries
    pub fn num_colour_entries(&self) -> usize {
        self.colour.len()
    }

    pub fn colour_entries(&self) -> &[ColourKeyEntry] {
        &self.colour
    }

    pub fn depth_entry(&self) -> Option<&DepthKeyEntry> {
        self.depth.as_ref()
    }

    /// Whether any attachment is the window back-buffer
    pub fn is_window_backed(&self) -> bool {
        self.colour.iter().any(|c| c.window_backed)
            || self.depth.map_or(false, |d| d.window_backed)
    }

    /// The coarser key used for pass-switch decisions
    pub fn flush_key(&self) -> FlushKey {
        FlushKey {
            colour: self.colour.iter().map(|c| c.texture).collect(),
            depth: self.depth.map(|d| d.texture),
        }
    }
}

/// Identity of the physical targets of a pass
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlushKey {
    colour: Vec<TextureId>,
    depth: Option<TextureId>,
}

#[cfg(test)]
#[path = "attachment_key_tests.rs"]
mod tests;
