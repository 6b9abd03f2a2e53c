/// Render pass descriptor: what a pass draws into, and the load/store
/// actions that open and close it on a command queue.
///
/// Lifecycle:
///
/// ```text
/// Unconfigured --set_*--> Configured --perform_load_actions--> Active
///                             ^                                  |
///                             +------perform_store_actions-------+
/// ```
///
/// Every attachment change recomputes the attachment and flush keys,
/// acquires the matching cache entries before releasing the old ones, and
/// realizes the shared native objects if this key is new.

use std::sync::{Arc, Mutex, MutexGuard};
use bitflags::bitflags;
use crate::error::{Error, Result};
use crate::{engine_bail, engine_bail_config, engine_error, engine_trace};
use crate::graphics_device::{
    BackingSurface, ClearColor, ClearValue, CommandQueue, EncoderState, Rect2D,
    RenderPassBeginDesc, TextureFormat,
};
use super::attachment_key::AttachmentKey;
use super::config::RenderPassConfig;
use super::frame_buffer_cache::{FboHandle, FlushHandle, FrameBufferCache};
use super::planner::AttachmentPlanner;
use super::target::{RenderPassColourTarget, RenderPassDepthTarget};

/// Maximum number of simultaneous colour targets (MRT)
pub const MAX_COLOUR_ATTACHMENTS: usize = 8;

/// Packed slots: one per colour target, one per resolve, depth, stencil
pub const MAX_ATTACHMENT_SLOTS: usize = MAX_COLOUR_ATTACHMENTS * 2 + 2;

bitflags! {
    /// Attachments whose pending work must be flushed on a pass switch
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FlushMask: u32 {
        const COLOUR0 = 1 << 0;
        const COLOUR1 = 1 << 1;
        const COLOUR2 = 1 << 2;
        const COLOUR3 = 1 << 3;
        const COLOUR4 = 1 << 4;
        const COLOUR5 = 1 << 5;
        const COLOUR6 = 1 << 6;
        const COLOUR7 = 1 << 7;
        const DEPTH = 1 << 8;
        const STENCIL = 1 << 9;
        const ALL_COLOUR = 0xFF;
        const ALL = Self::ALL_COLOUR.bits() | Self::DEPTH.bits() | Self::STENCIL.bits();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorState {
    /// No attachment set
    Unconfigured,
    /// Cache entry acquired (and realized unless creation failed)
    Configured,
    /// Between load and store actions
    Active,
}

fn lock<'a, T: ?Sized>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>> {
    mutex.lock().map_err(|_| {
        engine_error!("galaxy3d::RenderPassDescriptor", "{} lock poisoned", what);
        Error::BackendError(format!("{} lock poisoned", what))
    })
}

/// Clear colour in the representation the target format expects
fn clear_colour_for(colour: [f32; 4], format: TextureFormat) -> ClearColor {
    if format.is_signed_integer() {
        ClearColor::Int(colour.map(|c| c as i32))
    } else if format.is_integer() {
        ClearColor::Uint(colour.map(|c| c as u32))
    } else {
        ClearColor::Float(colour)
    }
}

pub struct RenderPassDescriptor {
    colour: Vec<RenderPassColourTarget>,
    depth: Option<RenderPassDepthTarget>,
    clear_values: [ClearValue; MAX_ATTACHMENT_SLOTS],
    target_width: u32,
    target_height: u32,
    information_only: bool,
    config: RenderPassConfig,
    fbo: Option<FboHandle>,
    flush: Option<FlushHandle>,
    active: bool,
    cache: Arc<Mutex<FrameBufferCache>>,
    queue: Arc<Mutex<dyn CommandQueue>>,
}

impl RenderPassDescriptor {
    /// Create an unconfigured descriptor bound to a cache and a queue
    pub fn new(
        cache: Arc<Mutex<FrameBufferCache>>,
        queue: Arc<Mutex<dyn CommandQueue>>,
    ) -> Result<Self> {
        let config = *lock(&cache, "FrameBufferCache")?.config();
        Ok(Self {
            colour: Vec::new(),
            depth: None,
            clear_values: [ClearValue::default(); MAX_ATTACHMENT_SLOTS],
            target_width: 0,
            target_height: 0,
            information_only: false,
            config,
            fbo: None,
            flush: None,
            active: false,
            cache,
            queue,
        })
    }

    // ===== ATTACHMENT MUTATORS =====

    /// Set colour target `index`; `index == count` appends a new entry
    pub fn set_colour_attachment(&mut self, index: usize, target: RenderPassColourTarget) -> Result<()> {
        if index >= MAX_COLOUR_ATTACHMENTS {
            engine_bail!("galaxy3d::RenderPassDescriptor",
                "Colour attachment index {} exceeds the maximum of {}", index, MAX_COLOUR_ATTACHMENTS);
        }
        if index > self.colour.len() {
            engine_bail!("galaxy3d::RenderPassDescriptor",
                "Colour attachment index {} leaves a gap (count is {})", index, self.colour.len());
        }

        let mut colour = self.colour.clone();
        if index == colour.len() {
            colour.push(target);
        } else {
            colour[index] = target;
        }
        self.apply(colour, self.depth.clone())
    }

    /// Replace all colour targets
    pub fn set_colour_attachments(&mut self, targets: Vec<RenderPassColourTarget>) -> Result<()> {
        if targets.len() > MAX_COLOUR_ATTACHMENTS {
            engine_bail!("galaxy3d::RenderPassDescriptor",
                "{} colour attachments exceed the maximum of {}", targets.len(), MAX_COLOUR_ATTACHMENTS);
        }
        self.apply(targets, self.depth.clone())
    }

    pub fn set_depth_attachment(&mut self, target: Option<RenderPassDepthTarget>) -> Result<()> {
        self.apply(self.colour.clone(), target)
    }

    /// Remove every attachment, returning to the unconfigured state
    pub fn clear_attachments(&mut self) -> Result<()> {
        self.apply(Vec::new(), None)
    }

    /// Information-only descriptors never record native commands
    pub fn set_information_only(&mut self, information_only: bool) {
        self.information_only = information_only;
    }

    fn validate(
        colour: &[RenderPassColourTarget],
        depth: Option<&RenderPassDepthTarget>,
    ) -> Result<()> {
        let any_window = colour.iter().any(|c| c.texture.is_window_backed())
            || depth.map_or(false, |d| d.texture.is_window_backed());
        if any_window && colour.len() > 1 {
            engine_bail_config!("galaxy3d::RenderPassDescriptor",
                "A window target cannot be combined with other colour targets ({} set)", colour.len());
        }
        Ok(())
    }

    fn apply(
        &mut self,
        colour: Vec<RenderPassColourTarget>,
        depth: Option<RenderPassDepthTarget>,
    ) -> Result<()> {
        Self::validate(&colour, depth.as_ref())?;
        self.colour = colour;
        self.depth = depth;
        self.entries_modified()
    }

    fn entries_modified(&mut self) -> Result<()> {
        let first_texture = self
            .colour
            .first()
            .map(|c| &c.texture)
            .or(self.depth.as_ref().map(|d| &d.texture));
        (self.target_width, self.target_height) =
            first_texture.map_or((0, 0), |t| (t.width(), t.height()));

        self.rebuild_clear_values();

        if self.colour.is_empty() && self.depth.is_none() {
            self.active = false;
            return self.release_handles();
        }

        let key = AttachmentKey::new(
            &self.colour, self.depth.as_ref(), self.target_width, self.target_height);
        let flush_key = key.flush_key();

        let mut cache = lock(&self.cache, "FrameBufferCache")?;

        // acquire first: an unchanged key must not pass through zero
        let fbo = cache.acquire(key);
        let flush = cache.acquire_flush(flush_key);
        if let Some(old) = self.fbo.replace(fbo) {
            if old != fbo {
                self.active = false;
            }
            cache.release(old);
        } else {
            self.active = false;
        }
        if let Some(old) = self.flush.replace(flush) {
            cache.release_flush(old);
        }

        cache.realize(
            fbo, &self.colour, self.depth.as_ref(), self.target_width, self.target_height)?;
        Ok(())
    }

    fn release_handles(&mut self) -> Result<()> {
        if self.fbo.is_none() && self.flush.is_none() {
            return Ok(());
        }
        let mut cache = lock(&self.cache, "FrameBufferCache")?;
        if let Some(fbo) = self.fbo.take() {
            cache.release(fbo);
        }
        if let Some(flush) = self.flush.take() {
            cache.release_flush(flush);
        }
        Ok(())
    }

    // ===== CLEAR VALUES =====

    fn rebuild_clear_values(&mut self) {
        self.clear_values = [ClearValue::default(); MAX_ATTACHMENT_SLOTS];
        for index in 0..self.colour.len() {
            self.write_clear_colour(index);
        }
        self.write_clear_depth();
    }

    fn write_clear_colour(&mut self, index: usize) {
        let Some(slot) = AttachmentPlanner::packed_clear_slot(&self.colour, index) else {
            return;
        };
        let target = &self.colour[index];
        self.clear_values[slot as usize] =
            ClearValue::Color(clear_colour_for(target.clear_colour, target.texture.format()));
    }

    fn write_clear_depth(&mut self) {
        let Some(depth) = &self.depth else {
            return;
        };
        let slot = AttachmentPlanner::colour_slot_count(&self.colour) as usize;
        self.clear_values[slot] = ClearValue::DepthStencil {
            depth: self.config.native_clear_depth(depth.clear_depth),
            stencil: depth.clear_stencil,
        };
    }

    pub fn set_clear_colour(&mut self, index: usize, colour: [f32; 4]) -> Result<()> {
        match self.colour.get_mut(index) {
            Some(target) => target.clear_colour = colour,
            None => engine_bail!("galaxy3d::RenderPassDescriptor",
                "Clear colour index {} out of range ({} colour targets)", index, self.colour.len()),
        }
        self.write_clear_colour(index);
        Ok(())
    }

    /// Set the clear colour of every colour target
    pub fn set_clear_colour_all(&mut self, colour: [f32; 4]) {
        for index in 0..self.colour.len() {
            self.colour[index].clear_colour = colour;
            self.write_clear_colour(index);
        }
    }

    /// Set clear depth (standard convention; flipped under reverse depth)
    ///
    /// Ignored when no depth target is set.
    pub fn set_clear_depth(&mut self, clear_depth: f32) {
        if let Some(depth) = self.depth.as_mut() {
            depth.clear_depth = clear_depth;
            self.write_clear_depth();
        }
    }

    pub fn set_clear_stencil(&mut self, clear_stencil: u32) {
        if let Some(depth) = self.depth.as_mut() {
            depth.clear_stencil = clear_stencil;
            self.write_clear_depth();
        }
    }

    // ===== PASS SWITCHING =====

    /// Attachments to flush when `next` becomes the current pass
    ///
    /// Nothing needs flushing only when both descriptors target the same
    /// physical attachments and both record native commands.
    pub fn will_switch_to(&self, next: Option<&RenderPassDescriptor>) -> FlushMask {
        match next {
            None => FlushMask::ALL,
            Some(next) => {
                if self.flush.is_none()
                    || self.flush != next.flush
                    || self.information_only
                    || next.information_only
                {
                    FlushMask::ALL
                } else {
                    FlushMask::empty()
                }
            }
        }
    }

    /// Begin the native render pass on the queue
    pub fn perform_load_actions(&mut self) -> Result<()> {
        if self.information_only {
            return Ok(());
        }

        let Some(handle) = self.fbo else {
            engine_bail!("galaxy3d::RenderPassDescriptor",
                "perform_load_actions on a descriptor without attachments");
        };

        let cache = lock(&self.cache, "FrameBufferCache")?;
        let Some(fbo) = cache.realized(handle) else {
            engine_bail!("galaxy3d::RenderPassDescriptor",
                "perform_load_actions on a descriptor whose objects failed to realize");
        };

        let mut queue = lock(&self.queue, "CommandQueue")?;

        let mut image_index = 0;
        if fbo.is_window_backed() {
            let window = self.colour.iter().find_map(|c| c.texture.window());
            if let Some(window) = window {
                image_index = window.current_image_index();
                let semaphore = window.image_acquired_semaphore();
                if !semaphore.is_null() {
                    queue.add_window_to_wait_for(semaphore);
                }
            }
        }

        let Some(framebuffer) = fbo.framebuffer_for_image(image_index) else {
            engine_bail!("galaxy3d::RenderPassDescriptor",
                "Swap-chain image {} has no framebuffer ({} created)", image_index, fbo.framebuffers.len());
        };

        engine_trace!("galaxy3d::RenderPassDescriptor",
            "Begin render pass {}x{} (image {})", self.target_width, self.target_height, image_index);

        queue.cmd_begin_render_pass(&RenderPassBeginDesc {
            render_pass: fbo.render_pass,
            framebuffer,
            render_area: Rect2D {
                x: 0,
                y: 0,
                width: self.target_width,
                height: self.target_height,
            },
            clear_values: &self.clear_values,
        })?;

        drop(queue);
        drop(cache);
        self.active = true;
        Ok(())
    }

    /// End the native render pass if the queue still has one open
    pub fn perform_store_actions(&mut self) -> Result<()> {
        if self.information_only {
            return Ok(());
        }

        let mut queue = lock(&self.queue, "CommandQueue")?;
        if queue.encoder_state() != EncoderState::GraphicsOpen {
            return Ok(());
        }

        queue.cmd_end_render_pass()?;
        queue.end_all_encoders(false);
        drop(queue);

        self.active = false;
        Ok(())
    }

    // ===== BACKING SURFACE NOTIFICATIONS =====

    /// Target a freshly created surface: its colour texture as the only
    /// colour target and its depth texture as depth
    ///
    /// Load/store actions and clear values of the existing targets are kept.
    pub fn on_backing_surface_created(&mut self, surface: &dyn BackingSurface) -> Result<()> {
        let colour = match self.colour.first() {
            Some(existing) => RenderPassColourTarget {
                texture: surface.colour_texture(),
                ..existing.clone()
            },
            None => RenderPassColourTarget::new(surface.colour_texture()),
        };

        let depth = surface.depth_texture().map(|texture| match &self.depth {
            Some(existing) => RenderPassDepthTarget {
                texture,
                ..existing.clone()
            },
            None => RenderPassDepthTarget::new(texture),
        });

        self.apply(vec![colour], depth)
    }

    /// Release the realized objects if this descriptor targets the surface
    ///
    /// The targets are kept, so `on_backing_surface_created` can restore them.
    pub fn on_backing_surface_destroyed(&mut self, surface: &dyn BackingSurface) -> Result<()> {
        let targets_surface = self.colour.first().map_or(false, |c| {
            c.texture.is_window_backed() && c.texture.id() == surface.colour_texture().id()
        });
        if targets_surface {
            self.active = false;
            self.release_handles()?;
        }
        Ok(())
    }

    // ===== ACCESSORS =====

    pub fn state(&self) -> DescriptorState {
        match (self.fbo, self.active) {
            (None, _) => DescriptorState::Unconfigured,
            (Some(_), true) => DescriptorState::Active,
            (Some(_), false) => DescriptorState::Configured,
        }
    }

    pub fn colour_attachments(&self) -> &[RenderPassColourTarget] {
        &self.colour
    }

    pub fn depth_attachment(&self) -> Option<&RenderPassDepthTarget> {
        self.depth.as_ref()
    }

    pub fn num_colour_entries(&self) -> usize {
        self.colour.len()
    }

    pub fn target_width(&self) -> u32 {
        self.target_width
    }

    pub fn target_height(&self) -> u32 {
        self.target_height
    }

    /// Packed clear values, as passed to the native begin command
    pub fn clear_values(&self) -> &[ClearValue; MAX_ATTACHMENT_SLOTS] {
        &self.clear_values
    }

    pub fn is_information_only(&self) -> bool {
        self.information_only
    }

    pub fn fbo_handle(&self) -> Option<FboHandle> {
        self.fbo
    }

    pub fn flush_handle(&self) -> Option<FlushHandle> {
        self.flush
    }
}

impl Drop for RenderPassDescriptor {
    fn drop(&mut self) {
        if let Err(e) = self.release_handles() {
            engine_error!("galaxy3d::RenderPassDescriptor",
                "Failed to release cache entries on drop: {}", e);
        }
    }
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
