/// Render-system owned cache of shared render pass / framebuffer objects.
///
/// Two registries live here:
/// - `AttachmentKey -> RealizedFbo`, realized lazily on first use and
///   destroyed when the last descriptor releases it;
/// - `FlushKey -> ()`, a pure reference count whose handles tell whether two
///   descriptors target the same physical attachments.

use std::sync::Arc;
use slotmap::new_key_type;
use crate::error::Result;
use crate::{engine_bail, engine_debug, engine_trace, engine_warn};
use crate::graphics_device::FboDevice;
use super::attachment_key::{AttachmentKey, FlushKey};
use super::config::RenderPassConfig;
use super::planner::AttachmentPlanner;
use super::realizer::{FboRealizer, RealizedFbo};
use super::registry::{Released, SharedRegistry};
use super::target::{RenderPassColourTarget, RenderPassDepthTarget};

new_key_type! {
    /// Handle of a shared realized FBO
    pub struct FboHandle;
    /// Handle of a shared flush key
    pub struct FlushHandle;
}

pub struct FrameBufferCache {
    device: Arc<dyn FboDevice>,
    config: RenderPassConfig,
    fbos: SharedRegistry<FboHandle, AttachmentKey, Option<RealizedFbo>>,
    flushes: SharedRegistry<FlushHandle, FlushKey, ()>,
}

impl FrameBufferCache {
    pub fn new(device: Arc<dyn FboDevice>, config: RenderPassConfig) -> Self {
        Self {
            device,
            config,
            fbos: SharedRegistry::new(),
            flushes: SharedRegistry::new(),
        }
    }

    pub fn config(&self) -> &RenderPassConfig {
        &self.config
    }

    /// Acquire the (possibly not yet realized) entry for `key`
    pub fn acquire(&mut self, key: AttachmentKey) -> FboHandle {
        let handle = self.fbos.acquire(key);
        engine_trace!("galaxy3d::FrameBufferCache",
            "Acquired FBO entry (refs: {})", self.fbos.ref_count(handle));
        handle
    }

    pub fn acquire_flush(&mut self, key: FlushKey) -> FlushHandle {
        self.flushes.acquire(key)
    }

    /// Release an FBO entry, destroying its native objects with the last holder
    ///
    /// Returns true if the entry was destroyed.
    pub fn release(&mut self, handle: FboHandle) -> bool {
        match self.fbos.release(handle) {
            Released::Destroyed(realized) => {
                if let Some(mut fbo) = realized {
                    FboRealizer::destroy(self.device.as_ref(), &mut fbo);
                    engine_debug!("galaxy3d::FrameBufferCache",
                        "Destroyed FBO entry ({} remaining)", self.fbos.len());
                }
                true
            }
            Released::Shared(_) => false,
            Released::Stale => {
                engine_warn!("galaxy3d::FrameBufferCache", "Release of stale FBO handle");
                false
            }
        }
    }

    pub fn release_flush(&mut self, handle: FlushHandle) {
        if let Released::Stale = self.flushes.release(handle) {
            engine_warn!("galaxy3d::FrameBufferCache", "Release of stale flush handle");
        }
    }

    /// Realize the entry behind `handle` if this has not happened yet
    ///
    /// The targets must be the ones the entry's key was built from.
    pub fn realize(
        &mut self,
        handle: FboHandle,
        colour: &[RenderPassColourTarget],
        depth: Option<&RenderPassDepthTarget>,
        width: u32,
        height: u32,
    ) -> Result<&RealizedFbo> {
        let needs_creation = match self.fbos.get(handle) {
            Some(entry) => entry.is_none(),
            None => engine_bail!("galaxy3d::FrameBufferCache",
                "Cannot realize a released FBO entry"),
        };

        if needs_creation {
            let layout = AttachmentPlanner::plan(colour, depth)?;
            let fbo = FboRealizer::create(
                self.device.as_ref(), &layout, colour, depth, width, height)?;
            if let Some(entry) = self.fbos.get_mut(handle) {
                *entry = Some(fbo);
            }
        }

        match self.fbos.get(handle) {
            Some(Some(fbo)) => Ok(fbo),
            _ => engine_bail!("galaxy3d::FrameBufferCache", "FBO entry vanished during realization"),
        }
    }

    /// Realized objects of an entry (None if stale or not yet realized)
    pub fn realized(&self, handle: FboHandle) -> Option<&RealizedFbo> {
        self.fbos.get(handle).and_then(|entry| entry.as_ref())
    }

    pub fn ref_count(&self, handle: FboHandle) -> u32 {
        self.fbos.ref_count(handle)
    }

    pub fn flush_ref_count(&self, handle: FlushHandle) -> u32 {
        self.flushes.ref_count(handle)
    }

    /// Number of live FBO entries
    pub fn len(&self) -> usize {
        self.fbos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fbos.is_empty()
    }

    pub fn flush_len(&self) -> usize {
        self.flushes.len()
    }
}

impl Drop for FrameBufferCache {
    fn drop(&mut self) {
        if self.fbos.is_empty() {
            return;
        }
        engine_warn!("galaxy3d::FrameBufferCache",
            "Dropping cache with {} live FBO entries", self.fbos.len());
        let device = self.device.clone();
        for mut fbo in self.fbos.drain().flatten() {
            FboRealizer::destroy(device.as_ref(), &mut fbo);
        }
    }
}

#[cfg(test)]
#[path = "frame_buffer_cache_tests.rs"]
mod tests;
