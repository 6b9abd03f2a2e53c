/// Opaque native object handles exchanged between the core and a backend
///
/// A handle is the raw 64-bit value of the backend object (for Vulkan, the
/// value of `ash::vk::Handle::as_raw`). Zero is the null handle.

macro_rules! native_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub u64);

        impl $name {
            /// The null handle
            pub const NULL: Self = Self(0);

            /// Wrap a raw backend handle
            pub fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            /// Raw backend handle
            pub fn as_raw(self) -> u64 {
                self.0
            }

            /// Whether this is the null handle
            pub fn is_null(self) -> bool {
                self.0 == 0
            }
        }
    };
}

native_handle! {
    /// Native render pass object (VkRenderPass)
    RenderPassHandle
}

native_handle! {
    /// Native framebuffer object (VkFramebuffer)
    FramebufferHandle
}

native_handle! {
    /// Native image view (VkImageView)
    ImageViewHandle
}

native_handle! {
    /// Native image (VkImage)
    ImageHandle
}

native_handle! {
    /// Native GPU semaphore (VkSemaphore)
    SemaphoreHandle
}
