/// Conversions from the backend-neutral render pass records to Vulkan enums
///
/// Pure functions, testable without a GPU.

use ash::vk;
use galaxy_3d_render_pass::engine_bail_config;
use galaxy_3d_render_pass::galaxy3d::{Error, Result};
use galaxy_3d_render_pass::galaxy3d::render::{
    ClearColor, ClearValue, ImageLayout, LoadOp, StoreOp, TextureFormat, ATTACHMENT_UNUSED,
    AttachmentReference,
};

/// Convert TextureFormat to Vulkan format
pub fn format_to_vk(format: TextureFormat) -> vk::Format {
    match format {
        TextureFormat::Unknown => vk::Format::UNDEFINED,
        TextureFormat::R8G8B8A8_SRGB => vk::Format::R8G8B8A8_SRGB,
        TextureFormat::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        TextureFormat::B8G8R8A8_SRGB => vk::Format::B8G8R8A8_SRGB,
        TextureFormat::B8G8R8A8_UNORM => vk::Format::B8G8R8A8_UNORM,
        TextureFormat::R16G16B16A16_SFLOAT => vk::Format::R16G16B16A16_SFLOAT,
        TextureFormat::R32G32B32A32_SFLOAT => vk::Format::R32G32B32A32_SFLOAT,
        TextureFormat::R8G8B8A8_UINT => vk::Format::R8G8B8A8_UINT,
        TextureFormat::R8G8B8A8_SINT => vk::Format::R8G8B8A8_SINT,
        TextureFormat::R32_UINT => vk::Format::R32_UINT,
        TextureFormat::R32_SINT => vk::Format::R32_SINT,
        TextureFormat::D16_UNORM => vk::Format::D16_UNORM,
        TextureFormat::D32_FLOAT => vk::Format::D32_SFLOAT,
        TextureFormat::D24_UNORM_S8_UINT => vk::Format::D24_UNORM_S8_UINT,
        TextureFormat::D32_FLOAT_S8_UINT => vk::Format::D32_SFLOAT_S8_UINT,
    }
}

/// Convert a sample count to Vulkan flags
///
/// Only the power-of-two counts Vulkan defines are accepted; anything else
/// would describe a render pass that disagrees with the image it renders to.
pub fn sample_count_to_vk(samples: u32) -> Result<vk::SampleCountFlags> {
    Ok(match samples {
        1 => vk::SampleCountFlags::TYPE_1,
        2 => vk::SampleCountFlags::TYPE_2,
        4 => vk::SampleCountFlags::TYPE_4,
        8 => vk::SampleCountFlags::TYPE_8,
        16 => vk::SampleCountFlags::TYPE_16,
        32 => vk::SampleCountFlags::TYPE_32,
        64 => vk::SampleCountFlags::TYPE_64,
        _ => engine_bail_config!("galaxy3d::vulkan", "Unsupported sample count {}", samples),
    })
}

/// Convert a failed Vulkan call into an engine error
pub fn vk_result_to_error(result: vk::Result, message: String) -> Error {
    match result {
        vk::Result::ERROR_OUT_OF_DEVICE_MEMORY | vk::Result::ERROR_OUT_OF_HOST_MEMORY => {
            Error::OutOfMemory
        }
        _ => Error::BackendError(message),
    }
}

/// Convert LoadOp to Vulkan
pub fn load_op_to_vk(load_op: LoadOp) -> vk::AttachmentLoadOp {
    match load_op {
        LoadOp::Load => vk::AttachmentLoadOp::LOAD,
        LoadOp::Clear => vk::AttachmentLoadOp::CLEAR,
        LoadOp::DontCare => vk::AttachmentLoadOp::DONT_CARE,
    }
}

/// Convert StoreOp to Vulkan
pub fn store_op_to_vk(store_op: StoreOp) -> vk::AttachmentStoreOp {
    match store_op {
        StoreOp::Store => vk::AttachmentStoreOp::STORE,
        StoreOp::DontCare => vk::AttachmentStoreOp::DONT_CARE,
    }
}

/// Convert ImageLayout to Vulkan
pub fn image_layout_to_vk(layout: ImageLayout) -> vk::ImageLayout {
    match layout {
        ImageLayout::Undefined => vk::ImageLayout::UNDEFINED,
        ImageLayout::ColorAttachment => vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        ImageLayout::DepthStencilAttachment => vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
        ImageLayout::PresentSrc => vk::ImageLayout::PRESENT_SRC_KHR,
    }
}

/// Convert an attachment reference, keeping the unused sentinel
pub fn attachment_reference_to_vk(reference: &AttachmentReference) -> vk::AttachmentReference {
    if reference.attachment == ATTACHMENT_UNUSED {
        return vk::AttachmentReference::default()
            .attachment(vk::ATTACHMENT_UNUSED)
            .layout(vk::ImageLayout::UNDEFINED);
    }
    vk::AttachmentReference::default()
        .attachment(reference.attachment)
        .layout(image_layout_to_vk(reference.layout))
}

/// Convert a clear value, keeping the numeric type of colour clears
pub fn clear_value_to_vk(value: &ClearValue) -> vk::ClearValue {
    match value {
        ClearValue::Color(ClearColor::Float(rgba)) => vk::ClearValue {
            color: vk::ClearColorValue { float32: *rgba },
        },
        ClearValue::Color(ClearColor::Int(rgba)) => vk::ClearValue {
            color: vk::ClearColorValue { int32: *rgba },
        },
        ClearValue::Color(ClearColor::Uint(rgba)) => vk::ClearValue {
            color: vk::ClearColorValue { uint32: *rgba },
        },
        ClearValue::DepthStencil { depth, stencil } => vk::ClearValue {
            depth_stencil: vk::ClearDepthStencilValue {
                depth: *depth,
                stencil: *stencil,
            },
        },
    }
}

/// Image aspect of a format, for view creation
pub fn aspect_mask_for(format: TextureFormat) -> vk::ImageAspectFlags {
    if format.is_depth() {
        // Views used as framebuffer attachments cover every aspect
        if format.has_stencil() {
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
        } else {
            vk::ImageAspectFlags::DEPTH
        }
    } else {
        vk::ImageAspectFlags::COLOR
    }
}

#[cfg(test)]
#[path = "vulkan_mapping_tests.rs"]
mod tests;
