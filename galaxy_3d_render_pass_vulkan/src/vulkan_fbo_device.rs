/// FboDevice - Vulkan implementation of the render pass / framebuffer factory

use std::sync::Arc;
use ash::vk;
use ash::vk::Handle;
use galaxy_3d_render_pass::galaxy3d::Result;
use galaxy_3d_render_pass::galaxy3d::render::{
    AttachmentLayout, FboDevice, FramebufferCreateDesc, FramebufferHandle, ImageViewHandle,
    RenderPassHandle,
};
use galaxy_3d_render_pass::engine_debug;

use crate::vulkan_mapping::{
    attachment_reference_to_vk, format_to_vk, image_layout_to_vk, load_op_to_vk,
    sample_count_to_vk, store_op_to_vk,
};

/// Vulkan FBO device
///
/// Creates and destroys VkRenderPass, VkFramebuffer and VkImageView objects
/// on behalf of the framebuffer cache. Handles cross the core boundary as
/// raw 64-bit values.
pub struct VulkanFboDevice {
    /// Vulkan logical device
    device: Arc<ash::Device>,
}

impl VulkanFboDevice {
    pub fn new(device: Arc<ash::Device>) -> Self {
        Self { device }
    }
}

/// Translate the planned layout into Vulkan create-info records
fn attachment_descriptions(layout: &AttachmentLayout) -> Result<Vec<vk::AttachmentDescription>> {
    layout
        .attachments
        .iter()
        .map(|planned| {
            let desc = &planned.desc;
            Ok(vk::AttachmentDescription::default()
                .format(format_to_vk(desc.format))
                .samples(sample_count_to_vk(desc.samples)?)
                .load_op(load_op_to_vk(desc.load_op))
                .store_op(store_op_to_vk(desc.store_op))
                .stencil_load_op(load_op_to_vk(desc.stencil_load_op))
                .stencil_store_op(store_op_to_vk(desc.stencil_store_op))
                .initial_layout(image_layout_to_vk(desc.initial_layout))
                .final_layout(image_layout_to_vk(desc.final_layout)))
        })
        .collect()
}

impl FboDevice for VulkanFboDevice {
    fn create_render_pass(&self, layout: &AttachmentLayout) -> Result<RenderPassHandle> {
        let attachments = attachment_descriptions(layout)?;
        let colour_refs: Vec<vk::AttachmentReference> =
            layout.colour_refs.iter().map(attachment_reference_to_vk).collect();
        let resolve_refs: Vec<vk::AttachmentReference> =
            layout.resolve_refs.iter().map(attachment_reference_to_vk).collect();
        let depth_ref = layout.depth_ref.as_ref().map(attachment_reference_to_vk);

        let mut subpass = vk::SubpassDescription::default()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&colour_refs);
        if layout.uses_resolve_attachments {
            subpass = subpass.resolve_attachments(&resolve_refs);
        }
        if let Some(ref depth_ref) = depth_ref {
            subpass = subpass.depth_stencil_attachment(depth_ref);
        }

        // Subpass dependency: include depth stages when depth attachment is present
        let (stage_mask, access_mask) = if depth_ref.is_some() {
            (
                vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
                    | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
                vk::AccessFlags::COLOR_ATTACHMENT_WRITE
                    | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
            )
        } else {
            (
                vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
                vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
            )
        };

        let dependency = vk::SubpassDependency::default()
            .src_subpass(vk::SUBPASS_EXTERNAL)
            .dst_subpass(0)
            .src_stage_mask(stage_mask)
            .src_access_mask(vk::AccessFlags::empty())
            .dst_stage_mask(stage_mask)
            .dst_access_mask(access_mask);

        let render_pass_info = vk::RenderPassCreateInfo::default()
            .attachments(&attachments)
            .subpasses(std::slice::from_ref(&subpass))
            .dependencies(std::slice::from_ref(&dependency));

        let render_pass = unsafe { self.device.create_render_pass(&render_pass_info, None) }
            .map_err(|e| vk_err!(e,
                "vkCreateRenderPass failed: {:?}", e))?;

        engine_debug!("galaxy3d::vulkan", "Created render pass with {} attachments ({} colour, depth: {})",
            attachments.len(), colour_refs.len(), depth_ref.is_some());

        Ok(RenderPassHandle::from_raw(render_pass.as_raw()))
    }

    fn create_framebuffer(&self, desc: &FramebufferCreateDesc) -> Result<FramebufferHandle> {
        let attachments: Vec<vk::ImageView> = desc
            .attachments
            .iter()
            .map(|view| vk::ImageView::from_raw(view.as_raw()))
            .collect();

        let framebuffer_info = vk::FramebufferCreateInfo::default()
            .render_pass(vk::RenderPass::from_raw(desc.render_pass.as_raw()))
            .attachments(&attachments)
            .width(desc.width)
            .height(desc.height)
            .layers(desc.layers);

        let framebuffer = unsafe { self.device.create_framebuffer(&framebuffer_info, None) }
            .map_err(|e| vk_err!(e,
                "vkCreateFramebuffer failed: {:?}", e))?;

        Ok(FramebufferHandle::from_raw(framebuffer.as_raw()))
    }

    fn destroy_framebuffer(&self, framebuffer: FramebufferHandle) {
        if framebuffer.is_null() {
            return;
        }
        unsafe {
            self.device.destroy_framebuffer(vk::Framebuffer::from_raw(framebuffer.as_raw()), None);
        }
    }

    fn destroy_image_view(&self, view: ImageViewHandle) {
        if view.is_null() {
            return;
        }
        unsafe {
            self.device.destroy_image_view(vk::ImageView::from_raw(view.as_raw()), None);
        }
    }

    fn destroy_render_pass(&self, render_pass: RenderPassHandle) {
        if render_pass.is_null() {
            return;
        }
        unsafe {
            self.device.destroy_render_pass(vk::RenderPass::from_raw(render_pass.as_raw()), None);
        }
    }
}
