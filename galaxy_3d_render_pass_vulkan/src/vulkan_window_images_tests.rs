//! Unit tests for VulkanWindowImages (no GPU required: handles are plain values)

use super::*;

fn views() -> Vec<vk::ImageView> {
    vec![
        vk::ImageView::from_raw(0x10),
        vk::ImageView::from_raw(0x20),
        vk::ImageView::from_raw(0x30),
    ]
}

#[test]
fn test_new_exposes_views() {
    let window = VulkanWindowImages::new(&views());

    let raw: Vec<u64> = window.swapchain_image_views().iter().map(|v| v.as_raw()).collect();
    assert_eq!(raw, vec![0x10, 0x20, 0x30]);
    assert_eq!(window.current_image_index(), 0);
    assert!(window.image_acquired_semaphore().is_null());
}

#[test]
fn test_set_current() {
    let window = VulkanWindowImages::new(&views());
    window.set_current(2, vk::Semaphore::from_raw(0xABC));

    assert_eq!(window.current_image_index(), 2);
    assert_eq!(window.image_acquired_semaphore(), SemaphoreHandle::from_raw(0xABC));
}
