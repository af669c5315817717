//! Physical device selection.
//!
//! Enumerates GPUs, filters out devices that cannot render and present to
//! the target surface, and scores the remainder so discrete hardware wins.

use std::ffi::CStr;

use ash::vk;
use tracing::{debug, info};

use crate::error::{RhiError, RhiResult};

/// Queue family indices discovered for a physical device.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueFamilyIndices {
    /// Graphics-capable family
    pub graphics_family: Option<u32>,
    /// Family able to present to the target surface
    pub present_family: Option<u32>,
}

impl QueueFamilyIndices {
    /// Whether every family the engine needs was found.
    pub fn is_complete(&self) -> bool {
        self.graphics_family.is_some() && self.present_family.is_some()
    }

    /// Deduplicated family indices, for queue creation.
    pub fn unique_families(&self) -> Vec<u32> {
        let mut families = Vec::new();
        if let Some(graphics) = self.graphics_family {
            families.push(graphics);
        }
        if let Some(present) = self.present_family
            && !families.contains(&present)
        {
            families.push(present);
        }
        families
    }
}

/// A selected physical device and its cached properties.
pub struct PhysicalDeviceInfo {
    pub device: vk::PhysicalDevice,
    pub properties: vk::PhysicalDeviceProperties,
    pub features: vk::PhysicalDeviceFeatures,
    pub memory_properties: vk::PhysicalDeviceMemoryProperties,
    pub queue_families: QueueFamilyIndices,
}

impl PhysicalDeviceInfo {
    /// Device name as reported by the driver.
    pub fn device_name(&self) -> String {
        // SAFETY: device_name is a nul-terminated array filled by the driver.
        unsafe {
            CStr::from_ptr(self.properties.device_name.as_ptr())
                .to_string_lossy()
                .into_owned()
        }
    }

    pub fn device_type_name(&self) -> &'static str {
        match self.properties.device_type {
            vk::PhysicalDeviceType::DISCRETE_GPU => "discrete",
            vk::PhysicalDeviceType::INTEGRATED_GPU => "integrated",
            vk::PhysicalDeviceType::VIRTUAL_GPU => "virtual",
            vk::PhysicalDeviceType::CPU => "cpu",
            _ => "other",
        }
    }
}

/// Selects the best physical device for rendering to `surface`.
///
/// # Errors
///
/// Returns [`RhiError::NoSuitableGpu`] when no device exposes both a
/// graphics queue and presentation support for the surface, along with the
/// swapchain extension.
pub fn select_physical_device(
    instance: &ash::Instance,
    surface: vk::SurfaceKHR,
    surface_loader: &ash::khr::surface::Instance,
) -> RhiResult<PhysicalDeviceInfo> {
    // SAFETY: instance is live.
    let devices = unsafe { instance.enumerate_physical_devices()? };

    if devices.is_empty() {
        return Err(RhiError::NoSuitableGpu);
    }

    let mut best: Option<(i32, PhysicalDeviceInfo)> = None;

    for device in devices {
        // SAFETY: device handles come from the enumeration above.
        let properties = unsafe { instance.get_physical_device_properties(device) };
        let features = unsafe { instance.get_physical_device_features(device) };
        let memory_properties =
            unsafe { instance.get_physical_device_memory_properties(device) };

        let queue_families = find_queue_families(instance, device, surface, surface_loader)?;

        if !queue_families.is_complete() {
            continue;
        }
        if !supports_swapchain_extension(instance, device)? {
            continue;
        }

        let info = PhysicalDeviceInfo {
            device,
            properties,
            features,
            memory_properties,
            queue_families,
        };
        let score = rate_device(&info);

        debug!("Candidate GPU \"{}\" scored {}", info.device_name(), score);

        match &best {
            Some((best_score, _)) if *best_score >= score => {}
            _ => best = Some((score, info)),
        }
    }

    let (_, info) = best.ok_or(RhiError::NoSuitableGpu)?;

    info!(
        "Selected GPU: {} ({})",
        info.device_name(),
        info.device_type_name()
    );

    Ok(info)
}

/// Scores a device; discrete GPUs dominate everything else.
fn rate_device(info: &PhysicalDeviceInfo) -> i32 {
    let mut score = 0;

    score += match info.properties.device_type {
        vk::PhysicalDeviceType::DISCRETE_GPU => 10_000,
        vk::PhysicalDeviceType::INTEGRATED_GPU => 1_000,
        vk::PhysicalDeviceType::VIRTUAL_GPU => 100,
        _ => 0,
    };

    // Tie-break on the largest image dimension the device can handle.
    score += (info.properties.limits.max_image_dimension2_d / 1024) as i32;

    score
}

fn find_queue_families(
    instance: &ash::Instance,
    device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
    surface_loader: &ash::khr::surface::Instance,
) -> RhiResult<QueueFamilyIndices> {
    // SAFETY: device handle is valid for this instance.
    let families = unsafe { instance.get_physical_device_queue_family_properties(device) };

    let mut indices = QueueFamilyIndices::default();

    for (i, family) in families.iter().enumerate() {
        let i = i as u32;

        if indices.graphics_family.is_none()
            && family.queue_flags.contains(vk::QueueFlags::GRAPHICS)
        {
            indices.graphics_family = Some(i);
        }

        if indices.present_family.is_none() {
            // SAFETY: i indexes the family list queried above.
            let present_support = unsafe {
                surface_loader.get_physical_device_surface_support(device, i, surface)?
            };
            if present_support {
                indices.present_family = Some(i);
            }
        }

        if indices.is_complete() {
            break;
        }
    }

    Ok(indices)
}

fn supports_swapchain_extension(
    instance: &ash::Instance,
    device: vk::PhysicalDevice,
) -> RhiResult<bool> {
    // SAFETY: device handle is valid for this instance.
    let extensions = unsafe { instance.enumerate_device_extension_properties(device)? };

    let wanted = ash::khr::swapchain::NAME.to_bytes_with_nul();
    Ok(extensions.iter().any(|ext| {
        // SAFETY: extension_name is a nul-terminated array filled by the
        // driver.
        let name = unsafe { CStr::from_ptr(ext.extension_name.as_ptr()) };
        name.to_bytes_with_nul() == wanted
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_without_present_family() {
        let indices = QueueFamilyIndices {
            graphics_family: Some(0),
            present_family: None,
        };
        assert!(!indices.is_complete());
    }

    #[test]
    fn complete_with_both_families() {
        let indices = QueueFamilyIndices {
            graphics_family: Some(0),
            present_family: Some(1),
        };
        assert!(indices.is_complete());
    }

    #[test]
    fn unique_families_deduplicates_shared_index() {
        let indices = QueueFamilyIndices {
            graphics_family: Some(2),
            present_family: Some(2),
        };
        assert_eq!(indices.unique_families(), vec![2]);
    }

    #[test]
    fn unique_families_keeps_distinct_indices() {
        let indices = QueueFamilyIndices {
            graphics_family: Some(0),
            present_family: Some(3),
        };
        assert_eq!(indices.unique_families(), vec![0, 3]);
    }

    #[test]
    fn default_is_empty() {
        let indices = QueueFamilyIndices::default();
        assert!(!indices.is_complete());
        assert!(indices.unique_families().is_empty());
    }
}
