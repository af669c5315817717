//! SPIR-V shader module loading.

use std::path::Path;
use std::sync::Arc;

use ash::vk;
use tracing::debug;

use crate::device::Device;
use crate::error::{RhiError, RhiResult};

/// Shader stage of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn to_vk_stage(self) -> vk::ShaderStageFlags {
        match self {
            ShaderStage::Vertex => vk::ShaderStageFlags::VERTEX,
            ShaderStage::Fragment => vk::ShaderStageFlags::FRAGMENT,
        }
    }

    fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

/// RAII shader module with its stage and entry point.
pub struct Shader {
    device: Arc<Device>,
    module: vk::ShaderModule,
    stage: ShaderStage,
    entry_point: std::ffi::CString,
}

impl Shader {
    /// Loads a SPIR-V binary from disk.
    pub fn from_spirv_file(
        device: Arc<Device>,
        path: &Path,
        stage: ShaderStage,
        entry_point: &str,
    ) -> RhiResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            RhiError::ShaderError(format!("failed to read {}: {e}", path.display()))
        })?;
        debug!("Loaded {} shader: {}", stage.name(), path.display());
        Self::from_spirv_bytes(device, &bytes, stage, entry_point)
    }

    /// Creates a module from raw SPIR-V bytes.
    ///
    /// # Errors
    ///
    /// Rejects byte slices that are not a whole number of SPIR-V words.
    pub fn from_spirv_bytes(
        device: Arc<Device>,
        bytes: &[u8],
        stage: ShaderStage,
        entry_point: &str,
    ) -> RhiResult<Self> {
        if bytes.is_empty() || !bytes.len().is_multiple_of(4) {
            return Err(RhiError::ShaderError(format!(
                "SPIR-V size {} is not a multiple of 4",
                bytes.len()
            )));
        }

        let words: Vec<u32> = bytes
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        let create_info = vk::ShaderModuleCreateInfo::default().code(&words);

        // SAFETY: device is live; `words` outlives the call.
        let module = unsafe { device.handle().create_shader_module(&create_info, None)? };

        let entry_point = std::ffi::CString::new(entry_point)
            .map_err(|_| RhiError::ShaderError("entry point contains a nul byte".to_string()))?;

        Ok(Self {
            device,
            module,
            stage,
            entry_point,
        })
    }

    #[inline]
    pub fn handle(&self) -> vk::ShaderModule {
        self.module
    }

    #[inline]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Stage create info for pipeline construction. Borrows self.
    pub fn stage_create_info(&self) -> vk::PipelineShaderStageCreateInfo<'_> {
        vk::PipelineShaderStageCreateInfo::default()
            .stage(self.stage.to_vk_stage())
            .module(self.module)
            .name(&self.entry_point)
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        // SAFETY: module is owned by self; pipelines created from it keep
        // their own reference per the Vulkan lifetime rules.
        unsafe {
            self.device.handle().destroy_shader_module(self.module, None);
        }
        debug!("{} shader module destroyed", self.stage.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_flags_map() {
        assert_eq!(
            ShaderStage::Vertex.to_vk_stage(),
            vk::ShaderStageFlags::VERTEX
        );
        assert_eq!(
            ShaderStage::Fragment.to_vk_stage(),
            vk::ShaderStageFlags::FRAGMENT
        );
    }
}
