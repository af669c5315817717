//! GPU meshes: a vertex buffer plus an optional index buffer.

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use crate::buffer::{Buffer, BufferUsage};
use crate::device::Device;
use crate::error::{RhiError, RhiResult};
use crate::vertex::Vertex;

/// Immutable GPU geometry, shared between scene objects via `Arc`.
pub struct Mesh {
    device: Arc<Device>,
    vertex_buffer: Buffer,
    vertex_count: u32,
    index_buffer: Option<Buffer>,
    index_count: u32,
}

impl Mesh {
    /// Uploads vertices (and optionally indices) to GPU-visible memory.
    ///
    /// # Errors
    ///
    /// Requires at least 3 vertices; fails on buffer allocation errors.
    pub fn new(
        device: Arc<Device>,
        vertices: &[Vertex],
        indices: Option<&[u32]>,
    ) -> RhiResult<Self> {
        if vertices.len() < 3 {
            return Err(RhiError::InvalidArgument(format!(
                "mesh needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }

        let vertex_buffer = Buffer::new_with_data(
            device.clone(),
            BufferUsage::Vertex,
            bytemuck::cast_slice(vertices),
        )?;

        let (index_buffer, index_count) = match indices {
            Some(indices) if !indices.is_empty() => {
                let buffer = Buffer::new_with_data(
                    device.clone(),
                    BufferUsage::Index,
                    bytemuck::cast_slice(indices),
                )?;
                (Some(buffer), indices.len() as u32)
            }
            _ => (None, 0),
        };

        debug!(
            "Mesh uploaded: {} vertices, {} indices",
            vertices.len(),
            index_count
        );

        Ok(Self {
            device,
            vertex_buffer,
            vertex_count: vertices.len() as u32,
            index_buffer,
            index_count,
        })
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    #[inline]
    pub fn has_indices(&self) -> bool {
        self.index_buffer.is_some()
    }

    /// Binds the vertex (and index) buffers into `cmd`.
    pub fn bind(&self, cmd: vk::CommandBuffer) {
        // SAFETY: cmd is in the recording state and the buffers are live
        // for as long as this mesh (and thus the frame referencing it).
        unsafe {
            self.device
                .handle()
                .cmd_bind_vertex_buffers(cmd, 0, &[self.vertex_buffer.handle()], &[0]);

            if let Some(index_buffer) = &self.index_buffer {
                self.device.handle().cmd_bind_index_buffer(
                    cmd,
                    index_buffer.handle(),
                    0,
                    vk::IndexType::UINT32,
                );
            }
        }
    }

    /// Issues the draw for the bound mesh.
    pub fn draw(&self, cmd: vk::CommandBuffer) {
        // SAFETY: bind() was recorded into the same command buffer.
        unsafe {
            if self.index_buffer.is_some() {
                self.device
                    .handle()
                    .cmd_draw_indexed(cmd, self.index_count, 1, 0, 0, 0);
            } else {
                self.device.handle().cmd_draw(cmd, self.vertex_count, 1, 0, 0);
            }
        }
    }
}
