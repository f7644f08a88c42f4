use nalgebra::Vector3;

use crate::error::{Error, Result};
use crate::shader::{Attrib, Attribs};

/// A collection of vertices, each with its own set of attributes, and triangles indexing them.
#[derive(Debug, Clone, Default)]
pub struct Object {
    attribs: Vec<Attribs>,
    indices: Vec<Vector3<usize>>,
}

impl Object {
    pub fn new() -> Self {
        return Self::default();
    }

    /// Writes `data[i]` into slot `attrib_index` of vertex `i`, adding vertices as needed.
    /// Vertices past `data.len()` are left as they are.
    pub fn set_vertex_attribs<T: Attrib>(&mut self, attrib_index: usize, data: &[T]) {
        if self.attribs.len() < data.len() {
            self.attribs.resize_with(data.len(), Attribs::new);
        }
        for (attribs, value) in self.attribs.iter_mut().zip(data) {
            attribs.set(attrib_index, *value);
        }
        log::debug!(
            "set attribute {} (dimension {}) on {} of {} vertices",
            attrib_index,
            T::DIM,
            data.len(),
            self.attribs.len()
        );
    }

    /// Replaces the triangle list. Indices are checked against the vertex count at draw time.
    pub fn set_triangle_indices(&mut self, indices: &[Vector3<usize>]) {
        self.indices = indices.to_vec();
        log::debug!("set {} triangles", self.indices.len());
    }

    pub fn vertices(&self) -> &[Attribs] {
        return &self.attribs;
    }

    pub fn triangles(&self) -> &[Vector3<usize>] {
        return &self.indices;
    }

    pub fn vertex_count(&self) -> usize {
        return self.attribs.len();
    }

    /// Checks that every triangle references an existing vertex.
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.attribs.len();
        for (triangle, indices) in self.indices.iter().enumerate() {
            if let Some(index) = indices.iter().copied().find(|index| *index >= vertex_count) {
                return Err(Error::VertexIndexOutOfRange {
                    triangle,
                    index,
                    vertex_count,
                });
            }
        }
        return Ok(());
    }
}
