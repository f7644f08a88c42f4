use thiserror::Error;

use crate::shader::UniformType;

/// Errors surfaced by the pipeline.
///
/// Attribute dimension mismatches are not errors; they are logged and the read
/// carries on with whatever the slot holds.
#[derive(Debug, Error)]
pub enum Error {
    #[error("uniform `{name}` was never set")]
    UniformNotFound { name: String },

    #[error("uniform `{name}` holds {found:?} but was read as {expected:?}")]
    UniformTypeMismatch {
        name: String,
        expected: UniformType,
        found: UniformType,
    },

    #[error("triangle {triangle} references vertex {index}, object has {vertex_count} vertices")]
    VertexIndexOutOfRange {
        triangle: usize,
        index: usize,
        vertex_count: usize,
    },

    #[error("window error: {0}")]
    Window(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
