//! Programmable stages of the pipeline.
//!
//! A vertex shader maps the attributes of one vertex to a clip space position and writes
//! any attributes it wants passed on into `out`. A fragment shader maps such attributes to
//! an rgba color. Shaders get read-only access to the uniforms of their program.

mod attribs;
mod builtin;
mod uniforms;

pub use attribs::{Attrib, Attribs};
pub use builtin::{fs_constant, fs_identity, vs_color, vs_color_transform, vs_identity, vs_transform};
pub use uniforms::{UniformType, UniformValue, UniformVariable, Uniforms};

use nalgebra::Vector4;

use crate::error::Result;

/// Type representing vertex shader.
pub type VertexShader = Box<
    dyn Fn(
        &Uniforms,    // Uniforms of the program.
        &Attribs,     // Input vertex attributes.
        &mut Attribs, // Attributes passed on to the fragment shader.
    ) -> Result<Vector4<f32>>,
>;

/// Type representing fragment shader.
pub type FragmentShader = Box<
    dyn Fn(
        &Uniforms, // Uniforms of the program.
        &Attribs,  // Attributes written by the vertex shader.
    ) -> Result<Vector4<f32>>,
>;

/// A vertex and fragment shader pair along with the uniforms they read.
pub struct ShaderProgram {
    vertex: VertexShader,
    fragment: FragmentShader,
    uniforms: Uniforms,
}

impl ShaderProgram {
    pub fn new(vertex: VertexShader, fragment: FragmentShader) -> Self {
        return Self {
            vertex,
            fragment,
            uniforms: Uniforms::new(),
        };
    }

    pub fn uniforms(&self) -> &Uniforms {
        return &self.uniforms;
    }

    pub fn set_uniform<T: UniformValue>(&mut self, name: &str, value: T) {
        self.uniforms.set(name, value);
    }

    /// Runs the vertex stage on one vertex, returning its clip space position and outputs.
    pub fn shade_vertex(&self, input: &Attribs) -> Result<(Vector4<f32>, Attribs)> {
        let mut out = Attribs::new();
        let position = (self.vertex)(&self.uniforms, input, &mut out)?;
        return Ok((position, out));
    }

    /// Runs the fragment stage on attributes produced by the vertex stage.
    pub fn shade_fragment(&self, input: &Attribs) -> Result<Vector4<f32>> {
        return (self.fragment)(&self.uniforms, input);
    }
}

impl std::fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return f.debug_struct("ShaderProgram")
            .field("uniforms", &self.uniforms)
            .finish_non_exhaustive();
    }
}
