//! A software triangle rasterizer with a shader-like API.
//!
//! Shader programs pair a vertex and a fragment shader, objects hold per-vertex attributes and
//! triangle indices, and a [`Rasterizer`] draws objects into its framebuffer with optional depth
//! testing and supersampling, then shows the result on a [`Surface`].

pub mod error;
pub mod framebuffer;
pub mod logging;
pub mod object;
pub mod raster;
pub mod rasterizer;
pub mod shader;
pub mod surface;
pub mod util;

pub use error::{Error, Result};
pub use framebuffer::Framebuffer;
pub use object::Object;
pub use rasterizer::{ActiveProgram, Rasterizer, RasterizerConfig, Supersampling};
pub use shader::{
    fs_constant, fs_identity, vs_color, vs_color_transform, vs_identity, vs_transform, Attrib, Attribs,
    FragmentShader, ShaderProgram, UniformType, UniformValue, Uniforms, VertexShader,
};
pub use surface::{HeadlessSurface, Surface, WindowSurface};
