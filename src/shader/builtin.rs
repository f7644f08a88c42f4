use nalgebra as na;
use na::{Matrix4, Vector4};

use super::{Attribs, FragmentShader, Uniforms, VertexShader};
use crate::error::Result;

/// A vertex shader that uses the 0th vertex attribute as the position.
pub fn vs_identity() -> VertexShader {
    return Box::new(|_uniforms: &Uniforms, input: &Attribs, _out: &mut Attribs| -> Result<Vector4<f32>> {
        Ok(input.get::<Vector4<f32>>(0))
    });
}

/// A vertex shader that applies the transformation matrix given by the uniform named `transform`.
pub fn vs_transform() -> VertexShader {
    return Box::new(|uniforms: &Uniforms, input: &Attribs, _out: &mut Attribs| -> Result<Vector4<f32>> {
        let vertex = input.get::<Vector4<f32>>(0);
        let transform = uniforms.get::<Matrix4<f32>>("transform")?;
        Ok(transform * vertex)
    });
}

/// A vertex shader that uses the 0th vertex attribute as the position and passes on the 1st
/// attribute as the color.
pub fn vs_color() -> VertexShader {
    return Box::new(|_uniforms: &Uniforms, input: &Attribs, out: &mut Attribs| -> Result<Vector4<f32>> {
        out.set(0, input.get::<Vector4<f32>>(1));
        Ok(input.get::<Vector4<f32>>(0))
    });
}

/// `vs_transform` and `vs_color` combined.
pub fn vs_color_transform() -> VertexShader {
    return Box::new(|uniforms: &Uniforms, input: &Attribs, out: &mut Attribs| -> Result<Vector4<f32>> {
        let vertex = input.get::<Vector4<f32>>(0);
        let transform = uniforms.get::<Matrix4<f32>>("transform")?;
        out.set(0, input.get::<Vector4<f32>>(1));
        Ok(transform * vertex)
    });
}

/// A fragment shader that returns a constant color given by the uniform named `color`.
pub fn fs_constant() -> FragmentShader {
    return Box::new(|uniforms: &Uniforms, _input: &Attribs| -> Result<Vector4<f32>> {
        uniforms.get::<Vector4<f32>>("color")
    });
}

/// A fragment shader that uses the 0th attribute as the color.
pub fn fs_identity() -> FragmentShader {
    return Box::new(|_uniforms: &Uniforms, input: &Attribs| -> Result<Vector4<f32>> {
        Ok(input.get::<Vector4<f32>>(0))
    });
}
