use std::collections::HashMap;

use nalgebra as na;
use na::{Matrix2, Matrix3, Matrix4, Vector2, Vector3, Vector4};

use crate::error::{Error, Result};

/// Type tag of a uniform variable.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UniformType {
    I32,
    F32,
    Vector2f,
    Vector3f,
    Vector4f,
    Matrix2f,
    Matrix3f,
    Matrix4f,
}

/// A stored uniform value.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformVariable {
    I32(i32),
    F32(f32),
    Vector2f(Vector2<f32>),
    Vector3f(Vector3<f32>),
    Vector4f(Vector4<f32>),
    Matrix2f(Matrix2<f32>),
    Matrix3f(Matrix3<f32>),
    Matrix4f(Matrix4<f32>),
}

impl UniformVariable {
    pub fn variable_type(&self) -> UniformType {
        return match self {
            UniformVariable::I32(_) => UniformType::I32,
            UniformVariable::F32(_) => UniformType::F32,
            UniformVariable::Vector2f(_) => UniformType::Vector2f,
            UniformVariable::Vector3f(_) => UniformType::Vector3f,
            UniformVariable::Vector4f(_) => UniformType::Vector4f,
            UniformVariable::Matrix2f(_) => UniformType::Matrix2f,
            UniformVariable::Matrix3f(_) => UniformType::Matrix3f,
            UniformVariable::Matrix4f(_) => UniformType::Matrix4f,
        };
    }
}

/// Rust types allowed as uniforms.
pub trait UniformValue: Sized {
    const TYPE: UniformType;

    fn into_variable(self) -> UniformVariable;

    fn from_variable(variable: &UniformVariable) -> Option<Self>;
}

macro_rules! impl_uniform_value {
    ($ty:ty, $variant:ident) => {
        impl UniformValue for $ty {
            const TYPE: UniformType = UniformType::$variant;

            fn into_variable(self) -> UniformVariable {
                return UniformVariable::$variant(self);
            }

            fn from_variable(variable: &UniformVariable) -> Option<Self> {
                return match variable {
                    UniformVariable::$variant(value) => Some(*value),
                    _ => None,
                };
            }
        }
    };
}

impl_uniform_value!(i32, I32);
impl_uniform_value!(f32, F32);
impl_uniform_value!(Vector2<f32>, Vector2f);
impl_uniform_value!(Vector3<f32>, Vector3f);
impl_uniform_value!(Vector4<f32>, Vector4f);
impl_uniform_value!(Matrix2<f32>, Matrix2f);
impl_uniform_value!(Matrix3<f32>, Matrix3f);
impl_uniform_value!(Matrix4<f32>, Matrix4f);

/// Named uniform variables of a shader program.
#[derive(Debug, Clone, Default)]
pub struct Uniforms {
    values: HashMap<String, UniformVariable>,
}

impl Uniforms {
    pub fn new() -> Self {
        return Self::default();
    }

    /// Sets a uniform, replacing any previous value under the same name whatever its type.
    pub fn set<T: UniformValue>(&mut self, name: &str, value: T) {
        self.values.insert(name.to_owned(), value.into_variable());
    }

    /// Reads a uniform. Fails if the name was never set or holds another type.
    pub fn get<T: UniformValue>(&self, name: &str) -> Result<T> {
        let variable = self.values.get(name).ok_or_else(|| Error::UniformNotFound {
            name: name.to_owned(),
        })?;
        return T::from_variable(variable).ok_or_else(|| Error::UniformTypeMismatch {
            name: name.to_owned(),
            expected: T::TYPE,
            found: variable.variable_type(),
        });
    }

    pub fn len(&self) -> usize {
        return self.values.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.values.is_empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use na::vector;

    #[test]
    fn set_then_get() {
        let mut uniforms = Uniforms::new();
        uniforms.set("count", 3i32);
        uniforms.set("transform", Matrix4::<f32>::identity());
        uniforms.set("color", vector![0.1f32, 0.2, 0.3, 1.0]);
        assert_eq!(uniforms.get::<i32>("count").unwrap(), 3);
        assert_eq!(uniforms.get::<Matrix4<f32>>("transform").unwrap(), Matrix4::identity());
        assert_eq!(uniforms.get::<Vector4<f32>>("color").unwrap(), vector![0.1, 0.2, 0.3, 1.0]);
        assert_eq!(uniforms.len(), 3);
    }

    #[test]
    fn overwrite_replaces_value_and_type() {
        let mut uniforms = Uniforms::new();
        uniforms.set("scale", 1.0f32);
        uniforms.set("scale", 2.0f32);
        assert_eq!(uniforms.get::<f32>("scale").unwrap(), 2.0);
        uniforms.set("scale", vector![1.0f32, 2.0]);
        assert_eq!(uniforms.get::<Vector2<f32>>("scale").unwrap(), vector![1.0, 2.0]);
        assert_eq!(uniforms.len(), 1);
    }

    #[test]
    fn missing_name_is_an_error() {
        let uniforms = Uniforms::new();
        match uniforms.get::<f32>("color") {
            Err(Error::UniformNotFound { name }) => assert_eq!(name, "color"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn wrong_type_is_an_error() {
        let mut uniforms = Uniforms::new();
        uniforms.set("color", vector![1.0f32, 0.0, 0.0]);
        match uniforms.get::<Vector4<f32>>("color") {
            Err(Error::UniformTypeMismatch { expected, found, .. }) => {
                assert_eq!(expected, UniformType::Vector4f);
                assert_eq!(found, UniformType::Vector3f);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }
}
