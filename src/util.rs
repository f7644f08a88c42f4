use nalgebra as na;
use na::{vector, Vector3, Vector4};

/// Transformation of a point to homogenous coordinates.
pub fn to_hom_point(v: Vector3<f32>) -> Vector4<f32> {
    return vector![v.x, v.y, v.z, 1.0];
}

/// Transformation of a point from homogenous coordinates, i.e. perspective division.
pub fn from_hom_point(v: Vector4<f32>) -> Vector3<f32> {
    return vector![v.x / v.w, v.y / v.w, v.z / v.w];
}

/// Dropping w without division. Used when there is no perspective to undo.
pub fn from_hom_vector(v: Vector4<f32>) -> Vector3<f32> {
    return vector![v.x, v.y, v.z];
}

/// Quantizes a normalized rgba color to rgba8. Channels are clamped to [0, 1].
pub fn to_rgba8(color: Vector4<f32>) -> [u8; 4] {
    let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    return [
        quantize(color.x),
        quantize(color.y),
        quantize(color.z),
        quantize(color.w),
    ];
}

/// Inverse of `to_rgba8`, up to quantization.
pub fn from_rgba8(bytes: [u8; 4]) -> Vector4<f32> {
    return Vector4::new(bytes[0] as f32, bytes[1] as f32, bytes[2] as f32, bytes[3] as f32) / 255.0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn homogenous_round_trip() {
        let p = vector![0.5, -0.25, 2.0];
        assert_relative_eq!(from_hom_point(to_hom_point(p)), p);
        assert_relative_eq!(from_hom_point(vector![2.0, 4.0, 1.0, 2.0]), vector![1.0, 2.0, 0.5]);
        assert_relative_eq!(from_hom_vector(vector![2.0, 4.0, 1.0, 2.0]), vector![2.0, 4.0, 1.0]);
    }

    #[test]
    fn quantization_clamps_and_rounds() {
        assert_eq!(to_rgba8(vector![1.5, -0.2, 0.5, 1.0]), [255, 0, 128, 255]);
        assert_eq!(to_rgba8(from_rgba8([12, 200, 7, 99])), [12, 200, 7, 99]);
    }
}
