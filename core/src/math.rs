//! Math type aliases and helper functions.
//!
//! The renderer backend treats matrices as opaque values handed over by the
//! scene layer as plain column-major `[f32; 16]` arrays. These helpers convert
//! between that form and `nalgebra` types.

pub use nalgebra;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 4D vector (f32).
pub type Vec4 = nalgebra::Vector4<f32>;

/// 3x3 matrix (f32).
pub type Mat3 = nalgebra::Matrix3<f32>;

/// 4x4 matrix (f32).
pub type Mat4 = nalgebra::Matrix4<f32>;

/// Build a 4x4 matrix from a column-major `[f32; 16]` array.
pub fn mat4_from_cols_array(m: &[f32; 16]) -> Mat4 {
    Mat4::from_column_slice(m)
}

/// Transform a point (w = 1) by a 4x4 matrix, returning the homogeneous result.
pub fn transform_point4(m: &Mat4, p: &Vec3) -> Vec4 {
    m * Vec4::new(p.x, p.y, p.z, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rustfmt::skip]
    const TRANSLATE_123: [f32; 16] = [
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        1.0, 2.0, 3.0, 1.0,
    ];

    #[test]
    fn cols_array_is_column_major() {
        let m = mat4_from_cols_array(&TRANSLATE_123);
        assert_eq!(m[(0, 3)], 1.0);
        assert_eq!(m[(1, 3)], 2.0);
        assert_eq!(m[(2, 3)], 3.0);
        assert_eq!(m, Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn transform_point_applies_translation() {
        let m = mat4_from_cols_array(&TRANSLATE_123);
        let p = transform_point4(&m, &Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(p, Vec4::new(2.0, 4.0, 6.0, 1.0));
    }
}
