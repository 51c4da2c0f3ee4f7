use glam::{DMat3, DVec3};

/// Errors raised while building rotations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// The rotation axis has (close to) zero length.
    #[error("cannot compute rotation matrix from a zero vector")]
    ZeroAxis,
}

/// Compute the rotation matrix from an axis and angle.
///
/// # Arguments
///
/// * `axis` - The axis of rotation, normalized internally.
/// * `angle` - The angle of rotation in radians.
///
/// # Returns
///
/// The rotation matrix.
///
/// Example:
///
/// ```
/// use glam::DVec3;
/// use pointreg_3d::transforms::axis_angle_to_rotation_matrix;
///
/// let rotation = axis_angle_to_rotation_matrix(DVec3::X, std::f64::consts::PI / 2.0).unwrap();
/// assert!(rotation.y_axis.abs_diff_eq(DVec3::Z, 1e-12));
/// ```
pub fn axis_angle_to_rotation_matrix(axis: DVec3, angle: f64) -> Result<DMat3, TransformError> {
    let magnitude = axis.length();
    if magnitude < 1e-10 {
        return Err(TransformError::ZeroAxis);
    }
    let DVec3 { x, y, z } = axis / magnitude;

    let c = angle.cos();
    let s = angle.sin();
    let t = 1.0 - c;

    let m00 = c + x * x * t;
    let m11 = c + y * y * t;
    let m22 = c + z * z * t;

    let tmp1 = x * y * t;
    let tmp2 = z * s;
    let m10 = tmp1 + tmp2;
    let m01 = tmp1 - tmp2;

    let tmp3 = x * z * t;
    let tmp4 = y * s;
    let m20 = tmp3 - tmp4;
    let m02 = tmp3 + tmp4;

    let tmp5 = y * z * t;
    let tmp6 = x * s;
    let m12 = tmp5 - tmp6;
    let m21 = tmp5 + tmp6;

    Ok(DMat3::from_cols(
        DVec3::new(m00, m10, m20),
        DVec3::new(m01, m11, m21),
        DVec3::new(m02, m12, m22),
    ))
}

/// Geodesic angle in radians between two rotations.
///
/// Returns `acos((trace(A^T B) - 1) / 2)`, clamped against round-off.
pub fn rotation_angle_between(a: &DMat3, b: &DMat3) -> f64 {
    let r = a.transpose() * *b;
    let trace = r.x_axis.x + r.y_axis.y + r.z_axis.z;
    ((trace - 1.0) / 2.0).clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_axis_angle_to_rotation_matrix() -> Result<(), Box<dyn std::error::Error>> {
        let rotation = axis_angle_to_rotation_matrix(DVec3::X, std::f64::consts::PI / 2.0)?;
        let expected = DMat3::from_cols(DVec3::X, DVec3::Z, -DVec3::Y);
        for j in 0..3 {
            for i in 0..3 {
                assert_relative_eq!(rotation.col(j)[i], expected.col(j)[i], epsilon = 1e-12);
            }
        }
        Ok(())
    }

    #[test]
    fn test_axis_angle_matches_glam() -> Result<(), Box<dyn std::error::Error>> {
        let axis = DVec3::new(1.0, 2.0, -0.5);
        let rotation = axis_angle_to_rotation_matrix(axis, 0.7)?;
        let expected = DMat3::from_axis_angle(axis.normalize(), 0.7);
        assert!(rotation.abs_diff_eq(expected, 1e-12));
        Ok(())
    }

    #[test]
    fn test_axis_angle_zero_axis() {
        let res = axis_angle_to_rotation_matrix(DVec3::ZERO, 0.1);
        assert_eq!(res.unwrap_err(), TransformError::ZeroAxis);
    }

    #[test]
    fn test_rotation_angle_between() {
        let a = DMat3::from_rotation_y(0.2);
        let b = DMat3::from_rotation_y(0.5);
        assert_relative_eq!(rotation_angle_between(&a, &b), 0.3, epsilon = 1e-9);
        assert_relative_eq!(rotation_angle_between(&a, &a), 0.0, epsilon = 1e-6);
    }
}
