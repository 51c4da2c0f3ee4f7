use faer::{Mat, MatRef};
use glam::{DMat3, DVec3};

/// Utility function to convert a glam 3x3 matrix to a dense faer matrix.
///
/// # Arguments
///
/// * `mat` - A column-major glam matrix.
///
/// # Returns
///
/// A faer matrix 3x3 with the same entries.
pub fn dmat3_to_faer(mat: &DMat3) -> Mat<f64> {
    Mat::<f64>::from_fn(3, 3, |i, j| mat.col(j)[i])
}

/// Utility function to convert a 3x3 faer matrix to a glam matrix.
///
/// PRECONDITION: `mat` is 3x3.
pub fn faer_to_dmat3(mat: MatRef<'_, f64>) -> DMat3 {
    assert_eq!((mat.nrows(), mat.ncols()), (3, 3));
    DMat3::from_cols(
        DVec3::new(mat.read(0, 0), mat.read(1, 0), mat.read(2, 0)),
        DVec3::new(mat.read(0, 1), mat.read(1, 1), mat.read(2, 1)),
        DVec3::new(mat.read(0, 2), mat.read(1, 2), mat.read(2, 2)),
    )
}

/// Check that `R * R^T` equals the identity within `epsilon`.
pub fn is_orthonormal(rotation: &DMat3, epsilon: f64) -> bool {
    (*rotation * rotation.transpose()).abs_diff_eq(DMat3::IDENTITY, epsilon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dmat3_faer_conversion() {
        let m = DMat3::from_cols_array_2d(&[[1.0, 4.0, 7.0], [2.0, 5.0, 8.0], [3.0, 6.0, 9.0]]);
        let f = dmat3_to_faer(&m);
        assert_eq!(f.read(0, 0), 1.0);
        assert_eq!(f.read(0, 1), 2.0);
        assert_eq!(f.read(1, 0), 4.0);
        assert_eq!(f.read(2, 2), 9.0);
        assert_eq!(faer_to_dmat3(f.as_ref()), m);
    }

    #[test]
    fn test_is_orthonormal() {
        assert!(is_orthonormal(&DMat3::IDENTITY, 1e-12));
        assert!(is_orthonormal(&DMat3::from_rotation_z(0.3), 1e-12));
        assert!(is_orthonormal(
            &DMat3::from_diagonal(DVec3::new(1.0, -1.0, 1.0)),
            1e-12
        ));
        assert!(!is_orthonormal(
            &DMat3::from_diagonal(DVec3::new(2.0, 1.0, 1.0)),
            1e-6
        ));
    }
}
