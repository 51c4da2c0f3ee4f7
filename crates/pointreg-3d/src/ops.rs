use faer::{Mat, MatRef};
use glam::{DMat3, DVec3};

use crate::{linalg::dmat3_to_faer, pointcloud::PointCloud};

/// Compute the centroid of a point cloud.
///
/// # Arguments
///
/// * `points` - A non empty point cloud.
///
/// # Returns
///
/// The mean of all the points.
///
/// Example:
/// ```
/// use pointreg_3d::{ops::centroid, pointcloud::PointCloud};
///
/// let pc = PointCloud::from_points(vec![[1.0, 2.0, 3.0], [3.0, 4.0, 5.0]]).unwrap();
/// let c = centroid(&pc);
/// assert_eq!(c.to_array(), [2.0, 3.0, 4.0]);
/// ```
pub fn centroid(points: &PointCloud) -> DVec3 {
    let sum = (0..points.len()).fold(DVec3::ZERO, |acc, j| {
        acc + DVec3::new(points.read(0, j), points.read(1, j), points.read(2, j))
    });
    sum / points.len() as f64
}

/// Subtract `centroid` from every point, returning a new 3xN matrix.
pub fn center(points: &PointCloud, centroid: DVec3) -> Mat<f64> {
    Mat::<f64>::from_fn(3, points.len(), |i, j| points.read(i, j) - centroid[i])
}

/// Center the points on `centroid` and rotate them, `R * (X - c)`.
pub fn rotate_centered(points: &PointCloud, centroid: DVec3, rotation: &DMat3) -> Mat<f64> {
    let centered = center(points, centroid);
    let rotation = dmat3_to_faer(rotation);
    rotation.as_ref() * centered.as_ref()
}

/// Squared euclidean norm of every column of a matrix.
pub fn squared_column_norms(mat: MatRef<'_, f64>) -> Vec<f64> {
    (0..mat.ncols())
        .map(|j| {
            (0..mat.nrows())
                .map(|i| mat.read(i, j) * mat.read(i, j))
                .sum::<f64>()
        })
        .collect()
}
