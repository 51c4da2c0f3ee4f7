use glam::{DMat3, DVec3};
use pointreg_3d::{
    ops::{center, rotate_centered, squared_column_norms},
    pointcloud::PointCloud,
};

/// Nearest neighbour assignment of every source point to a target point.
#[derive(Debug, Clone, PartialEq)]
pub struct Correspondences {
    indices: Vec<usize>,
    squared_distances: Vec<f64>,
}

impl Correspondences {
    /// Index of the matched target point, one entry per source point.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Squared distance to the matched target point, one entry per source point.
    pub fn squared_distances(&self) -> &[f64] {
        &self.squared_distances
    }

    /// Number of source points.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True when there are no source points.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Root mean squared distance between matched points.
    pub fn rmse(&self) -> f64 {
        if self.squared_distances.is_empty() {
            return 0.0;
        }
        (self.squared_distances.iter().sum::<f64>() / self.squared_distances.len() as f64).sqrt()
    }

    /// Consume and return the correspondence map.
    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }
}

/// Find for each source point the index of its nearest target point.
///
/// The source is centered on `source_centroid` and rotated by `rotation`, the target
/// is centered on `target_centroid`. Squared distances are computed through
/// `|a - b|^2 = |a|^2 + |b|^2 - 2 a.b` with a single MxN product, and ties are
/// resolved towards the lowest target index.
///
/// # Arguments
///
/// * `source` - Source point cloud with M points.
/// * `target` - Target point cloud with N points.
/// * `source_centroid` - Centroid subtracted from the source.
/// * `target_centroid` - Centroid subtracted from the target.
/// * `rotation` - Current estimate of the rotation from the source to the target frame.
///
/// # Returns
///
/// The M correspondences and their squared distances.
pub fn find_correspondences(
    source: &PointCloud,
    target: &PointCloud,
    source_centroid: DVec3,
    target_centroid: DVec3,
    rotation: &DMat3,
) -> Correspondences {
    let source_in_target = rotate_centered(source, source_centroid, rotation);
    let target_centered = center(target, target_centroid);

    // each cell (i, j) is the dot product between source i and target j
    let dots = source_in_target.transpose() * target_centered.as_ref();

    let source_norms = squared_column_norms(source_in_target.as_ref());
    let target_norms = squared_column_norms(target_centered.as_ref());

    let (indices, squared_distances): (Vec<usize>, Vec<f64>) = source_norms
        .iter()
        .enumerate()
        .map(|(i, &xx)| {
            let mut best_index = 0;
            let mut best_dist = f64::INFINITY;
            for (j, &yy) in target_norms.iter().enumerate() {
                let dist = xx + yy - 2.0 * dots.read(i, j);
                if dist < best_dist {
                    best_index = j;
                    best_dist = dist;
                }
            }
            // cancellation can push exact matches slightly below zero
            (best_index, best_dist.max(0.0))
        })
        .unzip();

    Correspondences {
        indices,
        squared_distances,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn find_raw(source: &PointCloud, target: &PointCloud) -> Correspondences {
        find_correspondences(source, target, DVec3::ZERO, DVec3::ZERO, &DMat3::IDENTITY)
    }

    #[test]
    fn test_find_correspondences() -> Result<(), Box<dyn std::error::Error>> {
        let source = PointCloud::from_points(vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
        ])?;
        let target = PointCloud::from_points(vec![[1.0, 0.0, 0.0], [1.0, 1.0, 0.0]])?;

        let corr = find_raw(&source, &target);
        assert_eq!(corr.len(), 4);
        assert_eq!(corr.indices(), &[0, 0, 1, 1]);
        assert_eq!(corr.squared_distances(), &[1.0, 0.0, 1.0, 0.0]);
        assert_relative_eq!(corr.rmse(), 0.5f64.sqrt());
        Ok(())
    }

    #[test]
    fn test_find_correspondences_tie_takes_lowest_index() -> Result<(), Box<dyn std::error::Error>>
    {
        let source = PointCloud::from_points(vec![[0.5, 0.0, 0.0]])?;
        let target = PointCloud::from_points(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]])?;
        assert_eq!(find_raw(&source, &target).indices(), &[0]);

        let target = PointCloud::from_points(vec![[1.0, 0.0, 0.0], [0.0, 0.0, 0.0]])?;
        assert_eq!(find_raw(&source, &target).indices(), &[0]);
        Ok(())
    }

    #[test]
    fn test_find_correspondences_source_smaller_than_target(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let source = PointCloud::from_points(vec![[0.1, 0.0, 0.0], [2.9, 0.0, 0.0]])?;
        let target = PointCloud::from_points(vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [3.0, 0.0, 0.0],
        ])?;
        assert_eq!(find_raw(&source, &target).indices(), &[0, 3]);
        Ok(())
    }

    #[test]
    fn test_find_correspondences_single_point() -> Result<(), Box<dyn std::error::Error>> {
        let source = PointCloud::from_points(vec![[1.0, 2.0, 3.0]])?;
        let target = PointCloud::from_points(vec![[-4.0, 5.0, 0.5]])?;
        assert_eq!(find_raw(&source, &target).into_indices(), vec![0]);
        Ok(())
    }

    #[test]
    fn test_find_correspondences_uses_centroids_and_rotation(
    ) -> Result<(), Box<dyn std::error::Error>> {
        // the source lies along x, the target along y, both shifted away from the origin
        let source = PointCloud::from_points(vec![
            [9.0, 0.0, 0.0],
            [10.0, 0.0, 0.0],
            [12.0, 0.0, 0.0],
        ])?;
        let target = PointCloud::from_points(vec![
            [0.0, -3.0, 5.0],
            [0.0, 2.5, 5.0],
            [0.0, -2.0, 5.0],
        ])?;

        // without an alignment every source point is closest to the same target point
        assert_eq!(find_raw(&source, &target).indices(), &[2, 2, 2]);

        let rotation = DMat3::from_rotation_z(std::f64::consts::FRAC_PI_2);
        let corr = find_correspondences(
            &source,
            &target,
            DVec3::new(10.0, 0.0, 0.0),
            DVec3::new(0.0, 0.0, 5.0),
            &rotation,
        );
        assert_eq!(corr.indices(), &[2, 2, 1]);
        assert_relative_eq!(corr.squared_distances()[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(corr.squared_distances()[1], 4.0, epsilon = 1e-9);
        assert_relative_eq!(corr.squared_distances()[2], 0.25, epsilon = 1e-9);
        Ok(())
    }
}
