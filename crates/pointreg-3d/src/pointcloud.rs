use faer::Mat;
use glam::DVec3;

/// Number of coordinates per point.
pub const POINT_DIM: usize = 3;

/// Errors raised when building or indexing a point cloud.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PointCloudError {
    /// The point cloud has no points.
    #[error("Pointcloud data is empty")]
    EmptyData,

    /// The matrix does not have one row per coordinate.
    #[error("Invalid pointcloud dimension: expected 3 rows, got {0}")]
    InvalidDimension(usize),

    /// A coordinate is NaN or infinite.
    #[error("Pointcloud contains a non finite value at point {index}")]
    NonFiniteValue {
        /// Index of the offending point.
        index: usize,
    },

    /// A point index is outside the cloud.
    #[error("Point index {index} out of range for a pointcloud of {len} points")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of points in the cloud.
        len: usize,
    },
}

/// A point cloud stored as a dense 3xN matrix, one column per point.
///
/// The cloud is never empty and every coordinate is finite.
#[derive(Debug, Clone)]
pub struct PointCloud(Mat<f64>);

impl PointCloud {
    /// Create a point cloud from a list of points.
    ///
    /// Example:
    ///
    /// ```
    /// use pointreg_3d::pointcloud::PointCloud;
    ///
    /// let pc = PointCloud::from_points(vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
    /// assert_eq!(pc.len(), 2);
    /// ```
    pub fn from_points(points: Vec<[f64; 3]>) -> Result<Self, PointCloudError> {
        if points.is_empty() {
            return Err(PointCloudError::EmptyData);
        }
        let mat = Mat::<f64>::from_fn(POINT_DIM, points.len(), |i, j| points[j][i]);
        Self::from_mat(mat)
    }

    /// Create a point cloud from a 3xN matrix.
    pub fn from_mat(mat: Mat<f64>) -> Result<Self, PointCloudError> {
        if mat.nrows() != POINT_DIM {
            return Err(PointCloudError::InvalidDimension(mat.nrows()));
        }
        if mat.ncols() == 0 {
            return Err(PointCloudError::EmptyData);
        }
        for j in 0..mat.ncols() {
            if (0..POINT_DIM).any(|i| !mat.read(i, j).is_finite()) {
                return Err(PointCloudError::NonFiniteValue { index: j });
            }
        }
        Ok(Self(mat))
    }

    /// Get the number of points in the point cloud.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.ncols()
    }

    /// Check if the point cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.ncols() == 0
    }

    /// Get the point at column `index`.
    pub fn point(&self, index: usize) -> Result<DVec3, PointCloudError> {
        if index >= self.len() {
            return Err(PointCloudError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(DVec3::new(
            self.0.read(0, index),
            self.0.read(1, index),
            self.0.read(2, index),
        ))
    }

    /// Gather the points at `indices` into a new cloud, repeats allowed.
    pub fn select(&self, indices: &[usize]) -> Result<Self, PointCloudError> {
        if indices.is_empty() {
            return Err(PointCloudError::EmptyData);
        }
        if let Some(&index) = indices.iter().find(|&&idx| idx >= self.len()) {
            return Err(PointCloudError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(Self(Mat::<f64>::from_fn(
            POINT_DIM,
            indices.len(),
            |i, j| self.0.read(i, indices[j]),
        )))
    }

    /// Copy the points out as a list of arrays.
    pub fn to_points(&self) -> Vec<[f64; 3]> {
        (0..self.len())
            .map(|j| [self.0.read(0, j), self.0.read(1, j), self.0.read(2, j)])
            .collect()
    }
}

impl std::ops::Deref for PointCloud {
    type Target = Mat<f64>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
