use pointreg_3d::pointcloud::PointCloudError;

/// Errors raised by the registration pipeline.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum IcpError {
    /// The input point cloud is invalid.
    #[error(transparent)]
    PointCloud(#[from] PointCloudError),

    /// The iteration budget must be at least one.
    #[error("Invalid iteration budget: max_iterations must be positive")]
    InvalidIterationBudget,

    /// The correspondence map does not have one entry per source point.
    #[error("Correspondence map has {actual} entries, expected {expected}")]
    CorrespondenceLength {
        /// Number of source points.
        expected: usize,
        /// Length of the given map.
        actual: usize,
    },

    /// A correspondence points outside of the target cloud.
    #[error("Correspondence index {index} out of range for a target of {target_len} points")]
    CorrespondenceOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of target points.
        target_len: usize,
    },

    /// The cross-covariance matrix has rank lower than two.
    #[error("Degenerate geometry, singular values: {singular_values:?}")]
    DegenerateGeometry {
        /// Singular values of the cross-covariance matrix, descending.
        singular_values: [f64; 3],
    },
}
