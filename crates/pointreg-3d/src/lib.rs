#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Conversions between dense and fixed-size matrix types.
pub mod linalg;

/// Operations on point clouds.
pub mod ops;

/// Point cloud container.
pub mod pointcloud;

/// 3D transforms algorithms.
pub mod transforms;
