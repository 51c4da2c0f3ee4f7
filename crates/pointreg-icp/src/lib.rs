#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

mod correspondences;
pub use correspondences::*;

mod error;
pub use error::IcpError;

mod icp;
pub use icp::*;

mod procrustes;
pub use procrustes::*;
