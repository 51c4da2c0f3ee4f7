use glam::{DMat3, DVec3};
use pointreg_3d::{
    linalg::faer_to_dmat3,
    ops::{center, centroid},
    pointcloud::PointCloud,
};

use crate::IcpError;

/// Formula used to turn the SVD of the cross-covariance into a rotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ProcrustesMethod {
    /// `R = V * diag(1, 1, det(V * U^T)) * U^T`, always a proper rotation.
    #[default]
    Kabsch,
    /// `R = U^T`, the transpose of the left singular vectors.
    ///
    /// Orthonormal but not guaranteed to be a proper rotation, and it only recovers
    /// the true rotation when the source covariance is aligned with the axes.
    /// Kept to reproduce trajectories computed with this formulation.
    LeftSingularTranspose,
}

/// Parameters of the Procrustes alignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcrustesParams {
    /// Rotation formula.
    pub method: ProcrustesMethod,
    /// Relative threshold on the second singular value below which the
    /// cross-covariance is considered rank deficient.
    pub degeneracy_tolerance: f64,
}

impl Default for ProcrustesParams {
    fn default() -> Self {
        Self {
            method: ProcrustesMethod::Kabsch,
            degeneracy_tolerance: 1e-9,
        }
    }
}

/// Rigid alignment of a centered source onto a centered target.
///
/// A source point `p` maps into the target frame as `rotation * (p - source_centroid) + target_centroid`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Alignment {
    /// Centroid of the source points.
    pub source_centroid: DVec3,
    /// Centroid of the matched target points.
    pub target_centroid: DVec3,
    /// Rotation from the centered source to the centered target.
    pub rotation: DMat3,
}

impl Alignment {
    /// Zero centroids and identity rotation.
    pub const IDENTITY: Self = Self {
        source_centroid: DVec3::ZERO,
        target_centroid: DVec3::ZERO,
        rotation: DMat3::IDENTITY,
    };
}

/// Compute the Procrustes alignment of the source onto its matched target points.
///
/// The algorithm:
/// 1. Gather the matched target points `Y[:, indices]`
/// 2. Compute the centroids of the source and of the matched target
/// 3. Compute the cross-covariance matrix H = Σ[(src - src_mean) * (dst - dst_mean)^T]
/// 4. Compute the SVD of H = U * S * V^T
/// 5. Build the rotation from U and V according to [`ProcrustesMethod`]
///
/// For more details, see: Arun, K., Huang, T. S., and Blostein, S. D.
/// "Least-squares fitting of two 3-D point sets." IEEE PAMI, 1987.
///
/// # Arguments
///
/// * `source` - Source point cloud with M points.
/// * `target` - Target point cloud with N points.
/// * `indices` - Correspondence map, M entries in `[0, N)`.
/// * `params` - Rotation formula and degeneracy threshold.
///
/// # Errors
///
/// Fails when the map does not match the clouds, or when the cross-covariance has
/// rank lower than two (single point, colinear points).
pub fn procrustes_alignment(
    source: &PointCloud,
    target: &PointCloud,
    indices: &[usize],
    params: &ProcrustesParams,
) -> Result<Alignment, IcpError> {
    if indices.len() != source.len() {
        return Err(IcpError::CorrespondenceLength {
            expected: source.len(),
            actual: indices.len(),
        });
    }
    if let Some(&index) = indices.iter().find(|&&idx| idx >= target.len()) {
        return Err(IcpError::CorrespondenceOutOfRange {
            index,
            target_len: target.len(),
        });
    }

    let target_matched = target.select(indices)?;

    let source_centroid = centroid(source);
    let target_centroid = centroid(&target_matched);

    let source_centered = center(source, source_centroid);
    let target_centered = center(&target_matched, target_centroid);

    // cross-covariance H = X' * Y'^T
    let h = source_centered.as_ref() * target_centered.transpose();

    let svd = h.svd();
    let s = svd.s_diagonal();
    let mut singular_values = [s.read(0), s.read(1), s.read(2)];
    singular_values.sort_by(|a, b| b.total_cmp(a));
    log::trace!("cross-covariance singular values: {:?}", singular_values);

    if singular_values.iter().any(|s| !s.is_finite())
        || singular_values[0] <= 0.0
        || singular_values[1] <= params.degeneracy_tolerance * singular_values[0]
    {
        return Err(IcpError::DegenerateGeometry { singular_values });
    }

    let u = faer_to_dmat3(svd.u());
    let v = faer_to_dmat3(svd.v());

    let rotation = match params.method {
        ProcrustesMethod::Kabsch => {
            // flip the least significant axis if V * U^T is a reflection
            let d = (v * u.transpose()).determinant();
            let correction = DMat3::from_diagonal(DVec3::new(1.0, 1.0, d.signum()));
            v * correction * u.transpose()
        }
        ProcrustesMethod::LeftSingularTranspose => {
            let rotation = u.transpose();
            if rotation.determinant() < 0.0 {
                log::debug!("left singular transpose produced a reflection");
            }
            rotation
        }
    };

    Ok(Alignment {
        source_centroid,
        target_centroid,
        rotation,
    })
}
