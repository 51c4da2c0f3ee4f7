use glam::{DMat3, DVec3};
use pointreg_3d::pointcloud::PointCloud;

use crate::{find_correspondences, procrustes_alignment, Alignment, IcpError, ProcrustesParams};

/// Structure to define the ICP parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IcpConfig {
    /// Maximum number of iterations to perform, regardless of convergence.
    pub max_iterations: usize,
    /// Parameters of the alignment step.
    pub procrustes: ProcrustesParams,
}

impl IcpConfig {
    /// Create a configuration with the given iteration budget and default alignment.
    pub fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            procrustes: ProcrustesParams::default(),
        }
    }
}

impl Default for IcpConfig {
    fn default() -> Self {
        Self::new(50)
    }
}

/// Terminal state of an ICP run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum IcpState {
    /// The correspondence map repeated between two iterations.
    Converged,
    /// The iteration budget ran out before the map repeated.
    Exhausted,
}

/// Full record of an ICP run.
///
/// Entry 0 of the centroid and rotation channels is the seed (zero centroids,
/// identity rotation), followed by one entry per completed iteration.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IcpTrajectory {
    source_centroids: Vec<DVec3>,
    target_centroids: Vec<DVec3>,
    rotations: Vec<DMat3>,
    correspondences: Vec<Vec<usize>>,
    rmse: Vec<f64>,
    state: IcpState,
}

impl IcpTrajectory {
    fn seed() -> Self {
        Self {
            source_centroids: vec![Alignment::IDENTITY.source_centroid],
            target_centroids: vec![Alignment::IDENTITY.target_centroid],
            rotations: vec![Alignment::IDENTITY.rotation],
            correspondences: Vec::new(),
            rmse: Vec::new(),
            state: IcpState::Exhausted,
        }
    }

    fn push(&mut self, alignment: Alignment, indices: Vec<usize>, rmse: f64) {
        self.source_centroids.push(alignment.source_centroid);
        self.target_centroids.push(alignment.target_centroid);
        self.rotations.push(alignment.rotation);
        self.correspondences.push(indices);
        self.rmse.push(rmse);
    }

    /// Number of entries, seed included.
    pub fn len(&self) -> usize {
        self.rotations.len()
    }

    /// Always false, the seed is always present.
    pub fn is_empty(&self) -> bool {
        self.rotations.is_empty()
    }

    /// Number of completed iterations, seed excluded.
    pub fn num_iterations(&self) -> usize {
        self.len() - 1
    }

    /// How the run terminated.
    pub fn state(&self) -> IcpState {
        self.state
    }

    /// True if the correspondence map stabilized within the budget.
    pub fn is_converged(&self) -> bool {
        self.state == IcpState::Converged
    }

    /// Centroid of the source at every entry.
    pub fn source_centroids(&self) -> &[DVec3] {
        &self.source_centroids
    }

    /// Centroid of the matched target points at every entry.
    pub fn target_centroids(&self) -> &[DVec3] {
        &self.target_centroids
    }

    /// Rotation estimate at every entry.
    pub fn rotations(&self) -> &[DMat3] {
        &self.rotations
    }

    /// Correspondence map that produced each completed iteration.
    ///
    /// Element `k` belongs to trajectory entry `k + 1`.
    pub fn correspondences(&self) -> &[Vec<usize>] {
        &self.correspondences
    }

    /// RMS nearest neighbour distance measured while finding each map.
    ///
    /// Element `k` belongs to trajectory entry `k + 1`.
    pub fn rmse(&self) -> &[f64] {
        &self.rmse
    }

    /// The alignment stored at entry `index`.
    pub fn alignment(&self, index: usize) -> Option<Alignment> {
        Some(Alignment {
            source_centroid: *self.source_centroids.get(index)?,
            target_centroid: *self.target_centroids.get(index)?,
            rotation: *self.rotations.get(index)?,
        })
    }

    /// The latest alignment, the seed if no iteration completed.
    pub fn last_alignment(&self) -> Alignment {
        self.alignment(self.num_iterations())
            .unwrap_or(Alignment::IDENTITY)
    }
}

/// Iterative Closest Point (ICP) algorithm using point to point distance.
///
/// Starting from the identity, each iteration matches every source point to its
/// nearest target point under the current alignment and solves the Procrustes
/// alignment of those matches. The loop stops as soon as a correspondence map equals
/// the previous one, or after `max_iterations` iterations.
///
/// # Arguments
///
/// * `source` - Source point cloud.
/// * `target` - Target point cloud.
/// * `config` - Iteration budget and alignment parameters.
///
/// # Returns
///
/// The trajectory of centroids and rotations, one entry per iteration plus the seed.
///
/// # Errors
///
/// Fails on a zero iteration budget or when an alignment step hits degenerate geometry.
pub fn icp(
    source: &PointCloud,
    target: &PointCloud,
    config: &IcpConfig,
) -> Result<IcpTrajectory, IcpError> {
    if config.max_iterations == 0 {
        return Err(IcpError::InvalidIterationBudget);
    }

    let mut trajectory = IcpTrajectory::seed();
    let mut current = Alignment::IDENTITY;
    let mut previous_indices: Option<Vec<usize>> = None;

    for i in 0..config.max_iterations {
        log::debug!("Iteration: {}", i + 1);
        let now = std::time::Instant::now();

        let correspondences = find_correspondences(
            source,
            target,
            current.source_centroid,
            current.target_centroid,
            &current.rotation,
        );
        let rmse = correspondences.rmse();
        let indices = correspondences.into_indices();

        if previous_indices.as_ref() == Some(&indices) {
            log::debug!(
                "ICP converged in {} iterations with error {}",
                trajectory.num_iterations(),
                rmse
            );
            trajectory.state = IcpState::Converged;
            return Ok(trajectory);
        }

        current = procrustes_alignment(source, target, &indices, &config.procrustes)?;
        log::debug!("rmse: {}", rmse);

        trajectory.push(current, indices.clone(), rmse);
        previous_indices = Some(indices);

        log::debug!("elapsed: {:?}", now.elapsed());
    }

    log::debug!(
        "ICP exhausted {} iterations without a stable correspondence map",
        config.max_iterations
    );
    Ok(trajectory)
}
