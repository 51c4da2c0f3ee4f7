use argh::FromArgs;
use glam::DVec3;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::path::PathBuf;

use pointreg_3d::{pointcloud::PointCloud, transforms};
use pointreg_icp as picp;

#[derive(FromArgs)]
/// Run ICP on a synthetic rotated point cloud and dump the trajectory
struct Args {
    /// number of points in the source cloud
    #[argh(option, default = "200")]
    num_points: usize,

    /// rotation angle applied to build the target, in degrees
    #[argh(option, default = "10.0")]
    angle: f64,

    /// maximum number of ICP iterations
    #[argh(option, default = "50")]
    max_iterations: usize,

    /// seed of the random generator
    #[argh(option, default = "42")]
    seed: u64,

    /// use the left singular transpose rotation instead of Kabsch
    #[argh(switch)]
    legacy: bool,

    /// path to write the trajectory as json
    #[argh(option)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut rng = StdRng::seed_from_u64(args.seed);
    let points = (0..args.num_points)
        .map(|_| [rng.random::<f64>(), rng.random::<f64>(), rng.random::<f64>()])
        .collect::<Vec<_>>();

    let axis = DVec3::new(rng.random::<f64>(), rng.random::<f64>(), 1.0);
    let rotation = transforms::axis_angle_to_rotation_matrix(axis, args.angle.to_radians())?;
    let rotated = points
        .iter()
        .map(|p| (rotation * DVec3::from_array(*p)).to_array())
        .collect::<Vec<_>>();

    let source = PointCloud::from_points(points)?;
    let target = PointCloud::from_points(rotated)?;
    println!("Source cloud: #{} points", source.len());
    println!("Target cloud: #{} points", target.len());

    let mut config = picp::IcpConfig::new(args.max_iterations);
    if args.legacy {
        config.procrustes.method = picp::ProcrustesMethod::LeftSingularTranspose;
    }

    let trajectory = picp::icp(&source, &target, &config)?;
    println!(
        "ICP finished: {:?} after {} iterations",
        trajectory.state(),
        trajectory.num_iterations()
    );
    if let Some(rmse) = trajectory.rmse().last() {
        println!("Last rmse: {rmse:.6}");
    }

    let estimated = trajectory.last_alignment().rotation;
    log::info!("estimated rotation: {:?}", estimated);
    println!(
        "Rotation error: {:.6} deg",
        transforms::rotation_angle_between(&estimated, &rotation).to_degrees()
    );

    if let Some(path) = args.output {
        std::fs::write(&path, serde_json::to_string_pretty(&trajectory)?)?;
        println!("Trajectory written to {}", path.display());
    }

    Ok(())
}
