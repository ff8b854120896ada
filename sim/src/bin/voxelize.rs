use clap::Parser;
use shared::constants::DEFAULT_VOXEL_RESOLUTION;
use sim::bake::bake_hull_samples;
use std::path::PathBuf;

/// Fill a closed hull mesh with spheres and write the sample file.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Hull mesh (.obj or RON)
    mesh: PathBuf,

    /// Cells along the longest axis of the mesh
    #[arg(short, long, default_value_t = DEFAULT_VOXEL_RESOLUTION)]
    resolution: u32,

    /// Output file; `.hull` is binary, anything else RON. Defaults to the
    /// mesh path with a `.hull` extension.
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    match bake_hull_samples(&args.mesh, args.resolution, args.out.as_deref()) {
        Ok((path, samples)) => {
            println!(
                "Wrote {} samples (radius {}) to {}",
                samples.len(),
                samples.radius(),
                path.display()
            );
        }
        Err(err) => {
            eprintln!("Failed to voxelize {}: {err}", args.mesh.display());
            std::process::exit(1);
        }
    }
}
