//! Offline hull baking: mesh in, persisted sample set out.

use shared::constants::HULL_SAMPLES_FILE_EXTENSION;
use shared::hull::{voxelize, HullMesh, HullSampleSet};
use std::path::{Path, PathBuf};

/// Voxelize the mesh at `mesh_path` and save the samples to `out`, or next
/// to the mesh with a `.hull` extension.
pub fn bake_hull_samples(
    mesh_path: &Path,
    resolution: u32,
    out: Option<&Path>,
) -> Result<(PathBuf, HullSampleSet), Box<dyn std::error::Error>> {
    let mesh = HullMesh::load(mesh_path)?;
    let samples = voxelize(&mesh, resolution)?;

    let out_path = match out {
        Some(path) => path.to_path_buf(),
        None => mesh_path.with_extension(HULL_SAMPLES_FILE_EXTENSION),
    };
    samples.save(&out_path)?;

    Ok((out_path, samples))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_bake_writes_loadable_samples() {
        let dir = std::env::temp_dir().join(format!("bake_test_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let mesh_path = dir.join("box.ron");
        let mesh = HullMesh::cuboid(bevy::math::Vec3::new(1.0, 0.5, 2.0));
        fs::write(&mesh_path, ron::ser::to_string(&mesh).unwrap()).unwrap();

        let (path, samples) = bake_hull_samples(&mesh_path, 8, None).unwrap();
        assert_eq!(path, dir.join("box.hull"));
        assert_eq!(HullSampleSet::load(&path).unwrap(), samples);

        let ron_path = dir.join("box_samples.ron");
        let (path, _) = bake_hull_samples(&mesh_path, 8, Some(&ron_path)).unwrap();
        assert_eq!(HullSampleSet::load(&path).unwrap(), samples);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_bake_rejects_zero_resolution() {
        let mesh_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/hulls/skiff.obj");
        let out = std::env::temp_dir().join("never_written.hull");
        assert!(bake_hull_samples(&mesh_path, 0, Some(&out)).is_err());
        assert!(!out.exists());
    }
}
