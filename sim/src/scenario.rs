use bevy::math::{Quat, Vec3};
use bevy_log::info;
use ron::de::from_str;
use serde::{Deserialize, Serialize};
use shared::constants::{DEFAULT_PATCH_CELL_SCALE, DEFAULT_VOXEL_RESOLUTION};
use shared::hull::{voxelize, HullMesh, HullSampleSet};
use shared::physics::{BuoyancyConfig, ShipBuoyancy};
use shared::water::{WaterPatchConfig, WaveConfig, WavePreset};
use std::fs;
use std::path::{Path, PathBuf};

/// Patch side length relative to the hull's horizontal extent, so that a
/// yawed hull still fits inside it.
const PATCH_MARGIN: f32 = 1.5;

/// Where a ship's hull samples come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HullSource {
    /// Voxelize a box matching the ship's collider
    Cuboid { resolution: u32 },
    /// Voxelize a mesh file (`.obj` or RON) at startup
    Mesh { path: PathBuf, resolution: u32 },
    /// Precomputed sample file (`.ron` or `.hull`)
    Samples(PathBuf),
}

impl Default for HullSource {
    fn default() -> Self {
        HullSource::Cuboid {
            resolution: DEFAULT_VOXEL_RESOLUTION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipConfig {
    pub name: String,
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub mass: f32,
    /// Half size of the box collider
    pub half_extents: Vec3,
    pub hull: HullSource,
    pub buoyancy: BuoyancyConfig,
    /// Sized from the hull when absent
    pub patch: Option<WaterPatchConfig>,
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            name: "ship".into(),
            position: Vec3::new(0.0, 1.0, 0.0),
            rotation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            mass: 1.0,
            half_extents: Vec3::new(1.0, 0.4, 2.5),
            hull: HullSource::default(),
            // Floats with about half of its volume under water
            buoyancy: BuoyancyConfig {
                density: 2.0,
                ..Default::default()
            },
            patch: None,
        }
    }
}

impl ShipConfig {
    /// Load or generate the hull samples. Relative paths are resolved
    /// against `base_dir`.
    pub fn hull_samples(
        &self,
        base_dir: &Path,
    ) -> Result<HullSampleSet, Box<dyn std::error::Error>> {
        let samples = match &self.hull {
            HullSource::Cuboid { resolution } => {
                voxelize(&HullMesh::cuboid(self.half_extents), *resolution)?
            }
            HullSource::Mesh { path, resolution } => {
                let mesh = HullMesh::load(&base_dir.join(path))?;
                voxelize(&mesh, *resolution)?
            }
            HullSource::Samples(path) => HullSampleSet::load(&base_dir.join(path))?,
        };
        Ok(samples)
    }

    pub fn build_buoyancy(
        &self,
        base_dir: &Path,
    ) -> Result<ShipBuoyancy, Box<dyn std::error::Error>> {
        let samples = self.hull_samples(base_dir)?;
        let patch = self.patch.unwrap_or_else(|| {
            WaterPatchConfig::covering(
                samples.horizontal_extent() * PATCH_MARGIN,
                DEFAULT_PATCH_CELL_SCALE,
            )
        });

        info!(
            "Ship {}: {} hull samples (r={:.3}), {}x{} water patch",
            self.name,
            samples.len(),
            samples.radius(),
            patch.grid_width,
            patch.grid_length
        );
        Ok(ShipBuoyancy::new(samples, patch, self.buoyancy)?)
    }
}

/// Everything a simulation run needs, as stored in a scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Replaces `waves` when set
    pub preset: Option<WavePreset>,
    pub waves: WaveConfig,
    pub ships: Vec<ShipConfig>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            preset: Some(WavePreset::Ocean),
            waves: WaveConfig::new(0.0),
            ships: vec![
                ShipConfig {
                    name: "skiff".into(),
                    ..Default::default()
                },
                ShipConfig {
                    name: "barge".into(),
                    position: Vec3::new(12.0, 2.0, -4.0),
                    rotation: Quat::from_rotation_y(0.6),
                    half_extents: Vec3::new(2.5, 0.8, 5.0),
                    hull: HullSource::Cuboid { resolution: 12 },
                    buoyancy: BuoyancyConfig {
                        density: 3.0,
                        ..Default::default()
                    },
                    ..Default::default()
                },
            ],
        }
    }
}

impl ScenarioConfig {
    pub fn wave_config(&self) -> WaveConfig {
        match self.preset {
            Some(preset) => preset.to_config(self.waves.sea_level),
            None => self.waves.clone(),
        }
    }
}

/// Read a scenario file, or fall back to the built-in scenario when no path
/// is given. Returns the scenario and the directory relative paths in it
/// are resolved against.
pub fn load_scenario(
    path: Option<&Path>,
) -> Result<(ScenarioConfig, PathBuf), Box<dyn std::error::Error>> {
    let Some(path) = path else {
        info!("No scenario file given. Using the built-in scenario.");
        return Ok((ScenarioConfig::default(), PathBuf::from(".")));
    };

    let contents: String = fs::read_to_string(path)?;
    let scenario: ScenarioConfig = from_str(&contents)?;

    info!(
        "Loaded scenario {} with {} ships",
        path.display(),
        scenario.ships.len()
    );

    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((scenario, base_dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenario_builds() {
        let scenario = ScenarioConfig::default();
        assert!(scenario.wave_config().build().is_ok());
        for ship in &scenario.ships {
            let buoyancy = ship.build_buoyancy(Path::new(".")).unwrap();
            assert!(!buoyancy.samples().unwrap().is_empty(), "{}", ship.name);
        }
    }

    #[test]
    fn test_bundled_scenario_parses() {
        let scenario: ScenarioConfig = from_str(include_str!("../scenarios/harbor.ron")).unwrap();
        assert_eq!(scenario.ships.len(), 2);
        assert_eq!(scenario.preset, None);
        assert_eq!(scenario.waves.waves.len(), 2);
        assert!(scenario.wave_config().build().is_ok());

        let dinghy = &scenario.ships[1];
        assert_eq!(dinghy.name, "dinghy");
        assert_eq!(dinghy.hull, HullSource::Cuboid { resolution: 6 });
        // Fields left out fall back to defaults
        assert_eq!(dinghy.buoyancy.drag_coefficient, BuoyancyConfig::default().drag_coefficient);
        assert_eq!(dinghy.patch.unwrap().grid_width, 12);
    }

    #[test]
    fn test_bundled_scenario_builds() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/harbor.ron");
        let (scenario, base_dir) = load_scenario(Some(&path)).unwrap();

        for ship in &scenario.ships {
            let buoyancy = ship.build_buoyancy(&base_dir).unwrap();
            let samples = buoyancy.samples().unwrap();
            assert!(!samples.is_empty(), "{} has no samples", ship.name);
            for c in samples.centers() {
                assert!(c.y > -0.4 && c.y < 0.4, "{} sample {c:?} outside hull", ship.name);
            }
        }
    }

    #[test]
    fn test_patch_covers_hull() {
        let ship = ShipConfig::default();
        let buoyancy = ship.build_buoyancy(Path::new(".")).unwrap();
        let patch = buoyancy.patch();
        let extent = buoyancy.samples().unwrap().horizontal_extent();
        assert!(patch.world_width() >= extent * PATCH_MARGIN);
    }

    #[test]
    fn test_missing_files_are_errors() {
        assert!(load_scenario(Some(Path::new("/nonexistent/scenario.ron"))).is_err());

        let ship = ShipConfig {
            hull: HullSource::Samples("/nonexistent/ship.hull".into()),
            ..Default::default()
        };
        assert!(ship.build_buoyancy(Path::new(".")).is_err());
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let ship = ShipConfig {
            hull: HullSource::Cuboid { resolution: 0 },
            ..Default::default()
        };
        assert!(ship.build_buoyancy(Path::new(".")).is_err());
    }

    #[test]
    fn test_no_path_uses_builtin_scenario() {
        let (scenario, base_dir) = load_scenario(None).unwrap();
        assert_eq!(scenario, ScenarioConfig::default());
        assert_eq!(base_dir, PathBuf::from("."));
    }
}
