//! Hull sample sets.
//!
//! A hull is approximated by equally sized spheres whose centers are given in
//! the hull's local space. Sets are produced offline by the
//! [`voxelizer`] and loaded unchanged at runtime.

pub mod voxelizer;

use bevy::math::Vec3;
use bevy_log::info;
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::constants::HULL_SAMPLES_FILE_EXTENSION;
use crate::errors::ConfigError;
use crate::utils::format_bytes;
use crate::{decode_payload, encode_payload};

pub use voxelizer::{voxelize, HullMesh};

/// Sphere centers (hull local space) sharing one radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HullSampleSet {
    radius: f32,
    centers: Vec<Vec3>,
}

impl HullSampleSet {
    pub fn new(centers: Vec<Vec3>, radius: f32) -> Result<Self, ConfigError> {
        let set = Self { radius, centers };
        set.validate()?;
        Ok(set)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(ConfigError::InvalidRadius(self.radius));
        }
        Ok(())
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn centers(&self) -> &[Vec3] {
        &self.centers
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Local-space bounds of the spheres as `(min, max)`, None when empty.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.centers.first()?;
        let (min, max) = self
            .centers
            .iter()
            .fold((first, first), |(min, max), c| (min.min(*c), max.max(*c)));
        Some((min - Vec3::splat(self.radius), max + Vec3::splat(self.radius)))
    }

    /// Largest horizontal extent of the set; handy for sizing a water patch.
    pub fn horizontal_extent(&self) -> f32 {
        self.bounds()
            .map(|(min, max)| {
                let size = max - min;
                size.x.max(size.z)
            })
            .unwrap_or(0.0)
    }

    /// Compact binary form (bincode, lz4 compressed).
    pub fn to_payload(&self) -> Result<Vec<u8>, bincode::Error> {
        encode_payload(self)
    }

    pub fn from_payload(payload: &[u8]) -> Result<Self, Box<dyn std::error::Error>> {
        let set: Self = decode_payload(payload)?;
        set.validate()?;
        Ok(set)
    }

    /// Write to `path`; `.hull` files get the binary form, anything else RON.
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if is_binary_path(path) {
            fs::write(path, self.to_payload()?)?;
        } else {
            let pretty_config = PrettyConfig::new()
                .with_depth_limit(2)
                .with_separate_tuple_members(false)
                .with_enumerate_arrays(false);
            let serialized = ron::ser::to_string_pretty(self, pretty_config)?;
            fs::write(path, serialized)?;
        }
        info!(
            "Saved {} hull samples (r={}) to {} ({})",
            self.len(),
            self.radius,
            path.display(),
            format_bytes(fs::metadata(path)?.len())
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let set = if is_binary_path(path) {
            Self::from_payload(&fs::read(path)?)?
        } else {
            let contents = fs::read_to_string(path)?;
            let set: Self = ron::de::from_str(&contents)?;
            set.validate()?;
            set
        };
        info!("Loaded {} hull samples from {}", set.len(), path.display());
        Ok(set)
    }
}

fn is_binary_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == HULL_SAMPLES_FILE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> HullSampleSet {
        HullSampleSet::new(
            vec![
                Vec3::new(-1.0, -0.5, 2.0),
                Vec3::new(1.0, -0.5, 2.0),
                Vec3::new(0.0, 0.25, -2.5),
            ],
            0.25,
        )
        .unwrap()
    }

    #[test]
    fn test_negative_radius_rejected() {
        assert_eq!(
            HullSampleSet::new(vec![Vec3::ZERO], -0.1).unwrap_err(),
            ConfigError::InvalidRadius(-0.1)
        );
        assert!(HullSampleSet::new(vec![Vec3::ZERO], f32::NAN).is_err());
        assert!(HullSampleSet::new(Vec::new(), 0.0).is_ok());
    }

    #[test]
    fn test_bounds_include_radius() {
        let (min, max) = sample_set().bounds().unwrap();
        assert_eq!(min, Vec3::new(-1.25, -0.75, -2.75));
        assert_eq!(max, Vec3::new(1.25, 0.5, 2.25));
        assert_eq!(sample_set().horizontal_extent(), 5.0);
        assert!(HullSampleSet::new(Vec::new(), 1.0).unwrap().bounds().is_none());
    }

    #[test]
    fn test_binary_payload_keeps_order() {
        let set = sample_set();
        let decoded = HullSampleSet::from_payload(&set.to_payload().unwrap()).unwrap();
        assert_eq!(decoded, set);
    }

    #[test]
    fn test_ron_file_round_trip() {
        let dir = std::env::temp_dir().join(format!("hull_samples_test_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let set = sample_set();
        for name in ["ship.ron", "ship.hull"] {
            let path = dir.join(name);
            set.save(&path).unwrap();
            assert_eq!(HullSampleSet::load(&path).unwrap(), set, "{name}");
        }

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_corrupt_payload_is_an_error() {
        assert!(HullSampleSet::from_payload(&[1, 2, 3]).is_err());
    }
}
