//! Sphere-sampled buoyancy force model.
//!
//! Every tick the hull samples are placed in world space, their submerged
//! volume is computed against the body's [`WaterPatch`], and four
//! aggregated contributions are produced: buoyancy, slamming, viscous drag
//! and angular drag. Gravity is added as a plain force. Everything is
//! computed from a single [`BodySnapshot`] and only then applied.
//!
//! Sample-weighted sums are divided by the total sample count, so the
//! buoyant force can never exceed `gravity * density` however finely the
//! hull is sampled.

use bevy::math::Vec3;
use bevy_ecs::component::Component;
use serde::{Deserialize, Serialize};

use super::body::{BodySnapshot, RigidBodyHandle};
use super::sphere::{filled_sphere_centroid_offset, filled_sphere_volume, full_sphere_volume};
use crate::constants::{
    DEFAULT_ANGULAR_DRAG_COEFFICIENT, DEFAULT_AVERAGE_WIDTH, DEFAULT_DRAG_COEFFICIENT,
    DEFAULT_GRAVITY, DEFAULT_SLAM_COEFFICIENT, DEFAULT_SLAM_ESTIMATION_TIME,
    DEFAULT_WATER_DENSITY, FILL_RATIO_EPSILON,
};
use crate::errors::ConfigError;
use crate::hull::HullSampleSet;
use crate::water::{WaterPatch, WaterPatchConfig, WaveField};

/// Per-body constants of the force model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuoyancyConfig {
    pub gravity: f32,
    pub density: f32,
    pub drag_coefficient: f32,
    pub angular_drag_coefficient: f32,
    /// Lever arm of the angular drag term
    pub average_width: f32,
    /// How far back in time a sample is extrapolated to detect water entry
    pub slam_estimation_time: f32,
    pub slam_coefficient: f32,
    /// Current of the surrounding water
    pub water_velocity: Vec3,
}

impl Default for BuoyancyConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            density: DEFAULT_WATER_DENSITY,
            drag_coefficient: DEFAULT_DRAG_COEFFICIENT,
            angular_drag_coefficient: DEFAULT_ANGULAR_DRAG_COEFFICIENT,
            average_width: DEFAULT_AVERAGE_WIDTH,
            slam_estimation_time: DEFAULT_SLAM_ESTIMATION_TIME,
            slam_coefficient: DEFAULT_SLAM_COEFFICIENT,
            water_velocity: Vec3::ZERO,
        }
    }
}

impl BuoyancyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let constants = [
            ("gravity", self.gravity),
            ("density", self.density),
            ("drag_coefficient", self.drag_coefficient),
            ("angular_drag_coefficient", self.angular_drag_coefficient),
            ("average_width", self.average_width),
            ("slam_estimation_time", self.slam_estimation_time),
            ("slam_coefficient", self.slam_coefficient),
        ];
        for (name, value) in constants {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidBuoyancyConstant { name, value });
            }
        }
        if !self.water_velocity.is_finite() {
            return Err(ConfigError::InvalidBuoyancyConstant {
                name: "water_velocity",
                value: self.water_velocity.length(),
            });
        }
        Ok(())
    }
}

/// What one hull sample saw during the last tick. Plain data for
/// visualizers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SampleState {
    pub world_center: Vec3,
    pub water_height: f32,
    pub depth: f32,
    pub volume: f32,
    pub filled_ratio: f32,
    pub centroid: Vec3,
    pub velocity: Vec3,
    pub slamming: bool,
}

/// A force applied at a world point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedForce {
    pub force: Vec3,
    pub point: Vec3,
}

/// Aggregated output of one tick, before it is handed to the body.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BuoyancyForces {
    pub buoyancy: Option<AppliedForce>,
    pub slam: Option<AppliedForce>,
    pub drag: Option<AppliedForce>,
    pub angular_drag: Vec3,
    pub gravity: Vec3,
}

impl BuoyancyForces {
    pub fn gravity_only(config: &BuoyancyConfig) -> Self {
        Self {
            gravity: Vec3::new(0.0, -config.gravity, 0.0),
            ..Default::default()
        }
    }

    /// Submit every contribution to `body` in one batch.
    pub fn apply(&self, body: &mut impl RigidBodyHandle) {
        for applied in [self.buoyancy, self.slam, self.drag].into_iter().flatten() {
            body.add_force_at_position(applied.force, applied.point);
        }
        body.add_torque(self.angular_drag);
        body.add_force(self.gravity);
    }

    pub fn net_force(&self) -> Vec3 {
        [self.buoyancy, self.slam, self.drag]
            .into_iter()
            .flatten()
            .map(|applied| applied.force)
            .sum::<Vec3>()
            + self.gravity
    }
}

/// Running weighted sum of forces and application points.
#[derive(Default)]
struct WeightedForce {
    force: Vec3,
    point: Vec3,
    weight: f32,
}

impl WeightedForce {
    #[inline]
    fn add(&mut self, force: Vec3, point: Vec3, weight: f32) {
        self.force += force;
        self.point += point * weight;
        self.weight += weight;
    }

    fn finish(self, sample_count: usize) -> Option<AppliedForce> {
        if self.weight <= 0.0 || sample_count == 0 {
            return None;
        }
        Some(AppliedForce {
            force: self.force / sample_count as f32,
            point: self.point / self.weight,
        })
    }
}

/// Compute this tick's forces without touching the body.
///
/// `states` is overwritten with one entry per sample.
pub fn compute_forces(
    snapshot: &BodySnapshot,
    samples: &HullSampleSet,
    patch: &WaterPatch,
    config: &BuoyancyConfig,
    states: &mut Vec<SampleState>,
) -> BuoyancyForces {
    states.clear();
    let mut forces = BuoyancyForces::gravity_only(config);

    let sample_count = samples.len();
    if sample_count == 0 {
        return forces;
    }

    let radius = samples.radius();
    let sphere_volume = full_sphere_volume(radius);
    let mut buoyancy = WeightedForce::default();
    let mut slam = WeightedForce::default();
    let mut drag = WeightedForce::default();
    let mut angular_drag = Vec3::ZERO;
    let width_squared = config.average_width * config.average_width;

    for local in samples.centers() {
        let center = snapshot.pose.transform_point(*local);
        let water_height = patch.height_at(center.x, center.z);
        let bottom = center.y - radius;
        let depth = (water_height - bottom).clamp(0.0, 2.0 * radius);

        let volume = filled_sphere_volume(radius, depth);
        let filled_ratio = if sphere_volume > 0.0 {
            volume / sphere_volume
        } else {
            0.0
        };
        let centroid = center + Vec3::Y * filled_sphere_centroid_offset(radius, depth);
        let velocity = snapshot.point_velocity(center);

        if filled_ratio > FILL_RATIO_EPSILON {
            buoyancy.add(
                Vec3::Y * config.gravity * config.density * filled_ratio,
                centroid,
                filled_ratio,
            );
        }

        let previous_bottom = (center - velocity * config.slam_estimation_time).y - radius;
        let slamming = water_height >= bottom && water_height < previous_bottom;
        if slamming {
            let impact = (-velocity.y).max(0.0).sqrt() * config.slam_coefficient;
            slam.add(Vec3::Y * impact * volume, centroid, volume);
        }

        drag.add(
            config.drag_coefficient
                * snapshot.mass
                * filled_ratio
                * (config.water_velocity - velocity),
            centroid,
            filled_ratio,
        );
        angular_drag += config.angular_drag_coefficient
            * snapshot.mass
            * filled_ratio
            * width_squared
            * -snapshot.angular_velocity;

        states.push(SampleState {
            world_center: center,
            water_height,
            depth,
            volume,
            filled_ratio,
            centroid,
            velocity,
            slamming,
        });
    }

    forces.buoyancy = buoyancy.finish(sample_count);
    forces.slam = slam.finish(sample_count);
    forces.drag = drag.finish(sample_count);
    forces.angular_drag = angular_drag / sample_count as f32;
    forces
}

/// Buoyancy state owned by one floating body.
#[derive(Component, Debug, Clone)]
pub struct ShipBuoyancy {
    samples: Option<HullSampleSet>,
    patch: WaterPatch,
    config: BuoyancyConfig,
    sample_states: Vec<SampleState>,
    last_forces: BuoyancyForces,
}

impl ShipBuoyancy {
    pub fn new(
        samples: HullSampleSet,
        patch_config: WaterPatchConfig,
        config: BuoyancyConfig,
    ) -> Result<Self, ConfigError> {
        let mut ship = Self::without_hull(patch_config, config)?;
        ship.set_samples(samples)?;
        Ok(ship)
    }

    /// A body whose hull has not been sampled yet. Only gravity is applied
    /// until [`set_samples`](Self::set_samples) is called.
    pub fn without_hull(
        patch_config: WaterPatchConfig,
        config: BuoyancyConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            samples: None,
            patch: WaterPatch::new(patch_config)?,
            config,
            sample_states: Vec::new(),
            last_forces: BuoyancyForces::gravity_only(&config),
        })
    }

    pub fn set_samples(&mut self, samples: HullSampleSet) -> Result<(), ConfigError> {
        samples.validate()?;
        self.sample_states = Vec::with_capacity(samples.len());
        self.samples = Some(samples);
        Ok(())
    }

    pub fn samples(&self) -> Option<&HullSampleSet> {
        self.samples.as_ref()
    }

    pub fn patch(&self) -> &WaterPatch {
        &self.patch
    }

    pub fn config(&self) -> &BuoyancyConfig {
        &self.config
    }

    pub fn sample_states(&self) -> &[SampleState] {
        &self.sample_states
    }

    pub fn last_forces(&self) -> &BuoyancyForces {
        &self.last_forces
    }

    /// Fraction of the hull volume currently under water.
    pub fn submerged_fraction(&self) -> f32 {
        if self.sample_states.is_empty() {
            return 0.0;
        }
        self.sample_states
            .iter()
            .map(|state| state.filled_ratio)
            .sum::<f32>()
            / self.sample_states.len() as f32
    }

    /// Run one fixed step: recenter the patch, compute every force from a
    /// single snapshot of `body`, then apply them.
    pub fn tick(
        &mut self,
        body: &mut impl RigidBodyHandle,
        waves: &WaveField,
        sim_time: f32,
    ) -> &BuoyancyForces {
        let snapshot = body.snapshot();
        self.patch.recenter(snapshot.pose.position, waves, sim_time);

        self.last_forces = match &self.samples {
            Some(samples) => compute_forces(
                &snapshot,
                samples,
                &self.patch,
                &self.config,
                &mut self.sample_states,
            ),
            None => {
                self.sample_states.clear();
                BuoyancyForces::gravity_only(&self.config)
            }
        };

        self.last_forces.apply(body);
        &self.last_forces
    }
}
