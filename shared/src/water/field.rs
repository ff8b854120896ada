//! Trochoidal (Gerstner) wave field.
//!
//! The field is a pure function of world position and time. Each component
//! displaces a point of the undisturbed surface both vertically and along its
//! propagation direction, which sharpens crests and flattens troughs as the
//! steepness grows.

use bevy::math::{Vec2, Vec3};

use super::config::WaveComponent;

/// Precomputed constants for a single wave.
#[derive(Debug, Clone, Copy)]
struct WaveConstants {
    /// Horizontal amplitude (steepness * amplitude)
    horizontal: f32,
    amplitude: f32,
    steepness: f32,
    /// Direction scaled by the wavenumber
    wave_vector: Vec2,
    direction: Vec2,
    frequency: f32,
    phase_constant: f32,
}

impl WaveConstants {
    #[inline]
    fn phase(&self, x: f32, z: f32, time: f32) -> f32 {
        self.wave_vector.dot(Vec2::new(x, z)) + self.phase_constant * time
    }
}

/// Immutable sum of wave components. Built from a validated
/// [`WaveConfig`](super::WaveConfig).
#[derive(Debug, Clone)]
pub struct WaveField {
    components: Vec<WaveComponent>,
    constants: Vec<WaveConstants>,
    sea_level: f32,
}

impl WaveField {
    pub(super) fn from_validated(components: Vec<WaveComponent>, sea_level: f32) -> Self {
        let constants = components
            .iter()
            .map(|w| {
                let frequency = w.frequency();
                WaveConstants {
                    horizontal: w.steepness * w.amplitude,
                    amplitude: w.amplitude,
                    steepness: w.steepness,
                    wave_vector: w.direction * frequency,
                    direction: w.direction,
                    frequency,
                    phase_constant: w.phase_constant(),
                }
            })
            .collect();

        Self {
            components,
            constants,
            sea_level,
        }
    }

    /// A field without waves. Its surface is the flat plane at `sea_level`.
    pub fn flat(sea_level: f32) -> Self {
        Self::from_validated(Vec::new(), sea_level)
    }

    pub fn components(&self) -> &[WaveComponent] {
        &self.components
    }

    pub fn sea_level(&self) -> f32 {
        self.sea_level
    }

    /// Map an undisturbed surface point to its animated world position.
    ///
    /// Only `position.x` and `position.z` feed the phase; the returned Y is
    /// `position.y` plus the summed vertical offsets.
    pub fn displacement(&self, position: Vec3, time: f32) -> Vec3 {
        let mut offset = Vec3::ZERO;

        for wc in &self.constants {
            let (sin_phase, cos_phase) = wc.phase(position.x, position.z, time).sin_cos();
            offset.x += wc.horizontal * wc.direction.x * cos_phase;
            offset.z += wc.horizontal * wc.direction.y * cos_phase;
            offset.y += wc.amplitude * sin_phase;
        }

        position + offset
    }

    /// Surface normal at an already displaced position.
    ///
    /// Used for rendering only; the force model assumes a flat local surface.
    pub fn normal_at(&self, transformed: Vec3, time: f32) -> Vec3 {
        let mut normal = Vec3::Y;

        for wc in &self.constants {
            let (sin_phase, cos_phase) = wc.phase(transformed.x, transformed.z, time).sin_cos();
            let wa = wc.frequency * wc.amplitude;
            normal.x -= wc.direction.x * wa * cos_phase;
            normal.z -= wc.direction.y * wa * cos_phase;
            normal.y -= wc.steepness * wa * sin_phase;
        }

        normal.normalize_or(Vec3::Y)
    }

    /// Estimate the water height above the fixed column `(x, z)`.
    ///
    /// Sampling the field at `(x, z)` lands on a surface point that has been
    /// pushed sideways, so the sample is shifted back by that horizontal
    /// offset once and re-evaluated. A single correction step is used.
    pub fn surface_height(&self, x: f32, z: f32, time: f32) -> f32 {
        let base = Vec3::new(x, 0.0, z);
        let mut offset = self.displacement(base, time) - base;
        offset.y = 0.0;

        self.sea_level + self.displacement(base - offset, time).y
    }
}

impl Default for WaveField {
    fn default() -> Self {
        Self::flat(0.0)
    }
}
