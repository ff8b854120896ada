//! Cached height samples around a single body.
//!
//! Evaluating the wave field once per hull sample per tick is expensive, so
//! each body owns a small regular grid of precomputed heights and answers
//! height queries by bilinear interpolation. The grid is only rebuilt when
//! the owner asks for it.

use bevy::math::Vec3;
use bevy_log::debug;
use serde::{Deserialize, Serialize};

use super::field::WaveField;
use crate::constants::{
    DEFAULT_PATCH_CELL_SCALE, DEFAULT_PATCH_DRIFT_THRESHOLD, DEFAULT_PATCH_GRID_SIZE,
    DEFAULT_PATCH_MIN_INTERVAL,
};
use crate::errors::ConfigError;

/// Sizing and refresh policy of a [`WaterPatch`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterPatchConfig {
    /// Number of samples along X
    pub grid_width: usize,
    /// Number of samples along Z
    pub grid_length: usize,
    /// World distance between neighbouring samples
    pub cell_scale: f32,
    /// Recenter once the body has drifted this far horizontally (None = never)
    #[serde(default)]
    pub refresh_drift_threshold: Option<f32>,
    /// Refresh once this many seconds have passed (None = never)
    #[serde(default)]
    pub refresh_min_interval: Option<f32>,
}

impl Default for WaterPatchConfig {
    fn default() -> Self {
        Self {
            grid_width: DEFAULT_PATCH_GRID_SIZE,
            grid_length: DEFAULT_PATCH_GRID_SIZE,
            cell_scale: DEFAULT_PATCH_CELL_SCALE,
            refresh_drift_threshold: Some(DEFAULT_PATCH_DRIFT_THRESHOLD),
            refresh_min_interval: Some(DEFAULT_PATCH_MIN_INTERVAL),
        }
    }
}

impl WaterPatchConfig {
    /// Smallest square patch of `cell_scale` cells that covers `extent` world units.
    pub fn covering(extent: f32, cell_scale: f32) -> Self {
        let cells = (extent / cell_scale).ceil().max(1.0) as usize;
        Self {
            grid_width: cells + 1,
            grid_length: cells + 1,
            cell_scale,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width == 0 || self.grid_length == 0 {
            return Err(ConfigError::InvalidPatchGrid {
                width: self.grid_width,
                length: self.grid_length,
            });
        }
        if !self.cell_scale.is_finite() || self.cell_scale <= 0.0 {
            return Err(ConfigError::InvalidCellScale(self.cell_scale));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct WaterPatch {
    config: WaterPatchConfig,
    /// Where the owner currently wants the patch. Y is ignored.
    center: Vec3,
    /// Center at the last refresh. Grid-to-world mapping always uses this.
    data_center: Vec3,
    heights: Vec<f32>,
    last_update_time: f32,
    refreshed: bool,
}

impl WaterPatch {
    pub fn new(config: WaterPatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            heights: vec![0.0; config.grid_width * config.grid_length],
            config,
            center: Vec3::ZERO,
            data_center: Vec3::ZERO,
            last_update_time: 0.0,
            refreshed: false,
        })
    }

    pub fn config(&self) -> &WaterPatchConfig {
        &self.config
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn data_center(&self) -> Vec3 {
        self.data_center
    }

    pub fn last_update_time(&self) -> f32 {
        self.last_update_time
    }

    pub fn is_refreshed(&self) -> bool {
        self.refreshed
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn world_width(&self) -> f32 {
        (self.config.grid_width - 1) as f32 * self.config.cell_scale
    }

    pub fn world_length(&self) -> f32 {
        (self.config.grid_length - 1) as f32 * self.config.cell_scale
    }

    pub fn set_center(&mut self, center: Vec3) {
        self.center = center;
    }

    /// Squared horizontal distance between the requested and the sampled center.
    pub fn sqr_drift(&self) -> f32 {
        let mut diff = self.center - self.data_center;
        diff.y = 0.0;
        diff.length_squared()
    }

    /// Whether the refresh policy asks for new samples at `time`.
    pub fn needs_refresh(&self, time: f32) -> bool {
        if !self.refreshed {
            return true;
        }
        let drifted = self
            .config
            .refresh_drift_threshold
            .is_some_and(|threshold| self.sqr_drift() > threshold * threshold);
        let expired = self
            .config
            .refresh_min_interval
            .is_some_and(|interval| time - self.last_update_time >= interval);

        drifted || expired
    }

    /// Move the patch to `center` and refresh it if the policy says so.
    /// Returns true when the samples were rebuilt.
    pub fn recenter(&mut self, center: Vec3, field: &WaveField, time: f32) -> bool {
        self.set_center(center);
        if self.needs_refresh(time) {
            self.refresh(center, field, time);
            true
        } else {
            false
        }
    }

    /// Rebuild every height sample around `center`.
    pub fn refresh(&mut self, center: Vec3, field: &WaveField, time: f32) {
        self.center = center;
        self.data_center = center;

        let width = self.config.grid_width;
        for iz in 0..self.config.grid_length {
            for ix in 0..width {
                let (world_x, world_z) = self.index_to_world(ix, iz);
                self.heights[ix + iz * width] = field.surface_height(world_x, world_z, time);
            }
        }

        self.last_update_time = time;
        self.refreshed = true;
        debug!(
            "Water patch refreshed at ({:.2}, {:.2}), t={:.3}",
            center.x, center.z, time
        );
    }

    /// Bilinearly interpolated water height at world `(x, z)`.
    ///
    /// Queries outside the patch clamp to the border samples. Returns 0 until
    /// the first refresh.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        if !self.refreshed {
            return 0.0;
        }

        let width = self.config.grid_width;
        let (fx, fz) = self.world_to_grid(x, z);
        let (ix0, ix1, tx) = split_axis(fx, width);
        let (iz0, iz1, tz) = split_axis(fz, self.config.grid_length);

        let h00 = self.heights[ix0 + iz0 * width];
        let h10 = self.heights[ix1 + iz0 * width];
        let h01 = self.heights[ix0 + iz1 * width];
        let h11 = self.heights[ix1 + iz1 * width];

        h00 * (1.0 - tx) * (1.0 - tz) + h10 * tx * (1.0 - tz) + h01 * (1.0 - tx) * tz + h11 * tx * tz
    }

    /// World XZ of grid vertex `(ix, iz)` relative to the data center.
    pub fn index_to_world(&self, ix: usize, iz: usize) -> (f32, f32) {
        let scale = self.config.cell_scale;
        let world_x = ix as f32 * scale + self.data_center.x - self.world_width() * 0.5;
        let world_z = iz as f32 * scale + self.data_center.z - self.world_length() * 0.5;
        (world_x, world_z)
    }

    /// Fractional grid coordinates of world `(x, z)`, unclamped.
    fn world_to_grid(&self, x: f32, z: f32) -> (f32, f32) {
        let scale = self.config.cell_scale;
        let fx = (x - self.data_center.x + self.world_width() * 0.5) / scale;
        let fz = (z - self.data_center.z + self.world_length() * 0.5) / scale;
        (fx, fz)
    }
}

/// Clamp a fractional grid coordinate into `[0, count - 1]` and split it into
/// the two neighbouring indices plus the interpolation weight.
#[inline]
fn split_axis(f: f32, count: usize) -> (usize, usize, f32) {
    let last = (count - 1) as f32;
    // NaN falls through to index 0
    let f = if f.is_nan() { 0.0 } else { f.clamp(0.0, last) };
    let i0 = (f.floor() as usize).min(count.saturating_sub(2));
    let i1 = (i0 + 1).min(count - 1);
    let t = if i1 == i0 { 0.0 } else { f - i0 as f32 };
    (i0, i1, t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::water::{WaveComponent, WaveConfig, WavePreset};
    use bevy::math::Vec2;

    fn small_config() -> WaterPatchConfig {
        WaterPatchConfig {
            grid_width: 5,
            grid_length: 4,
            cell_scale: 0.5,
            refresh_drift_threshold: Some(1.0),
            refresh_min_interval: Some(0.5),
        }
    }

    fn ocean() -> WaveField {
        WavePreset::Ocean.to_config(0.0).build().unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = WaterPatchConfig {
            grid_width: 0,
            ..small_config()
        };
        assert!(matches!(
            WaterPatch::new(config),
            Err(ConfigError::InvalidPatchGrid { .. })
        ));

        let config = WaterPatchConfig {
            cell_scale: 0.0,
            ..small_config()
        };
        assert_eq!(
            WaterPatch::new(config).unwrap_err(),
            ConfigError::InvalidCellScale(0.0)
        );
    }

    #[test]
    fn test_height_before_refresh_is_zero() {
        let patch = WaterPatch::new(small_config()).unwrap();
        assert_eq!(patch.height_at(0.3, -0.2), 0.0);
        assert!(patch.needs_refresh(0.0));
    }

    #[test]
    fn test_grid_points_return_stored_samples() {
        let mut patch = WaterPatch::new(small_config()).unwrap();
        let field = ocean();
        patch.refresh(Vec3::new(3.0, 1.0, -2.0), &field, 1.25);

        for iz in 0..4 {
            for ix in 0..5 {
                let (x, z) = patch.index_to_world(ix, iz);
                let stored = patch.heights()[ix + iz * 5];
                assert!(
                    (patch.height_at(x, z) - stored).abs() < 1e-5,
                    "mismatch at ({ix}, {iz})"
                );
                assert!((stored - field.surface_height(x, z, 1.25)).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_bilinear_midpoint_is_average() {
        let mut patch = WaterPatch::new(small_config()).unwrap();
        patch.refresh(Vec3::ZERO, &ocean(), 0.4);

        let (x0, z0) = patch.index_to_world(1, 1);
        let (x1, z1) = patch.index_to_world(2, 2);
        let h = patch.heights();
        let expected = (h[1 + 5] + h[2 + 5] + h[1 + 2 * 5] + h[2 + 2 * 5]) / 4.0;
        let got = patch.height_at((x0 + x1) * 0.5, (z0 + z1) * 0.5);
        assert!((got - expected).abs() < 1e-5);
    }

    #[test]
    fn test_queries_outside_clamp_to_edges() {
        let mut patch = WaterPatch::new(small_config()).unwrap();
        patch.refresh(Vec3::ZERO, &ocean(), 2.0);

        let (x_min, z_min) = patch.index_to_world(0, 0);
        let (x_max, z_max) = patch.index_to_world(4, 3);
        assert!((patch.height_at(x_min - 50.0, z_min - 50.0) - patch.heights()[0]).abs() < 1e-6);
        assert!(
            (patch.height_at(x_max + 50.0, z_max + 50.0) - patch.heights()[4 + 3 * 5]).abs()
                < 1e-6
        );
    }

    #[test]
    fn test_queries_use_data_center_not_center() {
        let mut config = WaveConfig::new(0.0);
        config.add_wave(WaveComponent::new(0.0, 1.0, 10.0, Vec2::X, 0.0));
        let field = config.build().unwrap();

        let mut patch = WaterPatch::new(small_config()).unwrap();
        patch.refresh(Vec3::ZERO, &field, 0.0);
        let before = patch.height_at(0.5, 0.0);

        // Moving the requested center alone must not shift the samples.
        patch.set_center(Vec3::new(0.7, 0.0, 0.0));
        assert_eq!(patch.height_at(0.5, 0.0), before);
        assert_eq!(patch.data_center(), Vec3::ZERO);
    }

    #[test]
    fn test_single_vertex_patch() {
        let config = WaterPatchConfig {
            grid_width: 1,
            grid_length: 1,
            ..small_config()
        };
        let mut patch = WaterPatch::new(config).unwrap();
        patch.refresh(Vec3::ZERO, &WaveField::flat(2.0), 0.0);
        assert_eq!(patch.height_at(100.0, -3.0), 2.0);
    }

    #[test]
    fn test_refresh_policy() {
        let field = WaveField::flat(0.0);
        let mut patch = WaterPatch::new(small_config()).unwrap();

        assert!(patch.recenter(Vec3::ZERO, &field, 0.0), "first call refreshes");
        assert!(!patch.recenter(Vec3::new(0.5, 9.0, 0.5), &field, 0.1));
        assert!((patch.sqr_drift() - 0.5).abs() < 1e-6, "Y is ignored");

        // Drift past the threshold
        assert!(patch.recenter(Vec3::new(1.2, 0.0, 0.0), &field, 0.2));
        assert_eq!(patch.data_center(), Vec3::new(1.2, 0.0, 0.0));

        // Time past the interval
        assert!(!patch.recenter(Vec3::new(1.2, 0.0, 0.0), &field, 0.6));
        assert!(patch.recenter(Vec3::new(1.2, 0.0, 0.0), &field, 0.8));
        assert_eq!(patch.last_update_time(), 0.8);
    }

    #[test]
    fn test_policy_without_triggers_only_refreshes_once() {
        let config = WaterPatchConfig {
            refresh_drift_threshold: None,
            refresh_min_interval: None,
            ..small_config()
        };
        let field = WaveField::flat(0.0);
        let mut patch = WaterPatch::new(config).unwrap();
        assert!(patch.recenter(Vec3::ZERO, &field, 0.0));
        assert!(!patch.recenter(Vec3::splat(100.0), &field, 100.0));
    }

    #[test]
    fn test_covering_config_spans_extent() {
        let config = WaterPatchConfig::covering(7.2, 0.5);
        let patch = WaterPatch::new(config).unwrap();
        assert!(patch.world_width() >= 7.2);
        assert!(patch.world_width() < 7.2 + 0.5);
    }
}
