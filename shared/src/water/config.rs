//! Serializable wave configuration.
//!
//! A `WaveConfig` is plain data loaded from RON. Validating it produces the
//! immutable [`WaveField`] used by the simulation.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::field::WaveField;
use crate::errors::ConfigError;

/// Configuration for a single trochoidal wave component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveComponent {
    /// Steepness Q (0.0 = sine wave, 1.0 = sharp crest)
    pub steepness: f32,
    /// Vertical amplitude A in world units
    pub amplitude: f32,
    /// Wavelength L in world units
    pub wavelength: f32,
    /// Propagation direction on the XZ plane (normalized on validation)
    pub direction: Vec2,
    pub speed: f32,
}

impl WaveComponent {
    pub fn new(steepness: f32, amplitude: f32, wavelength: f32, direction: Vec2, speed: f32) -> Self {
        Self {
            steepness,
            amplitude,
            wavelength,
            direction,
            speed,
        }
    }

    /// Angular wavenumber (k = 2π / wavelength).
    ///
    /// Deliberately not the plain `1 / wavelength` reciprocal: with 2π one
    /// full sine period spans exactly one wavelength, so a crest lands a
    /// quarter wavelength from the zero crossing at the origin.
    #[inline(always)]
    pub fn frequency(&self) -> f32 {
        TAU / self.wavelength
    }

    /// Phase advance per second.
    #[inline(always)]
    pub fn phase_constant(&self) -> f32 {
        2.0 * self.speed / self.wavelength
    }

    fn validated(self, index: usize) -> Result<Self, ConfigError> {
        if !self.wavelength.is_finite() || self.wavelength <= 0.0 {
            return Err(ConfigError::InvalidWavelength {
                index,
                wavelength: self.wavelength,
            });
        }
        if !(0.0..=1.0).contains(&self.steepness) {
            return Err(ConfigError::InvalidSteepness {
                index,
                steepness: self.steepness,
            });
        }
        if !self.amplitude.is_finite() || self.amplitude < 0.0 {
            return Err(ConfigError::InvalidAmplitude {
                index,
                amplitude: self.amplitude,
            });
        }
        let direction = self
            .direction
            .try_normalize()
            .ok_or(ConfigError::InvalidDirection { index })?;

        Ok(Self { direction, ..self })
    }
}

impl Default for WaveComponent {
    fn default() -> Self {
        Self::new(0.3, 0.5, 8.0, Vec2::X, 1.0)
    }
}

/// Complete wave configuration, as stored in scenario files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    pub waves: Vec<WaveComponent>,
    /// Undisturbed water level (Y coordinate)
    #[serde(default)]
    pub sea_level: f32,
}

impl WaveConfig {
    /// Create an empty wave config with no active waves.
    pub fn new(sea_level: f32) -> Self {
        Self {
            waves: Vec::new(),
            sea_level,
        }
    }

    pub fn add_wave(&mut self, wave: WaveComponent) {
        self.waves.push(wave);
    }

    /// Check every wave and build the immutable field.
    pub fn build(&self) -> Result<WaveField, ConfigError> {
        let waves = self
            .waves
            .iter()
            .enumerate()
            .map(|(i, wave)| wave.validated(i))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(WaveField::from_validated(waves, self.sea_level))
    }
}

impl Default for WaveConfig {
    fn default() -> Self {
        WavePreset::default().to_config(0.0)
    }
}

/// Preset wave configurations for different sea states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum WavePreset {
    /// Completely still water (no waves)
    Still,
    Calm,
    Lake,
    #[default]
    Ocean,
    Storm,
}

impl WavePreset {
    pub fn to_config(self, sea_level: f32) -> WaveConfig {
        let mut config = WaveConfig::new(sea_level);

        match self {
            WavePreset::Still => {}
            WavePreset::Calm => {
                config.add_wave(WaveComponent::new(0.2, 0.1, 12.0, Vec2::new(1.0, 0.2), 0.5));
            }
            WavePreset::Lake => {
                config.add_wave(WaveComponent::new(0.3, 0.15, 8.0, Vec2::new(1.0, 0.0), 0.8));
                config.add_wave(WaveComponent::new(0.2, 0.08, 5.0, Vec2::new(0.3, 1.0), 1.0));
            }
            WavePreset::Ocean => {
                config.add_wave(WaveComponent::new(0.6, 0.6, 24.0, Vec2::new(1.0, 0.3), 3.0));
                config.add_wave(WaveComponent::new(0.5, 0.35, 15.0, Vec2::new(-0.7, 1.0), 2.5));
                config.add_wave(WaveComponent::new(0.4, 0.2, 9.0, Vec2::new(0.5, -1.0), 2.2));
                config.add_wave(WaveComponent::new(0.3, 0.1, 4.5, Vec2::new(-1.0, -0.5), 1.8));
            }
            WavePreset::Storm => {
                config.add_wave(WaveComponent::new(0.8, 1.6, 40.0, Vec2::new(1.0, 0.2), 5.0));
                config.add_wave(WaveComponent::new(0.7, 0.9, 24.0, Vec2::new(-0.5, 1.0), 4.0));
                config.add_wave(WaveComponent::new(0.6, 0.5, 15.0, Vec2::new(0.7, -0.7), 3.5));
                config.add_wave(WaveComponent::new(0.5, 0.25, 9.0, Vec2::new(-1.0, -0.3), 3.0));
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_wave_counts() {
        assert_eq!(WavePreset::Still.to_config(0.0).waves.len(), 0);
        assert_eq!(WavePreset::Calm.to_config(0.0).waves.len(), 1);
        assert_eq!(WavePreset::Lake.to_config(0.0).waves.len(), 2);
        assert_eq!(WavePreset::Ocean.to_config(0.0).waves.len(), 4);
        assert_eq!(WavePreset::Storm.to_config(0.0).waves.len(), 4);
    }

    #[test]
    fn test_presets_are_valid() {
        for preset in [
            WavePreset::Still,
            WavePreset::Calm,
            WavePreset::Lake,
            WavePreset::Ocean,
            WavePreset::Storm,
        ] {
            assert!(preset.to_config(0.0).build().is_ok(), "{preset:?} should build");
        }
    }

    #[test]
    fn test_zero_wavelength_rejected() {
        let mut config = WaveConfig::new(0.0);
        config.add_wave(WaveComponent::default());
        config.add_wave(WaveComponent {
            wavelength: 0.0,
            ..Default::default()
        });

        assert_eq!(
            config.build().unwrap_err(),
            ConfigError::InvalidWavelength {
                index: 1,
                wavelength: 0.0
            }
        );
    }

    #[test]
    fn test_steepness_out_of_range_rejected() {
        let mut config = WaveConfig::new(0.0);
        config.add_wave(WaveComponent {
            steepness: 1.5,
            ..Default::default()
        });
        assert!(matches!(
            config.build(),
            Err(ConfigError::InvalidSteepness { index: 0, .. })
        ));
    }

    #[test]
    fn test_zero_direction_rejected() {
        let mut config = WaveConfig::new(0.0);
        config.add_wave(WaveComponent {
            direction: Vec2::ZERO,
            ..Default::default()
        });
        assert_eq!(
            config.build().unwrap_err(),
            ConfigError::InvalidDirection { index: 0 }
        );
    }

    #[test]
    fn test_direction_normalized_on_build() {
        let mut config = WaveConfig::new(0.0);
        config.add_wave(WaveComponent {
            direction: Vec2::new(3.0, 4.0),
            ..Default::default()
        });
        let field = config.build().unwrap();
        let dir = field.components()[0].direction;
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!((dir.x - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_config_parses_from_ron() {
        let text = r#"(
            waves: [
                (steepness: 0.5, amplitude: 1.0, wavelength: 10.0, direction: (1.0, 0.0), speed: 2.0),
            ],
        )"#;
        let config: WaveConfig = ron::de::from_str(text).unwrap();
        assert_eq!(config.waves.len(), 1);
        assert_eq!(config.sea_level, 0.0);
        assert!((config.waves[0].phase_constant() - 0.4).abs() < 1e-6);
    }
}
