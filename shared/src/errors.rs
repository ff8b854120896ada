//! Configuration errors.
//!
//! Everything here is rejected eagerly when configuration is loaded or a hull
//! is built. The per-tick path never produces one of these.

/// A configuration value that cannot be simulated.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Wave `index` has a wavelength that is zero, negative or not finite.
    InvalidWavelength { index: usize, wavelength: f32 },
    /// Wave `index` has a steepness outside `[0, 1]`.
    InvalidSteepness { index: usize, steepness: f32 },
    /// Wave `index` has a negative or non-finite amplitude.
    InvalidAmplitude { index: usize, amplitude: f32 },
    /// Wave `index` has a zero-length direction.
    InvalidDirection { index: usize },
    /// Water patch grid must be at least 1x1.
    InvalidPatchGrid { width: usize, length: usize },
    /// Water patch cell scale must be positive and finite.
    InvalidCellScale(f32),
    /// Hull sample radius must be non-negative and finite.
    InvalidRadius(f32),
    /// Voxelization needs at least one cell along the longest axis.
    ZeroResolution,
    /// The hull mesh has no triangles or no volume.
    DegenerateMesh,
    /// A triangle references a vertex that does not exist.
    InvalidMeshIndex { index: u32, vertex_count: usize },
    /// A buoyancy constant is negative or not finite.
    InvalidBuoyancyConstant { name: &'static str, value: f32 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidWavelength { index, wavelength } => {
                write!(f, "wave {index}: wavelength must be > 0 (got {wavelength})")
            }
            ConfigError::InvalidSteepness { index, steepness } => {
                write!(f, "wave {index}: steepness must be in [0, 1] (got {steepness})")
            }
            ConfigError::InvalidAmplitude { index, amplitude } => {
                write!(f, "wave {index}: amplitude must be >= 0 (got {amplitude})")
            }
            ConfigError::InvalidDirection { index } => {
                write!(f, "wave {index}: direction must not be zero")
            }
            ConfigError::InvalidPatchGrid { width, length } => {
                write!(f, "water patch grid must be at least 1x1 (got {width}x{length})")
            }
            ConfigError::InvalidCellScale(scale) => {
                write!(f, "water patch cell scale must be > 0 (got {scale})")
            }
            ConfigError::InvalidRadius(radius) => {
                write!(f, "hull sample radius must be >= 0 (got {radius})")
            }
            ConfigError::ZeroResolution => write!(f, "voxelization resolution must be > 0"),
            ConfigError::DegenerateMesh => write!(f, "hull mesh has no triangles or no volume"),
            ConfigError::InvalidMeshIndex {
                index,
                vertex_count,
            } => write!(
                f,
                "triangle index {index} out of range ({vertex_count} vertices)"
            ),
            ConfigError::InvalidBuoyancyConstant { name, value } => {
                write!(f, "buoyancy constant `{name}` must be >= 0 (got {value})")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_wave() {
        let err = ConfigError::InvalidWavelength {
            index: 2,
            wavelength: 0.0,
        };
        assert!(err.to_string().starts_with("wave 2"));
    }
}
