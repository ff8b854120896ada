pub const TICKS_PER_SECOND: u64 = 50;

/// Gravity magnitude used by the force model (m/s²).
pub const DEFAULT_GRAVITY: f32 = 9.81;
pub const DEFAULT_WATER_DENSITY: f32 = 1.0;
pub const DEFAULT_DRAG_COEFFICIENT: f32 = 0.5;
pub const DEFAULT_ANGULAR_DRAG_COEFFICIENT: f32 = 0.2;
pub const DEFAULT_SLAM_ESTIMATION_TIME: f32 = 0.1;
pub const DEFAULT_SLAM_COEFFICIENT: f32 = 1.0;
/// Lever arm used by the angular drag term.
pub const DEFAULT_AVERAGE_WIDTH: f32 = 1.0;

pub const DEFAULT_PATCH_GRID_SIZE: usize = 16;
pub const DEFAULT_PATCH_CELL_SCALE: f32 = 0.5;
/// Horizontal drift (world units) before a patch is recentered.
pub const DEFAULT_PATCH_DRIFT_THRESHOLD: f32 = 1.0;
/// Seconds between forced patch refreshes.
pub const DEFAULT_PATCH_MIN_INTERVAL: f32 = 0.1;

/// Filled fraction of a sample sphere below which it counts as empty.
/// Dimensionless, so it holds for any sample radius.
pub const FILL_RATIO_EPSILON: f32 = 1e-6;

pub const HULL_SAMPLES_FILE_EXTENSION: &str = "hull";

/// Cells along the longest hull axis when none is given.
pub const DEFAULT_VOXEL_RESOLUTION: u32 = 16;
