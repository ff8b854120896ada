//! Ocean surface: wave configuration, the wave field and per-body height caches.
//!
//! ```text
//!   WaveConfig (RON) ──build()──▶ WaveField ──refresh()──▶ WaterPatch
//!                                  (pure fn)               (one per body)
//!                                                              │
//!                                                   height_at(x, z), O(1)
//!                                                              ▼
//!                                                       buoyancy model
//! ```
//!
//! The force model never evaluates the field directly. It asks the body's
//! patch, which is rebuilt only when the body drifts away from the sampled
//! area or the samples get too old.

pub mod config;
pub mod field;
pub mod patch;

pub use config::{WaveComponent, WaveConfig, WavePreset};
pub use field::WaveField;
pub use patch::{WaterPatch, WaterPatchConfig};
