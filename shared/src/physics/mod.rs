//! Rigid-body side of the simulation: the body interface, the filled-sphere
//! integrals, the buoyancy force model and its Rapier adapter.

pub mod body;
pub mod buoyancy;
pub mod rapier;
pub mod sphere;

pub use body::{BodyPose, BodySnapshot, RigidBodyHandle};
pub use buoyancy::{
    compute_forces, AppliedForce, BuoyancyConfig, BuoyancyForces, SampleState, ShipBuoyancy,
};
pub use rapier::{BuoyancyPlugin, OceanWaves, ShipPhysicsBundle};
pub use sphere::{filled_sphere_centroid_offset, filled_sphere_volume, full_sphere_volume};
