//! Rapier integration for floating bodies.
//!
//! Rapier owns position and velocity. Every fixed step the buoyancy system
//! reads each ship's pose and velocity, runs [`ShipBuoyancy::tick`] and
//! writes the result into the ship's [`ExternalForce`], which Rapier then
//! integrates in its own fixed-schedule step.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::body::RigidBodyHandle;
use super::buoyancy::ShipBuoyancy;
use crate::water::WaveField;

/// The wave field shared by every floating body.
#[derive(Resource, Debug, Clone, Default)]
pub struct OceanWaves(pub WaveField);

/// Collision groups used by the simulation.
pub mod collision_groups {
    use bevy_rapier3d::prelude::Group;

    /// Floating hulls
    pub const SHIP: Group = Group::GROUP_1;
    /// Static scenery (piers, sea floor)
    pub const WORLD: Group = Group::GROUP_2;
}

/// Bundle for a dynamic body driven by buoyancy.
///
/// Rapier gravity is disabled on the body; the force model adds its own
/// gravity term every tick.
#[derive(Bundle)]
pub struct ShipPhysicsBundle {
    pub body: RigidBody,
    pub collider: Collider,
    pub mass: ColliderMassProperties,
    pub read_mass: ReadMassProperties,
    pub velocity: Velocity,
    pub external_force: ExternalForce,
    pub gravity_scale: GravityScale,
    pub collision_groups: CollisionGroups,
    pub buoyancy: ShipBuoyancy,
}

impl ShipPhysicsBundle {
    /// # Arguments
    /// * `buoyancy` - Hull samples and force model constants
    /// * `half_extents` - Half size of the box collider
    /// * `mass` - Total mass of the body
    pub fn new(buoyancy: ShipBuoyancy, half_extents: Vec3, mass: f32) -> Self {
        Self {
            body: RigidBody::Dynamic,
            collider: Collider::cuboid(half_extents.x, half_extents.y, half_extents.z),
            mass: ColliderMassProperties::Mass(mass),
            read_mass: ReadMassProperties::default(),
            velocity: Velocity::zero(),
            external_force: ExternalForce::default(),
            gravity_scale: GravityScale(0.0),
            collision_groups: CollisionGroups::new(
                collision_groups::SHIP,
                collision_groups::SHIP | collision_groups::WORLD,
            ),
            buoyancy,
        }
    }
}

/// [`RigidBodyHandle`] over the components of one Rapier body.
///
/// Forces are accumulated into `external_force`; callers reset it first.
pub struct RapierBody<'a> {
    pub transform: &'a Transform,
    pub velocity: &'a Velocity,
    pub mass_properties: &'a ReadMassProperties,
    pub external_force: &'a mut ExternalForce,
}

impl RigidBodyHandle for RapierBody<'_> {
    fn position(&self) -> Vec3 {
        self.transform.translation
    }

    fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    fn linear_velocity(&self) -> Vec3 {
        self.velocity.linvel
    }

    fn angular_velocity(&self) -> Vec3 {
        self.velocity.angvel
    }

    fn mass(&self) -> f32 {
        self.mass_properties.get().mass
    }

    fn world_center_of_mass(&self) -> Vec3 {
        self.transform
            .transform_point(self.mass_properties.get().local_center_of_mass)
    }

    fn add_force_at_position(&mut self, force: Vec3, world_point: Vec3) {
        let lever = world_point - self.world_center_of_mass();
        self.external_force.force += force;
        self.external_force.torque += lever.cross(force);
    }

    fn add_torque(&mut self, torque: Vec3) {
        self.external_force.torque += torque;
    }

    fn add_force(&mut self, force: Vec3) {
        self.external_force.force += force;
    }
}

/// Recompute every ship's external force for this fixed step.
pub fn apply_buoyancy_forces(
    waves: Res<OceanWaves>,
    time: Res<Time<Fixed>>,
    mut ships: Query<(
        &mut ShipBuoyancy,
        &Transform,
        &Velocity,
        &ReadMassProperties,
        &mut ExternalForce,
    )>,
) {
    let sim_time = time.elapsed_secs();

    for (mut buoyancy, transform, velocity, mass_properties, mut external_force) in
        ships.iter_mut()
    {
        *external_force = ExternalForce::default();
        let mut body = RapierBody {
            transform,
            velocity,
            mass_properties,
            external_force: &mut external_force,
        };
        buoyancy.tick(&mut body, &waves.0, sim_time);
    }
}

/// Plugin that runs Rapier and the buoyancy force model on the fixed clock.
///
/// The force system runs in `FixedUpdate`, ahead of Rapier's step in
/// `FixedPostUpdate`, so each step integrates forces computed from the state
/// it starts from.
pub struct BuoyancyPlugin;

impl Plugin for BuoyancyPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule());
        app.init_resource::<OceanWaves>();
        app.add_systems(FixedUpdate, apply_buoyancy_forces);
    }
}
