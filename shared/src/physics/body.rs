use bevy::math::{Quat, Vec3};

/// World pose of a rigid body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for BodyPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl BodyPose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Local-space point to world space.
    #[inline]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }
}

/// Everything the force model reads from a body, captured once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub pose: BodyPose,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mass: f32,
    pub center_of_mass: Vec3,
}

impl BodySnapshot {
    /// Velocity of the world point `point` if it were attached to the body.
    #[inline]
    pub fn point_velocity(&self, point: Vec3) -> Vec3 {
        self.linear_velocity + self.angular_velocity.cross(point - self.center_of_mass)
    }
}

/// A rigid body owned by an external integrator.
///
/// The force model only reads state through this trait and submits force
/// deltas; it never writes position or velocity.
pub trait RigidBodyHandle {
    fn position(&self) -> Vec3;
    fn rotation(&self) -> Quat;
    fn linear_velocity(&self) -> Vec3;
    fn angular_velocity(&self) -> Vec3;
    fn mass(&self) -> f32;
    fn world_center_of_mass(&self) -> Vec3;

    fn add_force_at_position(&mut self, force: Vec3, world_point: Vec3);
    fn add_torque(&mut self, torque: Vec3);
    fn add_force(&mut self, force: Vec3);

    fn snapshot(&self) -> BodySnapshot {
        BodySnapshot {
            pose: BodyPose::new(self.position(), self.rotation()),
            linear_velocity: self.linear_velocity(),
            angular_velocity: self.angular_velocity(),
            mass: self.mass(),
            center_of_mass: self.world_center_of_mass(),
        }
    }
}

/// In-memory body that records what was applied to it.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingBody {
    pub pose: BodyPose,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mass: f32,
    pub forces_at: Vec<(Vec3, Vec3)>,
    pub torques: Vec<Vec3>,
    pub forces: Vec<Vec3>,
}

#[cfg(test)]
impl RecordingBody {
    pub fn at(position: Vec3, mass: f32) -> Self {
        Self {
            pose: BodyPose::new(position, Quat::IDENTITY),
            mass,
            ..Default::default()
        }
    }

    pub fn net_force(&self) -> Vec3 {
        self.forces.iter().copied().sum::<Vec3>()
            + self.forces_at.iter().map(|(f, _)| *f).sum::<Vec3>()
    }

    /// Net torque about the center of mass.
    pub fn net_torque(&self) -> Vec3 {
        let com = self.world_center_of_mass();
        self.torques.iter().copied().sum::<Vec3>()
            + self
                .forces_at
                .iter()
                .map(|(f, p)| (*p - com).cross(*f))
                .sum::<Vec3>()
    }
}

#[cfg(test)]
impl RigidBodyHandle for RecordingBody {
    fn position(&self) -> Vec3 {
        self.pose.position
    }

    fn rotation(&self) -> Quat {
        self.pose.rotation
    }

    fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    fn mass(&self) -> f32 {
        self.mass
    }

    fn world_center_of_mass(&self) -> Vec3 {
        self.pose.position
    }

    fn add_force_at_position(&mut self, force: Vec3, world_point: Vec3) {
        self.forces_at.push((force, world_point));
    }

    fn add_torque(&mut self, torque: Vec3) {
        self.torques.push(torque);
    }

    fn add_force(&mut self, force: Vec3) {
        self.forces.push(force);
    }
}
