//! Actor transforms and yaw rotation math.
//!
//! Buildings only ever rotate about the vertical axis, so transforms carry a
//! single yaw angle in degrees rather than a full quaternion.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// World transform of an actor: location, yaw (degrees), scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActorTransform {
    pub location: Vec3,
    pub yaw: f32,
    pub scale: Vec3,
}

impl Default for ActorTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ActorTransform {
    pub const IDENTITY: ActorTransform = ActorTransform {
        location: Vec3::ZERO,
        yaw: 0.0,
        scale: Vec3::ONE,
    };

    pub fn from_location(location: Vec3) -> Self {
        ActorTransform {
            location,
            ..Self::IDENTITY
        }
    }

    pub fn from_location_yaw(location: Vec3, yaw: f32) -> Self {
        ActorTransform {
            location,
            yaw,
            ..Self::IDENTITY
        }
    }
}

/// Rotate `v` by `yaw_deg` degrees about the +Z axis.
pub fn rotate_yaw(v: Vec3, yaw_deg: f32) -> Vec3 {
    let (sin, cos) = yaw_deg.to_radians().sin_cos();
    Vec3::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos, v.z)
}

/// Inverse of [`rotate_yaw`].
pub fn unrotate_yaw(v: Vec3, yaw_deg: f32) -> Vec3 {
    rotate_yaw(v, -yaw_deg)
}

/// Rotate a transform about `rotation_center` by `rotation_yaw` degrees, then
/// translate it by `offset`. Scale is preserved.
pub fn transform_around_point(
    original: ActorTransform,
    offset: Vec3,
    rotation_yaw: f32,
    rotation_center: Vec3,
) -> ActorTransform {
    ActorTransform {
        location: rotate_yaw(original.location - rotation_center, rotation_yaw)
            + rotation_center
            + offset,
        yaw: original.yaw + rotation_yaw,
        scale: original.scale,
    }
}
