use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::object::{MovingFlags, ObjectId};

/// State changes pushed outward each tick; the networking layer serializes
/// them for the clients, nothing in the simulation reads them back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorldEvent {
    MoverMoved {
        object_id: ObjectId,
        destination: Vector3<f32>,
        angle: f32,
        moving_flags: MovingFlags,
    },
    MoverSpeed {
        object_id: ObjectId,
        speed_factor: f32,
    },
    MoverFollowing {
        object_id: ObjectId,
        target_id: ObjectId,
        range: f32,
    },
    MeleeAttack {
        object_id: ObjectId,
        motion: i32,
        target_id: ObjectId,
    },
    MoverHealthChanged {
        object_id: ObjectId,
        health: i32,
        change: i32,
    },
}
