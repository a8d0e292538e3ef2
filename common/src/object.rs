use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ObjectId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ModelId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct MapId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct RegionId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ObjectType {
    Player,
    Monster,
}

bitflags! {
    /// Movement state bits broadcast alongside a destination change.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MovingFlags: u32 {
        const FORWARD = 1 << 0;
        const BACKWARD = 1 << 1;
        const TURN_LEFT = 1 << 2;
        const TURN_RIGHT = 1 << 3;
    }
}

impl Serialize for MovingFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for MovingFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_bits_truncate(u32::deserialize(deserializer)?))
    }
}

bitflags! {
    /// Qualifiers of an attack, used to pick the matching defense stat.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AttackFlags: u32 {
        const MELEE = 1 << 0;
        const RANGED = 1 << 1;
        const MAGIC = 1 << 2;
    }
}
