use duskwold_common::object::{MapId, ModelId, MovingFlags, ObjectId, RegionId};
use nalgebra::Vector3;

/// One combatant slot. Players and monsters share the representation and a
/// `kind` tag answers the capability queries; the slot is reused across the
/// whole die/despawn/respawn cycle instead of being reallocated.
#[derive(Debug, Clone)]
pub struct Mover {
    pub id: ObjectId,
    pub model_id: ModelId,
    pub map_id: MapId,
    /// Back-reference to the parent region, id only. Players have none.
    pub region: Option<RegionId>,
    pub position: Vector3<f32>,
    pub destination: Vector3<f32>,
    pub angle: f32,
    pub moving_flags: MovingFlags,
    pub vitals: Vitals,
    pub size: i16,
    pub speed_factor: f32,
    pub is_fighting: bool,
    pub is_following: bool,
    /// Id only, resolved against the map every tick. The target may have
    /// died or left since it was assigned.
    pub target: Option<ObjectId>,
    pub is_spawned: bool,
    pub is_dead: bool,
    /// Next wander decision, in seconds.
    pub move_timer: u64,
    /// Next allowed attack, in millis.
    pub attack_timer: u64,
    /// Corpse removal deadline, in seconds. Armed on death.
    pub despawn_time: u64,
    /// Revival deadline, in seconds. Armed once the corpse is hidden.
    pub respawn_time: u64,
    pub kind: MoverKind,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Vitals {
    pub hp: i32,
    pub mp: i32,
    pub strength: i32,
    pub stamina: i32,
    pub intellect: i32,
    pub dexterity: i32,
}

#[derive(Debug, Clone)]
pub enum MoverKind {
    Player(PlayerState),
    Monster,
}

#[derive(Debug, Clone, Default)]
pub struct PlayerState {
    pub equipment: Equipment,
    pub attack_stats: AttackStats,
}

#[derive(Debug, Clone, Default)]
pub struct Equipment {
    pub right_weapon: Option<Weapon>,
}

/// Snapshot of an equipped weapon. Ownership stays with the equipment
/// system, damage calculation only reads it.
#[derive(Debug, Clone)]
pub struct Weapon {
    pub weapon_type: WeaponType,
    pub ability_min: i32,
    pub ability_max: i32,
    pub refine: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponType {
    Sword,
    Axe,
    Staff,
    Bow,
    Knuckle,
}

/// Per-weapon-type attack attribute of a player, maintained by the (out of
/// scope) stat system.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttackStats {
    pub sword: i32,
    pub axe: i32,
    pub staff: i32,
    pub bow: i32,
    pub knuckle: i32,
}

impl AttackStats {
    pub fn for_weapon(&self, weapon_type: WeaponType) -> i32 {
        match weapon_type {
            WeaponType::Sword => self.sword,
            WeaponType::Axe => self.axe,
            WeaponType::Staff => self.staff,
            WeaponType::Bow => self.bow,
            WeaponType::Knuckle => self.knuckle,
        }
    }
}

impl Mover {
    /// Player-like mover as the session layer hands it to a map.
    pub fn player(
        id: ObjectId,
        map_id: MapId,
        position: Vector3<f32>,
        vitals: Vitals,
        state: PlayerState,
    ) -> Self {
        Self {
            id,
            model_id: ModelId(0),
            map_id,
            region: None,
            position,
            destination: position,
            angle: 0.0,
            moving_flags: MovingFlags::empty(),
            vitals,
            size: 100,
            speed_factor: 1.0,
            is_fighting: false,
            is_following: false,
            target: None,
            is_spawned: true,
            is_dead: false,
            move_timer: 0,
            attack_timer: 0,
            despawn_time: 0,
            respawn_time: 0,
            kind: MoverKind::Player(state),
        }
    }

    pub fn is_monster(&self) -> bool {
        matches!(self.kind, MoverKind::Monster)
    }

    /// `Some` only for player-like movers.
    pub fn equipment(&self) -> Option<&Equipment> {
        match &self.kind {
            MoverKind::Player(player) => Some(&player.equipment),
            MoverKind::Monster => None,
        }
    }

    /// Weapon-type attack attribute. Monsters have no weapon attack path and
    /// always report zero here.
    pub fn weapon_attack_damages(&self, weapon_type: WeaponType) -> i32 {
        match &self.kind {
            MoverKind::Player(player) => player.attack_stats.for_weapon(weapon_type),
            MoverKind::Monster => 0,
        }
    }

    /// Bare combatant snapshot for formula tests.
    #[cfg(test)]
    pub fn test_snapshot(kind: MoverKind) -> Self {
        Self {
            id: ObjectId(0),
            model_id: ModelId(0),
            map_id: MapId(0),
            region: None,
            position: Vector3::zeros(),
            destination: Vector3::zeros(),
            angle: 0.0,
            moving_flags: MovingFlags::empty(),
            vitals: Vitals::default(),
            size: 100,
            speed_factor: 1.0,
            is_fighting: false,
            is_following: false,
            target: None,
            is_spawned: true,
            is_dead: false,
            move_timer: 0,
            attack_timer: 0,
            despawn_time: 0,
            respawn_time: 0,
            kind,
        }
    }
}
