use duskwold_common::object::AttackFlags;

use crate::{mover::Mover, server_context::ServerContext};

/// Refine bonus percentages indexed by refine level 0 to 10.
const REFINE_TABLE: [f64; 11] = [0.0, 2.0, 4.0, 6.0, 8.0, 10.0, 13.0, 16.0, 19.0, 21.0, 24.0];

/// Melee damage dealt by `attacker` against `defender`, never negative.
/// Pure: reads only the two snapshots and the provided generator, so it can
/// be exercised without a live world.
pub fn melee_damage(attacker: &Mover, _defender: &Mover, rng: &mut fastrand::Rng) -> i32 {
    let mut base_damages = 0;

    if let Some(equipment) = attacker.equipment() {
        // An empty weapon slot contributes nothing, it is not an error.
        if let Some(weapon) = &equipment.right_weapon {
            base_damages = attacker.weapon_attack_damages(weapon.weapon_type);

            let min_ability = weapon.ability_min * 2;
            let max_ability = weapon.ability_max * 2;
            let (low, high) =
                if min_ability <= max_ability { (min_ability, max_ability) } else { (max_ability, min_ability) };
            let weapon_damage = rng.i32(low..=high);

            let multiplier = refine_multiplier(weapon.refine as i32);
            let refine_damage = (weapon_damage as f64 * multiplier).floor() as i32
                + (weapon.refine as f64).powf(1.5).floor() as i32;

            base_damages += weapon_damage + refine_damage;
        }
    }

    base_damages.max(0)
}

/// Defense handed to the combat-resolution layer: natural armor against
/// plain hits, magic resist when the attack is flagged magical.
pub fn defense(
    defender: &Mover,
    _attacker: &Mover,
    flags: AttackFlags,
    ctx: &ServerContext,
) -> i32 {
    let template = ctx.mover_template(defender.model_id);
    let armor = if flags.contains(AttackFlags::MAGIC) {
        template.resist_magic
    } else {
        template.natural_armor
    };

    (armor / 7.0 + 1.0) as i32
}

/// `(table[refine] + 100) / 100`, with the level clamped into the table and
/// a neutral multiplier if the lookup still misses.
fn refine_multiplier(refine: i32) -> f64 {
    let index = refine.clamp(0, 10) as usize;
    match REFINE_TABLE.get(index) {
        Some(bonus) => (bonus + 100.0) / 100.0,
        None => 1.0,
    }
}
