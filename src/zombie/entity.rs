//! Zombie Entity (C6): per-entity state machine (idle/wander/chase/attack/
//! dying).

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::constants::{ZOMBIE_WANDER_REDIRECT_SECS, ZOMBIE_WANDER_SPEED_FRACTION};
use crate::events::{EventBus, GameEvent};

/// Per-tick tuning shared by every zombie (spec §9 ambient stack: runtime
/// retunable without recompiling). Held by [`crate::zombie::manager::ZombieManager`]
/// rather than on each [`Zombie`], so it never bloats the per-entity snapshot
/// schema (spec §4.11).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZombieTuning {
    pub chase_distance: f32,
    pub give_up_distance: f32,
    pub attack_distance: f32,
    pub wander_radius: f32,
    pub wander_redirect_secs: f32,
    pub wander_speed_fraction: f32,
    pub death_linger_secs: f32,
    pub attack_cooldown_secs: f32,
}

impl Default for ZombieTuning {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

impl ZombieTuning {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            chase_distance: config.zombie_chase_distance,
            give_up_distance: config.zombie_give_up_distance,
            attack_distance: config.zombie_attack_distance,
            wander_radius: config.zombie_wander_radius,
            wander_redirect_secs: ZOMBIE_WANDER_REDIRECT_SECS,
            wander_speed_fraction: ZOMBIE_WANDER_SPEED_FRACTION,
            death_linger_secs: config.zombie_death_linger_secs,
            attack_cooldown_secs: config.zombie_attack_cooldown_secs,
        }
    }
}

/// Opaque, unique zombie id. Newtype over `u64` so ids can't be confused with
/// other entity indices; stability across snapshot/restore is a Zombie
/// Manager contract (C7), not this type's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZombieId(u64);

impl ZombieId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Fixed archetype selecting a zombie's stats at spawn (spec GLOSSARY
/// "Variant").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZombieVariant {
    Walker,
    Runner,
    Brute,
    Crawler,
}

impl ZombieVariant {
    /// `(max_health, damage, speed)` for this variant.
    pub fn stats(self) -> (f32, f32, f32) {
        match self {
            ZombieVariant::Walker => (100.0, 10.0, 2.0),
            ZombieVariant::Runner => (70.0, 8.0, 4.5),
            ZombieVariant::Brute => (250.0, 25.0, 1.5),
            ZombieVariant::Crawler => (60.0, 6.0, 2.5),
        }
    }
}

/// Zombie state machine states (spec §4.6 transition table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZombieState {
    Idle,
    Wandering,
    Chasing,
    Attacking,
    Dying,
}

/// A single zombie entity (spec §3 `Zombie`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zombie {
    pub id: ZombieId,
    pub variant: ZombieVariant,
    pub position: Vec3,
    pub facing_yaw: f32,

    pub health: f32,
    pub max_health: f32,
    pub damage: f32,
    pub speed: f32,

    pub state: ZombieState,

    pub attack_cooldown: f32,
    pub wander_redirect: f32,
    pub death_linger_remaining: f32,
    wander_heading: Vec3,

    pub spawn_anchor: Vec3,
}

impl Zombie {
    pub fn spawn(id: ZombieId, variant: ZombieVariant, position: Vec3) -> Self {
        let (max_health, damage, speed) = variant.stats();
        Self {
            id,
            variant,
            position,
            facing_yaw: 0.0,
            health: max_health,
            max_health,
            damage,
            speed,
            state: ZombieState::Idle,
            attack_cooldown: 0.0,
            wander_redirect: 0.0,
            death_linger_remaining: 0.0,
            wander_heading: Vec3::ZERO,
            spawn_anchor: position,
        }
    }

    /// Reconstruct a zombie from persisted field values (spec §4.11 snapshot
    /// restore). `wander_heading` is transient steering state, not persisted,
    /// and is re-picked the next time the zombie enters `Wandering`.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: ZombieId,
        variant: ZombieVariant,
        position: Vec3,
        facing_yaw: f32,
        health: f32,
        max_health: f32,
        damage: f32,
        speed: f32,
        state: ZombieState,
        attack_cooldown: f32,
        wander_redirect: f32,
        death_linger_remaining: f32,
        spawn_anchor: Vec3,
    ) -> Self {
        Self {
            id,
            variant,
            position,
            facing_yaw,
            health,
            max_health,
            damage,
            speed,
            state,
            attack_cooldown,
            wander_redirect,
            death_linger_remaining,
            wander_heading: Vec3::ZERO,
            spawn_anchor,
        }
    }

    pub fn is_dying(&self) -> bool {
        self.state == ZombieState::Dying
    }

    /// Whether this zombie may currently land an attack (attacking state and
    /// cooldown elapsed).
    pub fn can_attack(&self) -> bool {
        self.state == ZombieState::Attacking && self.attack_cooldown <= 0.0
    }

    /// Apply damage, clamped to `>= 0`. A no-op on an already-dying zombie
    /// (spec §9 Open Questions resolution). Transitions to `dying` and emits
    /// `zombie:died` exactly once when health reaches zero.
    pub fn take_damage(&mut self, amount: f32, tuning: &ZombieTuning, bus: &mut EventBus) {
        if self.is_dying() || amount <= 0.0 {
            return;
        }
        self.health = (self.health - amount).max(0.0);
        bus.emit(GameEvent::ZombieDamaged {
            id: self.id,
            amount,
        });
        if self.health == 0.0 {
            self.enter_dying(tuning, bus);
        }
    }

    fn enter_dying(&mut self, tuning: &ZombieTuning, bus: &mut EventBus) {
        self.state = ZombieState::Dying;
        self.death_linger_remaining = tuning.death_linger_secs;
        bus.emit(GameEvent::ZombieDied { id: self.id });
    }

    fn enter_wandering(&mut self, tuning: &ZombieTuning, rng_unit: Vec3) {
        self.state = ZombieState::Wandering;
        self.wander_heading = rng_unit;
        self.wander_redirect = tuning.wander_redirect_secs;
    }

    fn enter_chasing(&mut self) {
        self.state = ZombieState::Chasing;
    }

    fn enter_attacking(&mut self) {
        self.state = ZombieState::Attacking;
        self.attack_cooldown = 0.0;
    }

    /// `true` once `death_linger_remaining` has counted down to zero; the
    /// manager should remove the zombie when this is true.
    pub fn is_ready_for_removal(&self) -> bool {
        self.is_dying() && self.death_linger_remaining <= 0.0
    }

    /// Advance this zombie by one fixed step given the player's position and
    /// a source of a fresh unit wander heading (caller-supplied so the state
    /// machine itself stays deterministic and testable).
    pub fn update(
        &mut self,
        dt: f32,
        player_pos: Vec3,
        tuning: &ZombieTuning,
        mut next_wander_heading: impl FnMut() -> Vec3,
        bus: &mut EventBus,
    ) {
        if self.is_dying() {
            self.death_linger_remaining = (self.death_linger_remaining - dt).max(0.0);
            return;
        }

        let to_player = player_pos - self.position;
        let distance = Vec3::new(to_player.x, 0.0, to_player.z).length();

        match self.state {
            ZombieState::Idle => {
                self.enter_wandering(tuning, next_wander_heading());
            }
            ZombieState::Wandering => {
                if distance < tuning.chase_distance {
                    self.enter_chasing();
                } else {
                    self.step_wandering(dt, tuning, &mut next_wander_heading);
                }
            }
            ZombieState::Chasing => {
                if distance < tuning.attack_distance {
                    self.enter_attacking();
                } else if distance > tuning.give_up_distance {
                    self.enter_wandering(tuning, next_wander_heading());
                } else {
                    self.step_chasing(dt, to_player, distance);
                }
            }
            ZombieState::Attacking => {
                if distance >= tuning.attack_distance {
                    self.enter_chasing();
                } else {
                    self.step_attacking(dt, to_player, tuning, bus);
                }
            }
            ZombieState::Dying => unreachable!("handled above"),
        }
    }

    fn step_wandering(
        &mut self,
        dt: f32,
        tuning: &ZombieTuning,
        next_heading: &mut impl FnMut() -> Vec3,
    ) {
        self.wander_redirect -= dt;
        let from_anchor = self.position - self.spawn_anchor;
        let outside_radius =
            Vec3::new(from_anchor.x, 0.0, from_anchor.z).length() > tuning.wander_radius;

        if self.wander_redirect <= 0.0 || outside_radius {
            let heading = if outside_radius {
                let back = self.spawn_anchor - self.position;
                let flat = Vec3::new(back.x, 0.0, back.z);
                if flat.length_squared() > 0.0 {
                    flat.normalize()
                } else {
                    next_heading()
                }
            } else {
                next_heading()
            };
            self.wander_heading = heading;
            self.wander_redirect = tuning.wander_redirect_secs;
        }

        let step = self.wander_heading * self.speed * tuning.wander_speed_fraction * dt;
        self.position += step;
        if step.length_squared() > 0.0 {
            self.facing_yaw = step.x.atan2(step.z);
        }
    }

    fn step_chasing(&mut self, dt: f32, to_player: Vec3, distance: f32) {
        if distance > 0.0 {
            let dir = Vec3::new(to_player.x, 0.0, to_player.z) / distance;
            self.position += dir * self.speed * dt;
            self.facing_yaw = dir.x.atan2(dir.z);
        }
    }

    fn step_attacking(&mut self, dt: f32, to_player: Vec3, tuning: &ZombieTuning, bus: &mut EventBus) {
        let flat = Vec3::new(to_player.x, 0.0, to_player.z);
        if flat.length_squared() > 0.0 {
            self.facing_yaw = flat.x.atan2(flat.z);
        }
        self.attack_cooldown -= dt;
        if self.attack_cooldown <= 0.0 {
            bus.emit(GameEvent::ZombieAttack {
                id: self.id,
                damage: self.damage,
            });
            self.attack_cooldown = tuning.attack_cooldown_secs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus() -> EventBus {
        EventBus::new()
    }

    #[test]
    fn chase_trigger_within_range() {
        let mut z = Zombie::spawn(ZombieId::from_raw(1), ZombieVariant::Walker, Vec3::ZERO);
        let mut b = bus();
        z.update(0.1, Vec3::ZERO, &ZombieTuning::default(), || Vec3::X, &mut b); // idle -> wandering
        z.update(0.1, Vec3::new(10.0, 0.0, 0.0), &ZombieTuning::default(), || Vec3::X, &mut b);
        assert_eq!(z.state, ZombieState::Chasing);
    }

    #[test]
    fn attack_trigger_within_range() {
        let mut z = Zombie::spawn(ZombieId::from_raw(1), ZombieVariant::Walker, Vec3::ZERO);
        z.state = ZombieState::Chasing;
        let mut b = bus();
        z.update(0.1, Vec3::new(1.0, 0.0, 0.0), &ZombieTuning::default(), || Vec3::X, &mut b);
        assert_eq!(z.state, ZombieState::Attacking);
    }

    #[test]
    fn chasing_gives_up_beyond_1_5x_detect_distance() {
        let mut z = Zombie::spawn(ZombieId::from_raw(1), ZombieVariant::Walker, Vec3::ZERO);
        z.state = ZombieState::Chasing;
        let mut b = bus();
        z.update(0.1, Vec3::new(50.0, 0.0, 0.0), &ZombieTuning::default(), || Vec3::X, &mut b);
        assert_eq!(z.state, ZombieState::Wandering);
    }

    #[test]
    fn damage_conservation_and_death_latch() {
        let mut z = Zombie::spawn(ZombieId::from_raw(1), ZombieVariant::Walker, Vec3::ZERO);
        let mut b = bus();
        z.take_damage(40.0, &ZombieTuning::default(), &mut b);
        assert_eq!(z.health, 60.0);
        z.take_damage(1000.0, &ZombieTuning::default(), &mut b);
        assert_eq!(z.health, 0.0);
        assert!(z.is_dying());

        // Further damage after death is a no-op: no re-entrant transition,
        // no further events.
        let before = z;
        z.take_damage(10.0, &ZombieTuning::default(), &mut b);
        assert_eq!(z, before);
    }

    #[test]
    fn death_latch_blocks_any_other_state_forever() {
        let mut z = Zombie::spawn(ZombieId::from_raw(1), ZombieVariant::Walker, Vec3::ZERO);
        let mut b = bus();
        z.take_damage(1000.0, &ZombieTuning::default(), &mut b);
        for _ in 0..10 {
            z.update(1.0, Vec3::ZERO, &ZombieTuning::default(), || Vec3::X, &mut b);
            assert_eq!(z.state, ZombieState::Dying);
        }
        assert!(z.is_ready_for_removal());
    }

    #[test]
    fn first_shot_kills_a_walker_in_four_hits() {
        let mut z = Zombie::spawn(ZombieId::from_raw(7), ZombieVariant::Walker, Vec3::ZERO);
        let mut b = bus();
        let damage = 25.0;
        let expected = [75.0, 50.0, 25.0, 0.0];
        for (i, exp) in expected.iter().enumerate() {
            z.take_damage(damage, &ZombieTuning::default(), &mut b);
            assert_eq!(z.health, *exp, "after hit {}", i + 1);
        }
        assert!(z.is_dying());
    }
}
