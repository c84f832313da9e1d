//! Player Entity (C3): position/orientation, health, stamina, locomotion,
//! jump physics.
//!
//! [`PlayerState`] is a plain data type with inherent methods implementing
//! every operation from spec §4.3; it is wrapped as a Bevy [`Resource`] by
//! [`crate::controller`] for orchestration, but every method here is fully
//! testable without an ECS `World`.

use bevy::math::Vec3;
use bevy::prelude::Resource;

use crate::config::SimConfig;
use crate::constants::PITCH_EPSILON;
use crate::events::{EventBus, GameEvent};

pub const MAX_HEALTH_DEFAULT: f32 = 100.0;
pub const MAX_STAMINA_DEFAULT: f32 = 100.0;

/// Full player entity state (spec §3 `PlayerState`).
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,

    pub health: f32,
    pub max_health: f32,

    pub stamina: f32,
    pub max_stamina: f32,
    /// Hysteretic sprint-allowed flag; see `sprint()` / `update_stamina()`.
    pub sprint_enabled: bool,
    sprint_requested: bool,

    pub on_ground: bool,
    pub vertical_velocity: f32,

    // Tunables sourced from `SimConfig` at construction (spec §9 ambient
    // stack: runtime-retunable without recompiling). Not part of the
    // snapshot schema (§4.11) — these govern behavior, not saved state.
    walk_speed: f32,
    sprint_multiplier: f32,
    jump_height: f32,
    gravity: f32,
    stamina_drain_per_sec: f32,
    stamina_regen_per_sec: f32,
    stamina_sprint_reenable_fraction: f32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

impl PlayerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh player with tunables sourced from `config`.
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            health: MAX_HEALTH_DEFAULT,
            max_health: MAX_HEALTH_DEFAULT,
            stamina: MAX_STAMINA_DEFAULT,
            max_stamina: MAX_STAMINA_DEFAULT,
            sprint_enabled: true,
            sprint_requested: false,
            on_ground: true,
            vertical_velocity: 0.0,
            walk_speed: config.walk_speed,
            sprint_multiplier: config.sprint_multiplier,
            jump_height: config.jump_height,
            gravity: config.gravity,
            stamina_drain_per_sec: config.stamina_drain_per_sec,
            stamina_regen_per_sec: config.stamina_regen_per_sec,
            stamina_sprint_reenable_fraction: config.stamina_sprint_reenable_fraction,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Sprint is currently active iff requested, enabled, and stamina > 0.
    pub fn is_sprint_active(&self) -> bool {
        self.sprint_requested && self.sprint_enabled && self.stamina > 0.0
    }

    /// Translate position in the horizontal plane of the player's yaw frame.
    /// `input_x` is strafe (+right), `input_z` is forward/back (+forward).
    /// Diagonals are normalized so |velocity| never exceeds the configured max.
    pub fn move_player(&mut self, input_x: f32, input_z: f32, dt: f32) {
        let mut axis = bevy::math::Vec2::new(input_x, input_z);
        if axis.length_squared() > 1.0 {
            axis = axis.normalize();
        }
        if axis == bevy::math::Vec2::ZERO {
            return;
        }

        let speed = if self.is_sprint_active() {
            self.walk_speed * self.sprint_multiplier
        } else {
            self.walk_speed
        };

        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        // Forward is the yaw-frame +Z axis; strafe is +X.
        let forward = Vec3::new(sin_yaw, 0.0, cos_yaw);
        let right = Vec3::new(cos_yaw, 0.0, -sin_yaw);

        let delta = (forward * axis.y + right * axis.x) * speed * dt;
        self.position += delta;
    }

    /// Update yaw (unbounded) and pitch (clamped to avoid gimbal lock at the
    /// poles) by the given deltas.
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        let limit = std::f32::consts::FRAC_PI_2 - PITCH_EPSILON;
        self.pitch = (self.pitch + delta_pitch).clamp(-limit, limit);
    }

    /// Attempt a jump. Succeeds iff `on_ground`. Returns `true` on success and
    /// emits `player:jumped`.
    pub fn jump(&mut self, bus: &mut EventBus) -> bool {
        if !self.on_ground {
            return false;
        }
        self.vertical_velocity = (2.0 * self.gravity * self.jump_height).sqrt();
        self.on_ground = false;
        bus.emit(GameEvent::PlayerJumped);
        true
    }

    /// Request sprint active/inactive. Actual activation is gated by
    /// `sprint_enabled` and current stamina; see `is_sprint_active`.
    pub fn sprint(&mut self, active: bool) {
        self.sprint_requested = active;
    }

    /// Apply damage, clamped to `[0, max_health]`. Emits `player:damaged` for
    /// any positive amount, and `player:died` exactly once when health
    /// reaches zero.
    pub fn take_damage(&mut self, amount: f32, bus: &mut EventBus) {
        if amount <= 0.0 {
            return;
        }
        let was_dead = self.is_dead();
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        bus.emit(GameEvent::PlayerDamaged { amount });
        if !was_dead && self.is_dead() {
            bus.emit(GameEvent::PlayerDied);
        }
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).clamp(0.0, self.max_health);
    }

    /// Integrate vertical motion under gravity and resolve ground contact.
    /// Emits `player:landed` exactly when the player crosses `ground_y` from
    /// above while airborne.
    pub fn update_physics(&mut self, dt: f32, ground_y: f32, bus: &mut EventBus) {
        if self.on_ground {
            return;
        }
        self.vertical_velocity -= self.gravity * dt;
        self.position.y += self.vertical_velocity * dt;

        if self.position.y <= ground_y {
            self.position.y = ground_y;
            self.vertical_velocity = 0.0;
            self.on_ground = true;
            bus.emit(GameEvent::PlayerLanded);
        }
    }

    /// Drain stamina while sprint is active, regenerate otherwise, with
    /// explicit hysteresis: once stamina hits zero, `sprint_enabled` is
    /// cleared and only re-set once stamina re-crosses
    /// `STAMINA_SPRINT_REENABLE_FRACTION * max_stamina` upward.
    pub fn update_stamina(&mut self, dt: f32) {
        if self.is_sprint_active() {
            self.stamina = (self.stamina - self.stamina_drain_per_sec * dt).max(0.0);
        } else {
            self.stamina = (self.stamina + self.stamina_regen_per_sec * dt).min(self.max_stamina);
        }

        if self.stamina <= 0.0 {
            self.sprint_enabled = false;
        } else if self.stamina >= self.max_stamina * self.stamina_sprint_reenable_fraction {
            self.sprint_enabled = true;
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
    fn jump_gating_only_succeeds_from_ground() {
        let mut player = PlayerState::new();
        let mut b = bus();
        assert!(player.jump(&mut b));
        assert!(!player.on_ground);
        assert!(!player.jump(&mut b));
    }

    #[test]
    fn jump_apex_matches_configured_height() {
        let mut player = PlayerState::new();
        let mut b = bus();
        player.jump(&mut b);
        let start_y = player.position.y;
        let dt = 1.0 / 600.0; // fine-grained integration to bound numerical error
        let mut max_y = start_y;
        for _ in 0..2000 {
            if player.on_ground {
                break;
            }
            player.update_physics(dt, start_y, &mut b);
            max_y = max_y.max(player.position.y);
        }
        assert!((max_y - (start_y + player.jump_height)).abs() < 0.01);
    }

    #[test]
    fn stamina_hysteresis_blocks_sprint_until_threshold() {
        let mut player = PlayerState::new();
        player.stamina = 10.0;
        player.sprint(true);
        // Drain to zero over 0.5s at 20/s.
        player.update_stamina(0.5);
        assert_eq!(player.stamina, 0.0);
        assert!(!player.sprint_enabled);
        assert!(!player.is_sprint_active());

        player.sprint(false);
        // Regenerate at 15/s; after 1s stamina = 15, still below 20% of 100.
        player.update_stamina(1.0);
        assert_eq!(player.stamina, 15.0);
        player.sprint(true);
        assert!(!player.is_sprint_active(), "still below the 20% threshold");

        // Cross the threshold.
        player.sprint(false);
        let regen = player.stamina_regen_per_sec;
        player.update_stamina((20.001 - 15.0) / regen);
        assert!(player.stamina >= 20.0);
        player.sprint(true);
        assert!(player.is_sprint_active());
    }

    #[test]
    fn take_damage_clamps_and_emits_once() {
        let mut player = PlayerState::new();
        let mut b = bus();
        player.health = 5.0;
        player.take_damage(15.0, &mut b);
        assert_eq!(player.health, 0.0);
        assert!(player.is_dead());
        let events = b.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], GameEvent::PlayerDamaged { amount: 15.0 });
        assert_eq!(events[1], GameEvent::PlayerDied);
    }

    #[test]
    fn heal_clamps_to_max_health() {
        let mut player = PlayerState::new();
        player.health = 90.0;
        player.heal(50.0);
        assert_eq!(player.health, player.max_health);
    }

    #[test]
    fn diagonal_move_does_not_exceed_max_speed() {
        let mut player = PlayerState::new();
        player.move_player(1.0, 1.0, 1.0);
        let displacement = player.position.length();
        assert!(displacement <= player.walk_speed + 1e-4);
    }
}
