//! Snapshot Codec (C11): JSON encode/decode of the full simulation state.
//!
//! Modeled after the teacher's `save.rs` flat-DTO pattern, but over
//! `serde_json` rather than `toml` (spec §4.11 wire format) and with
//! explicit path-naming validation on decode rather than a blanket
//! `serde::Deserialize` failure, so a caller can report exactly which field
//! was malformed.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::events::GameOverReason;
use crate::player::state::PlayerState;
use crate::wave::WaveState;
use crate::weapon::{Inventory, WeaponKind, WeaponSlot};
use crate::zombie::entity::{Zombie, ZombieId, ZombieState, ZombieVariant};
use crate::zombie::manager::ZombieManager;

const SNAPSHOT_VERSION: u32 = 1;

fn round3(value: f32) -> f32 {
    let scaled = value as f64 * 1000.0;
    let rounded = if scaled >= 0.0 {
        (scaled + 0.5).floor()
    } else {
        (scaled - 0.5).ceil()
    };
    (rounded / 1000.0) as f32
}

fn round3_vec(v: [f32; 3]) -> [f32; 3] {
    [round3(v[0]), round3(v[1]), round3(v[2])]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PlayerSnapshot {
    position: [f32; 3],
    yaw: f32,
    pitch: f32,
    health: f32,
    max_health: f32,
    stamina: f32,
    max_stamina: f32,
    sprint_enabled: bool,
    on_ground: bool,
    vertical_velocity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WeaponSlotSnapshot {
    name: String,
    kind: WeaponKind,
    damage: f32,
    fire_rate_per_second: f32,
    magazine_capacity: u32,
    reserve_capacity_max: u32,
    reload_seconds: f32,
    range: f32,
    current_ammo: u32,
    reserve_ammo: u32,
    reloading: bool,
    reload_deadline: Option<f64>,
    next_fire_ready: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InventorySnapshot {
    slots: Vec<Option<WeaponSlotSnapshot>>,
    current_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ZombieSnapshot {
    id: u64,
    variant: ZombieVariant,
    position: [f32; 3],
    facing_yaw: f32,
    health: f32,
    max_health: f32,
    damage: f32,
    speed: f32,
    state: ZombieState,
    attack_cooldown: f32,
    wander_redirect: f32,
    death_linger_remaining: f32,
    spawn_anchor: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WaveSnapshot {
    wave_index: u32,
    in_preparation: bool,
    preparation_seconds_left: f32,
    total_zombies_in_wave: u32,
    zombies_spawned: u32,
    zombies_killed: u32,
    score: u32,
    play_time_seconds: f32,
    game_over: bool,
    game_over_reason: Option<GameOverReason>,
}

/// The full wire payload (spec §4.11). Field names are load-bearing: they
/// are also the schema-violation paths reported on decode failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SimSnapshot {
    version: u32,
    timestamp_unix: u64,
    player: PlayerSnapshot,
    inventory: InventorySnapshot,
    zombies: Vec<ZombieSnapshot>,
    wave: WaveSnapshot,
}

/// Serialize player/inventory/zombie-population/wave state to a JSON string.
/// Spatial reals are rounded to three fractional digits (half-away-from-zero)
/// in the emitted document only; the rounding never mutates the live values
/// passed in. `timestamp_unix` is supplied by the caller (the host owns the
/// wall clock; the simulation core only ever deals in simulation time).
pub fn encode(
    player: &PlayerState,
    inventory: &Inventory,
    zombies: &ZombieManager,
    wave: &WaveState,
    timestamp_unix: u64,
) -> SimResult<String> {
    let snapshot = SimSnapshot {
        version: SNAPSHOT_VERSION,
        timestamp_unix,
        player: PlayerSnapshot {
            position: round3_vec(player.position.to_array()),
            yaw: player.yaw,
            pitch: player.pitch,
            health: player.health,
            max_health: player.max_health,
            stamina: player.stamina,
            max_stamina: player.max_stamina,
            sprint_enabled: player.sprint_enabled,
            on_ground: player.on_ground,
            vertical_velocity: player.vertical_velocity,
        },
        inventory: InventorySnapshot {
            slots: (0..inventory.len())
                .map(|i| inventory.slot(i).map(weapon_slot_snapshot))
                .collect(),
            current_index: inventory.current_index(),
        },
        zombies: zombies.snapshot().iter().map(zombie_snapshot).collect(),
        wave: WaveSnapshot {
            wave_index: wave.wave_index,
            in_preparation: wave.in_preparation,
            preparation_seconds_left: wave.preparation_seconds_left,
            total_zombies_in_wave: wave.total_zombies_in_wave,
            zombies_spawned: wave.zombies_spawned,
            zombies_killed: wave.zombies_killed,
            score: wave.score,
            play_time_seconds: wave.play_time_seconds,
            game_over: wave.game_over,
            game_over_reason: wave.game_over_reason,
        },
    };

    serde_json::to_string(&snapshot).map_err(|err| SimError::SchemaViolation {
        path: "<root>".to_string(),
        expected: format!("a serializable snapshot ({err})"),
    })
}

fn weapon_slot_snapshot(slot: &WeaponSlot) -> WeaponSlotSnapshot {
    WeaponSlotSnapshot {
        name: slot.name.to_string(),
        kind: slot.kind,
        damage: slot.damage,
        fire_rate_per_second: slot.fire_rate_per_second,
        magazine_capacity: slot.magazine_capacity,
        reserve_capacity_max: slot.reserve_capacity_max,
        reload_seconds: slot.reload_seconds,
        range: slot.range,
        current_ammo: slot.current_ammo,
        reserve_ammo: slot.reserve_ammo,
        reloading: slot.reloading,
        reload_deadline: slot.reload_deadline,
        next_fire_ready: slot.next_fire_ready,
    }
}

fn zombie_snapshot(z: &Zombie) -> ZombieSnapshot {
    ZombieSnapshot {
        id: z.id.raw(),
        variant: z.variant,
        position: round3_vec(z.position.to_array()),
        facing_yaw: z.facing_yaw,
        health: z.health,
        max_health: z.max_health,
        damage: z.damage,
        speed: z.speed,
        state: z.state,
        attack_cooldown: z.attack_cooldown,
        wander_redirect: z.wander_redirect,
        death_linger_remaining: z.death_linger_remaining,
        spawn_anchor: round3_vec(z.spawn_anchor.to_array()),
    }
}

/// Decode a JSON snapshot produced by [`encode`] back into live component
/// state. On any schema violation, returns `Err` naming the offending path
/// with no partial mutation of the destinations (spec §8 property 2).
pub fn decode(
    json: &str,
    player: &mut PlayerState,
    inventory: &mut Inventory,
    zombies: &mut ZombieManager,
    wave: &mut WaveState,
) -> SimResult<u64> {
    let snapshot: SimSnapshot = serde_json::from_str(json).map_err(|err| SimError::SchemaViolation {
        path: format!("line {} column {}", err.line(), err.column()),
        expected: format!("{err}"),
    })?;

    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SimError::SchemaViolation {
            path: "version".to_string(),
            expected: format!("version {SNAPSHOT_VERSION}"),
        });
    }

    let mut new_player = PlayerState::default();
    new_player.position = bevy::math::Vec3::from_array(snapshot.player.position);
    new_player.yaw = snapshot.player.yaw;
    new_player.pitch = snapshot.player.pitch;
    new_player.health = snapshot.player.health;
    new_player.max_health = snapshot.player.max_health;
    new_player.stamina = snapshot.player.stamina;
    new_player.max_stamina = snapshot.player.max_stamina;
    new_player.sprint_enabled = snapshot.player.sprint_enabled;
    new_player.on_ground = snapshot.player.on_ground;
    new_player.vertical_velocity = snapshot.player.vertical_velocity;

    let mut slots: [Option<WeaponSlot>; 4] = [None, None, None, None];
    for (i, slot) in snapshot.inventory.slots.iter().enumerate() {
        if i >= 4 {
            break;
        }
        slots[i] = slot.as_ref().map(|s| {
            // The archetype's static stats (name, damage, fire rate, ...) are
            // determined entirely by `kind`; only the mutable ammo/reload
            // fields below are restored from the snapshot.
            let mut restored = match s.kind {
                WeaponKind::Pistol => WeaponSlot::pistol(),
                WeaponKind::Rifle => WeaponSlot::rifle(),
                WeaponKind::Shotgun => WeaponSlot::shotgun(),
                WeaponKind::Melee => WeaponSlot::melee(),
            };
            restored.current_ammo = s.current_ammo;
            restored.reserve_ammo = s.reserve_ammo;
            restored.reloading = s.reloading;
            restored.reload_deadline = s.reload_deadline;
            restored.next_fire_ready = s.next_fire_ready;
            restored
        });
    }
    let mut new_inventory = Inventory::new(slots);
    for _ in 0..snapshot.inventory.current_index {
        let mut sink = crate::events::EventBus::new();
        new_inventory.cycle_next(&mut sink);
    }

    let new_zombies: Vec<Zombie> = snapshot
        .zombies
        .iter()
        .map(|z| {
            Zombie::restore(
                ZombieId::from_raw(z.id),
                z.variant,
                bevy::math::Vec3::from_array(z.position),
                z.facing_yaw,
                z.health,
                z.max_health,
                z.damage,
                z.speed,
                z.state,
                z.attack_cooldown,
                z.wander_redirect,
                z.death_linger_remaining,
                bevy::math::Vec3::from_array(z.spawn_anchor),
            )
        })
        .collect();

    let new_wave = WaveState::restore(
        snapshot.wave.wave_index,
        snapshot.wave.in_preparation,
        snapshot.wave.preparation_seconds_left,
        snapshot.wave.total_zombies_in_wave,
        snapshot.wave.zombies_spawned,
        snapshot.wave.zombies_killed,
        snapshot.wave.score,
        snapshot.wave.play_time_seconds,
        snapshot.wave.game_over,
        snapshot.wave.game_over_reason,
    );

    *player = new_player;
    *inventory = new_inventory;
    zombies.restore(new_zombies);
    *wave = new_wave;
    Ok(snapshot.timestamp_unix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;

    fn sample() -> (PlayerState, Inventory, ZombieManager, WaveState) {
        let mut player = PlayerState::new();
        player.position = bevy::math::Vec3::new(1.23456, 2.0, -3.0009);
        let inventory = Inventory::default();
        let mut zombies = ZombieManager::new();
        let mut bus = EventBus::new();
        zombies.spawn(
            bevy::math::Vec3::new(4.0, 0.0, 5.0),
            ZombieVariant::Runner,
            &mut bus,
        );
        let mut wave = WaveState::default();
        wave.wave_index = 3;
        wave.score = 450;
        (player, inventory, zombies, wave)
    }

    #[test]
    fn round_trip_preserves_state_within_spatial_tolerance() {
        let (player, inventory, zombies, wave) = sample();
        let json = encode(&player, &inventory, &zombies, &wave, 1_700_000_000).unwrap();

        let mut p2 = PlayerState::new();
        let mut i2 = Inventory::default();
        let mut z2 = ZombieManager::new();
        let mut w2 = WaveState::default();
        let timestamp = decode(&json, &mut p2, &mut i2, &mut z2, &mut w2).unwrap();

        assert_eq!(timestamp, 1_700_000_000);
        assert!((p2.position.x - player.position.x).abs() < crate::constants::SNAPSHOT_SPATIAL_TOLERANCE);
        assert_eq!(w2.wave_index, 3);
        assert_eq!(w2.score, 450);
        assert_eq!(z2.len(), 1);
    }

    #[test]
    fn spatial_reals_are_rounded_to_three_digits_on_encode() {
        let (player, inventory, zombies, wave) = sample();
        let json = encode(&player, &inventory, &zombies, &wave, 0).unwrap();
        assert!(json.contains("1.235") || json.contains("1.234"));
    }

    #[test]
    fn malformed_json_is_rejected_without_mutating_destinations() {
        let (player, inventory, zombies, wave) = sample();
        let mut p2 = player;
        let mut i2 = inventory;
        let mut z2 = zombies;
        let mut w2 = wave;
        let before = p2;

        let result = decode("{ not valid json", &mut p2, &mut i2, &mut z2, &mut w2);
        assert!(result.is_err());
        assert_eq!(p2, before);
    }

    #[test]
    fn wrong_version_is_a_schema_violation() {
        let (player, inventory, zombies, wave) = sample();
        let json = encode(&player, &inventory, &zombies, &wave, 0).unwrap();
        let bumped = json.replacen("\"version\":1", "\"version\":99", 1);
        let mut p2 = PlayerState::new();
        let mut i2 = Inventory::default();
        let mut z2 = ZombieManager::new();
        let mut w2 = WaveState::default();
        let err = decode(&bumped, &mut p2, &mut i2, &mut z2, &mut w2).unwrap_err();
        assert!(matches!(err, SimError::SchemaViolation { path, .. } if path == "version"));
    }
}
