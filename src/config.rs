//! Persisted settings and runtime-tunable gameplay configuration.
//!
//! Two distinct things live here, both grounded in the teacher's
//! `config.rs`/`save.rs` patterns: [`SimConfig`] mirrors `constants.rs`
//! field-for-field the way `PhysicsConfig` mirrors the teacher's own
//! `constants.rs` (same load-from-TOML-with-fallback-to-defaults shape), and
//! [`Settings`] is the small KV blob for user preferences from spec §6,
//! modeled on the teacher's versioned `SaveSnapshot`.

use bevy::log::{info, warn};
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Persisted settings key (spec §9 Open Questions resolution: `zww_settings`
/// is adopted over the spec's generic `gameSettings` placeholder).
pub const SETTINGS_KEY: &str = "zww_settings";

/// User preference blob (spec §6 "Persisted settings").
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub mouse_sensitivity: f32,
    pub master_volume: f32,
    pub music_volume: f32,
    pub sfx_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 50.0,
            master_volume: 80.0,
            music_volume: 70.0,
            sfx_volume: 80.0,
        }
    }
}

impl Settings {
    /// Clamp every field into its documented range (spec §6:
    /// `mouseSensitivity ∈ [1,100]`, volumes `∈ [0,100]`).
    pub fn clamped(self) -> Self {
        Self {
            mouse_sensitivity: self.mouse_sensitivity.clamp(1.0, 100.0),
            master_volume: self.master_volume.clamp(0.0, 100.0),
            music_volume: self.music_volume.clamp(0.0, 100.0),
            sfx_volume: self.sfx_volume.clamp(0.0, 100.0),
        }
    }
}

/// Host-backed KV store for [`Settings`] (spec §6 "Persisted settings
/// store"). No concrete backend is provided here; the host implements this
/// over whatever storage it has (browser localStorage, a config file, ...).
pub trait SettingsStore {
    fn load(&self, key: &str) -> Option<Settings>;
    fn save(&mut self, key: &str, settings: &Settings);
}

/// An in-memory `SettingsStore`, useful for tests and as a default until the
/// host installs persistent storage.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    value: Option<Settings>,
}

impl SettingsStore for InMemorySettingsStore {
    fn load(&self, _key: &str) -> Option<Settings> {
        self.value
    }

    fn save(&mut self, _key: &str, settings: &Settings) {
        self.value = Some(*settings);
    }
}

/// Runtime-tunable gameplay configuration, mirroring every constant in
/// [`crate::constants`] so behavior can be retuned from `assets/sim.toml`
/// without recompiling (teacher's `PhysicsConfig` pattern, see
/// `load_physics_config`).
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub fixed_step: f64,
    pub max_frame_delta: f64,
    pub max_catchup_ticks: u32,

    pub walk_speed: f32,
    pub sprint_multiplier: f32,
    pub jump_height: f32,
    pub gravity: f32,

    pub stamina_drain_per_sec: f32,
    pub stamina_regen_per_sec: f32,
    pub stamina_sprint_reenable_fraction: f32,

    pub ground_check_distance: f32,
    pub player_radius: f32,
    pub wall_slide_factor: f32,

    pub zombie_chase_distance: f32,
    pub zombie_give_up_distance: f32,
    pub zombie_attack_distance: f32,
    pub zombie_wander_radius: f32,
    pub zombie_death_linger_secs: f32,
    pub zombie_attack_cooldown_secs: f32,

    pub wave_preparation_secs: f32,
    pub wave_spawn_interval_secs: f32,
    pub wave_spawn_min_player_distance: f32,

    pub music_min_dwell_secs: f32,
    pub pause_gain_multiplier: f32,

    pub lod_slow_frame_streak: u32,
    pub lod_step_down_cooldown_secs: f32,
    pub lod_step_up_cooldown_secs: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_step: FIXED_STEP,
            max_frame_delta: MAX_FRAME_DELTA,
            max_catchup_ticks: MAX_CATCHUP_TICKS,
            walk_speed: WALK_SPEED,
            sprint_multiplier: SPRINT_MULTIPLIER,
            jump_height: JUMP_HEIGHT,
            gravity: GRAVITY,
            stamina_drain_per_sec: STAMINA_DRAIN_PER_SEC,
            stamina_regen_per_sec: STAMINA_REGEN_PER_SEC,
            stamina_sprint_reenable_fraction: STAMINA_SPRINT_REENABLE_FRACTION,
            ground_check_distance: GROUND_CHECK_DISTANCE,
            player_radius: PLAYER_RADIUS,
            wall_slide_factor: WALL_SLIDE_FACTOR,
            zombie_chase_distance: ZOMBIE_CHASE_DISTANCE,
            zombie_give_up_distance: ZOMBIE_GIVE_UP_DISTANCE,
            zombie_attack_distance: ZOMBIE_ATTACK_DISTANCE,
            zombie_wander_radius: ZOMBIE_WANDER_RADIUS,
            zombie_death_linger_secs: ZOMBIE_DEATH_LINGER_SECS,
            zombie_attack_cooldown_secs: ZOMBIE_ATTACK_COOLDOWN_SECS,
            wave_preparation_secs: WAVE_PREPARATION_SECS,
            wave_spawn_interval_secs: WAVE_SPAWN_INTERVAL_SECS,
            wave_spawn_min_player_distance: WAVE_SPAWN_MIN_PLAYER_DISTANCE,
            music_min_dwell_secs: MUSIC_MIN_DWELL_SECS,
            pause_gain_multiplier: PAUSE_GAIN_MULTIPLIER,
            lod_slow_frame_streak: LOD_SLOW_FRAME_STREAK,
            lod_step_down_cooldown_secs: LOD_STEP_DOWN_COOLDOWN_SECS,
            lod_step_up_cooldown_secs: LOD_STEP_UP_COOLDOWN_SECS,
        }
    }
}

/// Attempt to load `path` and overwrite the given config with any values
/// present in the file. A missing file or parse error is not fatal; the
/// compiled defaults are returned (teacher's `load_physics_config`).
pub fn load_sim_config(path: &str) -> SimConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<SimConfig>(&contents) {
            Ok(loaded) => {
                info!("loaded sim config from {path}");
                loaded
            }
            Err(err) => {
                warn!("failed to parse {path}: {err}; using defaults");
                SimConfig::default()
            }
        },
        Err(_) => SimConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_clamp_out_of_range_values() {
        let settings = Settings {
            mouse_sensitivity: 500.0,
            master_volume: -10.0,
            music_volume: 50.0,
            sfx_volume: 150.0,
        }
        .clamped();
        assert_eq!(settings.mouse_sensitivity, 100.0);
        assert_eq!(settings.master_volume, 0.0);
        assert_eq!(settings.music_volume, 50.0);
        assert_eq!(settings.sfx_volume, 100.0);
    }

    #[test]
    fn in_memory_store_round_trips() {
        let mut store = InMemorySettingsStore::default();
        assert!(store.load(SETTINGS_KEY).is_none());
        let settings = Settings::default();
        store.save(SETTINGS_KEY, &settings);
        assert_eq!(store.load(SETTINGS_KEY), Some(settings));
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let config = load_sim_config("assets/does_not_exist.toml");
        assert_eq!(config, SimConfig::default());
    }
}
