//! Centralised simulation constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! Runtime overrides live in [`crate::config::SimConfig`], which mirrors this
//! file field-for-field and is loaded from `assets/sim.toml` if present.

// ── Clock & Loop ──────────────────────────────────────────────────────────────

/// Fixed simulation step, in seconds (60 Hz).
pub const FIXED_STEP: f64 = 1.0 / 60.0;

/// Maximum wall-clock delta accepted from the host frame driver before it is
/// clamped (the "spiral of death" guard).
pub const MAX_FRAME_DELTA: f64 = 0.2;

/// Maximum number of `fixedUpdate` calls run from a single accumulated frame.
pub const MAX_CATCHUP_TICKS: u32 = 5;

// ── Player: Movement ──────────────────────────────────────────────────────────

/// Base walking speed, world units per second.
pub const WALK_SPEED: f32 = 5.0;

/// Multiplier applied to `WALK_SPEED` while sprint is active.
pub const SPRINT_MULTIPLIER: f32 = 1.5;

/// Pitch clamp margin below ±π/2 (radians) to avoid gimbal lock at the poles.
pub const PITCH_EPSILON: f32 = 0.01;

/// Jump height, world units.
pub const JUMP_HEIGHT: f32 = 2.0;

/// Gravity acceleration, world units per second squared.
pub const GRAVITY: f32 = 20.0;

// ── Player: Stamina ────────────────────────────────────────────────────────────

/// Stamina drain rate while sprinting, units per second.
pub const STAMINA_DRAIN_PER_SEC: f32 = 20.0;

/// Stamina regen rate while not sprinting, units per second.
pub const STAMINA_REGEN_PER_SEC: f32 = 15.0;

/// Fraction of max stamina that must be re-crossed (upward) before sprint can
/// be re-enabled after hitting zero.
pub const STAMINA_SPRINT_REENABLE_FRACTION: f32 = 0.2;

// ── Physics Probe ─────────────────────────────────────────────────────────────

/// Maximum downward ray distance used by `checkGround`.
pub const GROUND_CHECK_DISTANCE: f32 = 3.0;

/// Player capsule radius used for horizontal collision probing.
pub const PLAYER_RADIUS: f32 = 0.4;

/// Velocity retained (as a fraction) after a wall-slide projection.
pub const WALL_SLIDE_FACTOR: f32 = 0.8;

// ── Zombie ────────────────────────────────────────────────────────────────────

/// Distance at which a wandering/idle zombie begins chasing the player.
pub const ZOMBIE_CHASE_DISTANCE: f32 = 30.0;

/// Distance at which a chasing zombie gives up and returns to wandering.
/// 1.5x the chase-trigger distance, per spec.
pub const ZOMBIE_GIVE_UP_DISTANCE: f32 = 45.0;

/// Distance at which a chasing zombie starts attacking.
pub const ZOMBIE_ATTACK_DISTANCE: f32 = 2.0;

/// Radius of the wander circle around a zombie's spawn anchor.
pub const ZOMBIE_WANDER_RADIUS: f32 = 10.0;

/// Seconds between wander heading redirects.
pub const ZOMBIE_WANDER_REDIRECT_SECS: f32 = 3.0;

/// Fraction of full speed used while wandering.
pub const ZOMBIE_WANDER_SPEED_FRACTION: f32 = 0.5;

/// Seconds a dying zombie lingers before removal.
pub const ZOMBIE_DEATH_LINGER_SECS: f32 = 5.0;

/// Seconds between attacks from an attacking zombie.
pub const ZOMBIE_ATTACK_COOLDOWN_SECS: f32 = 1.5;

// ── Wave Scheduler ────────────────────────────────────────────────────────────

/// Preparation phase duration between waves, seconds.
pub const WAVE_PREPARATION_SECS: f32 = 30.0;

/// Seconds between individual zombie spawns during an active wave.
pub const WAVE_SPAWN_INTERVAL_SECS: f32 = 0.5;

/// Minimum distance from the player a spawn candidate must have to be chosen
/// without falling back to the unfiltered candidate set.
pub const WAVE_SPAWN_MIN_PLAYER_DISTANCE: f32 = 20.0;

/// Score awarded per zombie kill, multiplied by the current wave index.
pub const SCORE_PER_KILL: u32 = 100;

/// Score bonus awarded at the end of a wave, multiplied by the wave index.
pub const SCORE_WAVE_END_BONUS: u32 = 500;

/// `totalZombiesInWave(w) = ZOMBIES_PER_WAVE_SLOPE * w + ZOMBIES_PER_WAVE_BASE`
pub const ZOMBIES_PER_WAVE_SLOPE: u32 = 5;
pub const ZOMBIES_PER_WAVE_BASE: u32 = 10;

// ── Audio Director ─────────────────────────────────────────────────────────────

/// Minimum seconds a music state must be held before another transition is
/// allowed, to avoid flapping between states.
pub const MUSIC_MIN_DWELL_SECS: f32 = 2.0;

/// Master gain multiplier applied while the simulation is paused.
pub const PAUSE_GAIN_MULTIPLIER: f32 = 0.5;

/// Player health fraction below which the music director prefers "tense".
pub const MUSIC_TENSE_HEALTH_FRACTION: f32 = 0.25;

// ── LOD / Perf Controller ──────────────────────────────────────────────────────

/// Target frame time, seconds (60 FPS).
pub const LOD_TARGET_FRAME_SECS: f32 = 1.0 / 60.0;

/// Frame-time multiplier above target that counts as "slow".
pub const LOD_SLOW_MULTIPLIER: f32 = 1.5;

/// Frame-time multiplier below target that counts as "fast".
pub const LOD_FAST_MULTIPLIER: f32 = 0.7;

/// Consecutive slow frames required before stepping quality down.
pub const LOD_SLOW_FRAME_STREAK: u32 = 30;

/// Cooldown after stepping quality down, seconds.
pub const LOD_STEP_DOWN_COOLDOWN_SECS: f32 = 3.0;

/// Cooldown after stepping quality up, seconds.
pub const LOD_STEP_UP_COOLDOWN_SECS: f32 = 5.0;

/// LOD far-plane distance thresholds per quality level, `[low, medium, high]`.
pub const LOD_FAR_THRESHOLDS: [[f32; 3]; 3] = [
    [20.0, 40.0, 80.0],
    [30.0, 60.0, 120.0],
    [50.0, 100.0, 200.0],
];

// ── Snapshot Codec ─────────────────────────────────────────────────────────────

/// Fractional digits retained when serializing spatial reals.
pub const SNAPSHOT_SPATIAL_DIGITS: i32 = 3;

/// Tolerance allowed on a round-tripped spatial real, per spec §8 property 1.
pub const SNAPSHOT_SPATIAL_TOLERANCE: f32 = 5e-4;
