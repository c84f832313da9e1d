//! Wave Scheduler (C8): wave counter, prep timer, spawn pacing, variant mix,
//! score ledger, game-over.

use bevy::math::Vec3;
use bevy::prelude::Resource;
use rand::Rng;

use crate::config::SimConfig;
use crate::events::{EventBus, GameEvent, GameOverReason};
use crate::zombie::entity::ZombieVariant;
use crate::zombie::manager::ZombieManager;

/// `totalZombiesInWave(w) = slope*w + base` (spec §3, property 3; defaults
/// to `5w + 10`).
pub fn total_zombies_in_wave_with(wave_index: u32, base: u32, slope: u32) -> u32 {
    slope * wave_index + base
}

/// Roll a zombie variant for the given wave index, using the band
/// distribution from spec §4.8.
pub fn roll_variant(wave_index: u32, rng: &mut impl Rng) -> ZombieVariant {
    let r: f32 = rng.gen_range(0.0..1.0);
    let (walker, runner, crawler) = if wave_index <= 4 {
        (0.60, 0.25, 0.10)
    } else if wave_index <= 9 {
        (0.40, 0.30, 0.20)
    } else {
        (0.30, 0.30, 0.20)
    };
    if r < walker {
        ZombieVariant::Walker
    } else if r < walker + runner {
        ZombieVariant::Runner
    } else if r < walker + runner + crawler {
        ZombieVariant::Crawler
    } else {
        ZombieVariant::Brute
    }
}

/// Pick a spawn point: prefer candidates at least `min_player_distance` from
/// the player, falling back to the full candidate set if none qualify.
pub fn choose_spawn_point(
    candidates: &[Vec3],
    player_pos: Vec3,
    min_player_distance: f32,
    rng: &mut impl Rng,
) -> Vec3 {
    let far_enough: Vec<Vec3> = candidates
        .iter()
        .copied()
        .filter(|c| (*c - player_pos).length() >= min_player_distance)
        .collect();
    let pool = if far_enough.is_empty() {
        candidates
    } else {
        &far_enough
    };
    pool[rng.gen_range(0..pool.len())]
}

/// The wave state machine's counters and flags (spec §3 `WaveState`).
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct WaveState {
    pub wave_index: u32,
    pub in_preparation: bool,
    pub preparation_seconds_left: f32,
    pub total_zombies_in_wave: u32,
    pub zombies_spawned: u32,
    pub zombies_killed: u32,
    pub score: u32,
    pub play_time_seconds: f32,
    pub game_over: bool,
    pub game_over_reason: Option<GameOverReason>,
    spawn_timer: f32,
}

impl WaveState {
    /// Reconstruct persisted counters (spec §4.11 snapshot restore).
    /// `spawn_timer` is transient inter-spawn spacing state, not persisted,
    /// and restarts from zero.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
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
    ) -> Self {
        Self {
            wave_index,
            in_preparation,
            preparation_seconds_left,
            total_zombies_in_wave,
            zombies_spawned,
            zombies_killed,
            score,
            play_time_seconds,
            game_over,
            game_over_reason,
            spawn_timer: 0.0,
        }
    }
}

impl Default for WaveState {
    fn default() -> Self {
        Self {
            wave_index: 0,
            in_preparation: false,
            preparation_seconds_left: 0.0,
            total_zombies_in_wave: 0,
            zombies_spawned: 0,
            zombies_killed: 0,
            score: 0,
            play_time_seconds: 0.0,
            game_over: false,
            game_over_reason: None,
            spawn_timer: 0.0,
        }
    }
}

/// Wave Scheduler: the above counters plus the behavior that drives them
/// (spec §4.8).
#[derive(Resource, Debug)]
pub struct WaveScheduler {
    pub state: WaveState,
    wave_preparation_secs: f32,
    wave_spawn_interval_secs: f32,
    wave_spawn_min_player_distance: f32,
    score_per_kill: u32,
    score_wave_end_bonus: u32,
    zombies_per_wave_base: u32,
    zombies_per_wave_slope: u32,
}

impl Default for WaveScheduler {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

impl WaveScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an idle scheduler with tunables sourced from `config`.
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            state: WaveState::default(),
            wave_preparation_secs: config.wave_preparation_secs,
            wave_spawn_interval_secs: config.wave_spawn_interval_secs,
            wave_spawn_min_player_distance: config.wave_spawn_min_player_distance,
            score_per_kill: crate::constants::SCORE_PER_KILL,
            score_wave_end_bonus: crate::constants::SCORE_WAVE_END_BONUS,
            zombies_per_wave_base: crate::constants::ZOMBIES_PER_WAVE_BASE,
            zombies_per_wave_slope: crate::constants::ZOMBIES_PER_WAVE_SLOPE,
        }
    }

    /// Zombie count for `wave_index` under this scheduler's configured base/slope.
    pub fn total_zombies_in_wave(&self, wave_index: u32) -> u32 {
        total_zombies_in_wave_with(wave_index, self.zombies_per_wave_base, self.zombies_per_wave_slope)
    }

    /// Reset counters and enter preparation for wave 1.
    pub fn start_game(&mut self, bus: &mut EventBus) {
        self.state = WaveState {
            wave_index: 1,
            in_preparation: true,
            preparation_seconds_left: self.wave_preparation_secs,
            total_zombies_in_wave: self.total_zombies_in_wave(1),
            ..WaveState::default()
        };
        bus.emit(GameEvent::WavePrepStarted { wave: 1 });
    }

    fn award(&mut self, amount: u32, bus: &mut EventBus) {
        self.state.score += amount;
        bus.emit(GameEvent::WaveScoreChanged {
            score: self.state.score,
        });
    }

    /// Record that a zombie died during an active wave (called by the
    /// orchestrator after observing a `zombie:died` event). Scoring never
    /// happens during preparation (spec §4.8).
    pub fn record_kill(&mut self, bus: &mut EventBus) {
        if self.state.game_over || self.state.in_preparation {
            return;
        }
        self.state.zombies_killed += 1;
        self.award(self.score_per_kill * self.state.wave_index, bus);
    }

    /// Advance the wave scheduler by one fixed step.
    ///
    /// `player_is_dead` is a read-only probe (spec §9 "pass references only
    /// to the orchestrator") rather than a `PlayerState` reference, so Wave
    /// never reaches into Player's fields directly.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        dt: f32,
        player_is_dead: bool,
        zombies: &mut ZombieManager,
        spawn_candidates: &[Vec3],
        player_pos: Vec3,
        rng: &mut impl Rng,
        bus: &mut EventBus,
    ) {
        if self.state.game_over {
            return;
        }

        self.state.play_time_seconds += dt;

        if player_is_dead {
            self.state.game_over = true;
            self.state.game_over_reason = Some(GameOverReason::PlayerDeath);
            bus.emit(GameEvent::WaveGameOver {
                reason: GameOverReason::PlayerDeath,
                final_score: self.state.score,
            });
            return;
        }

        if self.state.in_preparation {
            self.state.preparation_seconds_left =
                (self.state.preparation_seconds_left - dt).max(0.0);
            if self.state.preparation_seconds_left <= 0.0 {
                self.state.in_preparation = false;
                self.state.spawn_timer = 0.0;
                bus.emit(GameEvent::WavePrepEnd {
                    wave: self.state.wave_index,
                });
                bus.emit(GameEvent::WaveStarted {
                    wave: self.state.wave_index,
                });
            }
            return;
        }

        self.state.spawn_timer += dt;
        while self.state.spawn_timer >= self.wave_spawn_interval_secs
            && self.state.zombies_spawned < self.state.total_zombies_in_wave
        {
            self.state.spawn_timer -= self.wave_spawn_interval_secs;
            let point = choose_spawn_point(
                spawn_candidates,
                player_pos,
                self.wave_spawn_min_player_distance,
                rng,
            );
            let variant = roll_variant(self.state.wave_index, rng);
            zombies.spawn(point, variant, bus);
            self.state.zombies_spawned += 1;
        }

        if self.state.zombies_killed >= self.state.total_zombies_in_wave {
            let bonus = self.score_wave_end_bonus * self.state.wave_index;
            self.award(bonus, bus);
            bus.emit(GameEvent::WaveEnded {
                wave: self.state.wave_index,
                bonus,
            });
            self.state.wave_index += 1;
            self.state.in_preparation = true;
            self.state.preparation_seconds_left = self.wave_preparation_secs;
            self.state.total_zombies_in_wave = self.total_zombies_in_wave(self.state.wave_index);
            self.state.zombies_spawned = 0;
            self.state.zombies_killed = 0;
            bus.emit(GameEvent::WavePrepStarted {
                wave: self.state.wave_index,
            });
        }
    }
}
