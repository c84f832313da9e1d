//! Audio Director (C9): event-bus subscriber driving a music state machine
//! and queuing one-shot cues for the host's [`crate::sinks::AudioSink`].
//!
//! Owns no audio backend; it only decides which logical music cue should be
//! playing, what the current gain multiplier is, and which 2D/3D sample cues
//! are due this step. Actual playback is the host's job.

use bevy::prelude::Resource;

use crate::config::SimConfig;
use crate::constants::MUSIC_TENSE_HEALTH_FRACTION;
use crate::events::GameEvent;
use crate::zombie::entity::ZombieId;

/// One queued sample cue awaiting dispatch through an [`crate::sinks::AudioSink`]
/// (spec §4.9 "translate each event to one of {2D cue, 3D positional cue,
/// music state transition}"). 3D cues carry the zombie id rather than a
/// position: the Audio Director doesn't have world access, so the
/// orchestrator resolves the position at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioCue {
    TwoD { sample: &'static str },
    ThreeD { sample: &'static str, zombie: ZombieId },
}

/// Logical music cue (spec §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicState {
    Menu,
    Ambient,
    Combat,
    Tense,
    GameOver,
}

/// Drives [`MusicState`] transitions from wave/combat events and player
/// health, with a minimum dwell time to prevent flapping, and a paused-gain
/// ducking behavior independent of the state machine.
#[derive(Resource, Debug)]
pub struct AudioDirector {
    pub state: MusicState,
    dwell: f32,
    pub gain: f32,
    pre_pause_gain: f32,
    paused: bool,
    in_combat: bool,
    cues: Vec<AudioCue>,
    music_min_dwell_secs: f32,
    pause_gain_multiplier: f32,
}

impl Default for AudioDirector {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

impl AudioDirector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a director at rest (menu music, full gain) with tunables
    /// sourced from `config`.
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            state: MusicState::Menu,
            dwell: 0.0,
            gain: 1.0,
            pre_pause_gain: 1.0,
            paused: false,
            in_combat: false,
            cues: Vec::new(),
            music_min_dwell_secs: config.music_min_dwell_secs,
            pause_gain_multiplier: config.pause_gain_multiplier,
        }
    }

    fn set_state(&mut self, next: MusicState) {
        if next != self.state && self.dwell >= self.music_min_dwell_secs {
            self.state = next;
            self.dwell = 0.0;
        }
    }

    /// Advance the dwell clock and re-evaluate the desired music state from
    /// current combat/health context. Called once per fixed step regardless
    /// of whether any events fired this frame.
    pub fn update(&mut self, dt: f32, health_fraction: f32, game_over: bool) {
        self.dwell += dt;

        if game_over {
            self.set_state(MusicState::GameOver);
            return;
        }
        if health_fraction <= MUSIC_TENSE_HEALTH_FRACTION {
            self.set_state(MusicState::Tense);
        } else if self.in_combat {
            self.set_state(MusicState::Combat);
        } else if self.state != MusicState::Menu {
            self.set_state(MusicState::Ambient);
        }
    }

    /// Observe one drained event: update the combat state (spec §4.9 "wave
    /// started → combat; wave ended → ambient") and queue any 2D/3D sample
    /// cue the event implies. Resource-load failures from the host sink are
    /// swallowed by the orchestrator before they ever reach here (spec §4.9
    /// "missing audio asset is never fatal").
    pub fn observe(&mut self, event: &GameEvent) {
        match event {
            GameEvent::WaveStarted { .. } => self.in_combat = true,
            GameEvent::WaveEnded { .. } => self.in_combat = false,
            GameEvent::WaveGameOver { .. } => self.in_combat = false,

            GameEvent::WeaponFired { .. } => self.cues.push(AudioCue::TwoD { sample: "gunshot" }),
            GameEvent::WeaponEmptyClick { .. } => {
                self.cues.push(AudioCue::TwoD { sample: "empty_click" })
            }
            GameEvent::WeaponReloadStarted { .. } => {
                self.cues.push(AudioCue::TwoD { sample: "reload_start" })
            }
            GameEvent::WeaponReloadFinished { .. } => {
                self.cues.push(AudioCue::TwoD { sample: "reload_finish" })
            }
            GameEvent::ZombieAttack { id, .. } => self.cues.push(AudioCue::ThreeD {
                sample: "zombie_attack",
                zombie: *id,
            }),
            GameEvent::ZombieDied { id } => self.cues.push(AudioCue::ThreeD {
                sample: "zombie_death",
                zombie: *id,
            }),
            _ => {}
        }
    }

    /// Take every cue queued since the last call, in emission order.
    pub fn drain_cues(&mut self) -> Vec<AudioCue> {
        std::mem::take(&mut self.cues)
    }

    /// Duck to 50% gain on pause, restoring the pre-pause gain on resume.
    pub fn set_paused(&mut self, paused: bool) {
        if paused == self.paused {
            return;
        }
        self.paused = paused;
        if paused {
            self.pre_pause_gain = self.gain;
            self.gain = self.pre_pause_gain * self.pause_gain_multiplier;
        } else {
            self.gain = self.pre_pause_gain;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_dwell_blocks_rapid_flapping() {
        let mut dir = AudioDirector::new();
        dir.in_combat = true;
        dir.update(0.1, 1.0, false);
        assert_eq!(dir.state, MusicState::Menu, "dwell not yet satisfied");
        dir.update(dir.music_min_dwell_secs, 1.0, false);
        assert_eq!(dir.state, MusicState::Combat);
    }

    #[test]
    fn low_health_in_combat_prefers_tense() {
        let mut dir = AudioDirector::new();
        dir.in_combat = true;
        dir.update(dir.music_min_dwell_secs, 0.1, false);
        assert_eq!(dir.state, MusicState::Tense, "low health wins immediately, highest priority");
    }

    #[test]
    fn game_over_wins_over_combat_state() {
        let mut dir = AudioDirector::new();
        dir.in_combat = true;
        dir.update(dir.music_min_dwell_secs, 1.0, false);
        dir.update(dir.music_min_dwell_secs, 1.0, true);
        assert_eq!(dir.state, MusicState::GameOver);
    }

    #[test]
    fn pause_halves_gain_and_resume_restores_it() {
        let mut dir = AudioDirector::new();
        dir.gain = 0.8;
        dir.set_paused(true);
        assert_eq!(dir.gain, 0.4);
        dir.set_paused(false);
        assert_eq!(dir.gain, 0.8);
    }

    #[test]
    fn repeated_pause_calls_are_idempotent() {
        let mut dir = AudioDirector::new();
        dir.gain = 1.0;
        dir.set_paused(true);
        dir.set_paused(true);
        assert_eq!(dir.gain, 0.5);
    }
}
