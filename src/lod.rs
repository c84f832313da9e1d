//! Adaptive LOD / Perf Controller (C10): rolling frame-time tracking and
//! discrete quality stepping.

use bevy::prelude::Resource;

use crate::config::SimConfig;
use crate::constants::{LOD_FAR_THRESHOLDS, LOD_FAST_MULTIPLIER, LOD_SLOW_MULTIPLIER, LOD_TARGET_FRAME_SECS};
use crate::events::{EventBus, GameEvent};

/// Discrete rendering quality levels, low to high (spec §4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum QualityLevel {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl QualityLevel {
    fn step_down(self) -> Self {
        match self {
            QualityLevel::High => QualityLevel::Medium,
            QualityLevel::Medium | QualityLevel::Low => QualityLevel::Low,
        }
    }

    fn step_up(self) -> Self {
        match self {
            QualityLevel::Low => QualityLevel::Medium,
            QualityLevel::Medium | QualityLevel::High => QualityLevel::High,
        }
    }

    /// Far-plane culling distance at this quality level (spec §4.10 frustum
    /// culling contract).
    pub fn far_plane(self, lod_band: usize) -> f32 {
        LOD_FAR_THRESHOLDS[self as usize][lod_band.min(2)]
    }
}

/// Metrics snapshot published to the HUD (spec §6 `HUDState.perf`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerfMetrics {
    pub average_frame_secs: f32,
    pub quality: QualityLevel,
}

/// Tracks a rolling count of consecutive slow/fast frames and steps the
/// active [`QualityLevel`] with asymmetric cooldowns, so a single stutter
/// never flips quality and recovery is more cautious than degradation.
#[derive(Resource, Debug)]
pub struct LodController {
    pub quality: QualityLevel,
    slow_streak: u32,
    fast_streak: u32,
    cooldown: f32,
    last_frame_secs: f32,
    slow_frame_streak: u32,
    step_down_cooldown_secs: f32,
    step_up_cooldown_secs: f32,
}

impl Default for LodController {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

impl LodController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an idle controller (full quality, no streak) with tunables
    /// sourced from `config`.
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            quality: QualityLevel::High,
            slow_streak: 0,
            fast_streak: 0,
            cooldown: 0.0,
            last_frame_secs: LOD_TARGET_FRAME_SECS,
            slow_frame_streak: config.lod_slow_frame_streak,
            step_down_cooldown_secs: config.lod_step_down_cooldown_secs,
            step_up_cooldown_secs: config.lod_step_up_cooldown_secs,
        }
    }

    /// Feed one frame's wall-clock delta and, if a streak threshold has been
    /// crossed and the cooldown has elapsed, step quality and emit
    /// `lod:quality_changed`.
    pub fn observe_frame(&mut self, frame_secs: f32, bus: &mut EventBus) {
        self.last_frame_secs = frame_secs;
        self.cooldown = (self.cooldown - frame_secs).max(0.0);

        if frame_secs >= LOD_TARGET_FRAME_SECS * LOD_SLOW_MULTIPLIER {
            self.slow_streak += 1;
            self.fast_streak = 0;
        } else if frame_secs <= LOD_TARGET_FRAME_SECS * LOD_FAST_MULTIPLIER {
            self.fast_streak += 1;
            self.slow_streak = 0;
        } else {
            self.slow_streak = 0;
            self.fast_streak = 0;
        }

        if self.cooldown > 0.0 {
            return;
        }

        if self.slow_streak >= self.slow_frame_streak {
            let next = self.quality.step_down();
            if next != self.quality {
                self.quality = next;
                self.cooldown = self.step_down_cooldown_secs;
                bus.emit(GameEvent::LodQualityChanged {
                    level: self.quality as u8,
                });
            }
            self.slow_streak = 0;
            bus.emit(GameEvent::LodPerfWarning);
        } else if self.fast_streak >= self.slow_frame_streak {
            let next = self.quality.step_up();
            if next != self.quality {
                self.quality = next;
                self.cooldown = self.step_up_cooldown_secs;
                bus.emit(GameEvent::LodQualityChanged {
                    level: self.quality as u8,
                });
            }
            self.fast_streak = 0;
        }
    }

    pub fn metrics(&self) -> PerfMetrics {
        PerfMetrics {
            average_frame_secs: self.last_frame_secs,
            quality: self.quality,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slow_frame() -> f32 {
        LOD_TARGET_FRAME_SECS * (LOD_SLOW_MULTIPLIER + 0.1)
    }

    fn fast_frame() -> f32 {
        LOD_TARGET_FRAME_SECS * (LOD_FAST_MULTIPLIER - 0.1)
    }

    #[test]
    fn sustained_slow_frames_step_quality_down() {
        let mut lod = LodController::new();
        let mut bus = EventBus::new();
        for _ in 0..lod.slow_frame_streak {
            lod.observe_frame(slow_frame(), &mut bus);
        }
        assert_eq!(lod.quality, QualityLevel::Medium);
    }

    #[test]
    fn cooldown_blocks_immediate_second_step() {
        let mut lod = LodController::new();
        let mut bus = EventBus::new();
        for _ in 0..lod.slow_frame_streak {
            lod.observe_frame(slow_frame(), &mut bus);
        }
        for _ in 0..lod.slow_frame_streak {
            lod.observe_frame(slow_frame(), &mut bus);
        }
        assert_eq!(lod.quality, QualityLevel::Medium, "cooldown should still be active");
    }

    #[test]
    fn step_up_requires_longer_cooldown_than_step_down() {
        let mut lod = LodController::new();
        let mut bus = EventBus::new();
        lod.quality = QualityLevel::Low;
        for _ in 0..lod.slow_frame_streak {
            lod.observe_frame(fast_frame(), &mut bus);
        }
        assert_eq!(lod.quality, QualityLevel::Medium);
        assert_eq!(lod.cooldown, lod.step_up_cooldown_secs);
    }

    #[test]
    fn quality_never_drops_below_low() {
        let mut lod = LodController::new();
        let mut bus = EventBus::new();
        lod.quality = QualityLevel::Low;
        for _ in 0..(lod.slow_frame_streak * 3) {
            lod.observe_frame(slow_frame(), &mut bus);
            lod.cooldown = 0.0;
        }
        assert_eq!(lod.quality, QualityLevel::Low);
    }

    #[test]
    fn far_plane_grows_with_quality_level() {
        assert!(QualityLevel::Low.far_plane(0) < QualityLevel::High.far_plane(0));
    }
}
