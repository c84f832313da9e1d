//! Orchestrator-owned event bus.
//!
//! Every cross-component effect is expressed as a [`GameEvent`] rather than a
//! direct mutation of foreign state (§9 design notes). The bus is a single
//! `Vec` drained once per fixed update by [`crate::audio::AudioDirector`] and
//! by the orchestrator's own score/HUD bookkeeping; listeners observe events
//! in emission order and may not emit on their own subject mid-drain (no
//! bus-triggered re-entrancy), matching the ordering guarantee in spec §5.

use serde::{Deserialize, Serialize};

use crate::zombie::entity::ZombieId;

/// Reason a game-over was triggered. Presently always `PlayerDeath`, but kept
/// as an enum so the wave scheduler's `gameOverReason` field has a stable
/// shape if further reasons are added later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    PlayerDeath,
}

/// The complete event-bus vocabulary from spec §6.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PlayerDamaged { amount: f32 },
    PlayerDied,
    PlayerJumped,
    PlayerLanded,

    WeaponFired { slot: usize, damage: f32, hits: u32 },
    WeaponEmptyClick { slot: usize },
    WeaponReloadStarted { slot: usize },
    WeaponReloadFinished { slot: usize },
    WeaponSwitched { from: usize, to: usize },
    WeaponAmmoChanged { slot: usize, current: u32, reserve: u32 },

    ZombieSpawned { id: ZombieId },
    ZombieAttack { id: ZombieId, damage: f32 },
    ZombieDamaged { id: ZombieId, amount: f32 },
    ZombieDied { id: ZombieId },

    WavePrepStarted { wave: u32 },
    WavePrepEnd { wave: u32 },
    WaveStarted { wave: u32 },
    WaveEnded { wave: u32, bonus: u32 },
    WaveScoreChanged { score: u32 },
    WaveGameOver { reason: GameOverReason, final_score: u32 },

    LodQualityChanged { level: u8 },
    LodPerfWarning,
}

/// Collects events emitted during one fixed update and dispatches them to
/// registered listeners in emission order.
#[derive(Default)]
pub struct EventBus {
    queue: Vec<GameEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { queue: Vec::new() }
    }

    /// Emit an event. Order of emission is preserved for dispatch.
    pub fn emit(&mut self, event: GameEvent) {
        self.queue.push(event);
    }

    /// Number of events currently queued.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Borrow the queued events without draining them.
    pub fn peek(&self) -> &[GameEvent] {
        &self.queue
    }

    /// Drain all queued events, invoking `listener` for each in emission
    /// order. The queue is empty after this call.
    pub fn drain_and_dispatch(&mut self, mut listener: impl FnMut(&GameEvent)) {
        for event in self.queue.drain(..) {
            listener(&event);
        }
    }

    /// Drain all queued events into a owned `Vec`, for callers that want to
    /// inspect them outside a closure (tests, HUD snapshotting).
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_preserves_emission_order() {
        let mut bus = EventBus::new();
        bus.emit(GameEvent::PlayerJumped);
        bus.emit(GameEvent::PlayerLanded);
        bus.emit(GameEvent::PlayerDied);

        let mut seen = Vec::new();
        bus.drain_and_dispatch(|e| seen.push(e.clone()));

        assert_eq!(
            seen,
            vec![
                GameEvent::PlayerJumped,
                GameEvent::PlayerLanded,
                GameEvent::PlayerDied,
            ]
        );
        assert!(bus.is_empty());
    }
}
