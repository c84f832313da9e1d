//! Player module: position/orientation, health, stamina, locomotion, jump
//! physics (spec C3).
//!
//! All state and behavior lives in [`state`]; the orchestrator
//! ([`crate::controller`]) is the only caller that mutates a `PlayerState`,
//! per the single-owner rule in spec §3.

pub mod state;

pub use state::{PlayerState, MAX_HEALTH_DEFAULT, MAX_STAMINA_DEFAULT};
