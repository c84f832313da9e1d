//! Remote persistence contract (spec §6 "Remote persistence contract").
//!
//! Interfaces only, mirroring how the teacher's `save.rs` only deals with the
//! *shape* of persisted data (`SaveSnapshot`) and a local stand-in, not a
//! remote service: no HTTP client is implemented here.

use serde::{Deserialize, Serialize};

/// The snapshot payload shape accepted by the save endpoint. The JSON string
/// produced by [`crate::snapshot::encode`] is the `game_snapshot` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavePayload {
    pub game_snapshot: String,
}

/// Response shape for a successful save (spec §6 `{saveId, savedAt}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveAck {
    pub save_id: String,
    pub saved_at_unix: u64,
}

/// One row of the paginated, score-descending leaderboard (spec §6
/// "Leaderboard submit").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub score: u32,
    pub wave_reached: u32,
    pub zombies_killed: u32,
    pub play_time_seconds: f32,
}

/// The three request classes the spec's "Errors" list distinguishes: a
/// malformed snapshot (4xx), missing auth (401), and a transient server
/// failure that the caller should retry (5xx).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    MalformedSnapshot { detail: String },
    Unauthorized,
    Transient { detail: String },
}

/// The save/load/leaderboard contract the core expects the host to provide.
/// No transport is implemented; this is the shape a real HTTP client would
/// fulfill.
pub trait PersistenceClient {
    fn save(&self, payload: SavePayload) -> Result<SaveAck, PersistenceError>;
    fn load(&self, save_id: &str) -> Result<SavePayload, PersistenceError>;
    fn submit_leaderboard(&self, entry: LeaderboardEntry) -> Result<(), PersistenceError>;
    fn leaderboard_page(&self, page: u32, page_size: u32) -> Result<Vec<LeaderboardEntry>, PersistenceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysUnauthorized;
    impl PersistenceClient for AlwaysUnauthorized {
        fn save(&self, _payload: SavePayload) -> Result<SaveAck, PersistenceError> {
            Err(PersistenceError::Unauthorized)
        }
        fn load(&self, _save_id: &str) -> Result<SavePayload, PersistenceError> {
            Err(PersistenceError::Unauthorized)
        }
        fn submit_leaderboard(&self, _entry: LeaderboardEntry) -> Result<(), PersistenceError> {
            Err(PersistenceError::Unauthorized)
        }
        fn leaderboard_page(
            &self,
            _page: u32,
            _page_size: u32,
        ) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
            Err(PersistenceError::Unauthorized)
        }
    }

    #[test]
    fn client_implementations_can_distinguish_error_classes() {
        let client = AlwaysUnauthorized;
        let result = client.save(SavePayload {
            game_snapshot: "{}".to_string(),
        });
        assert_eq!(result.unwrap_err(), PersistenceError::Unauthorized);
    }
}
