//! Simulation-wide error taxonomy.
//!
//! Systems propagate errors through [`SimError`] rather than panicking where
//! practical. Per the propagation policy, only [`SimError::HostFault`] is
//! fatal at start-up; every other kind is captured at the nearest component
//! boundary and reported as a diagnostic [`crate::events::GameEvent`] rather
//! than bubbled up to the orchestrator as an exception.
use std::fmt;

/// Top-level error enum for the zombie-survival simulation core.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Snapshot decode encountered a missing or malformed field.
    /// Recovery: the caller's live state is left untouched.
    SchemaViolation {
        /// Dot-separated path to the offending field, e.g. `"zombies[2].health"`.
        path: String,
        /// Human-readable description of what was expected.
        expected: String,
    },

    /// An internal consistency check failed (e.g. reloading a weapon with an
    /// empty reserve). Recovery: the offending subsystem is reset to its safe
    /// default.
    InvariantViolation {
        /// Human-readable description of where the check failed.
        context: &'static str,
    },

    /// A per-zombie `update` call failed. Recovery: the offending zombie is
    /// removed and the tick proceeds.
    EntityFault {
        /// Id of the zombie that raised the fault.
        zombie_id: u64,
        /// Human-readable description of the fault.
        reason: &'static str,
    },

    /// A requested audio sample was not present. Recovery: the cue is a
    /// no-op; simulation is unaffected.
    ResourceMissing {
        /// Id of the missing resource (sample name, asset key, ...).
        id: String,
    },

    /// The render sink or input layer was unavailable at start-up.
    /// Not recoverable inside the core; surfaced to the embedding host.
    HostFault {
        /// Human-readable description of what failed to initialize.
        context: &'static str,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::SchemaViolation { path, expected } => {
                write!(f, "schema violation at '{path}': expected {expected}")
            }
            SimError::InvariantViolation { context } => {
                write!(f, "invariant violation during '{context}'")
            }
            SimError::EntityFault { zombie_id, reason } => {
                write!(f, "zombie {zombie_id} update faulted: {reason}")
            }
            SimError::ResourceMissing { id } => {
                write!(f, "resource missing: '{id}'")
            }
            SimError::HostFault { context } => {
                write!(f, "host fault during '{context}'")
            }
        }
    }
}

impl std::error::Error for SimError {}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;
