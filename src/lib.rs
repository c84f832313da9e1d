//! Fixed-timestep simulation core for a first-person zombie-survival game.
//!
//! This crate is the simulation **core** only (spec §1): window, renderer,
//! audio backend, and network transport are all host concerns, modeled here
//! as narrow traits (see [`sinks`], [`persistence`]) the embedding
//! environment implements. `src/main.rs` boots a minimal `bevy` host around
//! [`controller::ControllerPlugin`] as a demonstration, not the deliverable.

pub mod audio;
pub mod clock;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod events;
pub mod input;
pub mod lod;
pub mod persistence;
pub mod physics;
pub mod player;
pub mod sinks;
pub mod snapshot;
pub mod wave;
pub mod weapon;
pub mod zombie;
