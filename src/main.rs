use bevy::a11y::AccessibilityPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy::winit::{WakeUp, WinitPlugin};

use zombie_core::config::load_sim_config;
use zombie_core::controller::ControllerPlugin;

/// Minimal windowed host around the simulation core (spec §0 "the binary is
/// a demonstration host, not the deliverable"). No renderer or audio backend
/// is wired up: `Controller` holds `NullRenderSink`/`NullAudioSink` handles
/// until a real embedding environment installs its own (spec §4.13).
fn main() {
    let mut app = App::new();

    app.add_plugins((
        MinimalPlugins,
        LogPlugin::default(),
        AccessibilityPlugin,
        WindowPlugin {
            primary_window: Some(Window {
                title: "Zombie Survival — simulation core host".into(),
                resolution: WindowResolution::new(1280, 720),
                ..Default::default()
            }),
            ..Default::default()
        },
        WinitPlugin::<WakeUp>::default(),
        bevy::input::InputPlugin,
        bevy::state::app::StatesPlugin,
    ))
    .insert_resource(load_sim_config("assets/sim.toml"))
    .add_plugins(ControllerPlugin);

    app.run();
}
