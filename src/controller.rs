//! Controller / Orchestrator (C12): wires C1–C11 together.
//!
//! Owns every mutable resource the fixed update touches (spec §4.12
//! ownership note: "the orchestrator exclusively owns PlayerState,
//! Inventory, WaveState"). `fixed_update` runs the 1→9 sequence exactly as
//! numbered in spec §4.12 and returns the [`HUDState`] snapshot published to
//! observers; it takes plain arguments rather than reading a Bevy `World` so
//! the whole sequence is unit-testable the way every other component here
//! is, mirroring the teacher's plain-resource-driven systems.

use bevy::math::Vec3;
use bevy::prelude::Resource;
use rand::Rng;

use crate::audio::{AudioCue, AudioDirector};
use crate::config::SimConfig;
use crate::events::{EventBus, GameEvent};
use crate::input::InputState;
use crate::lod::LodController;
use crate::physics::PhysicsProbe;
use crate::player::state::PlayerState;
use crate::sinks::{AudioSink, NullAudioSink, NullRenderSink, PlaybackOptions, RenderSink, SceneGraph};
use crate::wave::WaveScheduler;
use crate::weapon::Inventory;
use crate::zombie::manager::ZombieManager;

/// Published once per fixed update (spec §6 "HUDState").
#[derive(Debug, Clone, PartialEq)]
pub struct HUDState {
    pub health: f32,
    pub max_health: f32,
    pub stamina: f32,
    pub max_stamina: f32,
    pub current_weapon_name: &'static str,
    pub current_weapon_slot: usize,
    pub current_ammo: u32,
    pub reserve_ammo: u32,
    pub magazine_size: u32,
    pub is_reloading: bool,
    pub current_wave: u32,
    pub zombies_killed: u32,
    pub total_zombies_in_wave: u32,
    pub is_preparation_phase: bool,
    pub preparation_time_left: f32,
    pub score: u32,
}

/// Mouse sensitivity scale applied to raw pointer delta before `Player.rotate`.
const MOUSE_SENSITIVITY_SCALE: f32 = 0.0025;

/// The orchestrator (spec §4.12). Every field here is owned exclusively by
/// the Controller except the zombie population, which `ZombieManager` owns
/// (spec §4.7); everything else reaches zombies only by id.
#[derive(Resource)]
pub struct Controller {
    pub input: InputState,
    pub player: PlayerState,
    pub physics: PhysicsProbe,
    pub inventory: Inventory,
    pub zombies: ZombieManager,
    pub wave: WaveScheduler,
    pub audio: AudioDirector,
    pub lod: LodController,
    pub bus: EventBus,
    /// Scene submission sink (spec §6 "render sink"). The core never reads
    /// back through it; it only ever writes a handle it owns (spec §4.13).
    pub render_sink: Box<dyn RenderSink>,
    /// Sample playback sink (spec §6 "audio sink"), fed by
    /// [`AudioDirector::drain_cues`] each step.
    pub audio_sink: Box<dyn AudioSink>,
    mouse_sensitivity: f32,
    /// Monotonic simulation clock, advanced by `dt` every `fixed_update`.
    /// Weapon fire-rate limiting and reload deadlines are scheduled against
    /// this rather than wall-clock time, so they behave identically in
    /// headless tests and under the real host clock.
    sim_time: f64,
}

impl Default for Controller {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh, not-yet-started Controller with every subsystem's
    /// tunables sourced from `config` (spec §9 ambient stack: runtime
    /// retunable without recompiling).
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            input: InputState::new(),
            player: PlayerState::from_config(config),
            physics: PhysicsProbe::from_config(config),
            inventory: Inventory::default(),
            zombies: ZombieManager::from_config(config),
            wave: WaveScheduler::from_config(config),
            audio: AudioDirector::from_config(config),
            lod: LodController::from_config(config),
            bus: EventBus::new(),
            render_sink: Box::new(NullRenderSink),
            audio_sink: Box::new(NullAudioSink),
            mouse_sensitivity: 50.0,
            sim_time: 0.0,
        }
    }

    /// Start a fresh run: resets the wave scheduler into wave 1 preparation.
    pub fn start_game(&mut self) {
        self.wave.start_game(&mut self.bus);
    }

    pub fn set_mouse_sensitivity(&mut self, sensitivity: f32) {
        self.mouse_sensitivity = sensitivity.clamp(1.0, 100.0);
    }

    /// The player's eye position and aim direction, used both for the aimed
    /// hitscan ray and for the Renderer's camera pose.
    fn aim_ray(&self) -> (Vec3, Vec3) {
        let origin = self.player.position + Vec3::new(0.0, 1.6, 0.0);
        let (sin_yaw, cos_yaw) = self.player.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.player.pitch.sin_cos();
        let direction = Vec3::new(sin_yaw * cos_pitch, sin_pitch, cos_yaw * cos_pitch);
        (origin, direction)
    }

    /// Run the Controller's numbered 1→9 sequence for one fixed step
    /// (spec §4.12). `spawn_candidates` are world-space spawn anchors handed
    /// to the Wave Scheduler; `rng` drives zombie wander headings, wave
    /// variant rolls, and spawn point selection.
    pub fn fixed_update(
        &mut self,
        dt: f32,
        spawn_candidates: &[Vec3],
        rng: &mut impl Rng,
    ) -> HUDState {
        self.sim_time += dt as f64;
        // Zombie deaths (from weapon fire, below) and zombie attacks (from
        // the Zombie Manager update, further below) are both observed
        // against this tick-start mark rather than a step-local one, since
        // a kill can land synchronously during weapon fire, well before
        // step 4 runs.
        let tick_start = self.bus.len();

        // 1. Read InputState queries + 2. translate to intents.
        let (move_x, move_z) = self.input.move_axis();
        let pointer_delta = self.input.pointer_delta();
        self.player.rotate(
            -pointer_delta.x * self.mouse_sensitivity * MOUSE_SENSITIVITY_SCALE,
            -pointer_delta.y * self.mouse_sensitivity * MOUSE_SENSITIVITY_SCALE,
        );
        self.player.sprint(self.input.wants_to_sprint());
        self.player.move_player(move_x, move_z, dt);
        if self.input.wants_to_jump() {
            self.player.jump(&mut self.bus);
        }

        if let Some(slot) = self.input.wants_slot() {
            self.inventory.switch_to_slot(slot as usize, &mut self.bus);
        } else if self.input.wants_wheel_up() {
            self.inventory.cycle_next(&mut self.bus);
        } else if self.input.wants_wheel_down() {
            self.inventory.cycle_previous(&mut self.bus);
        }

        if self.input.wants_to_reload() {
            let slot_index = self.inventory.current_index();
            if let Some(slot) = self.inventory.current_mut() {
                slot.reload(slot_index, self.sim_time, &mut self.bus);
            }
        }

        if self.input.wants_to_fire() {
            let (origin, direction) = self.aim_ray();
            let slot_index = self.inventory.current_index();
            let result = {
                let zombies = &self.zombies;
                self.inventory
                    .current_mut()
                    .map(|slot| slot.fire(slot_index, origin, direction, self.sim_time, zombies, &mut self.bus))
            };
            if let Some(result) = result {
                for hit in result.hits {
                    self.zombies.damage(hit.zombie_id, result.damage, hit.point, &mut self.bus);
                }
            }
        }
        self.inventory.poll_reloads(self.sim_time, &mut self.bus);

        // 3. Player physics update.
        let ground_y = self.physics.check_ground(self.player.position);
        self.player.update_physics(dt, ground_y, &mut self.bus);
        self.player.update_stamina(dt);

        // 4. Zombie Manager update.
        self.zombies.update(
            dt,
            self.player.position,
            || random_unit_vector(rng),
            &mut self.bus,
        );

        // 5. Wave Scheduler update (also spawns via the Zombie Manager).
        self.wave.update(
            dt,
            self.player.is_dead(),
            &mut self.zombies,
            spawn_candidates,
            self.player.position,
            rng,
            &mut self.bus,
        );

        // Zombie deaths recorded against the wave's kill/score ledger.
        let deaths = self.bus.peek()[tick_start..]
            .iter()
            .filter(|event| matches!(event, GameEvent::ZombieDied { .. }))
            .count();
        for _ in 0..deaths {
            self.wave.record_kill(&mut self.bus);
        }

        // 6. Zombie-on-player attack check: the Zombie entity state machine
        // already gates `zombie:attack` on range + its own 1.5s cooldown
        // (spec §4.6); the Controller's job is just to apply the damage.
        let attacks: Vec<f32> = self.bus.peek()[tick_start..]
            .iter()
            .filter_map(|event| match event {
                GameEvent::ZombieAttack { damage, .. } => Some(*damage),
                _ => None,
            })
            .collect();
        for damage in attacks {
            self.player.take_damage(damage, &mut self.bus);
        }

        // 7. Audio Director consumes the event bus: update the music state
        // machine and queue any 2D/3D sample cues the step's events imply,
        // then dispatch those cues through the host's AudioSink.
        for event in self.bus.peek() {
            self.audio.observe(event);
        }
        let health_fraction = if self.player.max_health > 0.0 {
            self.player.health / self.player.max_health
        } else {
            0.0
        };
        self.audio.update(dt, health_fraction, self.wave.state.game_over);
        self.bus.drain();

        for cue in self.audio.drain_cues() {
            match cue {
                AudioCue::TwoD { sample } => {
                    self.audio_sink.play_2d(sample, PlaybackOptions::default());
                }
                AudioCue::ThreeD { sample, zombie } => {
                    let position = self
                        .zombies
                        .get(zombie)
                        .map(|z| z.position)
                        .unwrap_or(self.player.position);
                    self.audio_sink.play_3d(sample, position, PlaybackOptions::default());
                }
            }
        }

        // 8. Input endFrame.
        self.input.end_frame();

        // 9. Publish HUDState (and the scene submission that goes with it;
        // the core only ever writes to the render sink, spec §5 "shared
        // resources").
        self.render_sink.submit_scene(&SceneGraph {
            draw_calls: self.zombies.len() as u32 + 1,
        });
        self.hud_state()
    }

    fn hud_state(&self) -> HUDState {
        let slot = self.inventory.current();
        HUDState {
            health: self.player.health,
            max_health: self.player.max_health,
            stamina: self.player.stamina,
            max_stamina: self.player.max_stamina,
            current_weapon_name: slot.map_or("", |s| s.name),
            current_weapon_slot: self.inventory.current_index(),
            current_ammo: slot.map_or(0, |s| s.current_ammo),
            reserve_ammo: slot.map_or(0, |s| s.reserve_ammo),
            magazine_size: slot.map_or(0, |s| s.magazine_capacity),
            is_reloading: slot.is_some_and(|s| s.reloading),
            current_wave: self.wave.state.wave_index,
            zombies_killed: self.wave.state.zombies_killed,
            total_zombies_in_wave: self.wave.state.total_zombies_in_wave,
            is_preparation_phase: self.wave.state.in_preparation,
            preparation_time_left: self.wave.state.preparation_seconds_left,
            score: self.wave.state.score,
        }
    }
}

/// A deterministic-per-call unit vector for zombie wander headings, derived
/// from `rng` so tests can seed it (spec §9 "wander heading source").
fn random_unit_vector(rng: &mut impl Rng) -> Vec3 {
    let angle: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
    Vec3::new(angle.cos(), 0.0, angle.sin())
}

// ── Bevy host wiring ────────────────────────────────────────────────────────
//
// Everything below bridges the plain-data `Controller` above to a `bevy`
// `App`: it owns the host-facing `Clock` and random source, forwards device
// messages into `InputState`, and drives `fixed_update` the number of times
// the Clock reports each frame (spec §4.1/§4.12). Grounded in the teacher's
// `SimulationPlugin` (`simulation.rs`), which does the same
// messages-in/systems-drive-domain-state split over its own ECS components.

use bevy::app::{App, Plugin, Update};
use bevy::input::keyboard::KeyboardInput;
use bevy::input::mouse::{MouseButtonInput, MouseMotion, MouseWheel};
use bevy::input::ButtonState;
use bevy::log::info;
use bevy::prelude::{IntoScheduleConfigs, KeyCode, MessageReader, Res, ResMut};
use bevy::time::Time;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::clock::Clock;

/// Translate a physical [`KeyCode`] to our logical [`crate::input::Key`], if
/// it maps to one the core cares about.
fn map_key_code(code: KeyCode) -> Option<crate::input::Key> {
    use crate::input::Key;
    match code {
        KeyCode::KeyW | KeyCode::ArrowUp => Some(Key::Forward),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(Key::Back),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(Key::StrafeLeft),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(Key::StrafeRight),
        KeyCode::Space => Some(Key::Jump),
        KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(Key::Sprint),
        KeyCode::KeyR => Some(Key::Reload),
        KeyCode::Digit1 => Some(Key::Slot1),
        KeyCode::Digit2 => Some(Key::Slot2),
        KeyCode::Digit3 => Some(Key::Slot3),
        KeyCode::Digit4 => Some(Key::Slot4),
        _ => None,
    }
}

/// Forward this frame's device messages into the Controller's `InputState`
/// (spec §6 "Device event stream").
fn forward_device_input(
    mut controller: ResMut<Controller>,
    mut keys: MessageReader<KeyboardInput>,
    mut motion: MessageReader<MouseMotion>,
    mut buttons: MessageReader<MouseButtonInput>,
    mut wheel: MessageReader<MouseWheel>,
) {
    for event in keys.read() {
        let Some(key) = map_key_code(event.key_code) else {
            continue;
        };
        match event.state {
            ButtonState::Pressed => controller.input.on_key_down(key),
            ButtonState::Released => controller.input.on_key_up(key),
        }
    }
    for event in motion.read() {
        controller.input.on_pointer_motion(event.delta);
    }
    for event in buttons.read() {
        if event.state == ButtonState::Pressed
            && event.button == bevy::input::mouse::MouseButton::Left
        {
            controller
                .input
                .on_pointer_button_down(crate::input::PointerButton::Primary);
        }
    }
    for event in wheel.read() {
        controller.input.on_wheel(event.y);
    }
}

/// Host-owned clock and rng, driving [`Controller::fixed_update`] the number
/// of times the Clock reports for this frame's wall-clock delta.
#[derive(bevy::prelude::Resource)]
pub struct SimulationDriver {
    pub clock: Clock,
    rng: StdRng,
    spawn_candidates: Vec<Vec3>,
}

impl Default for SimulationDriver {
    fn default() -> Self {
        let mut clock = Clock::new();
        clock.start();
        Self {
            clock,
            rng: StdRng::seed_from_u64(0x5A5A_5A5A),
            spawn_candidates: vec![
                Vec3::new(20.0, 0.0, 20.0),
                Vec3::new(-20.0, 0.0, 20.0),
                Vec3::new(20.0, 0.0, -20.0),
                Vec3::new(-20.0, 0.0, -20.0),
            ],
        }
    }
}

fn drive_simulation(
    time: Res<Time>,
    mut driver: ResMut<SimulationDriver>,
    mut controller: ResMut<Controller>,
) {
    let driver = &mut *driver;
    // LOD samples wall-clock frame time directly, once per real frame,
    // independent of how many (if any) fixed steps the accumulator below
    // runs this frame (spec §4.10 "samples frame time").
    let controller = &mut *controller;
    controller.lod.observe_frame(time.delta_secs(), &mut controller.bus);

    let advance = driver.clock.advance_frame(time.delta_secs_f64());
    for _ in 0..advance.fixed_steps {
        let hud = controller.fixed_update(
            crate::constants::FIXED_STEP as f32,
            &driver.spawn_candidates,
            &mut driver.rng,
        );
        if hud.is_preparation_phase && hud.preparation_time_left <= 0.0 {
            info!("wave {} starting", hud.current_wave);
        }
    }
}

/// Boots the simulation core inside a `bevy` `App`: inserts [`Controller`]
/// and [`SimulationDriver`] and wires device input + the fixed-step drive
/// loop into `Update` (spec §0 "the binary plays the role of the embedding
/// environment").
pub struct ControllerPlugin;

impl Plugin for ControllerPlugin {
    fn build(&self, app: &mut App) {
        // The host is expected to `insert_resource` a `SimConfig` before
        // adding this plugin (see main.rs); fall back to compiled defaults
        // if it didn't.
        let config = app
            .world()
            .get_resource::<SimConfig>()
            .cloned()
            .unwrap_or_default();
        let mut controller = Controller::from_config(&config);
        controller.start_game();
        app.insert_resource(controller)
            .init_resource::<SimulationDriver>()
            .add_systems(Update, (forward_device_input, drive_simulation).chain());
    }
}
