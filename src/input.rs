//! Input State (C2): aggregates per-frame device events into a query surface
//! the Controller reads once per fixed update.
//!
//! The host pushes raw device events (key down/up, pointer motion delta,
//! pointer button down/up, wheel delta) via [`InputState::on_key`] etc.
//! Edge-triggered queries (`wants_to_fire`, ...) are consumed once per fixed
//! update; [`InputState::end_frame`] resets those transient edges while
//! leaving held keys intact, per spec §4.2.

use bevy::math::Vec2;

/// Logical key identifiers the core cares about. The host's physical keymap
/// is the host's concern; it translates to these before calling `on_key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
    Jump,
    Sprint,
    Reload,
    Slot1,
    Slot2,
    Slot3,
    Slot4,
}

/// Which mouse/pointer button was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

#[derive(Debug, Default)]
struct HeldKeys {
    forward: bool,
    back: bool,
    strafe_left: bool,
    strafe_right: bool,
    sprint: bool,
}

/// Aggregated device input for the current and upcoming fixed updates.
#[derive(Debug, Default)]
pub struct InputState {
    held: HeldKeys,

    pointer_delta: Vec2,
    wheel_delta: f32,

    edge_fire: bool,
    edge_jump: bool,
    edge_reload: bool,
    edge_slot: Option<u8>,
    edge_wheel_up: bool,
    edge_wheel_down: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Host-facing event ingestion ───────────────────────────────────────

    pub fn on_key_down(&mut self, key: Key) {
        match key {
            Key::Forward => self.held.forward = true,
            Key::Back => self.held.back = true,
            Key::StrafeLeft => self.held.strafe_left = true,
            Key::StrafeRight => self.held.strafe_right = true,
            Key::Sprint => self.held.sprint = true,
            Key::Jump => self.edge_jump = true,
            Key::Reload => self.edge_reload = true,
            Key::Slot1 => self.edge_slot = Some(0),
            Key::Slot2 => self.edge_slot = Some(1),
            Key::Slot3 => self.edge_slot = Some(2),
            Key::Slot4 => self.edge_slot = Some(3),
        }
    }

    pub fn on_key_up(&mut self, key: Key) {
        match key {
            Key::Forward => self.held.forward = false,
            Key::Back => self.held.back = false,
            Key::StrafeLeft => self.held.strafe_left = false,
            Key::StrafeRight => self.held.strafe_right = false,
            Key::Sprint => self.held.sprint = false,
            // Jump/Reload/Slot are edge-only; key-up is a no-op.
            _ => {}
        }
    }

    pub fn on_pointer_motion(&mut self, delta: Vec2) {
        self.pointer_delta += delta;
    }

    pub fn on_pointer_button_down(&mut self, button: PointerButton) {
        if button == PointerButton::Primary {
            self.edge_fire = true;
        }
    }

    pub fn on_wheel(&mut self, delta: f32) {
        self.wheel_delta += delta;
        if delta > 0.0 {
            self.edge_wheel_up = true;
        } else if delta < 0.0 {
            self.edge_wheel_down = true;
        }
    }

    // ── Controller-facing queries ──────────────────────────────────────────

    /// Horizontal move axis: x = strafe (+right), z = forward/back (+forward).
    pub fn move_axis(&self) -> (f32, f32) {
        let x = (self.held.strafe_right as i32 - self.held.strafe_left as i32) as f32;
        let z = (self.held.forward as i32 - self.held.back as i32) as f32;
        (x, z)
    }

    /// Accumulated pointer delta since the last `end_frame`.
    pub fn pointer_delta(&self) -> Vec2 {
        self.pointer_delta
    }

    pub fn wants_to_fire(&self) -> bool {
        self.edge_fire
    }

    pub fn wants_to_jump(&self) -> bool {
        self.edge_jump
    }

    pub fn wants_to_reload(&self) -> bool {
        self.edge_reload
    }

    /// `Some(n)` (0-indexed) if a direct slot key (1-4) was pressed.
    pub fn wants_slot(&self) -> Option<u8> {
        self.edge_slot
    }

    pub fn wants_wheel_up(&self) -> bool {
        self.edge_wheel_up
    }

    pub fn wants_wheel_down(&self) -> bool {
        self.edge_wheel_down
    }

    pub fn wants_to_sprint(&self) -> bool {
        self.held.sprint
    }

    /// Reset transient edges (pointer delta accumulator, wheel, edge flags)
    /// while leaving held keys intact. Called once per fixed update, after
    /// the Controller has consumed this tick's queries.
    pub fn end_frame(&mut self) {
        self.pointer_delta = Vec2::ZERO;
        self.wheel_delta = 0.0;
        self.edge_fire = false;
        self.edge_jump = false;
        self.edge_reload = false;
        self.edge_slot = None;
        self.edge_wheel_up = false;
        self.edge_wheel_down = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_keys_persist_across_end_frame() {
        let mut input = InputState::new();
        input.on_key_down(Key::Forward);
        input.end_frame();
        assert_eq!(input.move_axis(), (0.0, 1.0));
    }

    #[test]
    fn edges_are_cleared_by_end_frame() {
        let mut input = InputState::new();
        input.on_key_down(Key::Jump);
        assert!(input.wants_to_jump());
        input.end_frame();
        assert!(!input.wants_to_jump());
    }

    #[test]
    fn slot_key_reports_zero_indexed_slot() {
        let mut input = InputState::new();
        input.on_key_down(Key::Slot3);
        assert_eq!(input.wants_slot(), Some(2));
    }

    #[test]
    fn pointer_delta_accumulates_until_end_frame() {
        let mut input = InputState::new();
        input.on_pointer_motion(Vec2::new(1.0, 2.0));
        input.on_pointer_motion(Vec2::new(0.5, -1.0));
        assert_eq!(input.pointer_delta(), Vec2::new(1.5, 1.0));
        input.end_frame();
        assert_eq!(input.pointer_delta(), Vec2::ZERO);
    }
}
