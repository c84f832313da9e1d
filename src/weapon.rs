//! Weapon System (C5): weapon inventory, fire/reload/switch state machine,
//! hitscan query.
//!
//! A weapon slot is a closed tagged variant rather than an open hierarchy
//! (spec §9 "Polymorphism via interfaces"): [`WeaponKind`] carries the
//! per-variant fire behavior (`N` cone sub-rays for shotguns, a sphere sweep
//! for melee), while [`WeaponSlot`] holds the shared ammo/reload/cooldown
//! bookkeeping common to all four.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::events::{EventBus, GameEvent};

/// The closed set of weapon archetypes (spec §3 `WeaponSlot`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponKind {
    Pistol,
    Rifle,
    Shotgun,
    Melee,
}

impl WeaponKind {
    pub fn is_melee(self) -> bool {
        matches!(self, WeaponKind::Melee)
    }

    /// Number of sub-rays a shotgun fires per shot; irrelevant for other kinds.
    pub fn shotgun_pellets(self) -> u32 {
        match self {
            WeaponKind::Shotgun => 8,
            _ => 1,
        }
    }

    /// Half-angle (radians) of the shotgun's cone spread.
    pub fn shotgun_cone_half_angle(self) -> f32 {
        match self {
            WeaponKind::Shotgun => 0.12,
            _ => 0.0,
        }
    }

    /// Melee sweep radius, world units.
    pub fn melee_sweep_radius(self) -> f32 {
        0.8
    }
}

/// A single hit registered by a fire query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponHit {
    pub zombie_id: crate::zombie::entity::ZombieId,
    pub point: Vec3,
}

/// Result of a [`WeaponSlot::fire`] attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct FireResult {
    pub success: bool,
    pub damage: f32,
    pub hits: Vec<WeaponHit>,
}

impl FireResult {
    fn failure() -> Self {
        Self {
            success: false,
            damage: 0.0,
            hits: Vec::new(),
        }
    }
}

/// Anything the weapon system can query for hitscan/sweep resolution. The
/// Zombie Manager (C7) implements this over its active-entity broad phase.
pub trait HitscanWorld {
    /// Nearest zombie hit by a ray from `origin` in `direction`, within
    /// `max_range`. Zombies in the `dying` state are excluded.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_range: f32) -> Option<WeaponHit>;

    /// Every zombie overlapping a forward sphere sweep, for melee attacks.
    fn sphere_sweep(&self, origin: Vec3, direction: Vec3, radius: f32, max_range: f32)
        -> Vec<WeaponHit>;
}

/// One weapon slot: static archetype stats plus mutable ammo/reload state
/// (spec §3 `WeaponSlot`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponSlot {
    pub name: &'static str,
    pub kind: WeaponKind,
    pub damage: f32,
    pub fire_rate_per_second: f32,
    pub magazine_capacity: u32,
    pub reserve_capacity_max: u32,
    pub reload_seconds: f32,
    pub range: f32,

    pub current_ammo: u32,
    pub reserve_ammo: u32,
    pub reloading: bool,
    /// Simulation time (seconds) at which a reload completes, if reloading.
    pub reload_deadline: Option<f64>,
    /// Simulation time (seconds) before which `fire` will not succeed again.
    pub next_fire_ready: f64,
}

impl WeaponSlot {
    pub fn pistol() -> Self {
        Self::hitscan(
            "Pistol",
            WeaponKind::Pistol,
            25.0,
            3.0,
            15,
            120,
            1.5,
            60.0,
        )
    }

    pub fn rifle() -> Self {
        Self::hitscan(
            "Rifle",
            WeaponKind::Rifle,
            18.0,
            8.0,
            30,
            180,
            2.0,
            80.0,
        )
    }

    pub fn shotgun() -> Self {
        Self::hitscan(
            "Shotgun",
            WeaponKind::Shotgun,
            12.0,
            1.2,
            8,
            48,
            2.5,
            15.0,
        )
    }

    pub fn melee() -> Self {
        Self {
            name: "Machete",
            kind: WeaponKind::Melee,
            damage: 40.0,
            fire_rate_per_second: 1.5,
            magazine_capacity: 0,
            reserve_capacity_max: 0,
            reload_seconds: 0.0,
            range: 2.0,
            current_ammo: 0,
            reserve_ammo: 0,
            reloading: false,
            reload_deadline: None,
            next_fire_ready: 0.0,
        }
    }

    fn hitscan(
        name: &'static str,
        kind: WeaponKind,
        damage: f32,
        fire_rate_per_second: f32,
        magazine_capacity: u32,
        reserve_capacity_max: u32,
        reload_seconds: f32,
        range: f32,
    ) -> Self {
        Self {
            name,
            kind,
            damage,
            fire_rate_per_second,
            magazine_capacity,
            reserve_capacity_max,
            reload_seconds,
            range,
            current_ammo: magazine_capacity,
            reserve_ammo: reserve_capacity_max,
            reloading: false,
            reload_deadline: None,
            next_fire_ready: 0.0,
        }
    }

    fn can_fire(&self, now: f64) -> bool {
        if self.reloading {
            return false;
        }
        if !self.kind.is_melee() && self.current_ammo == 0 {
            return false;
        }
        now >= self.next_fire_ready
    }

    /// Attempt to fire. Fails (returns `success: false`) while reloading, out
    /// of ammo (non-melee), or before `next_fire_ready`. On success,
    /// decrements ammo (non-melee) and resolves hits via `world`.
    pub fn fire(
        &mut self,
        slot_index: usize,
        origin: Vec3,
        direction: Vec3,
        now: f64,
        world: &dyn HitscanWorld,
        bus: &mut EventBus,
    ) -> FireResult {
        if !self.can_fire(now) {
            bus.emit(GameEvent::WeaponEmptyClick { slot: slot_index });
            return FireResult::failure();
        }

        if !self.kind.is_melee() {
            self.current_ammo -= 1;
        }
        self.next_fire_ready = now + (1.0 / self.fire_rate_per_second) as f64;

        let hits = match self.kind {
            WeaponKind::Melee => {
                world.sphere_sweep(origin, direction, self.kind.melee_sweep_radius(), self.range)
            }
            WeaponKind::Shotgun => {
                let pellets = self.kind.shotgun_pellets();
                let half_angle = self.kind.shotgun_cone_half_angle();
                let mut hits = Vec::new();
                for i in 0..pellets {
                    let t = if pellets > 1 {
                        i as f32 / (pellets - 1) as f32 * 2.0 - 1.0
                    } else {
                        0.0
                    };
                    let spread = spread_direction(direction, t * half_angle);
                    if let Some(hit) = world.raycast(origin, spread, self.range) {
                        hits.push(hit);
                    }
                }
                hits
            }
            WeaponKind::Pistol | WeaponKind::Rifle => {
                world.raycast(origin, direction, self.range).into_iter().collect()
            }
        };

        let per_hit_damage = if self.kind == WeaponKind::Shotgun && !hits.is_empty() {
            self.damage / hits.len() as f32
        } else {
            self.damage
        };

        if !self.kind.is_melee() {
            bus.emit(GameEvent::WeaponAmmoChanged {
                slot: slot_index,
                current: self.current_ammo,
                reserve: self.reserve_ammo,
            });
        }
        bus.emit(GameEvent::WeaponFired {
            slot: slot_index,
            damage: per_hit_damage,
            hits: hits.len() as u32,
        });

        FireResult {
            success: true,
            damage: per_hit_damage,
            hits,
        }
    }

    /// Begin a reload. Succeeds iff not already reloading, non-melee,
    /// magazine isn't full, and reserve has ammo.
    pub fn reload(&mut self, slot_index: usize, now: f64, bus: &mut EventBus) -> bool {
        if self.reloading
            || self.kind.is_melee()
            || self.current_ammo >= self.magazine_capacity
            || self.reserve_ammo == 0
        {
            return false;
        }
        self.reloading = true;
        self.reload_deadline = Some(now + self.reload_seconds as f64);
        bus.emit(GameEvent::WeaponReloadStarted { slot: slot_index });
        true
    }

    /// Poll the reload deadline; completes the reload (transferring ammo
    /// from reserve to magazine) once `now >= reload_deadline`.
    pub fn poll_reload(&mut self, slot_index: usize, now: f64, bus: &mut EventBus) {
        let Some(deadline) = self.reload_deadline else {
            return;
        };
        if now < deadline {
            return;
        }
        let transfer = (self.magazine_capacity - self.current_ammo).min(self.reserve_ammo);
        self.current_ammo += transfer;
        self.reserve_ammo -= transfer;
        self.reloading = false;
        self.reload_deadline = None;
        bus.emit(GameEvent::WeaponReloadFinished { slot: slot_index });
        bus.emit(GameEvent::WeaponAmmoChanged {
            slot: slot_index,
            current: self.current_ammo,
            reserve: self.reserve_ammo,
        });
    }

    /// Cancel an in-flight reload without changing ammo (used on weapon
    /// switch, spec §9 Open Questions).
    pub fn cancel_reload(&mut self) {
        self.reloading = false;
        self.reload_deadline = None;
    }
}

fn spread_direction(direction: Vec3, angle: f32) -> Vec3 {
    if angle == 0.0 {
        return direction;
    }
    // Rotate around the world-up axis; sufficient for a horizontal cone spread.
    let (sin_a, cos_a) = angle.sin_cos();
    Vec3::new(
        direction.x * cos_a - direction.z * sin_a,
        direction.y,
        direction.x * sin_a + direction.z * cos_a,
    )
}

/// Ordered sequence of up to four weapon slots with one active index
/// (spec §3 `Inventory`).
#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    slots: Vec<Option<WeaponSlot>>,
    current_index: usize,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            slots: vec![
                Some(WeaponSlot::pistol()),
                Some(WeaponSlot::rifle()),
                Some(WeaponSlot::shotgun()),
                Some(WeaponSlot::melee()),
            ],
            current_index: 0,
        }
    }
}

impl Inventory {
    pub fn new(slots: [Option<WeaponSlot>; 4]) -> Self {
        Self {
            slots: slots.to_vec(),
            current_index: 0,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current(&self) -> Option<&WeaponSlot> {
        self.slots[self.current_index].as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut WeaponSlot> {
        self.slots[self.current_index].as_mut()
    }

    pub fn slot(&self, index: usize) -> Option<&WeaponSlot> {
        self.slots.get(index).and_then(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn switch_to(&mut self, to: usize, bus: &mut EventBus) {
        if to == self.current_index {
            return;
        }
        if let Some(slot) = self.current_mut() {
            slot.cancel_reload();
        }
        let from = self.current_index;
        self.current_index = to;
        bus.emit(GameEvent::WeaponSwitched { from, to });
    }

    /// Switch directly to slot `n` (0-indexed). No-op if empty or already
    /// current. Cancels any in-flight reload on the weapon being left.
    pub fn switch_to_slot(&mut self, n: usize, bus: &mut EventBus) -> bool {
        if n >= self.slots.len() || self.slots[n].is_none() || n == self.current_index {
            return false;
        }
        self.switch_to(n, bus);
        true
    }

    /// Step forward by one, wrapping, skipping empty slots.
    pub fn cycle_next(&mut self, bus: &mut EventBus) {
        self.cycle(1, bus);
    }

    /// Step backward by one, wrapping, skipping empty slots.
    pub fn cycle_previous(&mut self, bus: &mut EventBus) {
        self.cycle(-1, bus);
    }

    fn cycle(&mut self, step: i32, bus: &mut EventBus) {
        let len = self.slots.len() as i32;
        if len == 0 {
            return;
        }
        let mut idx = self.current_index as i32;
        for _ in 0..len {
            idx = (idx + step).rem_euclid(len);
            if self.slots[idx as usize].is_some() {
                self.switch_to(idx as usize, bus);
                return;
            }
        }
    }

    /// Poll every slot's reload deadline against `now`.
    pub fn poll_reloads(&mut self, now: f64, bus: &mut EventBus) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if let Some(slot) = slot {
                slot.poll_reload(i, now, bus);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zombie::entity::ZombieId;

    struct NoHits;
    impl HitscanWorld for NoHits {
        fn raycast(&self, _origin: Vec3, _direction: Vec3, _max_range: f32) -> Option<WeaponHit> {
            None
        }
        fn sphere_sweep(
            &self,
            _origin: Vec3,
            _direction: Vec3,
            _radius: f32,
            _max_range: f32,
        ) -> Vec<WeaponHit> {
            Vec::new()
        }
    }

    struct OneHit(ZombieId);
    impl HitscanWorld for OneHit {
        fn raycast(&self, _origin: Vec3, _direction: Vec3, _max_range: f32) -> Option<WeaponHit> {
            Some(WeaponHit {
                zombie_id: self.0,
                point: Vec3::ZERO,
            })
        }
        fn sphere_sweep(
            &self,
            _origin: Vec3,
            _direction: Vec3,
            _radius: f32,
            _max_range: f32,
        ) -> Vec<WeaponHit> {
            vec![WeaponHit {
                zombie_id: self.0,
                point: Vec3::ZERO,
            }]
        }
    }

    #[test]
    fn empty_magazine_fails_and_leaves_ammo_unchanged() {
        let mut weapon = WeaponSlot::pistol();
        weapon.current_ammo = 0;
        let mut bus = EventBus::new();
        let world = OneHit(ZombieId::from_raw(1));
        let result = weapon.fire(0, Vec3::ZERO, Vec3::Z, 0.0, &world, &mut bus);
        assert!(!result.success);
        assert_eq!(weapon.current_ammo, 0);
    }

    #[test]
    fn reload_conserves_total_ammo() {
        let mut weapon = WeaponSlot::pistol();
        weapon.current_ammo = 5;
        weapon.reserve_ammo = 20;
        weapon.magazine_capacity = 15;
        weapon.reload_seconds = 1.5;
        let mut bus = EventBus::new();

        assert!(weapon.reload(0, 0.0, &mut bus));
        weapon.poll_reload(0, 1.5, &mut bus);

        assert_eq!(weapon.current_ammo, 15);
        assert_eq!(weapon.reserve_ammo, 10);
        assert!(!weapon.reloading);

        let finished = bus
            .drain()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::WeaponReloadFinished { .. }))
            .count();
        assert_eq!(finished, 1);
    }

    #[test]
    fn cycling_n_times_returns_to_start() {
        let mut inventory = Inventory::default();
        let mut bus = EventBus::new();
        let start = inventory.current_index();
        for _ in 0..inventory.len() * 3 {
            inventory.cycle_next(&mut bus);
        }
        assert_eq!(inventory.current_index(), start);
    }

    #[test]
    fn switching_cancels_inflight_reload_without_changing_ammo() {
        let mut inventory = Inventory::default();
        let mut bus = EventBus::new();
        inventory.slot(0);
        {
            let pistol = inventory.current_mut().unwrap();
            pistol.current_ammo = 5;
            pistol.reload(0, 0.0, &mut bus);
        }
        let ammo_before = inventory.slot(0).unwrap().current_ammo;
        inventory.switch_to_slot(1, &mut bus);
        inventory.switch_to_slot(0, &mut bus);
        let slot = inventory.slot(0).unwrap();
        assert!(!slot.reloading);
        assert_eq!(slot.current_ammo, ammo_before);
    }

    #[test]
    fn fire_respects_rate_limit() {
        let mut weapon = WeaponSlot::pistol();
        let mut bus = EventBus::new();
        let world = NoHits;
        let first = weapon.fire(0, Vec3::ZERO, Vec3::Z, 0.0, &world, &mut bus);
        assert!(first.success);
        let too_soon = weapon.fire(0, Vec3::ZERO, Vec3::Z, 0.01, &world, &mut bus);
        assert!(!too_soon.success);
    }
}
