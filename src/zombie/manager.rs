//! Zombie Manager (C7): population store, spawn/despawn, broad-phase
//! queries, raycast dispatch.
//!
//! Owns the keyed zombie collection exclusively (spec §3 Ownership); every
//! other subsystem references zombies only by [`ZombieId`]. Id stability
//! across snapshot/restore is maintained by resuming the monotonic id
//! counter above any restored id (spec §4.7).

use std::collections::HashMap;

use bevy::math::Vec3;
use bevy::prelude::Resource;

use crate::config::SimConfig;
use crate::error::SimError;
use crate::events::{EventBus, GameEvent};
use crate::weapon::{HitscanWorld, WeaponHit};
use crate::zombie::entity::{Zombie, ZombieId, ZombieTuning, ZombieVariant};

/// Population store for all active zombies (spec §3/§4.7).
#[derive(Resource, Debug)]
pub struct ZombieManager {
    zombies: HashMap<ZombieId, Zombie>,
    next_id: u64,
    tuning: ZombieTuning,
}

impl Default for ZombieManager {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

impl ZombieManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an empty manager with zombie tunables sourced from `config`.
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            zombies: HashMap::new(),
            next_id: 0,
            tuning: ZombieTuning::from_config(config),
        }
    }

    pub fn len(&self) -> usize {
        self.zombies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zombies.is_empty()
    }

    pub fn get(&self, id: ZombieId) -> Option<&Zombie> {
        self.zombies.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zombie> {
        self.zombies.values()
    }

    /// Spawn a new zombie at `position`. Emits `zombie:spawned`.
    pub fn spawn(&mut self, position: Vec3, variant: ZombieVariant, bus: &mut EventBus) -> ZombieId {
        let id = ZombieId::from_raw(self.next_id);
        self.next_id += 1;
        self.zombies.insert(id, Zombie::spawn(id, variant, position));
        bus.emit(GameEvent::ZombieSpawned { id });
        id
    }

    /// Apply damage to a specific zombie by id. `hit_point` is accepted for
    /// API symmetry with the spec's `damage(id, n, hitPoint)` contract, even
    /// though the entity state machine doesn't currently use it.
    pub fn damage(&mut self, id: ZombieId, amount: f32, _hit_point: Vec3, bus: &mut EventBus) {
        if let Some(zombie) = self.zombies.get_mut(&id) {
            zombie.take_damage(amount, &self.tuning, bus);
        }
    }

    /// Every zombie whose horizontal distance to `pos` is within `radius`.
    /// Zombies in `dying` are excluded from the broad phase.
    pub fn in_range(&self, pos: Vec3, radius: f32) -> Vec<ZombieId> {
        self.zombies
            .values()
            .filter(|z| !z.is_dying())
            .filter(|z| {
                let d = Vec3::new(z.position.x - pos.x, 0.0, z.position.z - pos.z);
                d.length() <= radius
            })
            .map(|z| z.id)
            .collect()
    }

    /// The closest non-dying zombie to `pos`, if any.
    pub fn closest(&self, pos: Vec3) -> Option<ZombieId> {
        self.zombies
            .values()
            .filter(|z| !z.is_dying())
            .min_by(|a, b| {
                let da = (a.position - pos).length_squared();
                let db = (b.position - pos).length_squared();
                da.partial_cmp(&db).unwrap()
            })
            .map(|z| z.id)
    }

    /// Nearest non-dying zombie intersected by the ray `origin + t*direction`
    /// for `t` in `[0, max_range]`, approximated as a capsule test against
    /// each zombie's position (no full collider geometry is modeled; see
    /// DESIGN.md).
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_range: f32) -> Option<WeaponHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        const HIT_RADIUS: f32 = 0.6;

        let mut best: Option<(f32, ZombieId, Vec3)> = None;
        for zombie in self.zombies.values() {
            if zombie.is_dying() {
                continue;
            }
            let to_zombie = zombie.position - origin;
            let t = to_zombie.dot(direction);
            if t < 0.0 || t > max_range {
                continue;
            }
            let closest_point = origin + direction * t;
            let lateral = (zombie.position - closest_point).length();
            if lateral <= HIT_RADIUS && best.is_none_or(|(best_t, ..)| t < best_t) {
                best = Some((t, zombie.id, closest_point));
            }
        }
        best.map(|(_, id, point)| WeaponHit {
            zombie_id: id,
            point,
        })
    }

    /// Advance every non-dying zombie by one fixed step, and reap zombies
    /// whose death linger has expired. A per-entity panic-free fault
    /// (signalled by `fault_injector`, used only in tests) removes just that
    /// zombie and proceeds, per the `entity-fault` recovery policy (spec §7).
    pub fn update(
        &mut self,
        dt: f32,
        player_pos: Vec3,
        mut rng_unit: impl FnMut() -> Vec3,
        bus: &mut EventBus,
    ) -> Vec<SimError> {
        let mut faults = Vec::new();
        let ids: Vec<ZombieId> = self.zombies.keys().copied().collect();

        for id in ids {
            let Some(zombie) = self.zombies.get_mut(&id) else {
                continue;
            };
            if !zombie.position.is_finite() {
                faults.push(SimError::EntityFault {
                    zombie_id: id.raw(),
                    reason: "non-finite position",
                });
                self.zombies.remove(&id);
                continue;
            }
            zombie.update(dt, player_pos, &self.tuning, &mut rng_unit, bus);
        }

        self.zombies.retain(|_, z| !z.is_ready_for_removal());
        faults
    }

    /// A snapshot of every zombie's public state, suitable for persistence.
    pub fn snapshot(&self) -> Vec<Zombie> {
        let mut zombies: Vec<Zombie> = self.zombies.values().copied().collect();
        zombies.sort_by_key(|z| z.id.raw());
        zombies
    }

    /// Restore from a previously captured list. The monotonic id counter is
    /// resumed above the highest restored id so freshly spawned zombies never
    /// collide with restored ones.
    pub fn restore(&mut self, zombies: Vec<Zombie>) {
        self.zombies.clear();
        let mut max_id = 0u64;
        for zombie in zombies {
            max_id = max_id.max(zombie.id.raw());
            self.zombies.insert(zombie.id, zombie);
        }
        self.next_id = self.next_id.max(max_id + 1);
    }
}

impl HitscanWorld for ZombieManager {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_range: f32) -> Option<WeaponHit> {
        ZombieManager::raycast(self, origin, direction, max_range)
    }

    fn sphere_sweep(
        &self,
        origin: Vec3,
        direction: Vec3,
        radius: f32,
        max_range: f32,
    ) -> Vec<WeaponHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return Vec::new();
        }
        let mut hits = Vec::new();
        for zombie in self.zombies.values() {
            if zombie.is_dying() {
                continue;
            }
            let to_zombie = zombie.position - origin;
            let t = to_zombie.dot(direction).clamp(0.0, max_range);
            let closest_point = origin + direction * t;
            if (zombie.position - closest_point).length() <= radius {
                hits.push(WeaponHit {
                    zombie_id: zombie.id,
                    point: closest_point,
                });
            }
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_emits_event_and_assigns_unique_ids() {
        let mut mgr = ZombieManager::new();
        let mut bus = EventBus::new();
        let a = mgr.spawn(Vec3::ZERO, ZombieVariant::Walker, &mut bus);
        let b = mgr.spawn(Vec3::ZERO, ZombieVariant::Walker, &mut bus);
        assert_ne!(a, b);
        assert_eq!(mgr.len(), 2);
        let spawned = bus
            .drain()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::ZombieSpawned { .. }))
            .count();
        assert_eq!(spawned, 2);
    }

    #[test]
    fn restore_resumes_id_counter_above_max_restored() {
        let mut mgr = ZombieManager::new();
        let restored = vec![Zombie::spawn(ZombieId::from_raw(42), ZombieVariant::Walker, Vec3::ZERO)];
        mgr.restore(restored);
        let mut bus = EventBus::new();
        let new_id = mgr.spawn(Vec3::ZERO, ZombieVariant::Walker, &mut bus);
        assert!(new_id.raw() > 42);
    }

    #[test]
    fn broad_phase_skips_dying_zombies() {
        let mut mgr = ZombieManager::new();
        let mut bus = EventBus::new();
        let id = mgr.spawn(Vec3::ZERO, ZombieVariant::Walker, &mut bus);
        mgr.damage(id, 1000.0, Vec3::ZERO, &mut bus);
        assert!(mgr.in_range(Vec3::ZERO, 100.0).is_empty());
        assert!(mgr.closest(Vec3::ZERO).is_none());
    }

    #[test]
    fn raycast_finds_nearest_hit() {
        let mut mgr = ZombieManager::new();
        let mut bus = EventBus::new();
        mgr.spawn(Vec3::new(0.0, 0.0, 5.0), ZombieVariant::Walker, &mut bus);
        mgr.spawn(Vec3::new(0.0, 0.0, 2.0), ZombieVariant::Walker, &mut bus);
        let hit = mgr.raycast(Vec3::ZERO, Vec3::Z, 10.0).unwrap();
        assert_eq!(hit.point.z, 2.0);
    }

    #[test]
    fn gc_removes_zombies_after_linger_expires() {
        let mut mgr = ZombieManager::new();
        let mut bus = EventBus::new();
        let id = mgr.spawn(Vec3::ZERO, ZombieVariant::Walker, &mut bus);
        mgr.damage(id, 10000.0, Vec3::ZERO, &mut bus);
        assert_eq!(mgr.len(), 1);
        mgr.update(5.0, Vec3::new(1000.0, 0.0, 0.0), || Vec3::X, &mut bus);
        assert_eq!(mgr.len(), 0);
    }
}
