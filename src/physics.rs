//! Physics Probe (C4): ground detection and wall-collision resolution
//! against static world meshes.
//!
//! The probe is a narrow, synchronous contract over a set of static
//! axis-aligned obstacle boxes (the "placing static obstacle meshes" the
//! spec's non-goals permit). Dynamic entities (zombies, the player) are
//! excluded structurally: the obstacle set only ever holds static geometry
//! (`add_obstacle`/`with_obstacles`), so no per-query exclusion parameter is
//! needed to keep them out of a ground check or wall slide.

use bevy::math::{Vec2, Vec3};

use crate::config::SimConfig;

/// A static, axis-aligned box obstacle in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticObstacle {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl StaticObstacle {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    fn top_y(&self) -> f32 {
        self.center.y + self.half_extents.y
    }

    /// Signed penetration depth of a point against this box in the XZ plane,
    /// positive when inside. `None` when outside on the XZ footprint.
    fn horizontal_penetration(&self, point: Vec3) -> Option<(Vec2, f32)> {
        let dx = point.x - self.center.x;
        let dz = point.z - self.center.z;
        if dx.abs() > self.half_extents.x || dz.abs() > self.half_extents.z {
            return None;
        }
        // Distance to nearest face; normal points outward along that axis.
        let dist_x = self.half_extents.x - dx.abs();
        let dist_z = self.half_extents.z - dz.abs();
        if dist_x < dist_z {
            let normal = Vec2::new(dx.signum(), 0.0);
            Some((normal, dist_x))
        } else {
            let normal = Vec2::new(0.0, dz.signum());
            Some((normal, dist_z))
        }
    }
}

/// Ground/wall probe over a static obstacle set (spec §4.4).
#[derive(Debug, Clone)]
pub struct PhysicsProbe {
    obstacles: Vec<StaticObstacle>,
    ground_check_distance: f32,
    player_radius: f32,
    wall_slide_factor: f32,
}

impl Default for PhysicsProbe {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

impl PhysicsProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an empty probe with tunables sourced from `config`.
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            obstacles: Vec::new(),
            ground_check_distance: config.ground_check_distance,
            player_radius: config.player_radius,
            wall_slide_factor: config.wall_slide_factor,
        }
    }

    pub fn with_obstacles(obstacles: Vec<StaticObstacle>) -> Self {
        Self {
            obstacles,
            ..Self::default()
        }
    }

    pub fn add_obstacle(&mut self, obstacle: StaticObstacle) {
        self.obstacles.push(obstacle);
    }

    /// Downward ray from `pos`; returns the top surface Y of the nearest
    /// obstacle within `GROUND_CHECK_DISTANCE` of the feet, else the default
    /// ground plane (y = 0).
    pub fn check_ground(&self, pos: Vec3) -> f32 {
        let mut best: Option<f32> = None;
        for obstacle in &self.obstacles {
            let dx = pos.x - obstacle.center.x;
            let dz = pos.z - obstacle.center.z;
            if dx.abs() > obstacle.half_extents.x || dz.abs() > obstacle.half_extents.z {
                continue;
            }
            let top = obstacle.top_y();
            if top <= pos.y && pos.y - top <= self.ground_check_distance {
                best = Some(best.map_or(top, |b: f32| b.max(top)));
            }
        }
        best.unwrap_or(0.0)
    }

    /// Resolve a desired horizontal displacement against the obstacle set.
    /// If the destination penetrates an obstacle, the displacement is
    /// projected onto the wall plane (slide) and scaled by
    /// `WALL_SLIDE_FACTOR`; the y component of the result is always zero.
    pub fn resolve_horizontal(&self, pos: Vec3, desired_delta: Vec3) -> Vec3 {
        let destination = pos + Vec3::new(desired_delta.x, 0.0, desired_delta.z);
        let probe_radius = self.player_radius * 2.0;

        for obstacle in &self.obstacles {
            let inflated = StaticObstacle::new(
                obstacle.center,
                obstacle.half_extents + Vec3::splat(probe_radius),
            );
            if let Some((normal, _depth)) = inflated.horizontal_penetration(destination) {
                let delta_2d = Vec2::new(desired_delta.x, desired_delta.z);
                let slid = delta_2d - normal * delta_2d.dot(normal);
                return Vec3::new(
                    slid.x * self.wall_slide_factor,
                    0.0,
                    slid.y * self.wall_slide_factor,
                );
            }
        }

        Vec3::new(desired_delta.x, 0.0, desired_delta.z)
    }

    /// True iff none of the four cardinal neighbors of `pos` penetrate an
    /// obstacle.
    pub fn is_position_valid(&self, pos: Vec3) -> bool {
        let probe_radius = self.player_radius;
        let offsets = [
            Vec3::new(probe_radius, 0.0, 0.0),
            Vec3::new(-probe_radius, 0.0, 0.0),
            Vec3::new(0.0, 0.0, probe_radius),
            Vec3::new(0.0, 0.0, -probe_radius),
        ];
        for offset in offsets {
            let sample = pos + offset;
            for obstacle in &self.obstacles {
                if obstacle.horizontal_penetration(sample).is_some() {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ground_plane_is_zero() {
        let probe = PhysicsProbe::new();
        assert_eq!(probe.check_ground(Vec3::new(0.0, 5.0, 0.0)), 0.0);
    }

    #[test]
    fn ground_check_finds_platform_top() {
        let mut probe = PhysicsProbe::new();
        probe.add_obstacle(StaticObstacle::new(
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(2.0, 1.0, 2.0),
        ));
        let ground = probe.check_ground(Vec3::new(0.0, 2.5, 0.0));
        assert_eq!(ground, 2.0);
    }

    #[test]
    fn wall_slide_projects_and_scales_delta() {
        let mut probe = PhysicsProbe::new();
        probe.add_obstacle(StaticObstacle::new(
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
        ));
        let pos = Vec3::new(0.0, 0.0, 0.0);
        let desired = Vec3::new(2.0, 0.0, 1.0);
        let resolved = probe.resolve_horizontal(pos, desired);
        assert_eq!(resolved.y, 0.0);
        // Movement toward the wall (x) should be reduced versus the free axis.
        assert!(resolved.x.abs() < desired.x.abs());
    }

    #[test]
    fn position_valid_when_no_obstacles() {
        let probe = PhysicsProbe::new();
        assert!(probe.is_position_valid(Vec3::ZERO));
    }
}
