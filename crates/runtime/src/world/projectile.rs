//! Projectile flight.
//!
//! Projectiles are inanimate entities, visible to `SearchType::Inanimate`
//! queries. They fly in a straight line and are substepped so a fast shot
//! cannot tunnel through a body or a blocker within one tick.

use creature_core::{EntityId, EntityView, ProjectileSpec, Vec3};
use tracing::debug;

use crate::events::WorldEvent;
use crate::oracle::EntityRecord;

use super::World;

/// Distance from a body's axis that still counts as a hit.
const HIT_RADIUS: f32 = 0.6;
/// Longest distance covered by one substep.
const MAX_STEP: f32 = 0.25;
const LIFETIME_MS: u64 = 5_000;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Projectile {
    pub(crate) id: EntityId,
    pub(crate) shooter: EntityId,
    pub(crate) velocity: Vec3,
    pub(crate) damage: f32,
    pub(crate) age_ms: u64,
}

enum Flight {
    Airborne(Vec3),
    Hit(EntityId),
    Blocked,
}

impl World {
    pub(super) fn launch(&mut self, spec: ProjectileSpec) {
        let ProjectileSpec {
            code,
            shooter,
            origin,
            velocity,
            damage,
        } = spec;
        let id = self.entities.spawn(|id| {
            let mut view = EntityView::new(id, code.as_str(), origin);
            view.eye_height = 0.0;
            view.interactable = false;
            EntityRecord::inanimate(view)
        });
        self.projectiles.push(Projectile {
            id,
            shooter,
            velocity,
            damage,
            age_ms: 0,
        });
        debug!(shooter = %shooter, projectile = %id, code = %code, "projectile launched");
        self.events
            .push(self.time.elapsed_ms, WorldEvent::ProjectileLaunched {
                shooter,
                projectile: id,
                code,
            });
    }

    pub(super) fn fly_projectiles(&mut self, dt: f32) {
        let tick_ms = self.tick_ms;
        let mut remaining = Vec::with_capacity(self.projectiles.len());
        for mut projectile in std::mem::take(&mut self.projectiles) {
            let Some(start) = self.entities.get(projectile.id).map(|r| r.view.position) else {
                continue;
            };
            match self.trace(&projectile, start, dt) {
                Flight::Airborne(position) => {
                    projectile.age_ms += tick_ms;
                    if projectile.age_ms >= LIFETIME_MS {
                        self.entities.remove(projectile.id);
                        continue;
                    }
                    if let Some(record) = self.entities.get_mut(projectile.id) {
                        record.view.position = position;
                    }
                    remaining.push(projectile);
                }
                Flight::Hit(target) => {
                    self.entities.remove(projectile.id);
                    self.events.push(self.time.elapsed_ms, WorldEvent::ProjectileHit {
                        projectile: projectile.id,
                        target,
                    });
                    self.damage(projectile.shooter, target, projectile.damage);
                }
                Flight::Blocked => {
                    self.entities.remove(projectile.id);
                }
            }
        }
        self.projectiles = remaining;
    }

    fn trace(&self, projectile: &Projectile, start: Vec3, dt: f32) -> Flight {
        let travel = projectile.velocity * dt;
        let steps = (travel.length() / MAX_STEP).ceil().max(1.0) as u32;
        let step = travel * (1.0 / steps as f32);

        let mut position = start;
        for _ in 0..steps {
            position = position + step;
            if self.environment.is_solid(position) {
                return Flight::Blocked;
            }
            let hit = self
                .entities
                .iter()
                .filter(|record| !record.inanimate && record.view.alive)
                .filter(|record| record.view.id != projectile.shooter)
                .map(|record| (record.view.id, body_distance(&record.view, position)))
                .filter(|(_, distance)| *distance <= HIT_RADIUS)
                .min_by(|a, b| a.1.total_cmp(&b.1));
            if let Some((target, _)) = hit {
                return Flight::Hit(target);
            }
        }
        Flight::Airborne(position)
    }
}

/// Distance from `point` to the vertical segment between a body's feet and
/// its eyes.
fn body_distance(view: &EntityView, point: Vec3) -> f32 {
    let top = view.position.y + view.eye_height.max(0.0);
    let y = point.y.clamp(view.position.y, top);
    point.distance(Vec3::new(view.position.x, y, view.position.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_distance_measures_to_the_axis() {
        let view = EntityView::new(EntityId::new(0, 0), "wolf", Vec3::ZERO);
        assert!((body_distance(&view, Vec3::new(0.5, 0.5, 0.0)) - 0.5).abs() < 1e-6);
        assert!((body_distance(&view, Vec3::new(0.0, 3.0, 0.0)) - 2.0).abs() < 1e-6);
    }
}
