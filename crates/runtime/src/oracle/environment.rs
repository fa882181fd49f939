use creature_core::{AiSettings, EnvironmentOracle, Vec3};

/// Axis-aligned solid box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Builds a box from two opposite corners in any order.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: Vec3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Vec3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        (self.min.x..=self.max.x).contains(&point.x)
            && (self.min.y..=self.max.y).contains(&point.y)
            && (self.min.z..=self.max.z).contains(&point.z)
    }

    /// Slab test for the segment `from -> to`.
    pub fn intersects_segment(&self, from: Vec3, to: Vec3) -> bool {
        let delta = to - from;
        let mut enter = 0.0f32;
        let mut exit = 1.0f32;
        for (origin, d, lo, hi) in [
            (from.x, delta.x, self.min.x, self.max.x),
            (from.y, delta.y, self.min.y, self.max.y),
            (from.z, delta.z, self.min.z, self.max.z),
        ] {
            if d.abs() < f32::EPSILON {
                if origin < lo || origin > hi {
                    return false;
                }
                continue;
            }
            let (t0, t1) = {
                let a = (lo - origin) / d;
                let b = (hi - origin) / d;
                (a.min(b), a.max(b))
            };
            enter = enter.max(t0);
            exit = exit.min(t1);
            if enter > exit {
                return false;
            }
        }
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct LightZone {
    center: Vec3,
    radius: f32,
    level: u8,
}

/// Light and temperature fields plus solid obstacles.
///
/// Light zones replace the base level inside their radius; where zones
/// overlap the one added last wins.
#[derive(Clone, Debug, PartialEq)]
pub struct Environment {
    light: u8,
    zones: Vec<LightZone>,
    temperature: f32,
    blockers: Vec<Aabb>,
}

impl Environment {
    pub fn new(light: u8, temperature: f32) -> Self {
        Self {
            light: light.min(AiSettings::MAX_LIGHT_LEVEL),
            zones: Vec::new(),
            temperature,
            blockers: Vec::new(),
        }
    }

    pub fn with_light_zone(mut self, center: Vec3, radius: f32, level: u8) -> Self {
        self.zones.push(LightZone {
            center,
            radius,
            level: level.min(AiSettings::MAX_LIGHT_LEVEL),
        });
        self
    }

    pub fn with_blocker(mut self, blocker: Aabb) -> Self {
        self.blockers.push(blocker);
        self
    }

    pub fn set_light(&mut self, level: u8) {
        self.light = level.min(AiSettings::MAX_LIGHT_LEVEL);
    }

    pub fn set_temperature(&mut self, temperature: f32) {
        self.temperature = temperature;
    }

    /// Whether `point` lies inside solid matter.
    pub fn is_solid(&self, point: Vec3) -> bool {
        self.blockers.iter().any(|blocker| blocker.contains(point))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(15, 20.0)
    }
}

impl EnvironmentOracle for Environment {
    fn light_level(&self, position: Vec3) -> u8 {
        self.zones
            .iter()
            .rev()
            .find(|zone| zone.center.distance(position) <= zone.radius)
            .map_or(self.light, |zone| zone.level)
    }

    fn temperature(&self, _position: Vec3) -> f32 {
        self.temperature
    }

    fn has_direct_contact(&self, from: Vec3, to: Vec3) -> bool {
        !self
            .blockers
            .iter()
            .any(|blocker| blocker.intersects_segment(from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> Aabb {
        Aabb::new(Vec3::new(4.0, 0.0, -5.0), Vec3::new(5.0, 3.0, 5.0))
    }

    #[test]
    fn wall_blocks_sight_through_it_only() {
        let env = Environment::default().with_blocker(wall());
        assert!(!env.has_direct_contact(Vec3::new(0.0, 1.0, 0.0), Vec3::new(10.0, 1.0, 0.0)));
        assert!(env.has_direct_contact(Vec3::new(0.0, 1.0, 0.0), Vec3::new(3.0, 1.0, 0.0)));
        assert!(env.has_direct_contact(Vec3::new(0.0, 4.0, 0.0), Vec3::new(10.0, 4.0, 0.0)));
    }

    #[test]
    fn later_zone_wins() {
        let env = Environment::new(15, 20.0)
            .with_light_zone(Vec3::ZERO, 10.0, 4)
            .with_light_zone(Vec3::ZERO, 2.0, 0);
        assert_eq!(env.light_level(Vec3::new(1.0, 0.0, 0.0)), 0);
        assert_eq!(env.light_level(Vec3::new(5.0, 0.0, 0.0)), 4);
        assert_eq!(env.light_level(Vec3::new(20.0, 0.0, 0.0)), 15);
    }

    #[test]
    fn solid_points() {
        let env = Environment::default().with_blocker(wall());
        assert!(env.is_solid(Vec3::new(4.5, 1.0, 0.0)));
        assert!(!env.is_solid(Vec3::new(6.0, 1.0, 0.0)));
    }
}
