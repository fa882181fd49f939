use creature_core::{Poi, PoiOracle, Vec3};

/// Registered points of interest, in registration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoiRegistry {
    pois: Vec<Poi>,
    next_id: u64,
}

impl PoiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: impl Into<String>, position: Vec3) -> u64 {
        self.next_id += 1;
        self.pois.push(Poi {
            id: self.next_id,
            kind: kind.into(),
            position,
        });
        self.next_id
    }

    pub fn remove(&mut self, id: u64) -> Option<Poi> {
        let index = self.pois.iter().position(|poi| poi.id == id)?;
        Some(self.pois.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Poi> {
        self.pois.iter()
    }

    fn of_kind<'a>(
        &'a self,
        center: Vec3,
        range: f32,
        kind: &'a str,
    ) -> impl Iterator<Item = &'a Poi> {
        self.pois
            .iter()
            .filter(move |poi| poi.kind == kind && poi.position.distance(center) <= range)
    }
}

impl PoiOracle for PoiRegistry {
    fn nearest_poi(
        &self,
        center: Vec3,
        range: f32,
        kind: &str,
        suitable: &mut dyn FnMut(&Poi) -> bool,
    ) -> Option<Poi> {
        let mut best: Option<(f32, &Poi)> = None;
        for poi in self.of_kind(center, range, kind) {
            let distance = poi.position.distance(center);
            if best.is_some_and(|(closest, _)| distance >= closest) {
                continue;
            }
            if suitable(poi) {
                best = Some((distance, poi));
            }
        }
        best.map(|(_, poi)| poi.clone())
    }

    fn weighted_nearest_poi(
        &self,
        center: Vec3,
        range: f32,
        kind: &str,
        weight: &mut dyn FnMut(&Poi) -> f32,
    ) -> Option<Poi> {
        let mut best: Option<(f32, &Poi)> = None;
        for poi in self.of_kind(center, range, kind) {
            let w = weight(poi);
            if !(w > 0.0) {
                continue;
            }
            let score = poi.position.distance(center) / w;
            if best.is_none_or(|(lowest, _)| score < lowest) {
                best = Some((score, poi));
            }
        }
        best.map(|(_, poi)| poi.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_of_kind_within_range() {
        let mut pois = PoiRegistry::new();
        pois.register("food", Vec3::new(8.0, 0.0, 0.0));
        let near = pois.register("food", Vec3::new(3.0, 0.0, 0.0));
        pois.register("nest", Vec3::new(1.0, 0.0, 0.0));

        let found = pois.nearest_poi(Vec3::ZERO, 10.0, "food", &mut |_| true);
        assert_eq!(found.map(|poi| poi.id), Some(near));
        assert!(pois.nearest_poi(Vec3::ZERO, 2.0, "food", &mut |_| true).is_none());
    }

    #[test]
    fn weight_trades_off_distance() {
        let mut pois = PoiRegistry::new();
        pois.register("food", Vec3::new(2.0, 0.0, 0.0));
        let rich = pois.register("food", Vec3::new(4.0, 0.0, 0.0));

        let found = pois.weighted_nearest_poi(Vec3::ZERO, 10.0, "food", &mut |poi| {
            if poi.id == rich { 4.0 } else { 1.0 }
        });
        assert_eq!(found.map(|poi| poi.id), Some(rich));

        let none = pois.weighted_nearest_poi(Vec3::ZERO, 10.0, "food", &mut |_| 0.0);
        assert!(none.is_none());
    }
}
