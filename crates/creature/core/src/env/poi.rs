use crate::types::Vec3;

/// A registered world location with a semantic type (`nest`, `food`, ...).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Poi {
    pub id: u64,
    pub kind: String,
    pub position: Vec3,
}

/// Points-of-interest registry.
pub trait PoiOracle {
    /// Nearest POI of `kind` within `range` accepted by `suitable`.
    fn nearest_poi(
        &self,
        center: Vec3,
        range: f32,
        kind: &str,
        suitable: &mut dyn FnMut(&Poi) -> bool,
    ) -> Option<Poi>;

    /// POI of `kind` within `range` minimizing `distance / weight`. POIs with
    /// a non-positive weight are skipped.
    fn weighted_nearest_poi(
        &self,
        center: Vec3,
        range: f32,
        kind: &str,
        weight: &mut dyn FnMut(&Poi) -> f32,
    ) -> Option<Poi>;
}
