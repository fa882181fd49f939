use crate::types::Vec3;

/// Environmental fields sampled by preconditions and sensing.
pub trait EnvironmentOracle {
    /// Light level at `position`, from 0 (pitch black) to
    /// [`crate::AiSettings::MAX_LIGHT_LEVEL`].
    fn light_level(&self, position: Vec3) -> u8;

    /// Temperature in degrees Celsius at `position`.
    fn temperature(&self, position: Vec3) -> f32;

    /// Whether nothing solid lies on the straight segment between two points.
    fn has_direct_contact(&self, from: Vec3, to: Vec3) -> bool;
}
