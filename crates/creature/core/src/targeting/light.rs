/// Piecewise-linear mapping from light level to a detection-range
/// multiplier, defined by four non-decreasing breakpoints.
///
/// ```text
///  1 |        ________
///    |       /        \
///  0 |______/          \______
///         b1  b2    b3  b4
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightCurve([f32; 4]);

impl LightCurve {
    /// Returns `None` when the breakpoints decrease or are not finite.
    pub fn new(breakpoints: [f32; 4]) -> Option<Self> {
        let finite = breakpoints.iter().all(|b| b.is_finite());
        let ordered = breakpoints.windows(2).all(|pair| pair[0] <= pair[1]);
        (finite && ordered).then_some(Self(breakpoints))
    }

    pub fn breakpoints(&self) -> [f32; 4] {
        self.0
    }

    pub fn multiplier(&self, level: f32) -> f32 {
        let [b1, b2, b3, b4] = self.0;
        if level <= b1 || level >= b4 {
            0.0
        } else if level < b2 {
            (level - b1) / (b2 - b1)
        } else if level <= b3 {
            1.0
        } else {
            (b4 - level) / (b4 - b3)
        }
    }
}
