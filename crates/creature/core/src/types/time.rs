/// Snapshot of the world clock handed to every task call.
///
/// `elapsed_ms` drives short cooldowns, durations and animation timing.
/// `total_hours` is the in-game calendar used for long cooldowns and the
/// day-time windows.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldTime {
    /// Simulated milliseconds since the world started.
    pub elapsed_ms: u64,
    /// In-game hours since the calendar epoch.
    pub total_hours: f64,
    /// Length of an in-game day in hours.
    pub hours_per_day: f32,
}

impl WorldTime {
    pub const fn new(elapsed_ms: u64, total_hours: f64, hours_per_day: f32) -> Self {
        Self {
            elapsed_ms,
            total_hours,
            hours_per_day,
        }
    }

    /// Time of day on a 24 hour virtual clock, in `[0, 24)`.
    pub fn hour_of_day(&self) -> f32 {
        let day = f64::from(self.hours_per_day.max(f32::EPSILON));
        (self.total_hours.rem_euclid(day) / day * 24.0) as f32
    }

    /// Seconds elapsed between `since_ms` and now, saturating at zero.
    pub fn seconds_since(&self, since_ms: u64) -> f32 {
        self.elapsed_ms.saturating_sub(since_ms) as f32 / 1000.0
    }

    /// Advances the clock by `dt` seconds, with the calendar moving
    /// `hours_per_second` in-game hours for every simulated second.
    #[must_use]
    pub fn advanced(self, dt: f32, hours_per_second: f64) -> Self {
        let dt_ms = (f64::from(dt.max(0.0)) * 1000.0).round() as u64;
        Self {
            elapsed_ms: self.elapsed_ms + dt_ms,
            total_hours: self.total_hours + f64::from(dt.max(0.0)) * hours_per_second,
            hours_per_day: self.hours_per_day,
        }
    }
}

impl Default for WorldTime {
    fn default() -> Self {
        Self::new(0, 0.0, 24.0)
    }
}
