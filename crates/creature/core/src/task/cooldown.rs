use crate::env::TaskRng;
use crate::types::WorldTime;

use super::config::Span;

/// Independent short (milliseconds) and long (in-game hours) cooldown
/// deadlines of one task instance.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cooldown {
    pub ready_at_ms: u64,
    pub ready_at_hours: f64,
}

impl Cooldown {
    /// Both deadlines have elapsed.
    pub fn is_ready(&self, time: &WorldTime) -> bool {
        time.elapsed_ms >= self.ready_at_ms && time.total_hours >= self.ready_at_hours
    }

    /// Resolves both windows to a single randomized deadline each, measured
    /// from `time`.
    pub fn arm(&mut self, time: &WorldTime, ms: Span<u64>, hours: Span<f64>, rng: &mut TaskRng) {
        self.ready_at_ms = time.elapsed_ms + rng.range_u64(ms.min, ms.max);
        self.ready_at_hours = time.total_hours + rng.range_f64(hours.min, hours.max);
    }

    /// Pushes only the millisecond deadline, used for the initial cooldown.
    pub fn delay_ms(&mut self, time: &WorldTime, ms: Span<u64>, rng: &mut TaskRng) {
        self.ready_at_ms = self
            .ready_at_ms
            .max(time.elapsed_ms + rng.range_u64(ms.min, ms.max));
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
