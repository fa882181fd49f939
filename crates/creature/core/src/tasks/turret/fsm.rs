//! Pure transition function of the turret-mode state machine.
//!
//! ```text
//! Idle ──firing──▶ TurretMode ("load")      Idle ──sensing──▶ TurretMode ("turret")
//! TurretMode ──anim done, firing──▶ Load ──anim done──▶ Hold
//! Hold ──in range, held 1.25s──▶ Fired ──anim done, in sensing range──▶ Reload
//! Reload ──anim done──▶ Load          Hold ──held 2s──▶ Unload ──anim done──▶ Stop
//! ```
//!
//! Abort (target too close, or lost after firing) hands the target to the
//! fallback task and ends the run. A lost target is never fired at; the hold
//! runs out into an unload instead.
//!
//! The reload animation re-arms the turret, so Reload enters Load without a
//! further animation and Load moves on to Hold at the next evaluation.

/// States of a turret run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
pub enum TurretState {
    #[default]
    Idle,
    TurretMode,
    TurretModeLoad,
    TurretModeHold,
    TurretModeFired,
    TurretModeReload,
    TurretModeUnload,
    Stop,
}

/// Where the target sits relative to the turret's ranges. Abort is checked
/// first, then the firing window, then the sensing range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum RangeBand {
    Abort,
    Firing,
    Sensing,
    Outside,
}

impl RangeBand {
    pub fn classify(
        distance: f32,
        abort_range: f32,
        firing_min: f32,
        firing_max: f32,
        sensing_range: f32,
    ) -> Self {
        if distance < abort_range {
            RangeBand::Abort
        } else if distance >= firing_min && distance <= firing_max {
            RangeBand::Firing
        } else if distance <= sensing_range {
            RangeBand::Sensing
        } else {
            RangeBand::Outside
        }
    }

    fn can_fire(self) -> bool {
        matches!(self, RangeBand::Firing | RangeBand::Abort)
    }
}

/// Whether the target still qualifies: resolves, alive, targetable and in
/// direct line of contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetStatus {
    Valid,
    Lost,
}

/// Everything a transition depends on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurretInputs {
    /// Simulated seconds since the current state was entered.
    pub elapsed_secs: f32,
    pub target: TargetStatus,
    pub band: RangeBand,
    /// The animation started on entering the current state has stopped, or
    /// none was started.
    pub animation_done: bool,
}

/// Outcome of one evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Enter {
        state: TurretState,
        animation: Option<&'static str>,
    },
    /// Spawn the projectile, then enter [`TurretState::TurretModeFired`]
    /// playing [`ANIM_FIRE`].
    Fire,
    /// Hand the target to the fallback task and stop.
    Abort,
}

pub const ANIM_LOAD: &str = "load";
pub const ANIM_TURRET: &str = "turret";
pub const ANIM_LOAD_FROM_POSE: &str = "load-from-turret-pose";
pub const ANIM_HOLD: &str = "hold";
pub const ANIM_FIRE: &str = "fire";
pub const ANIM_RELOAD: &str = "reload";
pub const ANIM_UNLOAD: &str = "unload";

/// Longest wait in [`TurretState::TurretMode`] or out of range after firing.
pub const STATE_TIMEOUT_SECS: f32 = 5.0;
/// Minimum hold before a shot.
pub const HOLD_BEFORE_FIRE_SECS: f32 = 1.25;
/// Hold after which the turret gives up and unloads.
pub const HOLD_LIMIT_SECS: f32 = 2.0;

const fn enter(state: TurretState, animation: Option<&'static str>) -> Transition {
    Transition::Enter { state, animation }
}

pub fn next_transition(state: TurretState, inputs: &TurretInputs) -> Transition {
    use TurretState::*;

    match state {
        Idle => match inputs.band {
            RangeBand::Abort => Transition::Abort,
            RangeBand::Firing => enter(TurretMode, Some(ANIM_LOAD)),
            RangeBand::Sensing => enter(TurretMode, Some(ANIM_TURRET)),
            RangeBand::Outside => enter(Stop, None),
        },
        TurretMode => {
            if inputs.elapsed_secs > STATE_TIMEOUT_SECS {
                enter(Stop, None)
            } else if !inputs.animation_done {
                Transition::Stay
            } else if inputs.band == RangeBand::Abort {
                Transition::Abort
            } else if inputs.band == RangeBand::Firing {
                enter(TurretModeLoad, Some(ANIM_LOAD_FROM_POSE))
            } else {
                Transition::Stay
            }
        }
        TurretModeLoad => {
            if inputs.animation_done {
                enter(TurretModeHold, Some(ANIM_HOLD))
            } else {
                Transition::Stay
            }
        }
        TurretModeHold => {
            if inputs.target == TargetStatus::Valid
                && inputs.band.can_fire()
                && inputs.elapsed_secs >= HOLD_BEFORE_FIRE_SECS
            {
                Transition::Fire
            } else if inputs.elapsed_secs >= HOLD_LIMIT_SECS {
                enter(TurretModeUnload, Some(ANIM_UNLOAD))
            } else {
                Transition::Stay
            }
        }
        TurretModeFired => {
            if inputs.target == TargetStatus::Lost {
                Transition::Abort
            } else if inputs.band != RangeBand::Outside {
                if inputs.animation_done {
                    enter(TurretModeReload, Some(ANIM_RELOAD))
                } else {
                    Transition::Stay
                }
            } else if inputs.elapsed_secs > STATE_TIMEOUT_SECS {
                enter(Stop, None)
            } else {
                Transition::Stay
            }
        }
        TurretModeReload => {
            if inputs.animation_done {
                enter(TurretModeLoad, None)
            } else {
                Transition::Stay
            }
        }
        TurretModeUnload => {
            if inputs.animation_done {
                enter(Stop, None)
            } else {
                Transition::Stay
            }
        }
        Stop => Transition::Stay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(elapsed_secs: f32, band: RangeBand) -> TurretInputs {
        TurretInputs {
            elapsed_secs,
            target: TargetStatus::Valid,
            band,
            animation_done: true,
        }
    }

    #[test]
    fn idle_picks_animation_by_band() {
        assert_eq!(
            next_transition(TurretState::Idle, &inputs(0.0, RangeBand::Firing)),
            enter(TurretState::TurretMode, Some(ANIM_LOAD))
        );
        assert_eq!(
            next_transition(TurretState::Idle, &inputs(0.0, RangeBand::Sensing)),
            enter(TurretState::TurretMode, Some(ANIM_TURRET))
        );
        assert_eq!(
            next_transition(TurretState::Idle, &inputs(0.0, RangeBand::Abort)),
            Transition::Abort
        );
    }

    #[test]
    fn hold_fires_at_exactly_one_and_a_quarter_seconds() {
        let held = inputs(1.25, RangeBand::Firing);
        assert_eq!(next_transition(TurretState::TurretModeHold, &held), Transition::Fire);

        let early = inputs(1.2, RangeBand::Firing);
        assert_eq!(next_transition(TurretState::TurretModeHold, &early), Transition::Stay);
    }

    #[test]
    fn hold_unloads_after_two_seconds_out_of_range() {
        let waiting = inputs(1.9, RangeBand::Sensing);
        assert_eq!(next_transition(TurretState::TurretModeHold, &waiting), Transition::Stay);

        let expired = inputs(2.0, RangeBand::Sensing);
        assert_eq!(
            next_transition(TurretState::TurretModeHold, &expired),
            enter(TurretState::TurretModeUnload, Some(ANIM_UNLOAD))
        );
    }

    #[test]
    fn hold_never_fires_at_a_lost_target() {
        let mut dead = inputs(1.5, RangeBand::Firing);
        dead.target = TargetStatus::Lost;
        assert_eq!(next_transition(TurretState::TurretModeHold, &dead), Transition::Stay);

        dead.elapsed_secs = 2.0;
        assert_eq!(
            next_transition(TurretState::TurretModeHold, &dead),
            enter(TurretState::TurretModeUnload, Some(ANIM_UNLOAD))
        );
    }

    #[test]
    fn lost_target_after_firing_aborts() {
        let mut dead = inputs(0.1, RangeBand::Firing);
        dead.target = TargetStatus::Lost;
        assert_eq!(next_transition(TurretState::TurretModeFired, &dead), Transition::Abort);
    }

    #[test]
    fn fired_reloads_once_fire_animation_ends() {
        let mut playing = inputs(0.3, RangeBand::Sensing);
        playing.animation_done = false;
        assert_eq!(next_transition(TurretState::TurretModeFired, &playing), Transition::Stay);

        playing.animation_done = true;
        assert_eq!(
            next_transition(TurretState::TurretModeFired, &playing),
            enter(TurretState::TurretModeReload, Some(ANIM_RELOAD))
        );
        assert_eq!(
            next_transition(TurretState::TurretModeReload, &playing),
            enter(TurretState::TurretModeLoad, None)
        );
        // Re-armed by the reload itself.
        assert_eq!(
            next_transition(TurretState::TurretModeLoad, &inputs(0.0, RangeBand::Firing)),
            enter(TurretState::TurretModeHold, Some(ANIM_HOLD))
        );
    }

    #[test]
    fn turret_mode_times_out() {
        let mut stuck = inputs(5.1, RangeBand::Sensing);
        stuck.animation_done = false;
        assert_eq!(
            next_transition(TurretState::TurretMode, &stuck),
            enter(TurretState::Stop, None)
        );
    }

    #[test]
    fn turret_mode_aborts_when_target_closes_in() {
        assert_eq!(
            next_transition(TurretState::TurretMode, &inputs(1.0, RangeBand::Abort)),
            Transition::Abort
        );
        assert_eq!(
            next_transition(TurretState::TurretMode, &inputs(1.0, RangeBand::Firing)),
            enter(TurretState::TurretModeLoad, Some(ANIM_LOAD_FROM_POSE))
        );
    }

    #[test]
    fn bands_check_abort_first() {
        assert_eq!(RangeBand::classify(2.0, 3.0, 1.0, 10.0, 20.0), RangeBand::Abort);
        assert_eq!(RangeBand::classify(5.0, 3.0, 1.0, 10.0, 20.0), RangeBand::Firing);
        assert_eq!(RangeBand::classify(15.0, 3.0, 1.0, 10.0, 20.0), RangeBand::Sensing);
        assert_eq!(RangeBand::classify(25.0, 3.0, 1.0, 10.0, 20.0), RangeBand::Outside);
    }
}
