use crate::types::Vec3;

/// Parameters of a movement request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveRequest {
    pub target: Vec3,
    /// Movement speed in blocks per second.
    pub speed: f32,
    /// Distance to the target at which the goal counts as reached.
    pub tolerance: f32,
}

impl MoveRequest {
    pub const fn new(target: Vec3, speed: f32, tolerance: f32) -> Self {
        Self {
            target,
            speed,
            tolerance,
        }
    }
}

/// Progress of the current movement request.
///
/// Tasks poll this instead of registering goal/stuck callbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum PathStatus {
    /// No movement requested.
    Idle,
    /// Walking (or, for asynchronous traversers, waiting for a path).
    Moving,
    /// Within tolerance of the target.
    ReachedGoal,
    /// No progress possible; the request was abandoned.
    Stuck,
}

impl PathStatus {
    /// True once the request ended, successfully or not.
    pub const fn is_finished(self) -> bool {
        matches!(self, PathStatus::ReachedGoal | PathStatus::Stuck | PathStatus::Idle)
    }
}

/// The entity's movement controller. Pathfinding internals are opaque.
pub trait PathTraverser {
    /// Walks in a straight line toward the target. Returns `false` when the
    /// request is rejected outright.
    fn walk_towards(&mut self, request: MoveRequest) -> bool;

    /// Requests a computed path to the target. Asynchronous implementations
    /// report `is_ready() == false` until the path is available; tasks must
    /// not assume the path exists on the tick it was requested.
    fn navigate_to(&mut self, request: MoveRequest) -> bool;

    /// Abandons the current request.
    fn stop(&mut self);

    /// Moves the current request's target without restarting it.
    fn retarget(&mut self, target: Vec3);

    /// A request is in progress.
    fn is_active(&self) -> bool;

    /// The traverser can accept or is executing a request. False while an
    /// asynchronous path search is pending.
    fn is_ready(&self) -> bool;

    fn status(&self) -> PathStatus;

    fn current_target(&self) -> Option<Vec3>;
}
