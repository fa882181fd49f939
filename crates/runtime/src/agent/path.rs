use creature_core::{MoveRequest, PathStatus, PathTraverser, Vec3};

use crate::oracle::Environment;

/// Straight-line traverser.
///
/// `navigate_to` models an asynchronous path search: the request is pending
/// (not ready) for one world step before the walk begins. Movement itself
/// happens in [`LinePath::step`], called by the world after every agent has
/// ticked; the traverser stops as `Stuck` when its next step would enter
/// solid matter.
#[derive(Clone, Debug, PartialEq)]
pub struct LinePath {
    request: Option<MoveRequest>,
    status: PathStatus,
    pending: bool,
}

impl LinePath {
    pub fn new() -> Self {
        Self {
            request: None,
            status: PathStatus::Idle,
            pending: false,
        }
    }

    fn accept(&mut self, request: MoveRequest) -> bool {
        let valid = request.speed > 0.0
            && request.speed.is_finite()
            && request.tolerance >= 0.0
            && request.target.x.is_finite()
            && request.target.y.is_finite()
            && request.target.z.is_finite();
        if !valid {
            return false;
        }
        self.request = Some(request);
        self.status = PathStatus::Moving;
        true
    }

    /// Advances the owner by one step and returns its new position.
    pub fn step(&mut self, position: Vec3, dt: f32, environment: &Environment) -> Vec3 {
        if self.pending {
            self.pending = false;
            return position;
        }
        let Some(request) = self.request else {
            return position;
        };
        if self.status != PathStatus::Moving {
            return position;
        }
        let remaining = position.distance(request.target);
        if remaining <= request.tolerance {
            self.status = PathStatus::ReachedGoal;
            return position;
        }
        let travel = (request.speed * dt).min(remaining);
        let next = position + (request.target - position).normalize() * travel;
        if environment.is_solid(next) {
            self.status = PathStatus::Stuck;
            return position;
        }
        if next.distance(request.target) <= request.tolerance {
            self.status = PathStatus::ReachedGoal;
        }
        next
    }
}

impl Default for LinePath {
    fn default() -> Self {
        Self::new()
    }
}

impl PathTraverser for LinePath {
    fn walk_towards(&mut self, request: MoveRequest) -> bool {
        self.pending = false;
        self.accept(request)
    }

    fn navigate_to(&mut self, request: MoveRequest) -> bool {
        let accepted = self.accept(request);
        self.pending = accepted;
        accepted
    }

    fn stop(&mut self) {
        self.request = None;
        self.pending = false;
        self.status = PathStatus::Idle;
    }

    fn retarget(&mut self, target: Vec3) {
        if let Some(request) = self.request.as_mut() {
            request.target = target;
        }
    }

    fn is_active(&self) -> bool {
        self.status == PathStatus::Moving
    }

    fn is_ready(&self) -> bool {
        !self.pending
    }

    fn status(&self) -> PathStatus {
        self.status
    }

    fn current_target(&self) -> Option<Vec3> {
        self.request.map(|request| request.target)
    }
}
