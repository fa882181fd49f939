use crate::types::Vec3;

/// Request to play an animation on the owning entity.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationRequest {
    pub code: String,
    pub speed: f32,
}

impl AnimationRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            speed: 1.0,
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }
}

/// Animation player of the owning entity.
///
/// Completion is also signalled to the task manager through
/// [`crate::TaskManager::on_animation_stopped`], but tasks must tolerate the
/// two sources disagreeing by a tick.
pub trait AnimationOracle {
    fn start(&mut self, request: AnimationRequest);

    fn stop(&mut self, code: &str);

    fn is_running(&self, code: &str) -> bool;

    /// Playback progress in `[0, 1]`, `None` when not running.
    fn progress(&self, code: &str) -> Option<f32>;
}

/// A one-shot sound to play in the world.
#[derive(Clone, Debug, PartialEq)]
pub struct SoundRequest {
    pub asset: String,
    pub position: Vec3,
    pub range: f32,
    pub volume: f32,
    pub pitch: f32,
}

/// Sound playback service. Delivery over the network is the host's concern.
pub trait SoundOracle {
    fn play(&mut self, request: SoundRequest);
}
