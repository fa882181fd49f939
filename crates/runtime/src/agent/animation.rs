use std::collections::BTreeMap;
use std::sync::Arc;

use creature_core::{AnimationOracle, AnimationRequest};

/// Playback length of every known animation, at speed 1.
pub type AnimationCatalog = Arc<BTreeMap<String, u64>>;

#[derive(Clone, Debug, PartialEq)]
struct Playing {
    code: String,
    elapsed_ms: f32,
    length_ms: f32,
}

/// Per-entity animation player.
///
/// Animations missing from the catalog play for
/// [`AnimationPlayer::DEFAULT_LENGTH_MS`]. Stopping an animation does not
/// report it as finished; only natural completion does.
#[derive(Clone, Debug)]
pub struct AnimationPlayer {
    catalog: AnimationCatalog,
    playing: Vec<Playing>,
}

impl AnimationPlayer {
    pub const DEFAULT_LENGTH_MS: u64 = 1_000;

    pub fn new(catalog: AnimationCatalog) -> Self {
        Self {
            catalog,
            playing: Vec::new(),
        }
    }

    /// Advances playback and returns the codes that completed.
    pub fn step(&mut self, dt_ms: u64) -> Vec<String> {
        let mut finished = Vec::new();
        self.playing.retain_mut(|anim| {
            anim.elapsed_ms += dt_ms as f32;
            if anim.elapsed_ms >= anim.length_ms {
                finished.push(anim.code.clone());
                false
            } else {
                true
            }
        });
        finished
    }

    pub fn playing(&self) -> impl Iterator<Item = &str> {
        self.playing.iter().map(|anim| anim.code.as_str())
    }
}

impl AnimationOracle for AnimationPlayer {
    fn start(&mut self, request: AnimationRequest) {
        let base = self
            .catalog
            .get(&request.code)
            .copied()
            .unwrap_or(Self::DEFAULT_LENGTH_MS) as f32;
        let length_ms = if request.speed > 0.0 {
            base / request.speed
        } else {
            base
        };
        self.playing.retain(|anim| anim.code != request.code);
        self.playing.push(Playing {
            code: request.code,
            elapsed_ms: 0.0,
            length_ms,
        });
    }

    fn stop(&mut self, code: &str) {
        self.playing.retain(|anim| anim.code != code);
    }

    fn is_running(&self, code: &str) -> bool {
        self.playing.iter().any(|anim| anim.code == code)
    }

    fn progress(&self, code: &str) -> Option<f32> {
        self.playing
            .iter()
            .find(|anim| anim.code == code)
            .map(|anim| (anim.elapsed_ms / anim.length_ms.max(1.0)).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> AnimationPlayer {
        let catalog = BTreeMap::from([("shoot".to_owned(), 800)]);
        AnimationPlayer::new(Arc::new(catalog))
    }

    #[test]
    fn completes_after_catalog_length() {
        let mut player = player();
        player.start(AnimationRequest::new("shoot"));
        assert!(player.step(500).is_empty());
        assert_eq!(player.progress("shoot"), Some(0.625));
        assert_eq!(player.step(300), vec!["shoot".to_owned()]);
        assert!(!player.is_running("shoot"));
    }

    #[test]
    fn speed_shortens_playback_and_unknown_codes_use_default() {
        let mut player = player();
        player.start(AnimationRequest::new("shoot").with_speed(2.0));
        player.start(AnimationRequest::new("idle"));
        assert_eq!(player.step(400), vec!["shoot".to_owned()]);
        assert_eq!(player.step(600), vec!["idle".to_owned()]);
    }

    #[test]
    fn stopped_animation_is_not_reported() {
        let mut player = player();
        player.start(AnimationRequest::new("shoot"));
        player.stop("shoot");
        assert!(player.step(1000).is_empty());
    }
}
