use tracing::debug;

use crate::env::{AnimationRequest, SoundRequest, TaskRng};
use crate::preconditions::{self, PreconditionFailure, Stages};
use crate::types::WorldTime;

use super::{Cooldown, TaskConfig, TaskContext};

/// State and side effects shared by every task kind.
///
/// Concrete tasks embed a `TaskBase` and delegate to it from their
/// lifecycle methods: [`Self::should_start`] runs the precondition pipeline,
/// [`Self::start`] applies tags and starts the bound animation,
/// [`Self::update`] drives the sound schedule and the duration cap, and
/// [`Self::finish`] arms the next cooldown and undoes the side effects.
#[derive(Clone, Debug)]
pub struct TaskBase {
    config: TaskConfig,
    cooldown: Cooldown,
    active: bool,
    started_at_ms: u64,
    duration_deadline_ms: Option<u64>,
    /// Tags this task added to the owner. Tags already present at start are
    /// not tracked, so finishing never strips a tag someone else applied.
    applied_tags: Vec<String>,
    next_sound_ms: Option<u64>,
    last_sound_ms: Option<u64>,
    last_failure: Option<PreconditionFailure>,
}

impl TaskBase {
    pub fn new(config: TaskConfig) -> Self {
        Self {
            config,
            cooldown: Cooldown::default(),
            active: false,
            started_at_ms: 0,
            duration_deadline_ms: None,
            applied_tags: Vec::new(),
            next_sound_ms: None,
            last_sound_ms: None,
            last_failure: None,
        }
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    pub fn code(&self) -> &str {
        &self.config.code
    }

    pub fn cooldown(&self) -> &Cooldown {
        &self.cooldown
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn started_at_ms(&self) -> u64 {
        self.started_at_ms
    }

    pub fn applied_tags(&self) -> &[String] {
        &self.applied_tags
    }

    pub fn last_sound_ms(&self) -> Option<u64> {
        self.last_sound_ms
    }

    /// Gate that failed on the most recent evaluation, if any.
    pub fn last_failure(&self) -> Option<PreconditionFailure> {
        self.last_failure
    }

    /// Applies the configured initial cooldown. Called once by the manager
    /// builder.
    pub fn arm_initial_cooldown(&mut self, time: &WorldTime, rng: &mut TaskRng) {
        self.cooldown
            .delay_ms(time, self.config.initial_cooldown_ms, rng);
    }

    /// Runs the full precondition pipeline.
    pub fn should_start(&mut self, ctx: &mut TaskContext<'_, '_>) -> bool {
        self.should_start_with(ctx, Stages::all())
    }

    /// Runs the selected stages of the precondition pipeline, in order.
    pub fn should_start_with(&mut self, ctx: &mut TaskContext<'_, '_>, stages: Stages) -> bool {
        match preconditions::evaluate(&self.config, &self.cooldown, ctx, stages) {
            Ok(()) => {
                self.last_failure = None;
                true
            }
            Err(failure) => {
                if self.last_failure != Some(failure) {
                    debug!(
                        entity = %ctx.owner(),
                        task = %self.config.code,
                        gate = <&'static str>::from(failure),
                        "precondition failed"
                    );
                }
                self.last_failure = Some(failure);
                false
            }
        }
    }

    pub fn start(&mut self, ctx: &mut TaskContext<'_, '_>) {
        debug_assert!(!self.active, "task '{}' started twice", self.config.code);

        let now = ctx.now_ms();
        self.active = true;
        self.started_at_ms = now;
        self.duration_deadline_ms = match self.config.duration_ms {
            Some(span) => Some(now + ctx.rng().range_u64(span.min, span.max)),
            None => None,
        };

        let owner = ctx.owner();
        let present = ctx.owner_view().map(|view| view.tags.clone()).unwrap_or_default();
        self.applied_tags.clear();
        for tag in &self.config.tags {
            if !present.contains(tag) && !self.applied_tags.contains(tag) {
                ctx.commands().add_tag(owner, tag);
                self.applied_tags.push(tag.clone());
            }
        }

        if let Some(animation) = &self.config.animation {
            ctx.animations()
                .start(AnimationRequest::new(animation.code.clone()).with_speed(animation.speed));
        }

        self.next_sound_ms = self.config.sound.as_ref().map(|sound| now + sound.delay_ms);
    }

    /// Per-tick bookkeeping. Returns `false` once the duration cap elapsed.
    pub fn update(&mut self, ctx: &mut TaskContext<'_, '_>) -> bool {
        let now = ctx.now_ms();
        self.play_due_sound(ctx, now);
        match self.duration_deadline_ms {
            Some(deadline) => now < deadline,
            None => true,
        }
    }

    pub fn finish(&mut self, ctx: &mut TaskContext<'_, '_>) {
        if !self.active {
            return;
        }
        self.active = false;
        self.duration_deadline_ms = None;
        self.next_sound_ms = None;

        let time = *ctx.time();
        self.cooldown.arm(
            &time,
            self.config.cooldown_ms,
            self.config.cooldown_hours,
            ctx.rng(),
        );

        if let Some(animation) = &self.config.animation {
            ctx.animations().stop(&animation.code);
        }

        let owner = ctx.owner();
        for tag in self.applied_tags.drain(..) {
            ctx.commands().remove_tag(owner, &tag);
        }
    }

    fn play_due_sound(&mut self, ctx: &mut TaskContext<'_, '_>, now: u64) {
        let (Some(sound), Some(due)) = (&self.config.sound, self.next_sound_ms) else {
            return;
        };
        if now < due {
            return;
        }
        self.next_sound_ms = sound.repeat_ms.map(|repeat| now + repeat.max(1));
        if !ctx.rng().chance(sound.chance) {
            return;
        }
        let Some(position) = ctx.owner_view().map(|view| view.position) else {
            return;
        };
        ctx.sounds().play(SoundRequest {
            asset: sound.asset.clone(),
            position,
            range: sound.range,
            volume: sound.volume,
            pitch: sound.pitch,
        });
        self.last_sound_ms = Some(now);
    }
}
