use crate::env::SearchType;
use crate::error::{ConfigError, ErrorContext};
use crate::task::Span;

use super::light::LightCurve;
use super::tags::TagRule;

/// Entity-code pattern: an exact code, or a prefix when written with a
/// trailing `*` (`wolf-*`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CodePattern {
    Exact(String),
    Prefix(String),
}

impl CodePattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix('*') {
            Some(prefix) => CodePattern::Prefix(prefix.to_owned()),
            None => CodePattern::Exact(pattern.to_owned()),
        }
    }

    pub fn matches(&self, code: &str) -> bool {
        match self {
            CodePattern::Exact(exact) => exact == code,
            CodePattern::Prefix(prefix) => code.starts_with(prefix.as_str()),
        }
    }
}

impl From<&str> for CodePattern {
    fn from(pattern: &str) -> Self {
        Self::parse(pattern)
    }
}

/// Herd relationship a candidate must have with the owner. Only applied when
/// the owner belongs to a herd.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum HerdFilter {
    #[default]
    Any,
    SameHerd,
    DifferentHerd,
}

/// Whether players may be sensed at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PlayerHostility {
    #[default]
    Always,
    /// Only while the owner is in one of the hostile emotion states.
    IfHostile,
    Never,
}

/// Immutable search and filter settings of a targeting task.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct TargetingConfig {
    /// Base search radius in blocks, before fear reduction.
    pub seeking_range: f32,
    /// Accepted candidate weight as a fraction of the owner's weight.
    pub target_weight: Option<Span<f32>>,
    pub entity_tags: TagRule,
    pub skip_entity_tags: TagRule,
    /// Switches tag matching from "all tags of any group" to "any tag of
    /// every group".
    pub reverse_tag_logic: bool,
    /// Codes admitted regardless of tag and weight filters.
    pub entity_codes: Vec<CodePattern>,
    /// Codes never sensed.
    pub skip_entity_codes: Vec<CodePattern>,
    pub herd: HerdFilter,
    pub light_curve: Option<LightCurve>,
    pub player_hostility: PlayerHostility,
    pub hostile_emotion_states: Vec<String>,
    pub target_dead: bool,
    pub target_non_interactable: bool,
    pub target_creative_players: bool,
    /// Range multiplier against players sneaking on the ground.
    pub sneak_range_factor: f32,
    /// Prefer the most recent attacker as target.
    pub retaliate: bool,
    pub retaliation_window_ms: u64,
    pub search_type: SearchType,
}

impl TargetingConfig {
    pub const DEFAULT_SNEAK_RANGE_FACTOR: f32 = 0.6;
    pub const DEFAULT_RETALIATION_WINDOW_MS: u64 = 5_000;

    pub fn builder(seeking_range: f32) -> TargetingConfigBuilder {
        TargetingConfigBuilder::new(seeking_range)
    }

    pub fn weight_configured(&self) -> bool {
        self.target_weight.is_some()
    }

    pub fn tags_configured(&self) -> bool {
        !self.entity_tags.is_empty() || !self.skip_entity_tags.is_empty()
    }

    /// Whether any tag, weight or code filter narrows the candidates.
    pub fn has_filters(&self) -> bool {
        self.tags_configured() || self.weight_configured() || !self.entity_codes.is_empty()
    }
}

impl Default for TargetingConfig {
    fn default() -> Self {
        Self {
            seeking_range: 16.0,
            target_weight: None,
            entity_tags: TagRule::default(),
            skip_entity_tags: TagRule::default(),
            reverse_tag_logic: false,
            entity_codes: Vec::new(),
            skip_entity_codes: Vec::new(),
            herd: HerdFilter::Any,
            light_curve: None,
            player_hostility: PlayerHostility::Always,
            hostile_emotion_states: vec![
                "aggressiveondamage".to_owned(),
                "aggressivearoundentities".to_owned(),
            ],
            target_dead: false,
            target_non_interactable: false,
            target_creative_players: false,
            sneak_range_factor: Self::DEFAULT_SNEAK_RANGE_FACTOR,
            retaliate: false,
            retaliation_window_ms: Self::DEFAULT_RETALIATION_WINDOW_MS,
            search_type: SearchType::Creatures,
        }
    }
}

/// Builder for [`TargetingConfig`].
#[derive(Clone, Debug)]
pub struct TargetingConfigBuilder {
    config: TargetingConfig,
    light_breakpoints: Option<[f32; 4]>,
}

impl TargetingConfigBuilder {
    pub fn new(seeking_range: f32) -> Self {
        Self {
            config: TargetingConfig {
                seeking_range,
                ..TargetingConfig::default()
            },
            light_breakpoints: None,
        }
    }

    pub fn target_weight(mut self, min: f32, max: f32) -> Self {
        self.config.target_weight = Some(Span::new(min, max));
        self
    }

    pub fn entity_tags(mut self, rule: TagRule) -> Self {
        self.config.entity_tags = rule;
        self
    }

    pub fn skip_entity_tags(mut self, rule: TagRule) -> Self {
        self.config.skip_entity_tags = rule;
        self
    }

    pub fn reverse_tag_logic(mut self, reverse: bool) -> Self {
        self.config.reverse_tag_logic = reverse;
        self
    }

    pub fn entity_code(mut self, pattern: &str) -> Self {
        self.config.entity_codes.push(CodePattern::parse(pattern));
        self
    }

    pub fn skip_entity_code(mut self, pattern: &str) -> Self {
        self.config.skip_entity_codes.push(CodePattern::parse(pattern));
        self
    }

    pub fn herd(mut self, filter: HerdFilter) -> Self {
        self.config.herd = filter;
        self
    }

    pub fn light_curve(mut self, breakpoints: [f32; 4]) -> Self {
        self.light_breakpoints = Some(breakpoints);
        self
    }

    pub fn player_hostility(mut self, hostility: PlayerHostility) -> Self {
        self.config.player_hostility = hostility;
        self
    }

    pub fn hostile_emotion_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.hostile_emotion_states = states.into_iter().map(Into::into).collect();
        self
    }

    pub fn target_dead(mut self, allow: bool) -> Self {
        self.config.target_dead = allow;
        self
    }

    pub fn target_non_interactable(mut self, allow: bool) -> Self {
        self.config.target_non_interactable = allow;
        self
    }

    pub fn target_creative_players(mut self, allow: bool) -> Self {
        self.config.target_creative_players = allow;
        self
    }

    pub fn sneak_range_factor(mut self, factor: f32) -> Self {
        self.config.sneak_range_factor = factor;
        self
    }

    pub fn retaliate(mut self, window_ms: u64) -> Self {
        self.config.retaliate = true;
        self.config.retaliation_window_ms = window_ms;
        self
    }

    pub fn search_type(mut self, search: SearchType) -> Self {
        self.config.search_type = search;
        self
    }

    /// Validates and freezes the configuration. `task` names the owning task
    /// in errors.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a non-positive seeking range, an
    /// inverted or negative weight window, light breakpoints that decrease,
    /// or a sneak factor outside `[0, 1]`.
    pub fn build(mut self, task: &str) -> Result<TargetingConfig, ConfigError> {
        let config = &self.config;
        if !(config.seeking_range.is_finite() && config.seeking_range > 0.0) {
            return Err(ConfigError::value(
                "seeking_range",
                format!("must be positive, got {}", config.seeking_range),
                task,
            ));
        }
        if let Some(weight) = config.target_weight {
            if !weight.is_ordered() || weight.min < 0.0 {
                return Err(ConfigError::range(
                    "target_weight",
                    f64::from(weight.min),
                    f64::from(weight.max),
                    task,
                ));
            }
        }
        if !(0.0..=1.0).contains(&config.sneak_range_factor) {
            return Err(ConfigError::value(
                "sneak_range_factor",
                "must be within [0, 1]",
                task,
            ));
        }
        if let Some(breakpoints) = self.light_breakpoints {
            let curve = LightCurve::new(breakpoints).ok_or_else(|| ConfigError::NotNonDecreasing {
                field: "light_curve",
                context: ErrorContext::task(task),
            })?;
            self.config.light_curve = Some(curve);
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_codes_match_prefix() {
        let pattern = CodePattern::parse("wolf-*");
        assert!(pattern.matches("wolf-male"));
        assert!(pattern.matches("wolf-"));
        assert!(!pattern.matches("fox-male"));

        let exact = CodePattern::parse("sheep");
        assert!(exact.matches("sheep"));
        assert!(!exact.matches("sheep-ram"));
    }

    #[test]
    fn rejects_decreasing_light_curve() {
        let err = TargetingConfig::builder(10.0)
            .light_curve([0.0, 8.0, 4.0, 12.0])
            .build("seekentity")
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotNonDecreasing { field: "light_curve", .. }));
    }

    #[test]
    fn filters_are_detected() {
        let plain = TargetingConfig::builder(10.0).build("fleeentity").unwrap();
        assert!(!plain.has_filters());

        let weighted = TargetingConfig::builder(10.0)
            .target_weight(0.3, 0.8)
            .build("meleeattack")
            .unwrap();
        assert!(weighted.has_filters());
        assert!(TargetingConfig::builder(0.0).build("fleeentity").is_err());
    }
}
