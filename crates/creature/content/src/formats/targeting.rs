use creature_core::{
    ConfigError, HerdFilter, PlayerHostility, SearchType, TagRule, TargetingConfig,
    TargetingConfigBuilder,
};
use serde::{Deserialize, Serialize};

/// Target search and filter settings of a behavior file entry.
///
/// Tag rules are written as a list of groups, each group a list of tags.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetingSpec {
    pub seeking_range: Option<f32>,
    pub target_weight: Option<(f32, f32)>,
    #[serde(default)]
    pub entity_tags: Vec<Vec<String>>,
    #[serde(default)]
    pub skip_entity_tags: Vec<Vec<String>>,
    #[serde(default)]
    pub reverse_tag_logic: bool,
    #[serde(default)]
    pub entity_codes: Vec<String>,
    #[serde(default)]
    pub skip_entity_codes: Vec<String>,
    pub herd: Option<HerdFilter>,
    pub light_curve: Option<[f32; 4]>,
    pub player_hostility: Option<PlayerHostility>,
    #[serde(default)]
    pub hostile_emotion_states: Vec<String>,
    #[serde(default)]
    pub target_dead: bool,
    #[serde(default)]
    pub target_non_interactable: bool,
    #[serde(default)]
    pub target_creative_players: bool,
    pub sneak_range_factor: Option<f32>,
    /// Window in milliseconds; enables retaliation.
    pub retaliate: Option<u64>,
    pub search_type: Option<SearchType>,
}

impl TargetingSpec {
    pub const DEFAULT_SEEKING_RANGE: f32 = 16.0;

    /// Validates the settings for the task `code`.
    ///
    /// # Errors
    ///
    /// Propagates the builder's [`ConfigError`].
    pub fn into_config(self, code: &str) -> Result<TargetingConfig, ConfigError> {
        let mut builder: TargetingConfigBuilder = TargetingConfig::builder(
            self.seeking_range.unwrap_or(Self::DEFAULT_SEEKING_RANGE),
        );
        if let Some((min, max)) = self.target_weight {
            builder = builder.target_weight(min, max);
        }
        if !self.entity_tags.is_empty() {
            builder = builder.entity_tags(TagRule::new(self.entity_tags));
        }
        if !self.skip_entity_tags.is_empty() {
            builder = builder.skip_entity_tags(TagRule::new(self.skip_entity_tags));
        }
        builder = builder.reverse_tag_logic(self.reverse_tag_logic);
        for pattern in &self.entity_codes {
            builder = builder.entity_code(pattern);
        }
        for pattern in &self.skip_entity_codes {
            builder = builder.skip_entity_code(pattern);
        }
        if let Some(herd) = self.herd {
            builder = builder.herd(herd);
        }
        if let Some(curve) = self.light_curve {
            builder = builder.light_curve(curve);
        }
        if let Some(hostility) = self.player_hostility {
            builder = builder.player_hostility(hostility);
        }
        if !self.hostile_emotion_states.is_empty() {
            builder = builder.hostile_emotion_states(self.hostile_emotion_states);
        }
        builder = builder
            .target_dead(self.target_dead)
            .target_non_interactable(self.target_non_interactable)
            .target_creative_players(self.target_creative_players);
        if let Some(factor) = self.sneak_range_factor {
            builder = builder.sneak_range_factor(factor);
        }
        if let Some(window) = self.retaliate {
            builder = builder.retaliate(window);
        }
        if let Some(search) = self.search_type {
            builder = builder.search_type(search);
        }
        builder.build(code)
    }
}
