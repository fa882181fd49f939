use crate::task::SenseView;
use crate::types::{EntityFlags, EntityView};

use super::{PlayerHostility, TargetingConfig};

/// Whether `owner` can perceive `candidate` within `range`.
///
/// Checks run in order: self, interactability, skip codes, then the player
/// rules (hostility policy, game mode, detection multiplier) and finally the
/// straight-line distance.
pub fn can_sense(
    config: &TargetingConfig,
    owner: &EntityView,
    candidate: &EntityView,
    range: f32,
    view: &SenseView<'_>,
) -> bool {
    if candidate.id == owner.id {
        return false;
    }
    if !candidate.interactable && !config.target_non_interactable {
        return false;
    }
    if config
        .skip_entity_codes
        .iter()
        .any(|pattern| pattern.matches(&candidate.code))
    {
        return false;
    }

    let multiplier = match &candidate.player {
        None => 1.0,
        Some(player) => {
            if !hostility_allows(config, view) {
                return false;
            }
            if player.game_mode.is_exempt() && !config.target_creative_players {
                return false;
            }
            detection_multiplier(config, candidate, player.seeking_range_multiplier, view)
        }
    };
    if multiplier <= 0.0 {
        return false;
    }

    owner.position.distance(candidate.position) <= range * multiplier
}

fn hostility_allows(config: &TargetingConfig, view: &SenseView<'_>) -> bool {
    match config.player_hostility {
        PlayerHostility::Always => true,
        PlayerHostility::Never => false,
        PlayerHostility::IfHostile => config
            .hostile_emotion_states
            .iter()
            .any(|state| view.emotions.is_in_state(state)),
    }
}

/// Light curve at the candidate, sneak reduction and the player's stat
/// multiplier, composed.
pub fn detection_multiplier(
    config: &TargetingConfig,
    candidate: &EntityView,
    stat_multiplier: f32,
    view: &SenseView<'_>,
) -> f32 {
    let light = match &config.light_curve {
        Some(curve) => {
            curve.multiplier(f32::from(view.environment.light_level(candidate.position)))
        }
        None => 1.0,
    };
    let sneaking = candidate
        .flags
        .contains(EntityFlags::SNEAKING | EntityFlags::ON_GROUND);
    let sneak = if sneaking { config.sneak_range_factor } else { 1.0 };
    light * sneak * stat_multiplier
}
