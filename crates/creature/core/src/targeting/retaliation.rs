use crate::task::SenseView;
use crate::types::{EntityId, EntityView};

use super::TargetingConfig;
use super::sense::can_sense;

/// The entity that most recently damaged `owner`, if it still qualifies as
/// a retaliation target.
///
/// The attack must lie within the configured window and the attacker must be
/// alive, interactable, not tolerated by the owner and sensed within
/// `range`.
pub fn retaliation_target(
    config: &TargetingConfig,
    owner: &EntityView,
    range: f32,
    view: &SenseView<'_>,
) -> Option<EntityId> {
    if !config.retaliate {
        return None;
    }
    let attack = owner.last_attack?;
    if view.now_ms.saturating_sub(attack.at_ms) >= config.retaliation_window_ms {
        return None;
    }
    let attacker = view.entities.entity(attack.source)?;
    can_pursue(config, owner, attacker, range, view).then_some(attacker.id)
}

/// Looser check for targets that did not come from a search: alive,
/// interactable, not tolerated and sensed within `range`. Kind filters
/// (tags, weight, entity codes) are skipped.
pub fn can_pursue(
    config: &TargetingConfig,
    owner: &EntityView,
    candidate: &EntityView,
    range: f32,
    view: &SenseView<'_>,
) -> bool {
    candidate.alive
        && candidate.interactable
        && !view.entities.tolerates_damage_from(owner.id, candidate.id)
        && can_sense(config, owner, candidate, range, view)
}
