use crate::task::SenseView;
use crate::types::EntityView;

use super::sense::can_sense;
use super::tags::tags_match;
use super::{HerdFilter, TargetingConfig};

/// Whether `candidate` is an acceptable target for `owner` within `range`.
///
/// Dead entities and herd mismatches are rejected first. Without tag,
/// weight or code filters every sensed entity is targetable. Otherwise the
/// candidate must pass the weight and tag filters, or be admitted by an
/// entity-code exception, and then be sensed.
pub fn is_targetable(
    config: &TargetingConfig,
    owner: &EntityView,
    candidate: &EntityView,
    range: f32,
    view: &SenseView<'_>,
) -> bool {
    if !candidate.alive && !config.target_dead {
        return false;
    }
    if !herd_allows(config.herd, owner, candidate) {
        return false;
    }
    if !config.has_filters() {
        return can_sense(config, owner, candidate, range, view);
    }

    let filtered = (config.tags_configured() || config.weight_configured())
        && weight_allows(config, owner, candidate)
        && tags_match(
            &config.entity_tags,
            &config.skip_entity_tags,
            config.reverse_tag_logic,
            &candidate.tags,
        );
    let excepted = config
        .entity_codes
        .iter()
        .any(|pattern| pattern.matches(&candidate.code));

    (filtered || excepted) && can_sense(config, owner, candidate, range, view)
}

fn herd_allows(filter: HerdFilter, owner: &EntityView, candidate: &EntityView) -> bool {
    if owner.herd_id == 0 {
        return true;
    }
    match filter {
        HerdFilter::Any => true,
        HerdFilter::SameHerd => candidate.herd_id == owner.herd_id,
        HerdFilter::DifferentHerd => candidate.herd_id != owner.herd_id,
    }
}

/// Candidate weight as a fraction of the owner's weight.
pub fn weight_fraction(owner: &EntityView, candidate: &EntityView) -> f32 {
    candidate.weight / owner.weight.max(f32::EPSILON)
}

fn weight_allows(config: &TargetingConfig, owner: &EntityView, candidate: &EntityView) -> bool {
    config
        .target_weight
        .is_none_or(|window| window.contains(weight_fraction(owner, candidate)))
}
