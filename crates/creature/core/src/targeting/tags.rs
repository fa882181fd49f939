use std::collections::BTreeSet;

/// Grouped tag expression.
///
/// How groups combine depends on the reverse flag of the owning config, see
/// [`tags_match`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TagRule {
    groups: Vec<Vec<String>>,
}

impl TagRule {
    pub fn new<G, T>(groups: impl IntoIterator<Item = G>) -> Self
    where
        G: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let groups = groups
            .into_iter()
            .map(|group| group.into_iter().map(Into::into).collect::<Vec<String>>())
            .filter(|group| !group.is_empty())
            .collect();
        Self { groups }
    }

    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The candidate has every tag of at least one group.
    pub fn all_of_any_group(&self, tags: &BTreeSet<String>) -> bool {
        self.groups
            .iter()
            .any(|group| group.iter().all(|tag| tags.contains(tag)))
    }

    /// The candidate has at least one tag of every group.
    pub fn any_of_every_group(&self, tags: &BTreeSet<String>) -> bool {
        self.groups
            .iter()
            .all(|group| group.iter().any(|tag| tags.contains(tag)))
    }

    fn matches(&self, tags: &BTreeSet<String>, reverse: bool) -> bool {
        if reverse {
            self.any_of_every_group(tags)
        } else {
            self.all_of_any_group(tags)
        }
    }
}

/// Evaluates the inclusion rule and then the skip rule in the same mode.
///
/// An empty inclusion rule admits every candidate; an empty skip rule
/// rejects none.
pub fn tags_match(
    include: &TagRule,
    skip: &TagRule,
    reverse: bool,
    tags: &BTreeSet<String>,
) -> bool {
    let included = include.is_empty() || include.matches(tags, reverse);
    included && (skip.is_empty() || !skip.matches(tags, reverse))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|tag| tag.to_string()).collect()
    }

    #[test]
    fn all_tags_of_any_group() {
        let rule = TagRule::new([vec!["a", "b"], vec!["c"]]);
        let skip = TagRule::default();

        assert!(tags_match(&rule, &skip, false, &tags(&["a", "b"])));
        assert!(!tags_match(&rule, &skip, false, &tags(&["a"])));
        assert!(tags_match(&rule, &skip, false, &tags(&["c"])));
    }

    #[test]
    fn reverse_needs_one_tag_of_every_group() {
        let rule = TagRule::new([vec!["a", "b"], vec!["c"]]);
        let skip = TagRule::default();

        assert!(!tags_match(&rule, &skip, true, &tags(&["a", "b"])));
        assert!(tags_match(&rule, &skip, true, &tags(&["a", "c"])));
        assert!(!tags_match(&rule, &skip, true, &tags(&["c"])));
    }

    #[test]
    fn skip_rule_vetoes_inclusion() {
        let rule = TagRule::new([vec!["animal"]]);
        let skip = TagRule::new([vec!["animal", "baby"]]);

        assert!(tags_match(&rule, &skip, false, &tags(&["animal"])));
        assert!(!tags_match(&rule, &skip, false, &tags(&["animal", "baby"])));
    }

    #[test]
    fn empty_rules_are_permissive() {
        let empty = TagRule::default();
        assert!(tags_match(&empty, &empty, false, &tags(&[])));
        assert!(tags_match(&empty, &empty, true, &tags(&["x"])));
        assert!(TagRule::new([Vec::<String>::new()]).is_empty());
    }
}
