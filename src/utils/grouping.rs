use std::collections::{BTreeMap, BTreeSet};

/// Deduplicate and sort booth tags for display.
pub fn sorted_unique_tags<'a, I>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let unique: BTreeSet<&str> = tags.into_iter().collect();
    unique.into_iter().map(str::to_string).collect()
}

/// Group tags by their uppercased first character. Keys iterate in sorted
/// order; tags keep the order they were passed in.
pub fn group_by_initial(tags: &[String]) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for tag in tags {
        let initial = tag
            .chars()
            .next()
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_default();
        grouped.entry(initial).or_default().push(tag.clone());
    }
    grouped
}

/// Pair tags two-at-a-time in the given order. An odd count leaves a
/// trailing singleton.
pub fn pair_tags(tags: &[String]) -> Vec<Vec<String>> {
    tags.chunks(2).map(|pair| pair.to_vec()).collect()
}
