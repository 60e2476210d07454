//! Word-frequency extraction over report descriptions, for the keyword
//! bar chart.

use std::collections::HashMap;

use crate::types::KeywordCount;

/// Default number of keywords shown on the dashboard.
pub const DEFAULT_KEYWORD_LIMIT: usize = 5;

/// Tokenize the descriptions into a frequency table and return the top
/// `limit` terms.
///
/// Descriptions are joined with single spaces, lowercased and split on
/// runs of non-alphanumeric characters; tokens of length <= 1 are
/// discarded, so counting is case-insensitive and punctuation-blind.
/// Ranking is by count descending with lexicographic tie-break, which
/// keeps the output deterministic. An empty input yields an empty result.
pub fn top_keywords<'a, I>(descriptions: I, limit: usize) -> Vec<KeywordCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let combined = descriptions
        .into_iter()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for token in combined.split(|c: char| !c.is_alphanumeric()) {
        if token.chars().count() <= 1 {
            continue;
        }
        *counts.entry(token).or_insert(0) += 1;
    }

    let mut rows: Vec<KeywordCount> = counts
        .into_iter()
        .map(|(word, count)| KeywordCount {
            word: word.to_string(),
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    rows.truncate(limit);
    rows
}
