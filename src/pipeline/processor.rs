//! Per-record work for the count, filter and aggregate phases
//!
//! Every function here touches one record and either writes disjoint data
//! or performs commutative per-key updates, so any interleaving of claimed
//! indices across workers produces the same tables.

use crate::model::Article;
use crate::pipeline::state::SharedState;
use std::collections::HashSet;
use std::sync::Arc;

/// Count phase: bump the id and title frequencies for one record
pub fn count_record(state: &SharedState, article: &Article) {
    state.id_frequency.increment(&article.id);
    state.title_frequency.increment(&article.title);
}

/// Whether a record's id and title each occur exactly once among all
/// ingested records
pub fn is_unique(state: &SharedState, article: &Article) -> bool {
    state.id_frequency.get(&article.id) == 1 && state.title_frequency.get(&article.title) == 1
}

/// Filter phase: keep the record if it is unique
pub fn filter_record(state: &SharedState, article: &Arc<Article>) -> bool {
    let keep = is_unique(state, article);
    if keep {
        state.clean_records.push(Arc::clone(article));
    }
    keep
}

/// Distinct accepted keywords of a body.
///
/// Empty tokens and excluded words are dropped; repeats collapse to one.
pub fn distinct_keywords<'a>(
    tokens: &'a [String],
    excluded: &HashSet<String>,
) -> HashSet<&'a str> {
    tokens
        .iter()
        .map(String::as_str)
        .filter(|token| !token.is_empty() && !excluded.contains(*token))
        .collect()
}

/// Aggregate phase: keywords, language index and category index for one
/// clean record
pub fn aggregate_record(state: &SharedState, article: &Article) {
    let inputs = &state.inputs;

    if article.is_english() {
        let tokens = article.keywords();
        for keyword in distinct_keywords(&tokens, &inputs.excluded_words) {
            state.keyword_frequency.increment(keyword);
        }
    }

    if inputs.target_languages.contains(&article.language) {
        state.language_index.append(&article.language, &article.id);
    }

    let categories: HashSet<&str> = article.categories.iter().map(String::as_str).collect();
    for category in categories {
        if inputs.target_categories.contains(category) {
            state.category_index.append(category, &article.id);
        }
    }
}
