//! Summary report (`reports.txt`)
//!
//! Seven `key - value` lines. "Dominant" values break count ties
//! alphabetically. A missing value leaves nothing after the dash.

use crate::model::Article;
use crate::output::category_file_stem;
use crate::pipeline::SharedState;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Closing statistics of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub duplicates_found: usize,
    pub unique_articles: usize,
    pub best_author: Option<(String, usize)>,
    pub top_language: Option<(String, usize)>,

    /// Category name already normalized for file names
    pub top_category: Option<(String, usize)>,

    /// `(publish_date, url)` of the newest clean article
    pub most_recent_article: Option<(String, String)>,

    pub top_keyword: Option<(String, usize)>,
}

impl Report {
    /// Compute the report from a finished run.
    ///
    /// `sorted_articles` must already be ordered newest first and
    /// `ranked_keywords` by count descending.
    pub fn build(
        state: &SharedState,
        sorted_articles: &[Arc<Article>],
        ranked_keywords: &[(String, usize)],
    ) -> Self {
        let clean = state.clean_records.read();

        let mut authors: HashMap<&str, usize> = HashMap::new();
        let mut languages: HashMap<&str, usize> = HashMap::new();
        let mut categories: HashMap<&str, usize> = HashMap::new();

        for article in clean.iter() {
            *authors.entry(article.author.as_str()).or_default() += 1;
            *languages.entry(article.language.as_str()).or_default() += 1;

            let distinct: HashSet<&str> = article.categories.iter().map(String::as_str).collect();
            for category in distinct {
                if state.inputs.target_categories.contains(category) {
                    *categories.entry(category).or_default() += 1;
                }
            }
        }

        Self {
            duplicates_found: state.raw_records.len() - clean.len(),
            unique_articles: clean.len(),
            best_author: non_empty(dominant(&authors)),
            top_language: non_empty(dominant(&languages)),
            top_category: non_empty(
                dominant(&categories).map(|(category, count)| (category_file_stem(&category), count)),
            ),
            most_recent_article: sorted_articles
                .first()
                .map(|a| (a.publish_date.clone(), a.url.clone())),
            top_keyword: ranked_keywords.first().cloned(),
        }
    }
}

/// Key with the highest count, ties broken by the smallest key
pub fn dominant(counts: &HashMap<&str, usize>) -> Option<(String, usize)> {
    counts
        .iter()
        .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then_with(|| kb.cmp(ka)))
        .map(|(key, count)| (key.to_string(), *count))
}

/// An empty key prints as an absent value
fn non_empty(entry: Option<(String, usize)>) -> Option<(String, usize)> {
    entry.filter(|(key, _)| !key.is_empty())
}

fn pair<A: fmt::Display, B: fmt::Display>(value: &Option<(A, B)>) -> String {
    match value {
        Some((a, b)) => format!("{} {}", a, b),
        None => String::new(),
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "duplicates_found - {}", self.duplicates_found)?;
        writeln!(f, "unique_articles - {}", self.unique_articles)?;
        writeln!(f, "best_author - {}", pair(&self.best_author))?;
        writeln!(f, "top_language - {}", pair(&self.top_language))?;
        writeln!(f, "top_category - {}", pair(&self.top_category))?;
        writeln!(f, "most_recent_article - {}", pair(&self.most_recent_article))?;
        writeln!(f, "top_keyword_en - {}", pair(&self.top_keyword))
    }
}
