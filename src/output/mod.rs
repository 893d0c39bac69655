//! Result files
//!
//! Runs single-threaded after the pool has joined and only reads the
//! finalized `SharedState`. Every file is sorted so that output is identical
//! regardless of worker count or scheduling.
//!
//! | File                       | Content                                  |
//! |----------------------------|------------------------------------------|
//! | `<language>.txt`           | ids, ascending                           |
//! | `<normalized category>.txt`| ids, ascending                           |
//! | `all_articles.txt`         | `id date`, date desc then id asc         |
//! | `keywords_count.txt`       | `keyword count`, count desc then key asc |
//! | `reports.txt`              | summary, see [`report`]                  |

pub mod report;
pub mod writer;

pub use report::Report;
pub use writer::{write_all, OutputSummary};

use crate::model::Article;
use crate::pipeline::state::FrequencyTable;
use std::cmp::Reverse;
use std::sync::Arc;

/// Names of the fixed result files
pub mod files {
    pub const ALL_ARTICLES: &str = "all_articles.txt";
    pub const KEYWORDS: &str = "keywords_count.txt";
    pub const REPORT: &str = "reports.txt";
}

/// File name for a category: commas removed, spaces to underscores
pub fn category_file_stem(category: &str) -> String {
    category.replace(',', "").replace(' ', "_")
}

/// Articles sorted by publish date descending, then id ascending
pub fn sort_articles(mut articles: Vec<Arc<Article>>) -> Vec<Arc<Article>> {
    articles.sort_by(|a, b| {
        b.publish_date
            .cmp(&a.publish_date)
            .then_with(|| a.id.cmp(&b.id))
    });
    articles
}

/// Table entries sorted by count descending, then key ascending
pub fn rank_counts(table: &FrequencyTable) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = table.snapshot().into_iter().collect();
    entries.sort_by_key(|(key, count)| (Reverse(*count), key.clone()));
    entries
}
