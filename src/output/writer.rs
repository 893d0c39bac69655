//! Writes result files from a finalized `SharedState`

use crate::error::{OutputError, OutputResult, Result};
use crate::output::report::Report;
use crate::output::{category_file_stem, files, rank_counts, sort_articles};
use crate::pipeline::SharedState;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What the output stage wrote
#[derive(Debug, Clone, Default)]
pub struct OutputSummary {
    /// Every file written, in write order
    pub files: Vec<PathBuf>,

    pub report: Report,
}

/// Write every result file into `out_dir`
pub fn write_all(state: &SharedState, out_dir: &Path) -> Result<OutputSummary> {
    let mut written = Vec::new();

    let mut languages: Vec<&String> = state.inputs.target_languages.iter().collect();
    languages.sort();
    for language in languages {
        if let Some(ids) = state.language_index.sorted_ids(language) {
            let path = out_dir.join(format!("{}.txt", language));
            write_lines(&path, &ids)?;
            written.push(path);
        }
    }

    let mut categories: Vec<&String> = state.inputs.target_categories.iter().collect();
    categories.sort();
    for category in categories {
        if let Some(ids) = state.category_index.sorted_ids(category) {
            let path = out_dir.join(format!("{}.txt", category_file_stem(category)));
            write_lines(&path, &ids)?;
            written.push(path);
        }
    }

    let articles = sort_articles(state.clean_snapshot());
    let path = out_dir.join(files::ALL_ARTICLES);
    write_lines(
        &path,
        articles
            .iter()
            .map(|a| format!("{} {}", a.id, a.publish_date)),
    )?;
    written.push(path);

    let keywords = rank_counts(&state.keyword_frequency);
    let path = out_dir.join(files::KEYWORDS);
    write_lines(
        &path,
        keywords.iter().map(|(keyword, count)| format!("{} {}", keyword, count)),
    )?;
    written.push(path);

    let report = Report::build(state, &articles, &keywords);
    let path = out_dir.join(files::REPORT);
    write_text(&path, &report.to_string())?;
    written.push(path);

    info!(files = written.len(), dir = %out_dir.display(), "Results written");

    Ok(OutputSummary {
        files: written,
        report,
    })
}

/// Write one item per line
fn write_lines<I, S>(path: &Path, lines: I) -> OutputResult<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let wrap = |source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(wrap)?;
    let mut out = BufWriter::new(file);
    let mut count = 0usize;
    for line in lines {
        writeln!(out, "{}", line.as_ref()).map_err(wrap)?;
        count += 1;
    }
    out.flush().map_err(wrap)?;

    debug!(path = %path.display(), lines = count, "Wrote result file");
    Ok(())
}

fn write_text(path: &Path, text: &str) -> OutputResult<()> {
    std::fs::write(path, text).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })
}
