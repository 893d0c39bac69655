//! Manifest and list-file loading
//!
//! All three file kinds share one layout: a count header on the first line
//! (ignored, the actual lines are authoritative) followed by one entry per
//! line. Relative paths inside a manifest resolve against the manifest's
//! own directory.

use crate::error::{ConfigError, Result};
use crate::pipeline::PipelineInputs;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Target sets and excluded words named by the auxiliary manifest
#[derive(Debug, Clone, Default)]
pub struct AuxiliaryLists {
    pub target_languages: HashSet<String>,
    pub target_categories: HashSet<String>,
    pub excluded_words: HashSet<String>,
}

impl AuxiliaryLists {
    /// Load the three lists named by the auxiliary manifest at `path`
    pub fn load(path: &Path) -> std::result::Result<Self, ConfigError> {
        let entries = read_entries(path)?;
        let base = base_dir(path);

        let mut names = entries.into_iter();
        let mut next_list = |what: &'static str| -> std::result::Result<HashSet<String>, ConfigError> {
            let name = names.next().ok_or_else(|| ConfigError::MissingEntry {
                path: path.to_path_buf(),
                what,
            })?;
            load_word_set(&base.join(name))
        };

        let lists = Self {
            target_languages: next_list("language list")?,
            target_categories: next_list("category list")?,
            excluded_words: next_list("excluded word list")?,
        };

        debug!(
            languages = lists.target_languages.len(),
            categories = lists.target_categories.len(),
            excluded = lists.excluded_words.len(),
            "Loaded auxiliary lists"
        );

        Ok(lists)
    }
}

/// Load the article file paths listed in the manifest at `path`
pub fn load_article_paths(path: &Path) -> std::result::Result<Vec<PathBuf>, ConfigError> {
    let base = base_dir(path);
    let paths: Vec<PathBuf> = read_entries(path)?
        .into_iter()
        .map(|entry| base.join(entry))
        .collect();

    debug!(files = paths.len(), manifest = %path.display(), "Loaded article manifest");
    Ok(paths)
}

/// Load one list file into a set of trimmed, non-blank entries
pub fn load_word_set(path: &Path) -> std::result::Result<HashSet<String>, ConfigError> {
    Ok(read_entries(path)?.into_iter().collect())
}

/// Resolve both manifests into the inputs of a pipeline run
pub fn load_inputs(articles_manifest: &Path, aux_manifest: &Path) -> Result<PipelineInputs> {
    let files = load_article_paths(articles_manifest)?;
    let lists = AuxiliaryLists::load(aux_manifest)?;

    Ok(PipelineInputs {
        files,
        target_languages: lists.target_languages,
        target_categories: lists.target_categories,
        excluded_words: lists.excluded_words,
    })
}

/// Lines after the count header, trimmed, blanks dropped
fn read_entries(path: &Path) -> std::result::Result<Vec<String>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(content
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

fn base_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use tempfile::tempdir;

    #[test]
    fn test_article_paths_resolve_against_manifest_dir() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("articles.txt");
        fs::write(&manifest, "2\nsrc/a.json\n\n  src/b.json  \n").unwrap();

        let paths = load_article_paths(&manifest).unwrap();
        assert_eq!(
            paths,
            vec![dir.path().join("src/a.json"), dir.path().join("src/b.json")]
        );
    }

    #[test]
    fn test_count_header_is_ignored() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("articles.txt");
        fs::write(&manifest, "99\nonly.json\n").unwrap();

        assert_eq!(load_article_paths(&manifest).unwrap().len(), 1);
    }

    #[test]
    fn test_auxiliary_lists() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("langs.txt"), "2\nenglish\nfrench\n").unwrap();
        fs::write(dir.path().join("cats.txt"), "1\nArts, Culture\n").unwrap();
        fs::write(dir.path().join("stop.txt"), "2\nthe\na\n\n").unwrap();
        let aux = dir.path().join("inputs.txt");
        fs::write(&aux, "3\nlangs.txt\ncats.txt\nstop.txt\n").unwrap();

        let lists = AuxiliaryLists::load(&aux).unwrap();
        assert!(lists.target_languages.contains("english"));
        assert!(lists.target_languages.contains("french"));
        assert!(lists.target_categories.contains("Arts, Culture"));
        assert_eq!(lists.excluded_words.len(), 2);
    }

    #[test]
    fn test_auxiliary_manifest_missing_entry() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("langs.txt"), "0\n").unwrap();
        let aux = dir.path().join("inputs.txt");
        fs::write(&aux, "3\nlangs.txt\n").unwrap();

        let err = AuxiliaryLists::load(&aux).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingEntry { what: "category list", .. }
        ));
    }

    #[test]
    fn test_load_inputs_wraps_config_errors() {
        let dir = tempdir().unwrap();
        let articles = dir.path().join("articles.txt");
        fs::write(&articles, "1\na.json\n").unwrap();

        let err = load_inputs(&articles, &dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Config(ConfigError::Unreadable { .. })
        ));
    }

    #[test]
    fn test_missing_list_file() {
        let dir = tempdir().unwrap();
        let aux = dir.path().join("inputs.txt");
        fs::write(&aux, "3\nnope.txt\nnope.txt\nnope.txt\n").unwrap();

        assert!(matches!(
            AuxiliaryLists::load(&aux),
            Err(ConfigError::Unreadable { .. })
        ));
    }
}
