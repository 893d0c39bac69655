//! Article loading for the ingest phase
//!
//! The pool loads files through the [`ArticleSource`] trait so that tests
//! can swap in sources that fail or panic. [`JsonFileSource`] is the real
//! loader: it reads a whole file and parses it as a JSON array of articles.

use crate::error::{IngestError, IngestResult};
use crate::model::Article;
use std::fs;
use std::path::Path;

/// Records loaded from one file
#[derive(Debug, Default)]
pub struct LoadedFile {
    pub articles: Vec<Article>,

    /// Size of the file on disk
    pub bytes: u64,
}

/// Loads the records of a single input file
pub trait ArticleSource: Send + Sync {
    fn load(&self, path: &Path) -> IngestResult<LoadedFile>;
}

/// Reads JSON array files from the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFileSource;

impl ArticleSource for JsonFileSource {
    fn load(&self, path: &Path) -> IngestResult<LoadedFile> {
        let raw = fs::read(path).map_err(|source| IngestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let articles: Vec<Article> =
            serde_json::from_slice(&raw).map_err(|source| IngestError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(LoadedFile {
            articles,
            bytes: raw.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_json_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.json");
        fs::write(&path, r#"[{"uuid": "1", "title": "X"}, {"uuid": "2", "title": "Y"}]"#).unwrap();

        let loaded = JsonFileSource.load(&path).unwrap();
        assert_eq!(loaded.articles.len(), 2);
        assert_eq!(loaded.articles[1].id, "2");
        assert!(loaded.bytes > 0);
    }

    #[test]
    fn test_empty_array_is_not_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.json");
        fs::write(&path, "[]").unwrap();

        assert!(JsonFileSource.load(&path).unwrap().articles.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = JsonFileSource.load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, IngestError::Read { .. }));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"uuid": "not an array"}"#).unwrap();

        let err = JsonFileSource.load(&path).unwrap_err();
        assert!(matches!(err, IngestError::Malformed { .. }));
    }
}
