use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SentenceError {
    #[error("could not read sentence file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read a `.sen` file: one whitespace-tokenized sentence per line, blank
/// lines skipped, no escaping or line continuations (spec.md §6.2).
pub fn load(path: &Path) -> Result<Vec<Vec<String>>, SentenceError> {
    let text = std::fs::read_to_string(path).map_err(|source| SentenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.split_whitespace().map(str::to_string).collect())
        .collect())
}
