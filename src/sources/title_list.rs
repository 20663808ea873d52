//! Newline-delimited candidate list used as a discovery source.

use std::path::PathBuf;

use log::info;

use super::TitleDiscoverySource;
use crate::error::SourceError;

/// Reads one candidate per line.
///
/// Blank lines are skipped, as are comment lines: a lone `#` or `#` followed
/// by a space. Titles such as `#Girlboss` are kept.
pub struct TitleListFile {
    path: PathBuf,
}

impl TitleListFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn is_comment(line: &str) -> bool {
        line == "#" || line.starts_with("# ")
    }

    fn parse_lines(content: &str) -> Vec<String> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !Self::is_comment(line))
            .map(str::to_string)
            .collect()
    }
}

impl TitleDiscoverySource for TitleListFile {
    fn discover(&self) -> Result<Vec<String>, SourceError> {
        let content = std::fs::read_to_string(&self.path).map_err(|error| {
            SourceError::Unavailable(format!(
                "failed to read title list {}: {error}",
                self.path.display()
            ))
        })?;
        let titles = Self::parse_lines(&content);
        info!(
            "Discovered {} candidate lines in {}",
            titles.len(),
            self.path.display()
        );
        Ok(titles)
    }
}
