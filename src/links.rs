//! The newline-delimited list of feed URLs a run reads from.
//!
//! The whole file is read at the start of every run and rewritten whole on
//! save. There is no locking; concurrent writers race.

use crate::error::LinkStoreError;
use itertools::Itertools;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Default location of the link list.
pub const DEFAULT_LINKS_PATH: &str = "rss_links.txt";

/// True when `link` is an absolute HTTP(S) URL by prefix.
pub fn is_valid_link(link: &str) -> bool {
    link.starts_with("http://") || link.starts_with("https://")
}

/// Trim, drop blank lines, and validate every link.
///
/// # Errors
///
/// [`LinkStoreError::InvalidLink`] naming the first link that does not
/// start with `http://` or `https://`.
pub fn normalize_links<I, S>(links: I) -> Result<Vec<String>, LinkStoreError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let links: Vec<String> = links
        .into_iter()
        .map(|l| l.as_ref().trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();
    if let Some(bad) = links.iter().find(|l| !is_valid_link(l)) {
        return Err(LinkStoreError::InvalidLink(bad.clone()));
    }
    Ok(links.into_iter().unique().collect())
}

/// File-backed feed link list.
#[derive(Debug, Clone)]
pub struct LinkStore {
    path: PathBuf,
}

impl LinkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the list. A missing file is an empty list.
    #[instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<Vec<String>, LinkStoreError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Validate and replace the whole list.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub async fn save<I, S>(&self, links: I) -> Result<Vec<String>, LinkStoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let links = normalize_links(links)?;
        let mut contents = links.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        fs::write(&self.path, contents).await?;
        info!(count = links.len(), "Saved feed links");
        Ok(links)
    }

    /// Append one link unless it is already listed. Returns whether it was added.
    pub async fn add(&self, link: &str) -> Result<bool, LinkStoreError> {
        let link = link.trim();
        if !is_valid_link(link) {
            return Err(LinkStoreError::InvalidLink(link.to_string()));
        }
        let mut links = self.load().await?;
        if links.iter().any(|l| l == link) {
            return Ok(false);
        }
        links.push(link.to_string());
        self.save(&links).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_link() {
        assert!(is_valid_link("https://example.com/rss"));
        assert!(is_valid_link("http://example.com/rss"));
        assert!(!is_valid_link("ftp://example.com/rss"));
        assert!(!is_valid_link("example.com/rss"));
    }

    #[test]
    fn test_normalize_links() {
        let links = normalize_links([
            "  https://a.example/rss ",
            "",
            "https://b.example/rss",
            "https://a.example/rss",
        ])
        .unwrap();
        assert_eq!(links, vec!["https://a.example/rss", "https://b.example/rss"]);
    }

    #[test]
    fn test_normalize_rejects_invalid() {
        let err = normalize_links(["https://a.example/rss", "javascript:alert(1)"]).unwrap_err();
        assert!(matches!(err, LinkStoreError::InvalidLink(l) if l == "javascript:alert(1)"));
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LinkStore::new(dir.path().join("rss_links.txt"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = LinkStore::new(dir.path().join("rss_links.txt"));
        store
            .save(["https://a.example/rss", "https://b.example/rss"])
            .await
            .unwrap();
        assert_eq!(
            store.load().await.unwrap(),
            vec!["https://a.example/rss", "https://b.example/rss"]
        );
    }

    #[tokio::test]
    async fn test_invalid_save_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = LinkStore::new(dir.path().join("rss_links.txt"));
        store.save(["https://a.example/rss"]).await.unwrap();
        assert!(store.save(["not-a-url"]).await.is_err());
        assert_eq!(store.load().await.unwrap(), vec!["https://a.example/rss"]);
    }

    #[tokio::test]
    async fn test_add_skips_existing() {
        let dir = tempfile::tempdir().unwrap();
        let store = LinkStore::new(dir.path().join("rss_links.txt"));
        assert!(store.add("https://a.example/rss").await.unwrap());
        assert!(!store.add("https://a.example/rss").await.unwrap());
        assert!(store.add("bad").await.is_err());
        assert_eq!(store.load().await.unwrap().len(), 1);
    }
}
