//! Async API for non-blocking deduplication.
//!
//! Enable the `async` feature to use these APIs:
//!
//! ```toml
//! [dependencies]
//! mealdedup = { version = "0.1", features = ["async"] }
//! ```

use crate::error::{Error, Result};
use crate::mapping::DedupReport;
use crate::options::DedupOptions;
use crate::Deduplicator;
use std::path::Path;
use tokio::fs;

/// Runs a deduplication on the blocking pool.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> mealdedup::Result<()> {
/// let names = vec!["Gulasch mit Spätzle".to_string(), "Gulasch mit Spaetzle a".to_string()];
/// let report = mealdedup::async_api::deduplicate(names, Default::default()).await?;
/// println!("Groups: {}", report.groups.len());
/// # Ok(())
/// # }
/// ```
pub async fn deduplicate(names: Vec<String>, options: DedupOptions) -> Result<DedupReport> {
    // Clustering is CPU-bound, so it runs in a blocking task
    tokio::task::spawn_blocking(move || Deduplicator::with_options(options).try_run(names))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?
}

/// Reads names from a file (see [`crate::parse_names`]) and deduplicates them.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> mealdedup::Result<()> {
/// let report = mealdedup::async_api::deduplicate_file("meals.txt", Default::default()).await?;
/// println!("Merges: {}", report.merge_count());
/// # Ok(())
/// # }
/// ```
pub async fn deduplicate_file(
    path: impl AsRef<Path>,
    options: DedupOptions,
) -> Result<DedupReport> {
    let content = fs::read_to_string(path).await?;
    let names = crate::parse_names(&content)?;
    deduplicate(names, options).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deduplicate() {
        let names = vec![
            "Schnitzel mit Pommes a,c".to_string(),
            "Schnitzel mit Pommes".to_string(),
        ];
        let report = deduplicate(names, DedupOptions::default()).await.unwrap();
        assert_eq!(report.merge_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_options() {
        let options = DedupOptions::default().with_threshold(2.0);
        let result = deduplicate(vec![], options).await;
        assert!(matches!(result, Err(Error::InvalidOption { .. })));
    }

    #[tokio::test]
    async fn test_deduplicate_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meals.json");
        std::fs::write(&path, r#"["Milchreis", "Milchreis a"]"#).unwrap();

        let report = deduplicate_file(&path, DedupOptions::default()).await.unwrap();
        assert_eq!(report.total_names, 2);
        assert_eq!(report.mapping.get("Milchreis a"), Some("Milchreis"));
    }
}
