use std::path::PathBuf;

/// The process-wide pool memoisation the data-fetcher keeps on disk (`spec`
/// §6, "Persistent state": `./mem-cache`). The core does not know the
/// contents of this directory — only that it is the one piece of durable
/// state a round owns, and that it must be blown away and recreated on a
/// timer (`spec` §5, "Shared resources").
///
/// An explicit type with `refresh()`/`invalidate()` rather than a hidden
/// global (`spec` §9 design note).
#[derive(Debug, Clone)]
pub struct PoolCache {
    dir: PathBuf,
}

impl PoolCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    /// Deletes and recreates the backing directory, discarding every
    /// memoised pool entry (`spec` §6, §5).
    pub async fn refresh(&self) -> std::io::Result<()> {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Same effect as [`Self::refresh`]; kept as a distinct name so callers
    /// can express intent (an explicit invalidation vs. a scheduled tick).
    pub async fn invalidate(&self) -> std::io::Result<()> {
        self.refresh().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refresh_recreates_an_empty_directory() {
        let tmp = tempfile_dir();
        let cache = PoolCache::new(tmp.clone());
        tokio::fs::create_dir_all(&tmp).await.unwrap();
        tokio::fs::write(tmp.join("stale-pool.json"), b"{}")
            .await
            .unwrap();

        cache.refresh().await.unwrap();

        let mut entries = tokio::fs::read_dir(&tmp).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());

        tokio::fs::remove_dir_all(&tmp).await.unwrap();
    }

    fn tempfile_dir() -> PathBuf {
        std::env::temp_dir().join(format!("clearer-pool-cache-test-{:?}", std::thread::current().id()))
    }
}
