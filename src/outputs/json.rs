//! JSON file output.
//!
//! The whole batch is serialized in one go and written over any existing
//! file at the configured path.

use crate::error::SinkError;
use crate::models::Batch;
use crate::outputs::BatchSink;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BatchSink for JsonFileSink {
    /// Write `batch` as pretty-printed JSON, creating parent directories.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    async fn store(&self, batch: &Batch) -> Result<(), SinkError> {
        let json = serde_json::to_string_pretty(batch)?;
        let io_err = |source| SinkError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(dir).await {
                error!(dir = %dir.display(), error = %e, "Failed to create output dir");
                return Err(io_err(e));
            }
        }

        fs::write(&self.path, json).await.map_err(io_err)?;
        info!(posts = batch.len(), "Wrote batch JSON");
        Ok(())
    }
}
