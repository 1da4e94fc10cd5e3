//! Retention cleanup for rolled log files.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use std::path::Path;
use tracing::{info, warn};

use super::logger::LOG_FILE_PREFIX;

/// Deletes rolled log files older than the retention period.
#[derive(Debug, Clone, Copy)]
pub struct LogRetention {
    retention_days: u32,
}

impl LogRetention {
    pub fn new(retention_days: u32) -> Self {
        Self { retention_days }
    }

    /// Remove `deploytrack.log*` files last modified before the cutoff.
    ///
    /// Returns the number of files deleted. A missing directory is not an
    /// error.
    pub async fn cleanup_old_logs(&self, log_dir: impl AsRef<Path>) -> Result<usize> {
        let log_dir = log_dir.as_ref();

        if !log_dir.exists() {
            warn!(path = %log_dir.display(), "log directory does not exist");
            return Ok(0);
        }

        // Retention longer than the calendar range keeps everything.
        let Some(cutoff) = TimeDelta::try_days(i64::from(self.retention_days))
            .and_then(|window| Utc::now().checked_sub_signed(window))
        else {
            return Ok(0);
        };
        let mut deleted_count = 0;

        let mut entries = tokio::fs::read_dir(log_dir)
            .await
            .context("failed to read log directory")?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .context("failed to read directory entry")?
        {
            let path = entry.path();
            let is_log = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX));
            if !is_log {
                continue;
            }

            let modified: DateTime<Utc> = tokio::fs::metadata(&path)
                .await
                .context("failed to get file metadata")?
                .modified()
                .context("failed to get file modification time")?
                .into();

            if modified < cutoff {
                tokio::fs::remove_file(&path)
                    .await
                    .context("failed to delete old log file")?;
                deleted_count += 1;
            }
        }

        if deleted_count > 0 {
            info!(count = deleted_count, "cleaned up old log files");
        }

        Ok(deleted_count)
    }
}
