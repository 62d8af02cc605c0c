use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use tokio::{io::AsyncWriteExt, sync::Mutex};

use crate::datastore::DataStore;

#[derive(Debug)]
pub struct FsDataStore {
    dataset_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FsDataStore {
    const DATASET_FILE: &str = "records.jsonl";

    /// Creates the dataset directory if it does not exist
    pub async fn init(dataset_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dataset_dir = dataset_dir.as_ref();

        tokio::fs::create_dir_all(dataset_dir)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to create dataset directory"))
            .with_context(|| format!("Failed to create {}", dataset_dir.display()))?;

        Ok(FsDataStore {
            dataset_path: dataset_dir.join(Self::DATASET_FILE),
            write_lock: Mutex::new(()),
        })
    }

    pub fn dataset_path(&self) -> &Path {
        &self.dataset_path
    }
}

impl DataStore for FsDataStore {
    async fn push_record<T: Serialize + Sync>(&self, record: &T) -> anyhow::Result<()> {
        let mut line = serde_json::to_string(record).context("Failed to serialize record")?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.dataset_path)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to open dataset"))
            .with_context(|| format!("Failed to open {}", self.dataset_path.display()))?;

        file.write_all(line.as_bytes())
            .await
            .context("Failed to append record")?;
        file.flush().await.context("Failed to flush dataset")?;

        tracing::debug!(path = ?self.dataset_path, "Record pushed to dataset");
        Ok(())
    }

    async fn list_records(&self) -> anyhow::Result<Vec<serde_json::Value>> {
        let contents = match tokio::fs::read_to_string(&self.dataset_path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read {}", self.dataset_path.display()))
            }
        };

        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(idx, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("Malformed record on line {}", idx + 1))
            })
            .collect()
    }
}
