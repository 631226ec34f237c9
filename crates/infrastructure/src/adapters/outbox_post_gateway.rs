//! Outbox submission gateway
//!
//! Implements `PostSubmissionPort` by appending each post as one JSON line to
//! a local outbox file, for a separate publisher to pick up.

use std::path::{Path, PathBuf};

use application::{
    error::ApplicationError,
    ports::{PostPayload, PostSubmissionPort},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// One line of the outbox file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxRecord {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub post: PostPayload,
}

/// Gateway writing posts to a JSON-lines outbox
#[derive(Debug)]
pub struct OutboxPostGateway {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl OutboxPostGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record written so far, oldest first
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn read_records(&self) -> Result<Vec<OutboxRecord>, ApplicationError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ApplicationError::Storage(e.to_string())),
        };

        raw.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(ApplicationError::from))
            .collect()
    }
}

#[async_trait]
impl PostSubmissionPort for OutboxPostGateway {
    #[instrument(skip(self, payload), fields(path = %self.path.display(), blocks = payload.blocks.len()))]
    async fn submit(&self, payload: &PostPayload) -> Result<(), ApplicationError> {
        let record = OutboxRecord {
            id: Uuid::new_v4(),
            submitted_at: Utc::now(),
            post: payload.clone(),
        };
        let mut line = serde_json::to_string(&record)
            .map_err(|e| ApplicationError::Submission(e.to_string()))?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ApplicationError::Submission(e.to_string()))?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| ApplicationError::Submission(e.to_string()))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| ApplicationError::Submission(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| ApplicationError::Submission(e.to_string()))?;

        debug!(bytes = line.len(), "Outbox record appended");
        info!(record_id = %record.id, "Post queued in outbox");
        Ok(())
    }
}
