use crate::models::{JudgmentVerdict, ScreeningResult};
use crate::traits::ResultSink;
use crate::ScreeningError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScreeningRecord {
    pub id: Uuid,
    pub job_id: String,
    pub resume_id: String,
    pub score: f64,
    pub model_used: String,
    pub analysis: JudgmentVerdict,
    pub matched_skills: Vec<String>,
    pub experience_years: f64,
    pub created_at: DateTime<Utc>,
}

impl ScreeningRecord {
    pub fn from_result(job_id: &str, result: &ScreeningResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_id: job_id.to_string(),
            resume_id: result.resume_id.clone(),
            score: result.score,
            model_used: result.model_used.clone(),
            analysis: result.verdict(),
            matched_skills: result.matched_skills.clone(),
            experience_years: result.experience_years,
            created_at: Utc::now(),
        }
    }
}

pub struct JsonLinesSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ResultSink for JsonLinesSink {
    async fn persist(&self, record: &ScreeningRecord) -> Result<(), ScreeningError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let _guard = self.lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}
