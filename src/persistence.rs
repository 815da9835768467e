// Shadow-Instructor: Report Persistence Boundary
// Finished reports may be handed to a sink for storage. Fire-and-forget: a
// storage failure is logged and never affects the report already returned.

use crate::schema::InterviewAnalysisReport;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// A report as it is stored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredReport {
    pub id: Uuid,
    #[serde(default)]
    pub user_id: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub report: InterviewAnalysisReport,
}

impl StoredReport {
    pub fn new(role: &str, report: InterviewAnalysisReport) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: None,
            role: role.to_string(),
            created_at: Utc::now(),
            report,
        }
    }

    pub fn with_user(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }
}

/// Destination for finished reports
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn store(&self, report: &StoredReport) -> anyhow::Result<()>;
}

/// Appends one JSON document per line
pub struct JsonlReportSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlReportSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReportSink for JsonlReportSink {
    async fn store(&self, report: &StoredReport) -> anyhow::Result<()> {
        let mut line = serde_json::to_string(report).context("Failed to serialize report")?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Store in the background; failures are only logged
pub fn persist_detached(sink: Arc<dyn ReportSink>, report: StoredReport) -> JoinHandle<()> {
    tokio::spawn(async move {
        match sink.store(&report).await {
            Ok(()) => log::debug!("Stored report {}", report.id),
            Err(e) => log::error!("Failed to store report {}: {:#}", report.id, e),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::StructuredOutput;
    use tempfile::TempDir;

    fn report() -> InterviewAnalysisReport {
        InterviewAnalysisReport::from_json_str(
            r#"{
                "overall_score": 20,
                "summary": "Too vague.",
                "speech_analysis": {"pace":"Good","clarity":40,"conciseness":50,"stammering_frequency":"Moderate","filled_pauses_count":2,"long_pauses_count":0},
                "content_analysis": {"technical_accuracy":10,"relevance":30,"problem_solving_skills":15,"key_strengths":[],"areas_for_improvement":["Depth"]},
                "question_breakdown": [],
                "actionable_tips": ["Explain collisions"],
                "final_verdict": "No Hire"
            }"#,
        )
        .unwrap()
    }

    struct FailingSink;

    #[async_trait]
    impl ReportSink for FailingSink {
        async fn store(&self, _report: &StoredReport) -> anyhow::Result<()> {
            anyhow::bail!("database unavailable")
        }
    }

    #[tokio::test]
    async fn test_jsonl_sink_appends_lines() {
        let dir = TempDir::new().unwrap();
        let sink = JsonlReportSink::new(dir.path().join("nested").join("reports.jsonl"));

        let first = StoredReport::new("SRE", report()).with_user("u-1");
        sink.store(&first).await.unwrap();
        sink.store(&StoredReport::new("SWE", report())).await.unwrap();

        let text = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: StoredReport = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed, first);
    }

    #[tokio::test]
    async fn test_detached_failure_is_swallowed() {
        let handle = persist_detached(Arc::new(FailingSink), StoredReport::new("SRE", report()));
        assert!(handle.await.is_ok());
    }
}
