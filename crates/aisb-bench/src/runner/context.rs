//! Per-run execution context handed to evaluator instances

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{BenchError, BenchResult};
use crate::tasks::TaskDefinition;

/// Everything an evaluator is allowed to see of the run that hosts it
///
/// Carries the bound task definition, the verified evaluator artifact, the
/// reserved write-once log path, and the cancellation token the evaluator
/// must honor during long-running work.
pub struct EvalContext {
    task: TaskDefinition,
    artifact_path: PathBuf,
    log_path: PathBuf,
    cancel: CancellationToken,
}

impl EvalContext {
    /// Reserve a log artifact and build the context for one run
    ///
    /// The log path is namespaced by task and request ID with a unique
    /// suffix, and the file is created with `create_new`, so an evaluator
    /// structurally cannot overwrite the log of any other run — including
    /// a re-run of the same request.
    pub async fn reserve(
        log_root: &Path,
        task: &TaskDefinition,
        request_id: &str,
        artifact_path: PathBuf,
        cancel: CancellationToken,
    ) -> BenchResult<Self> {
        let log_dir = log_root.join(&task.task_id);
        tokio::fs::create_dir_all(&log_dir).await?;

        let log_path = log_dir.join(format!("{}-{}.log", request_id, Uuid::new_v4()));
        tokio::fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&log_path)
            .await
            .map_err(|e| {
                BenchError::Io(format!(
                    "failed to reserve log artifact '{}': {}",
                    log_path.display(),
                    e
                ))
            })?;

        Ok(Self {
            task: task.clone(),
            artifact_path,
            log_path,
            cancel,
        })
    }

    /// The task this run is bound to
    pub fn task(&self) -> &TaskDefinition {
        &self.task
    }

    /// The integrity-verified evaluator artifact
    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    /// The reserved, write-once log artifact for this run
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Token fired when the caller cancels the run
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Append one line to the run's log artifact
    pub async fn append_log(&self, line: &str) -> BenchResult<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(&self.log_path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn task() -> TaskDefinition {
        serde_json::from_value(serde_json::json!({
            "task_id": "task-ctx",
            "task_name": "Ctx",
            "version": "1.0",
            "domain": "nlp",
            "sub_domain": "general",
            "task_description": "d",
            "source": {
                "paper_title": "p",
                "paper_url": "u",
                "leaderboard_url": "l"
            },
            "metrics": [],
            "sota_baseline": {
                "method_name": "m",
                "method_id": "m-1",
                "score": {},
                "method_summary": "s"
            },
            "local_evaluator": {
                "evaluator_name": "noop",
                "version": "1.0",
                "code_path": "noop.rs",
                "verification_hash": format!("sha256:{}", "ab".repeat(32))
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_reserve_creates_namespaced_log() {
        let dir = TempDir::new().unwrap();
        let ctx = EvalContext::reserve(
            dir.path(),
            &task(),
            "req-1",
            PathBuf::from("/tmp/noop.rs"),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(ctx.log_path().exists());
        assert!(ctx.log_path().starts_with(dir.path().join("task-ctx")));

        ctx.append_log("line one").await.unwrap();
        let content = std::fs::read_to_string(ctx.log_path()).unwrap();
        assert_eq!(content, "line one\n");
    }

    #[tokio::test]
    async fn test_same_request_gets_distinct_logs() {
        let dir = TempDir::new().unwrap();
        let a = EvalContext::reserve(
            dir.path(),
            &task(),
            "req-1",
            PathBuf::from("/tmp/noop.rs"),
            CancellationToken::new(),
        )
        .await
        .unwrap();
        let b = EvalContext::reserve(
            dir.path(),
            &task(),
            "req-1",
            PathBuf::from("/tmp/noop.rs"),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_ne!(a.log_path(), b.log_path());
    }
}
