//! Evaluators compiled into the binary
//!
//! These are the only implementations the default registry can produce.
//! Each one is bound to a task at creation time and consumes the submitted
//! payload through the `Evaluator` contract.

use std::collections::BTreeMap;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use walkdir::WalkDir;

use aisb_protocol::EvaluationRequest;

use super::{Evaluator, EvaluatorFactory, RawEvaluation};
use crate::error::{BenchError, BenchResult, ExecutionErrorKind};
use crate::runner::EvalContext;
use crate::tasks::TaskDefinition;

/// Factory for [`PatchHarnessEvaluator`]
pub struct PatchHarnessFactory;

impl EvaluatorFactory for PatchHarnessFactory {
    fn create(&self, task: &TaskDefinition) -> Box<dyn Evaluator> {
        Box::new(PatchHarnessEvaluator { task: task.clone() })
    }

    // Harness runs mutate a shared benchmark environment; runs for the
    // same task must not interleave.
    fn exclusive(&self) -> bool {
        true
    }
}

/// Runs the task's verified harness script against the submitted code
///
/// The script is the integrity-verified evaluator artifact itself; it is
/// invoked as a subprocess with the submission directory as its argument
/// and must print a JSON object of scores as its last stdout line. The log
/// artifact path is exported to the script via `AISB_EVAL_LOG`.
pub struct PatchHarnessEvaluator {
    task: TaskDefinition,
}

#[async_trait]
impl Evaluator for PatchHarnessEvaluator {
    async fn evaluate(
        &self,
        request: &EvaluationRequest,
        ctx: &EvalContext,
    ) -> BenchResult<RawEvaluation> {
        let code_dir = request.payload.artifact_dir().ok_or_else(|| {
            BenchError::execution(
                ExecutionErrorKind::Failed,
                "payload carries no artifact directory to evaluate",
            )
        })?;
        if !code_dir.is_dir() {
            return Err(BenchError::execution(
                ExecutionErrorKind::Failed,
                format!("submitted code directory '{}' not found", code_dir.display()),
            ));
        }

        ctx.append_log(&format!(
            "harness start: task={} request={} submission={}",
            self.task.task_id,
            request.request_id,
            code_dir.display()
        ))
        .await?;

        let mut cmd = Command::new("sh");
        cmd.arg(ctx.artifact_path())
            .arg(code_dir)
            .env("AISB_TASK_ID", &self.task.task_id)
            .env("AISB_EVAL_LOG", ctx.log_path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            BenchError::execution(
                ExecutionErrorKind::ProcessCrash,
                format!("failed to spawn harness: {}", e),
            )
        })?;

        // Dropping the wait future on cancellation kills the child via
        // kill_on_drop; no harness process outlives the request.
        let output = tokio::select! {
            out = child.wait_with_output() => out.map_err(|e| {
                BenchError::execution(
                    ExecutionErrorKind::ProcessCrash,
                    format!("harness wait failed: {}", e),
                )
            })?,
            _ = ctx.cancel_token().cancelled() => {
                return Err(BenchError::Execution {
                    kind: ExecutionErrorKind::Cancelled,
                    message: "run cancelled while harness was executing".to_string(),
                    partial_log: Some(ctx.log_path().to_path_buf()),
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            ctx.append_log(&format!("harness stderr:\n{}", stderr.trim_end()))
                .await?;
        }

        if !output.status.success() {
            ctx.append_log(&format!("harness exited with {}", output.status))
                .await?;
            return Err(BenchError::Execution {
                kind: ExecutionErrorKind::ProcessCrash,
                message: format!("harness exited with {}", output.status),
                partial_log: Some(ctx.log_path().to_path_buf()),
            });
        }

        let scores = parse_scores(&stdout).ok_or_else(|| BenchError::Execution {
            kind: ExecutionErrorKind::Failed,
            message: "harness produced no JSON score object on stdout".to_string(),
            partial_log: Some(ctx.log_path().to_path_buf()),
        })?;

        ctx.append_log(&format!(
            "harness done: scores={}",
            serde_json::to_string(&scores).unwrap_or_default()
        ))
        .await?;

        Ok(RawEvaluation {
            scores,
            log_path: ctx.log_path().to_path_buf(),
        })
    }
}

/// The last non-empty stdout line must be a JSON object of scores
fn parse_scores(stdout: &str) -> Option<BTreeMap<String, serde_json::Value>> {
    stdout
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .and_then(|line| serde_json::from_str(line.trim()).ok())
}

/// Factory for [`ArtifactAuditEvaluator`]
pub struct ArtifactAuditFactory;

impl EvaluatorFactory for ArtifactAuditFactory {
    fn create(&self, task: &TaskDefinition) -> Box<dyn Evaluator> {
        Box::new(ArtifactAuditEvaluator { task: task.clone() })
    }
}

/// Static audit of a submitted artifact directory
///
/// Touches nothing outside the submission: walks the directory, records
/// what it finds in the run log, and scores structural completeness. Used
/// for payload kinds where execution is delegated to a later stage.
pub struct ArtifactAuditEvaluator {
    task: TaskDefinition,
}

#[async_trait]
impl Evaluator for ArtifactAuditEvaluator {
    async fn evaluate(
        &self,
        request: &EvaluationRequest,
        ctx: &EvalContext,
    ) -> BenchResult<RawEvaluation> {
        let dir = request.payload.artifact_dir().ok_or_else(|| {
            BenchError::execution(
                ExecutionErrorKind::Failed,
                "payload carries no artifact directory to audit",
            )
        })?;
        if !dir.is_dir() {
            return Err(BenchError::execution(
                ExecutionErrorKind::Failed,
                format!("artifact directory '{}' not found", dir.display()),
            ));
        }

        let mut files: u64 = 0;
        let mut empty_files: u64 = 0;
        let mut total_bytes: u64 = 0;

        for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            files += 1;
            let len = entry.metadata().map(|m| m.len()).unwrap_or(0);
            total_bytes += len;
            if len == 0 {
                empty_files += 1;
            }
            ctx.append_log(&format!("audited: {} ({} bytes)", entry.path().display(), len))
                .await?;
        }

        if files == 0 {
            return Err(BenchError::Execution {
                kind: ExecutionErrorKind::Failed,
                message: format!("artifact directory '{}' contains no files", dir.display()),
                partial_log: Some(ctx.log_path().to_path_buf()),
            });
        }

        tracing::debug!(
            task_id = %self.task.task_id,
            request_id = %request.request_id,
            files,
            total_bytes,
            "artifact audit complete"
        );

        let mut scores = BTreeMap::new();
        scores.insert("files_audited".to_string(), serde_json::json!(files));
        scores.insert("empty_files".to_string(), serde_json::json!(empty_files));
        scores.insert("total_bytes".to_string(), serde_json::json!(total_bytes));

        Ok(RawEvaluation {
            scores,
            log_path: ctx.log_path().to_path_buf(),
        })
    }
}
