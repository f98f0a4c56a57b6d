//! Orchestration of one evaluation run
//!
//! The runner owns the strict ordering that makes the pipeline trustworthy:
//! nothing belonging to an evaluator artifact executes until the catalog
//! lookup and the integrity check have unconditionally succeeded. Every
//! fault aborts the run whole; no partial performance record ever escapes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

use aisb_protocol::EvaluationRequest;

use super::{EvalContext, RunnerConfig};
use crate::error::{BenchError, BenchResult, ExecutionErrorKind};
use crate::integrity;
use crate::packager::{self, PackagedResult};
use crate::registry::{Evaluator, EvaluatorRegistry, RawEvaluation};
use crate::tasks::TaskCatalog;

/// Runs evaluation requests against the trusted task catalog
///
/// Catalog and registry are read-only after construction and shared freely
/// across concurrent runs. Runs for distinct tasks proceed in parallel;
/// runs for one task are serialized when its evaluator declares that it
/// mutates a shared environment.
pub struct EvalRunner {
    config: RunnerConfig,
    catalog: Arc<TaskCatalog>,
    registry: Arc<EvaluatorRegistry>,
    /// One lock per task that requires exclusive execution
    task_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl EvalRunner {
    pub fn new(
        config: RunnerConfig,
        catalog: Arc<TaskCatalog>,
        registry: Arc<EvaluatorRegistry>,
    ) -> Self {
        Self {
            config,
            catalog,
            registry,
            task_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &TaskCatalog {
        &self.catalog
    }

    /// Run one evaluation request to completion
    pub async fn run(&self, request: &EvaluationRequest) -> BenchResult<PackagedResult> {
        self.run_with_cancellation(request, CancellationToken::new())
            .await
    }

    /// Run one evaluation request under a caller-held cancellation token
    ///
    /// On cancellation the evaluator gets the configured grace period to
    /// stop on its own; after that the run is abandoned and any spawned
    /// process is killed.
    pub async fn run_with_cancellation(
        &self,
        request: &EvaluationRequest,
        cancel: CancellationToken,
    ) -> BenchResult<PackagedResult> {
        // 1. The payload variant decides the governing task
        let named = request.payload.governing_task_ids();
        if named.is_empty() {
            return Err(BenchError::NotEvaluable(request.payload.kind().to_string()));
        }
        if !named.contains(&request.task_id.as_str()) {
            return Err(BenchError::Configuration(format!(
                "request targets task '{}' but the payload names {:?}",
                request.task_id, named
            )));
        }

        // 2. Catalog lookup
        let task = self
            .catalog
            .get(&request.task_id)
            .ok_or_else(|| BenchError::TaskNotFound {
                task_id: request.task_id.clone(),
            })?;

        // 3. Verify the evaluator artifact before anything of it runs.
        // Fail-closed: any integrity fault propagates unchanged.
        let binding = &task.local_evaluator;
        let artifact_path = self.config.evaluators_root.join(&binding.code_path);
        integrity::verify_artifact(&artifact_path, &binding.verification_hash).await?;

        // 4. Closed-set evaluator resolution
        let factory = self
            .registry
            .resolve(&binding.evaluator_name, &binding.version)?;

        // 5. Fresh instance per run; no state crosses requests
        let evaluator = factory.create(task);

        let ctx = EvalContext::reserve(
            &self.config.log_root,
            task,
            &request.request_id,
            artifact_path,
            cancel.clone(),
        )
        .await?;
        let log_path = ctx.log_path().to_path_buf();

        // Serialize runs of this task if its evaluator touches a shared
        // external environment; other tasks are unaffected.
        let _guard = if factory.exclusive() {
            Some(self.task_lock(&task.task_id).lock_owned().await)
        } else {
            None
        };

        tracing::info!(
            task_id = %task.task_id,
            request_id = %request.request_id,
            evaluator = %binding.evaluator_name,
            log = %log_path.display(),
            "running evaluator"
        );

        // 6-7. The only step allowed to run untrusted, long-running logic
        let raw = self
            .execute(evaluator.as_ref(), request, &ctx, &cancel)
            .await
            .map_err(|e| attach_partial_log(e, &log_path))?;

        // 8. Package into the final tamper-evident record
        packager::package(task, raw)
    }

    /// Execute the evaluator under the timeout and cancellation policy
    async fn execute(
        &self,
        evaluator: &dyn Evaluator,
        request: &EvaluationRequest,
        ctx: &EvalContext,
        cancel: &CancellationToken,
    ) -> BenchResult<RawEvaluation> {
        let eval_fut = evaluator.evaluate(request, ctx);
        tokio::pin!(eval_fut);

        let timed = tokio::time::timeout(self.config.timeout(), async {
            tokio::select! {
                res = &mut eval_fut => res,
                _ = cancel.cancelled() => {
                    // Cooperative evaluators observe the token and return;
                    // the grace period bounds the rest. Dropping the future
                    // reclaims any spawned process via kill_on_drop.
                    match tokio::time::timeout(self.config.grace_period(), &mut eval_fut).await {
                        Ok(res) => res,
                        Err(_) => Err(BenchError::execution(
                            ExecutionErrorKind::Cancelled,
                            "cancelled; evaluator did not stop within the grace period",
                        )),
                    }
                }
            }
        })
        .await;

        match timed {
            Ok(res) => res,
            Err(_) => Err(BenchError::execution(
                ExecutionErrorKind::Timeout,
                format!(
                    "evaluator exceeded the {}s execution timeout",
                    self.config.timeout_secs
                ),
            )),
        }
    }

    fn task_lock(&self, task_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .task_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(task_id.to_string()).or_default().clone()
    }
}

/// Point execution faults at the log written before the failure, if any
fn attach_partial_log(err: BenchError, log_path: &std::path::Path) -> BenchError {
    match err {
        BenchError::Execution {
            kind,
            message,
            partial_log: None,
        } => {
            let produced = std::fs::metadata(log_path)
                .map(|m| m.len() > 0)
                .unwrap_or(false);
            BenchError::Execution {
                kind,
                message,
                partial_log: produced.then(|| log_path.to_path_buf()),
            }
        }
        other => other,
    }
}
