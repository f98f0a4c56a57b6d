//! Result packaging
//!
//! Pure assembly of an evaluator's raw output into the final
//! `PerformanceMetrics` record. The packager is a transparent carrier: it
//! never re-scores, and metric keys that diverge from the task's declared
//! schema are reported as advisories, not rejected.

use std::collections::BTreeSet;
use std::fs::File;

use chrono::Utc;

use aisb_protocol::PerformanceMetrics;

use crate::error::{BenchError, BenchResult};
use crate::registry::RawEvaluation;
use crate::tasks::TaskDefinition;

/// A divergence between produced scores and the task's metric schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaAdvisory {
    /// The task declares this metric but the evaluator did not produce it
    MissingMetric(String),
    /// The evaluator produced a metric the task does not declare
    UnexpectedMetric(String),
}

impl std::fmt::Display for SchemaAdvisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaAdvisory::MissingMetric(name) => {
                write!(f, "declared metric '{}' missing from scores", name)
            }
            SchemaAdvisory::UnexpectedMetric(name) => {
                write!(f, "score key '{}' not in declared metric schema", name)
            }
        }
    }
}

/// A packaged evaluation result plus any schema advisories
#[derive(Debug, Clone)]
pub struct PackagedResult {
    pub metrics: PerformanceMetrics,
    /// Divergences between scores and the declared schema; advisory only
    pub advisories: Vec<SchemaAdvisory>,
}

/// Assemble the final performance record for a completed run
///
/// A record must always be traceable to a concrete, inspectable log, so a
/// missing or unreadable log artifact fails the packaging step.
pub fn package(task: &TaskDefinition, raw: RawEvaluation) -> BenchResult<PackagedResult> {
    if !raw.log_path.is_file() {
        return Err(BenchError::ArtifactNotFound {
            path: raw.log_path.clone(),
        });
    }
    File::open(&raw.log_path).map_err(|e| {
        BenchError::Io(format!(
            "evaluation log '{}' is not readable: {}",
            raw.log_path.display(),
            e
        ))
    })?;

    let declared: BTreeSet<&str> = task.metric_names().into_iter().collect();
    let produced: BTreeSet<&str> = raw.scores.keys().map(String::as_str).collect();

    let mut advisories = Vec::new();
    for name in declared.difference(&produced) {
        advisories.push(SchemaAdvisory::MissingMetric((*name).to_string()));
    }
    for name in produced.difference(&declared) {
        advisories.push(SchemaAdvisory::UnexpectedMetric((*name).to_string()));
    }
    if !advisories.is_empty() {
        tracing::warn!(
            task_id = %task.task_id,
            advisories = advisories.len(),
            "evaluator scores diverge from the declared metric schema"
        );
    }

    Ok(PackagedResult {
        metrics: PerformanceMetrics {
            task_id: task.task_id.clone(),
            scores: raw.scores,
            raw_eval_log: raw.log_path,
            recorded_at: Utc::now(),
        },
        advisories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn task() -> TaskDefinition {
        serde_json::from_value(serde_json::json!({
            "task_id": "task-p",
            "task_name": "Pack",
            "version": "1.0",
            "domain": "nlp",
            "sub_domain": "general",
            "task_description": "d",
            "source": {"paper_title": "p", "paper_url": "u", "leaderboard_url": "l"},
            "metrics": [
                {"name": "accuracy", "description": "a", "higher_is_better": true},
                {"name": "latency_ms", "description": "lat", "higher_is_better": false}
            ],
            "sota_baseline": {
                "method_name": "m", "method_id": "m-1",
                "score": {"accuracy": 0.9}, "method_summary": "s"
            },
            "local_evaluator": {
                "evaluator_name": "noop", "version": "1.0",
                "code_path": "noop.rs",
                "verification_hash": format!("sha256:{}", "ab".repeat(32))
            }
        }))
        .unwrap()
    }

    fn raw(dir: &TempDir, scores: BTreeMap<String, serde_json::Value>) -> RawEvaluation {
        let log_path = dir.path().join("run.log");
        std::fs::write(&log_path, "log line\n").unwrap();
        RawEvaluation { scores, log_path }
    }

    #[test]
    fn test_package_carries_scores_verbatim() {
        let dir = TempDir::new().unwrap();
        let mut scores = BTreeMap::new();
        scores.insert("accuracy".to_string(), serde_json::json!(0.97));
        scores.insert("latency_ms".to_string(), serde_json::json!(150));

        let packaged = package(&task(), raw(&dir, scores.clone())).unwrap();
        assert_eq!(packaged.metrics.task_id, "task-p");
        assert_eq!(packaged.metrics.scores, scores);
        assert!(packaged.advisories.is_empty());
    }

    #[test]
    fn test_divergent_keys_reported_not_rejected() {
        let dir = TempDir::new().unwrap();
        let mut scores = BTreeMap::new();
        scores.insert("accuracy".to_string(), serde_json::json!(0.97));
        scores.insert("gpu_hours".to_string(), serde_json::json!(4.2));

        let packaged = package(&task(), raw(&dir, scores)).unwrap();
        assert_eq!(packaged.advisories.len(), 2);
        assert!(packaged
            .advisories
            .contains(&SchemaAdvisory::MissingMetric("latency_ms".to_string())));
        assert!(packaged
            .advisories
            .contains(&SchemaAdvisory::UnexpectedMetric("gpu_hours".to_string())));
        // Extra key still carried
        assert!(packaged.metrics.scores.contains_key("gpu_hours"));
    }

    #[test]
    fn test_missing_log_fails_packaging() {
        let raw = RawEvaluation {
            scores: BTreeMap::new(),
            log_path: PathBuf::from("/nonexistent/run.log"),
        };
        let err = package(&task(), raw).unwrap_err();
        assert!(matches!(err, BenchError::ArtifactNotFound { .. }));
    }
}
