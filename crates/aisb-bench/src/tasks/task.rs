//! Benchmark task definition types
//!
//! One `TaskDefinition` per registered benchmark task, loaded from a
//! structured record and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::integrity::PinnedHash;

/// Where a task comes from in the literature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub paper_title: String,
    pub paper_url: String,
    pub leaderboard_url: String,
}

/// One metric the task is scored on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSpec {
    /// Metric name, matched against evaluator output keys
    pub name: String,
    pub description: String,
    pub higher_is_better: bool,
}

/// The state-of-the-art baseline the task ships with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SotaBaseline {
    pub method_name: String,
    pub method_id: String,
    /// Baseline scores, keyed like the task's metric schema
    pub score: BTreeMap<String, serde_json::Value>,
    pub method_summary: String,
    /// How to run the baseline, e.g. {"command": "./run.sh"}
    #[serde(default)]
    pub execution: BTreeMap<String, String>,
}

/// Which evaluator implementation answers for a task
///
/// `code_path` is resolved against the configured evaluators root;
/// `verification_hash` pins that artifact's exact byte content at
/// registration time. A malformed hash string fails record deserialization,
/// so it surfaces as a configuration fault during catalog load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorBinding {
    /// Symbolic name resolved through the evaluator registry
    pub evaluator_name: String,
    pub version: String,
    /// Artifact location, relative to the evaluators root
    pub code_path: PathBuf,
    pub verification_hash: PinnedHash,
}

/// An immutable benchmark task definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
    /// Globally unique task ID, e.g. "agent-swe-bench-v1"
    pub task_id: String,

    pub task_name: String,
    pub version: String,

    /// Domain tag, e.g. "software_engineering"
    pub domain: String,
    pub sub_domain: String,

    pub task_description: String,

    pub source: SourceInfo,

    /// Ordered metric schema
    pub metrics: Vec<MetricSpec>,

    pub sota_baseline: SotaBaseline,

    /// The task's registered trusted evaluator
    pub local_evaluator: EvaluatorBinding,
}

impl TaskDefinition {
    /// Names in the task's declared metric schema, in declaration order
    pub fn metric_names(&self) -> Vec<&str> {
        self.metrics.iter().map(|m| m.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TASK_JSON: &str = r#"{
        "task_id": "agent-swe-bench-v1",
        "task_name": "SWE-bench",
        "version": "1.0",
        "domain": "software_engineering",
        "sub_domain": "program_repair",
        "task_description": "Resolve real GitHub issues.",
        "source": {
            "paper_title": "SWE-bench",
            "paper_url": "https://example.org/paper",
            "leaderboard_url": "https://example.org/board"
        },
        "metrics": [
            {"name": "resolved_at_1", "description": "Resolved @1", "higher_is_better": true},
            {"name": "execution_time_s", "description": "Wall time", "higher_is_better": false}
        ],
        "sota_baseline": {
            "method_name": "GPT-4 agent",
            "method_id": "sota-001",
            "score": {"resolved_at_1": 0.1386},
            "method_summary": "Agentic baseline",
            "execution": {"command": "./run.sh"}
        },
        "local_evaluator": {
            "evaluator_name": "swe_bench_v1",
            "version": "1.0",
            "code_path": "evaluators/swe_bench_v1.rs",
            "verification_hash": "sha256:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
        }
    }"#;

    #[test]
    fn test_task_record_parses() {
        let task: TaskDefinition = serde_json::from_str(TASK_JSON).unwrap();
        assert_eq!(task.task_id, "agent-swe-bench-v1");
        assert_eq!(
            task.metric_names(),
            vec!["resolved_at_1", "execution_time_s"]
        );
        assert_eq!(task.local_evaluator.evaluator_name, "swe_bench_v1");
    }

    #[test]
    fn test_malformed_pin_fails_deserialization() {
        let bad = TASK_JSON.replace("sha256:", "sha1:");
        assert!(serde_json::from_str::<TaskDefinition>(&bad).is_err());
    }
}
