//! Research output payloads and the performance record they are scored into

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::paper::PaperContent;

/// Tamper-evident record of scores on one benchmark task
///
/// Produced exactly once per successful evaluation run and never mutated
/// afterwards. `raw_eval_log` points at the write-once log artifact the
/// evaluator produced during that run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Unique ID of the task that was evaluated
    pub task_id: String,

    /// Metric name to score, exactly as the evaluator produced it
    pub scores: BTreeMap<String, serde_json::Value>,

    /// Path to the immutable raw evaluation log
    pub raw_eval_log: PathBuf,

    /// When the record was assembled
    pub recorded_at: DateTime<Utc>,
}

/// The result-submission kinds a research output can carry
///
/// Closed set, dispatched by the `type` tag. The evaluation core pattern
/// matches on the variant to find the governing task; it never probes for
/// optional fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResearchPayload {
    /// An improvement over a known baseline on one benchmark task
    Improvement {
        /// The task the improvement targets
        task_id: String,
        /// Directory containing the modified code under evaluation
        modified_code_dir: PathBuf,
        /// Short report on method, setup, and results
        report: PaperContent,
        /// Performance the submitter claims; the trusted run decides
        #[serde(default)]
        claimed_gain: Vec<PerformanceMetrics>,
    },

    /// Experimental findings with supporting data
    Findings {
        report: PaperContent,
        experimental_data: PathBuf,
        #[serde(default)]
        proposed_benchmark_package: Option<PathBuf>,
    },

    /// A literature survey
    Survey { survey_paper: PaperContent },

    /// A new benchmark package with its technical paper
    Benchmark {
        /// Complete, runnable benchmark package (data, scoring, docs)
        benchmark_package: PathBuf,
        technical_paper: PaperContent,
    },

    /// A technique applied to one or more existing benchmark tasks
    TechniqueReport {
        technical_paper: PaperContent,
        /// Tasks the technique was applied to, one evaluation request each
        target_task_ids: Vec<String>,
        source_code_dir: PathBuf,
    },
}

impl ResearchPayload {
    /// The wire tag for this payload kind
    pub fn kind(&self) -> &'static str {
        match self {
            ResearchPayload::Improvement { .. } => "improvement",
            ResearchPayload::Findings { .. } => "findings",
            ResearchPayload::Survey { .. } => "survey",
            ResearchPayload::Benchmark { .. } => "benchmark",
            ResearchPayload::TechniqueReport { .. } => "technique_report",
        }
    }

    /// Task IDs this payload claims results on
    ///
    /// Empty for payload kinds that are not scored against a catalog task
    /// (findings, surveys).
    pub fn governing_task_ids(&self) -> Vec<&str> {
        match self {
            ResearchPayload::Improvement { task_id, .. } => vec![task_id.as_str()],
            ResearchPayload::TechniqueReport { target_task_ids, .. } => {
                target_task_ids.iter().map(String::as_str).collect()
            }
            ResearchPayload::Benchmark { .. }
            | ResearchPayload::Findings { .. }
            | ResearchPayload::Survey { .. } => Vec::new(),
        }
    }

    /// Whether a trusted evaluator can score this payload
    pub fn is_evaluable(&self) -> bool {
        !self.governing_task_ids().is_empty()
    }

    /// The directory of submitted artifacts an evaluator operates on
    pub fn artifact_dir(&self) -> Option<&Path> {
        match self {
            ResearchPayload::Improvement {
                modified_code_dir, ..
            } => Some(modified_code_dir),
            ResearchPayload::TechniqueReport {
                source_code_dir, ..
            } => Some(source_code_dir),
            ResearchPayload::Benchmark {
                benchmark_package, ..
            } => Some(benchmark_package),
            ResearchPayload::Findings {
                experimental_data, ..
            } => Some(experimental_data),
            ResearchPayload::Survey { .. } => None,
        }
    }
}

/// A complete research output submitted for review
///
/// Caller-constructed and read-only once submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchOutput {
    /// ID of the research request this output answers
    pub request_id: String,

    pub payload: ResearchPayload,

    /// Full logbook of the research process, for traceability review
    pub logbook_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> PaperContent {
        PaperContent::new("T", "A", "B")
    }

    #[test]
    fn test_payload_tag_round_trip() {
        let payload = ResearchPayload::Improvement {
            task_id: "agent-swe-bench-v1".to_string(),
            modified_code_dir: PathBuf::from("/tmp/patch"),
            report: report(),
            claimed_gain: Vec::new(),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "improvement");
        assert_eq!(json["task_id"], "agent-swe-bench-v1");

        let back: ResearchPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_governing_task_ids() {
        let payload = ResearchPayload::TechniqueReport {
            technical_paper: report(),
            target_task_ids: vec!["t-1".to_string(), "t-2".to_string()],
            source_code_dir: PathBuf::from("/tmp/src"),
        };
        assert_eq!(payload.governing_task_ids(), vec!["t-1", "t-2"]);
        assert!(payload.is_evaluable());

        let survey = ResearchPayload::Survey {
            survey_paper: report(),
        };
        assert!(survey.governing_task_ids().is_empty());
        assert!(!survey.is_evaluable());
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let json = r#"{"type": "poetry", "task_id": "x"}"#;
        assert!(serde_json::from_str::<ResearchPayload>(json).is_err());
    }
}
