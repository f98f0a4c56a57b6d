//! Evaluator registry: a closed, compile-time set of evaluator implementations
//!
//! Every evaluator the system can run is registered here under a symbolic
//! name. Task records refer to evaluators by that name; nothing is ever
//! loaded or instantiated from a path string, which removes the
//! arbitrary-code-execution surface of dynamic module loading. An
//! unrecognized name is a configuration fault, not a security incident.

mod builtin;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;

use aisb_protocol::EvaluationRequest;

use crate::error::{BenchError, BenchResult};
use crate::runner::EvalContext;
use crate::tasks::TaskDefinition;

pub use builtin::{ArtifactAuditEvaluator, PatchHarnessEvaluator};

/// Raw output of one evaluator execution
#[derive(Debug, Clone)]
pub struct RawEvaluation {
    /// Metric name to score, as produced by the evaluator
    pub scores: BTreeMap<String, serde_json::Value>,
    /// The log artifact the evaluator wrote during execution
    pub log_path: PathBuf,
}

/// A live evaluator bound to exactly one task
///
/// Instances are created fresh per run and never reused across requests, so
/// no state can leak between evaluations of different artifacts. Execution
/// is the only place in the pipeline allowed to run untrusted or
/// long-running logic; it happens strictly after the integrity check.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Score the request's payload, producing scores plus a log artifact
    async fn evaluate(
        &self,
        request: &EvaluationRequest,
        ctx: &EvalContext,
    ) -> BenchResult<RawEvaluation>;
}

/// Produces evaluator instances for a task
pub trait EvaluatorFactory: Send + Sync {
    /// Create a fresh instance bound to `task`
    fn create(&self, task: &TaskDefinition) -> Box<dyn Evaluator>;

    /// Whether runs for the same task must be serialized
    ///
    /// True when execution mutates a shared external resource (e.g. a
    /// shared benchmark environment). Distinct tasks always run in
    /// parallel; this only gates runs of one task.
    fn exclusive(&self) -> bool {
        false
    }
}

impl std::fmt::Debug for dyn EvaluatorFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EvaluatorFactory")
    }
}

/// Closed mapping from evaluator name to a registered factory
pub struct EvaluatorRegistry {
    factories: HashMap<String, Arc<dyn EvaluatorFactory>>,
}

impl EvaluatorRegistry {
    /// An empty registry; hosts compose their own evaluator set
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// The registry of evaluators compiled into this crate
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("patch_harness_v1", Arc::new(builtin::PatchHarnessFactory));
        registry.register("artifact_audit_v1", Arc::new(builtin::ArtifactAuditFactory));
        registry
    }

    /// Register a factory under a symbolic evaluator name
    ///
    /// Re-registering a name replaces the previous factory; the set is
    /// still closed because registration only happens at composition time.
    pub fn register(&mut self, name: impl Into<String>, factory: Arc<dyn EvaluatorFactory>) {
        self.factories.insert(name.into(), factory);
    }

    /// Resolve the factory registered under `name`
    ///
    /// `version` is carried for diagnostics; the name alone selects the
    /// implementation. There is deliberately no fallback evaluator.
    pub fn resolve(
        &self,
        name: &str,
        version: &str,
    ) -> BenchResult<Arc<dyn EvaluatorFactory>> {
        self.factories
            .get(name)
            .cloned()
            .ok_or_else(|| BenchError::UnknownEvaluator {
                name: name.to_string(),
                version: version.to_string(),
            })
    }

    /// Registered evaluator names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for EvaluatorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_set() {
        let registry = EvaluatorRegistry::builtin();
        assert_eq!(
            registry.names(),
            vec!["artifact_audit_v1", "patch_harness_v1"]
        );
        assert!(registry.resolve("patch_harness_v1", "1.0").is_ok());
    }

    #[test]
    fn test_unregistered_name_never_falls_back() {
        let registry = EvaluatorRegistry::builtin();
        let err = registry.resolve("mystery_eval", "9.9").unwrap_err();
        match err {
            BenchError::UnknownEvaluator { name, version } => {
                assert_eq!(name, "mystery_eval");
                assert_eq!(version, "9.9");
            }
            other => panic!("expected UnknownEvaluator, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_registry_resolves_nothing() {
        let registry = EvaluatorRegistry::new();
        assert!(registry.resolve("patch_harness_v1", "1.0").is_err());
    }
}
