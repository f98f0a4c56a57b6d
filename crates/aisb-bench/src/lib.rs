//! AISB trusted evaluation core
//!
//! Evaluates machine-generated research artifacts against a fixed catalog
//! of benchmark tasks, each carrying hash-pinned evaluator logic:
//!
//! - **Task catalog**: immutable task definitions loaded from structured
//!   records, indexed by task ID
//! - **Integrity verification**: evaluator artifacts are hashed and checked
//!   against their registration-time pin before anything of them runs
//! - **Evaluator registry**: a closed, compile-time set of evaluator
//!   implementations keyed by symbolic name; no dynamic code loading
//! - **Evaluation runner**: resolve, verify, execute under timeout and
//!   cancellation, package into a tamper-evident performance record
//!
//! # Example
//!
//! ```rust,ignore
//! use aisb_bench::{EvalRunner, EvaluatorRegistry, RunnerConfig, TaskCatalog};
//! use std::sync::Arc;
//!
//! let config = RunnerConfig::new("tasks", "evaluators", "logs");
//! let catalog = Arc::new(TaskCatalog::load(&config.catalog_dir)?);
//! let registry = Arc::new(EvaluatorRegistry::builtin());
//! let runner = EvalRunner::new(config, catalog, registry);
//! let packaged = runner.run(&request).await?;
//! ```

pub mod error;
pub mod integrity;
pub mod packager;
pub mod registry;
pub mod runner;
pub mod tasks;

// Re-exports for convenience
pub use error::{BenchError, BenchResult, ExecutionErrorKind};
pub use integrity::{verify_artifact, HashAlgorithm, PinnedHash};
pub use packager::{PackagedResult, SchemaAdvisory};
pub use registry::{Evaluator, EvaluatorFactory, EvaluatorRegistry, RawEvaluation};
pub use runner::{EvalContext, EvalRunner, RunnerConfig};
pub use tasks::{EvaluatorBinding, MetricSpec, TaskCatalog, TaskDefinition};
