//! Benchmark task definitions and the catalog that indexes them

mod catalog;
mod task;

pub use catalog::TaskCatalog;
pub use task::{EvaluatorBinding, MetricSpec, SotaBaseline, SourceInfo, TaskDefinition};
