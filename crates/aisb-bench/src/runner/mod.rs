//! Evaluation runner: resolve, verify, execute, package

mod config;
mod context;
mod executor;

pub use config::RunnerConfig;
pub use context::EvalContext;
pub use executor::EvalRunner;
