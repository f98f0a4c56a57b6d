//! Shared request/result shapes for the AISB evaluation platform
//!
//! This crate defines the data exchanged with the evaluation core: the
//! research output submitted by an AI scientist, the payload kinds it can
//! carry, and the tamper-evident `PerformanceMetrics` record produced by a
//! trusted evaluation run. Transport (RPC, CLI, queues) is out of scope;
//! any host marshals these shapes however it likes.

pub mod output;
pub mod paper;
pub mod request;

pub use output::{PerformanceMetrics, ResearchOutput, ResearchPayload};
pub use paper::{FigureRef, PaperContent};
pub use request::{EvaluationRequest, RequestError};
