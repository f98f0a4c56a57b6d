//! The unit of work submitted to the evaluation runner

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::output::{ResearchOutput, ResearchPayload};

/// Errors raised while forming an evaluation request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The payload kind carries nothing a trusted evaluator can score
    #[error("research type '{0}' is not evaluable")]
    NotEvaluable(String),

    /// The requested task is not among the tasks the payload claims
    #[error("payload does not name task '{task_id}' (it names: {named:?})")]
    TaskNotNamed { task_id: String, named: Vec<String> },
}

/// One evaluation to run: a payload scored against exactly one task
///
/// Payload kinds that name several tasks (technique reports) are split into
/// one request per task by the caller; the core never batches across tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// ID of the originating research request
    pub request_id: String,

    /// The task to evaluate against
    pub task_id: String,

    pub payload: ResearchPayload,
}

impl EvaluationRequest {
    /// Build a request scoring `output` against one of the tasks it names
    pub fn for_task(output: &ResearchOutput, task_id: &str) -> Result<Self, RequestError> {
        let named = output.payload.governing_task_ids();
        if named.is_empty() {
            return Err(RequestError::NotEvaluable(
                output.payload.kind().to_string(),
            ));
        }
        if !named.contains(&task_id) {
            return Err(RequestError::TaskNotNamed {
                task_id: task_id.to_string(),
                named: named.into_iter().map(String::from).collect(),
            });
        }

        Ok(Self {
            request_id: output.request_id.clone(),
            task_id: task_id.to_string(),
            payload: output.payload.clone(),
        })
    }

    /// One request per task the output claims results on
    pub fn fan_out(output: &ResearchOutput) -> Result<Vec<Self>, RequestError> {
        let named = output.payload.governing_task_ids();
        if named.is_empty() {
            return Err(RequestError::NotEvaluable(
                output.payload.kind().to_string(),
            ));
        }
        Ok(named
            .into_iter()
            .map(|task_id| Self {
                request_id: output.request_id.clone(),
                task_id: task_id.to_string(),
                payload: output.payload.clone(),
            })
            .collect())
    }
}
