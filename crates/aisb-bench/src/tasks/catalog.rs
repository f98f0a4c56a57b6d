//! Task catalog loading and lookup
//!
//! Loads every structured task record (YAML or JSON) under a directory and
//! indexes it by task ID. The catalog is built once at process start and
//! shared read-only; concurrent readers never block each other.

use std::collections::HashMap;
use std::path::Path;

use walkdir::WalkDir;

use super::TaskDefinition;
use crate::error::{BenchError, BenchResult};

/// Read-only index of registered benchmark tasks
#[derive(Debug, Default)]
pub struct TaskCatalog {
    tasks: HashMap<String, TaskDefinition>,
}

impl TaskCatalog {
    /// Load all task records under `tasks_dir`
    ///
    /// Any malformed record or duplicate task ID aborts the whole load; an
    /// operator either gets the full catalog or a configuration fault. A
    /// missing directory is tolerated (a host may run with zero tasks
    /// registered) and yields an empty catalog with a warning.
    pub fn load(tasks_dir: impl AsRef<Path>) -> BenchResult<Self> {
        let tasks_dir = tasks_dir.as_ref();
        let mut tasks: HashMap<String, TaskDefinition> = HashMap::new();

        if !tasks_dir.is_dir() {
            tracing::warn!(
                dir = %tasks_dir.display(),
                "task catalog directory missing, starting with empty catalog"
            );
            return Ok(Self { tasks });
        }

        for entry in WalkDir::new(tasks_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !Self::is_task_record(path) {
                continue;
            }

            let task = Self::load_record(path)?;
            if let Some(previous) = tasks.get(&task.task_id) {
                return Err(BenchError::Configuration(format!(
                    "duplicate task_id '{}' in '{}' (already loaded as '{}')",
                    task.task_id,
                    path.display(),
                    previous.task_name,
                )));
            }
            tasks.insert(task.task_id.clone(), task);
        }

        tracing::info!(count = tasks.len(), dir = %tasks_dir.display(), "task catalog loaded");
        Ok(Self { tasks })
    }

    /// Parse a single task record, YAML or JSON by extension
    fn load_record(path: &Path) -> BenchResult<TaskDefinition> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BenchError::Io(format!("failed to read '{}': {}", path.display(), e)))?;

        if path.extension().is_some_and(|ext| ext == "yaml" || ext == "yml") {
            serde_yaml::from_str(&content).map_err(|e| {
                BenchError::Configuration(format!(
                    "malformed task record '{}': {}",
                    path.display(),
                    e
                ))
            })
        } else {
            serde_json::from_str(&content).map_err(|e| {
                BenchError::Configuration(format!(
                    "malformed task record '{}': {}",
                    path.display(),
                    e
                ))
            })
        }
    }

    fn is_task_record(path: &Path) -> bool {
        if !path.is_file() {
            return false;
        }
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml") | Some("json")
        )
    }

    /// Number of registered tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Look up one task by ID
    pub fn get(&self, task_id: &str) -> Option<&TaskDefinition> {
        self.tasks.get(task_id)
    }

    /// All registered tasks, ordered by task ID
    pub fn list(&self) -> Vec<&TaskDefinition> {
        let mut tasks: Vec<_> = self.tasks.values().collect();
        tasks.sort_by(|a, b| a.task_id.cmp(&b.task_id));
        tasks
    }

    /// Tasks whose domain tag matches `domain`, case-insensitively
    pub fn list_by_domain(&self, domain: &str) -> Vec<&TaskDefinition> {
        let mut tasks: Vec<_> = self
            .tasks
            .values()
            .filter(|t| t.domain.eq_ignore_ascii_case(domain))
            .collect();
        tasks.sort_by(|a, b| a.task_id.cmp(&b.task_id));
        tasks
    }
}
