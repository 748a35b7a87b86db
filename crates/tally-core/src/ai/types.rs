//! AI backend types shared by every implementation

use serde::Serialize;

use crate::model_router::{ModelRouter, TaskType};

/// Router configuration information for display
#[derive(Debug, Clone, Serialize)]
pub struct RouterInfo {
    /// Model used when a task has nothing pinned
    pub default_model: String,
    /// Fallback model when primary fails
    pub fallback_model: Option<String>,
    /// Task-specific model overrides (only non-default)
    pub task_models: Vec<(String, String)>,
}

impl RouterInfo {
    /// Summarise a router from the point of view of a backend's own model
    pub fn from_router(router: &ModelRouter, default_model: &str) -> Self {
        let task_models = TaskType::all()
            .iter()
            .filter_map(|task| {
                let model = router.resolve_model(*task, default_model);
                (model != default_model).then(|| (task.as_str().to_string(), model))
            })
            .collect();

        Self {
            default_model: default_model.to_string(),
            fallback_model: router.fallback_model().map(str::to_string),
            task_models,
        }
    }
}
