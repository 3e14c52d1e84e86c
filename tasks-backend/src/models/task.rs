//! Task records and the candidate shapes callers submit for them.
//!
//! `Task` is the current (version 2) shape. Version 1 callers see the
//! `TaskV1` projection, which simply omits `priority`.

use serde::{Deserialize, Serialize};

/// Priority assigned when a record or candidate doesn't carry one.
pub const DEFAULT_PRIORITY: &str = "lower";

/// A stored task, decoded into the current schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
}

impl Task {
    /// Build a new record from a candidate, filling the default priority.
    pub fn from_draft(id: u64, draft: TaskDraft) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            status: draft.status,
            priority: draft.priority.unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
        }
    }

    /// Replace every field the candidate carries. The id never changes.
    ///
    /// A version 1 candidate has no priority, so the stored one is kept.
    pub fn replace_with(&mut self, draft: TaskDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.status = draft.status;
        if let Some(priority) = draft.priority {
            self.priority = priority;
        }
    }
}

/// Version 1 view of a task (no priority).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskV1 {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub status: String,
}

impl From<Task> for TaskV1 {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
        }
    }
}

/// Caller-supplied fields for create and update. Never carries an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: String,
    /// `None` when the candidate's schema has no priority field.
    pub priority: Option<String>,
}

impl TaskDraft {
    pub fn new(title: &str, description: &str, status: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            status: status.to_string(),
            priority: None,
        }
    }

    pub fn with_priority(mut self, priority: &str) -> Self {
        self.priority = Some(priority.to_string());
        self
    }

    /// Check the candidate before it reaches the store
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        Ok(())
    }
}

/// Request body for version 1 create/update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: String,
}

impl From<NewTask> for TaskDraft {
    fn from(req: NewTask) -> Self {
        Self {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: None,
        }
    }
}

/// Request body for version 2 create/update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTaskV2 {
    pub title: String,
    pub description: String,
    pub status: String,
    #[serde(default)]
    pub priority: Option<String>,
}

impl From<NewTaskV2> for TaskDraft {
    // The v2 schema always has a priority: an omitted one means the default.
    fn from(req: NewTaskV2) -> Self {
        Self {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: Some(req.priority.unwrap_or_else(|| DEFAULT_PRIORITY.to_string())),
        }
    }
}
