//! Row layouts of the task file.
//!
//! Version 1 files have the columns `id,title,description,status`; version 2
//! adds `priority`. Both decode into the same `Task`, with a missing or empty
//! priority filled in as `DEFAULT_PRIORITY`.

use csv::StringRecord;
use serde::Deserialize;

use crate::models::{DEFAULT_PRIORITY, Task};

/// Columns every layout must carry
pub const REQUIRED_COLUMNS: [&str; 4] = ["id", "title", "description", "status"];

pub const PRIORITY_COLUMN: &str = "priority";

const V2_COLUMNS: [&str; 5] = ["id", "title", "description", "status", PRIORITY_COLUMN];

/// Physical layout of the task file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaVersion {
    #[default]
    V1,
    V2,
}

impl SchemaVersion {
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(SchemaVersion::V1),
            2 => Some(SchemaVersion::V2),
            _ => None,
        }
    }

    pub fn as_number(&self) -> u8 {
        match self {
            SchemaVersion::V1 => 1,
            SchemaVersion::V2 => 2,
        }
    }

    /// Header row written for this layout
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            SchemaVersion::V1 => &REQUIRED_COLUMNS,
            SchemaVersion::V2 => &V2_COLUMNS,
        }
    }

    /// Work out the layout of an existing header row.
    ///
    /// Extra unknown columns are tolerated; a missing required one is not.
    pub fn detect(headers: &StringRecord) -> Result<Self, String> {
        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|col| !headers.iter().any(|h| h.trim() == **col))
        {
            return Err(format!("header is missing required column '{}'", missing));
        }

        if headers.iter().any(|h| h.trim() == PRIORITY_COLUMN) {
            Ok(SchemaVersion::V2)
        } else {
            Ok(SchemaVersion::V1)
        }
    }

    /// Field values of one row, in `columns()` order
    pub fn encode(&self, task: &Task) -> Vec<String> {
        let mut fields = vec![
            task.id.to_string(),
            task.title.clone(),
            task.description.clone(),
            task.status.clone(),
        ];
        if *self == SchemaVersion::V2 {
            fields.push(task.priority.clone());
        }
        fields
    }

    /// Layout able to hold every field of `tasks`. V1 widens to V2 once a
    /// task carries a priority other than the default.
    pub fn widened_for(self, tasks: &[Task]) -> Self {
        match self {
            SchemaVersion::V1 if tasks.iter().any(|t| t.priority != DEFAULT_PRIORITY) => {
                SchemaVersion::V2
            }
            other => other,
        }
    }
}

/// Raw row as stored. `id` stays textual until validated.
#[derive(Debug, Deserialize)]
struct TaskRow {
    id: String,
    title: String,
    description: String,
    status: String,
    #[serde(default)]
    priority: Option<String>,
}

/// Decode one row into the current schema
pub fn decode(record: &StringRecord, headers: &StringRecord) -> Result<Task, String> {
    let row: TaskRow = record
        .deserialize(Some(headers))
        .map_err(|e| e.to_string())?;

    let id = parse_id(&row.id).ok_or_else(|| format!("id '{}' is not an integer", row.id))?;

    let priority = match row.priority {
        Some(p) if !p.is_empty() => p,
        _ => DEFAULT_PRIORITY.to_string(),
    };

    Ok(Task {
        id,
        title: row.title,
        description: row.description,
        status: row.status,
        priority,
    })
}

pub fn parse_id(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}
