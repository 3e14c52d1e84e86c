//! TaskStore: single-writer access to the task file
//!
//! All operations re-read the file; mutations rewrite it. One mutex serialises
//! the operations of a process so a read-modify-rewrite can't interleave with
//! another.

use parking_lot::Mutex;
use std::path::{Path, PathBuf};

use super::error::{StoreError, StoreResult};
use super::medium::{self, Table};
use super::query::{self, TaskFilter};
use super::schema::SchemaVersion;
use crate::models::{Task, TaskDraft};

pub struct TaskStore {
    path: PathBuf,
    /// Layout used when the file has to be created from scratch
    default_schema: SchemaVersion,
    lock: Mutex<()>,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>, default_schema: SchemaVersion) -> Self {
        Self {
            path: path.into(),
            default_schema,
            lock: Mutex::new(()),
        }
    }

    /// Path of the task file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn default_schema(&self) -> SchemaVersion {
        self.default_schema
    }

    fn read_table(&self) -> StoreResult<Table> {
        Ok(medium::read_table(&self.path)?.unwrap_or(Table {
            schema: self.default_schema,
            tasks: Vec::new(),
        }))
    }

    /// Every task in file order. An absent or empty file yields an empty list.
    pub fn list_all(&self) -> StoreResult<Vec<Task>> {
        let _guard = self.lock.lock();
        let tasks = self.read_table()?.tasks;
        log::debug!("[TASKS] Read {} tasks from {:?}", tasks.len(), self.path);
        Ok(tasks)
    }

    /// Tasks matching the status/title filter
    pub fn list(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        Ok(filter.apply(self.list_all()?))
    }

    /// Tasks whose title or description contains `keyword`, ignoring case
    pub fn search(&self, keyword: &str) -> StoreResult<Vec<Task>> {
        Ok(query::search(self.list_all()?, keyword))
    }

    pub fn get_by_id(&self, id: u64) -> StoreResult<Option<Task>> {
        Ok(self.list_all()?.into_iter().find(|t| t.id == id))
    }

    pub fn count(&self) -> StoreResult<usize> {
        Ok(self.list_all()?.len())
    }

    /// One past the largest integer id in the file, or 1 when there is none
    pub fn get_next_id(&self) -> StoreResult<u64> {
        let _guard = self.lock.lock();
        Ok(self.next_slot()?.0)
    }

    /// Next id plus the layout new rows are written in. Caller holds the lock.
    fn next_slot(&self) -> StoreResult<(u64, SchemaVersion)> {
        let scan = medium::scan_ids(&self.path)?;
        let id = next_id(&scan.ids).ok_or_else(|| StoreError::IdsExhausted {
            path: self.path.clone(),
        })?;
        Ok((id, scan.schema.unwrap_or(self.default_schema)))
    }

    /// Assign the next id and append the task as a new row.
    ///
    /// A priority the file's layout can't hold upgrades the file to V2 first.
    pub fn create(&self, draft: TaskDraft) -> StoreResult<Task> {
        let _guard = self.lock.lock();

        let (id, schema) = self.next_slot()?;
        let task = Task::from_draft(id, draft);

        let widened = schema.widened_for(std::slice::from_ref(&task));
        if widened == schema {
            medium::append_task(&self.path, schema, &task)?;
        } else {
            let mut table = self.read_table()?;
            table.tasks.push(task.clone());
            medium::rewrite_table(&self.path, widened, &table.tasks)?;
            log::info!("[TASKS] Upgraded {:?} to schema v{}", self.path, widened.as_number());
        }

        log::info!("[TASKS] Created task {} ({:?})", task.id, task.title);
        Ok(task)
    }

    /// Replace the candidate fields of task `id` and rewrite the file.
    ///
    /// The file is rewritten even when no task matches.
    pub fn update(&self, id: u64, draft: TaskDraft) -> StoreResult<Option<Task>> {
        let _guard = self.lock.lock();

        let mut table = self.read_table()?;
        let mut updated = None;
        if let Some(task) = table.tasks.iter_mut().find(|t| t.id == id) {
            task.replace_with(draft);
            updated = Some(task.clone());
        }

        let schema = table.schema.widened_for(&table.tasks);
        if schema != table.schema {
            log::info!("[TASKS] Upgraded {:?} to schema v{}", self.path, schema.as_number());
        }
        medium::rewrite_table(&self.path, schema, &table.tasks)?;

        match &updated {
            Some(_) => log::info!("[TASKS] Updated task {}", id),
            None => log::debug!("[TASKS] Update of unknown task {}", id),
        }
        Ok(updated)
    }

    /// Rewrite the file without task `id`, returning the removed task.
    ///
    /// The file is rewritten even when no task matches.
    pub fn delete(&self, id: u64) -> StoreResult<Option<Task>> {
        let _guard = self.lock.lock();

        let table = self.read_table()?;
        let mut deleted = None;
        let mut kept = Vec::with_capacity(table.tasks.len());
        for task in table.tasks {
            if deleted.is_none() && task.id == id {
                deleted = Some(task);
            } else {
                kept.push(task);
            }
        }

        medium::rewrite_table(&self.path, table.schema, &kept)?;

        match &deleted {
            Some(_) => log::info!("[TASKS] Deleted task {}", id),
            None => log::debug!("[TASKS] Delete of unknown task {}", id),
        }
        Ok(deleted)
    }
}

/// None when the largest id is already `u64::MAX`
fn next_id(ids: &[u64]) -> Option<u64> {
    match ids.iter().max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}
