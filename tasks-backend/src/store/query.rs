//! In-memory filters over a full read of the task file.

use serde::Deserialize;

use crate::models::Task;

/// Exact, case-insensitive match on status and/or title.
/// A `None` field places no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskFilter {
    pub status: Option<String>,
    pub title: Option<String>,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.title.is_none()
    }

    pub fn matches(&self, task: &Task) -> bool {
        let status_ok = self
            .status
            .as_ref()
            .map_or(true, |s| task.status.to_lowercase() == s.to_lowercase());
        let title_ok = self
            .title
            .as_ref()
            .map_or(true, |t| task.title.to_lowercase() == t.to_lowercase());
        status_ok && title_ok
    }

    pub fn apply(&self, tasks: Vec<Task>) -> Vec<Task> {
        if self.is_empty() {
            return tasks;
        }
        tasks.into_iter().filter(|t| self.matches(t)).collect()
    }
}

/// Keep tasks whose title or description contains `keyword`, ignoring case
pub fn search(tasks: Vec<Task>, keyword: &str) -> Vec<Task> {
    let needle = keyword.to_lowercase();
    tasks
        .into_iter()
        .filter(|t| {
            t.title.to_lowercase().contains(&needle)
                || t.description.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: u64, title: &str, description: &str, status: &str) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: description.to_string(),
            status: status.to_string(),
            priority: "lower".to_string(),
        }
    }

    fn sample() -> Vec<Task> {
        vec![
            task(1, "Buy milk", "From the corner shop", "Incomplete"),
            task(2, "Write report", "Quarterly numbers", "On-going"),
            task(3, "buy MILK", "again", "incomplete"),
        ]
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        assert_eq!(TaskFilter::default().apply(sample()).len(), 3);
    }

    #[test]
    fn test_status_filter_is_case_insensitive_and_exact() {
        let filter = TaskFilter {
            status: Some("INCOMPLETE".to_string()),
            title: None,
        };
        let ids: Vec<u64> = filter.apply(sample()).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let partial = TaskFilter {
            status: Some("complete".to_string()),
            title: None,
        };
        assert!(partial.apply(sample()).is_empty());
    }

    #[test]
    fn test_filters_compose_with_and() {
        let filter = TaskFilter {
            status: Some("incomplete".to_string()),
            title: Some("buy milk".to_string()),
        };
        assert_eq!(filter.apply(sample()).len(), 2);

        let filter = TaskFilter {
            status: Some("on-going".to_string()),
            title: Some("buy milk".to_string()),
        };
        assert!(filter.apply(sample()).is_empty());
    }

    #[test]
    fn test_empty_string_filter_is_a_constraint() {
        let filter = TaskFilter {
            status: Some(String::new()),
            title: None,
        };
        assert!(filter.apply(sample()).is_empty());
    }

    #[test]
    fn test_search_title_or_description() {
        let ids: Vec<u64> = search(sample(), "MILK").iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let ids: Vec<u64> = search(sample(), "quarter").iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2]);

        assert!(search(sample(), "nothing here").is_empty());
    }
}
