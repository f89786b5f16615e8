use serde::Serialize;

use crate::domain::check_in_type::CheckInType;
use crate::domain::model::{CheckIn, Resolution, Task};
use crate::util::{days_since, pct};

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_goals: usize,
    pub completed_goals: usize,
    pub goal_completion: u32,
    pub total_tasks: usize,
    pub done_tasks: usize,
    pub task_completion: u32,
}

pub fn overall_stats(resolutions: &[Resolution]) -> OverallStats {
    let total_goals = resolutions.len();

    let mut total_tasks = 0;
    let mut done_tasks = 0;
    let mut completed_goals = 0;

    for resolution in resolutions {
        let task_total = resolution.tasks.len();
        let task_done = resolution.tasks.iter().filter(|task| task.done).count();
        total_tasks += task_total;
        done_tasks += task_done;
        // a resolution with zero tasks never counts as completed
        if task_total > 0 && task_done == task_total {
            completed_goals += 1;
        }
    }

    OverallStats {
        total_goals,
        completed_goals,
        goal_completion: pct(completed_goals, total_goals),
        total_tasks,
        done_tasks,
        task_completion: pct(done_tasks, total_tasks),
    }
}

/// The task to surface next for a resolution: among not-done tasks, the one
/// with the earliest deadline (deadlines are YYYY-MM-DD, so lexical order is
/// chronological; ties break to list order), else the first remaining task.
/// None means everything is done.
pub fn next_task(resolution: &Resolution) -> Option<&Task> {
    let remaining: Vec<&Task> = resolution
        .tasks
        .iter()
        .filter(|task| !task.done)
        .collect();

    let earliest = remaining
        .iter()
        .copied()
        .filter(|task| task.deadline.is_some())
        .min_by(|a, b| a.deadline.cmp(&b.deadline));

    earliest.or_else(|| remaining.first().copied())
}

/// Front of the list is the most recent; insertion order enforces this.
pub fn latest_check_in(check_ins: &[CheckIn]) -> Option<&CheckIn> {
    check_ins.first()
}

pub fn days_since_last_check_in(check_ins: &[CheckIn]) -> Option<i64> {
    latest_check_in(check_ins).and_then(|check_in| days_since(&check_in.created_at))
}

pub fn needs_nudge(days: Option<i64>) -> bool {
    days.is_some_and(|days| days >= 1)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckInFilter {
    pub query: String,
    pub kind: Option<CheckInType>,
    pub resolution_id: String,
}

/// AND semantics across the active filters, original order preserved. The
/// free-text query also matches the resolved resolution name, so searching a
/// goal's name surfaces its check-ins.
pub fn filter_check_ins<'a>(
    check_ins: &'a [CheckIn],
    resolutions: &[Resolution],
    filter: &CheckInFilter,
) -> Vec<&'a CheckIn> {
    let query = filter.query.trim().to_lowercase();
    let resolution_id = filter.resolution_id.trim();

    check_ins
        .iter()
        .filter(|check_in| {
            if let Some(kind) = filter.kind {
                if check_in.kind != kind {
                    return false;
                }
            }
            if !resolution_id.is_empty() {
                // a check-in with no resolution never matches an id filter
                match check_in.resolution_id.as_deref() {
                    Some(actual) if actual == resolution_id => {}
                    _ => return false,
                }
            }
            if query.is_empty() {
                return true;
            }
            let haystack = format!(
                "{}\n{}\n{}",
                check_in.text,
                check_in.kind,
                resolution_name_by_id(resolutions, check_in.resolution_id.as_deref())
            )
            .to_lowercase();
            haystack.contains(&query)
        })
        .collect()
}

pub fn filter_resolutions<'a>(resolutions: &'a [Resolution], query: &str) -> Vec<&'a Resolution> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return resolutions.iter().collect();
    }

    resolutions
        .iter()
        .filter(|resolution| {
            format!("{}\n{}", resolution.name, resolution.description)
                .to_lowercase()
                .contains(&query)
        })
        .collect()
}

/// Weak references resolve to placeholder labels, never to errors.
pub fn resolution_name_by_id(resolutions: &[Resolution], id: Option<&str>) -> String {
    let Some(id) = id.filter(|id| !id.is_empty()) else {
        return "All (General)".to_string();
    };
    resolutions
        .iter()
        .find(|resolution| resolution.id == id)
        .map(|resolution| resolution.name.clone())
        .unwrap_or_else(|| "Resolution (deleted)".to_string())
}

pub fn task_label(resolution: &Resolution, task_id: Option<&str>) -> String {
    let Some(task_id) = task_id.filter(|id| !id.is_empty()) else {
        return "General".to_string();
    };
    resolution
        .tasks
        .iter()
        .find(|task| task.id == task_id)
        .map(|task| format!("Task: {}", task.text))
        .unwrap_or_else(|| "Task (deleted)".to_string())
}

#[cfg(test)]
#[path = "views_tests.rs"]
mod tests;
