use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use uuid::Uuid;

use crate::domain::check_in_type::CheckInType;
use crate::domain::model::{CheckIn, Note, Resolution, Task, TrackerState};
use crate::templates::TemplateRegistry;
use crate::util::{non_empty, now_utc_rfc3339};

/// A rejected command. The message is specific to the field and entity and
/// the canonical state is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: &'static str,
}

impl ValidationError {
    fn new(message: &'static str) -> Self {
        Self { message }
    }

    pub fn message(&self) -> &str {
        self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

impl Error for ValidationError {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskRowDraft {
    pub text: String,
    pub deadline: String,
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionDraft {
    pub name: String,
    pub description: String,
    pub deadline: String,
    pub task_rows: Vec<TaskRowDraft>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckInDraft {
    pub text: String,
    pub resolution_id: String,
    pub kind: CheckInType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEditTarget {
    pub resolution_id: String,
    pub task_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEditTarget {
    pub resolution_id: String,
    pub note_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionEditBuffer {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEditBuffer {
    pub text: String,
    pub deadline: String,
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteEditBuffer {
    pub text: String,
    pub task_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckInEditBuffer {
    pub text: String,
    pub resolution_id: String,
    pub kind: CheckInType,
}

/// Transient per-resolution note composer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteComposer {
    pub open: bool,
    pub text: String,
    pub task_id: String,
}

/// Transient per-resolution add-task composer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskComposer {
    pub open: bool,
    pub text: String,
    pub deadline: String,
    pub details: String,
}

/// Canonical tracker state plus every piece of interaction state the
/// presentation layer reads: filters, drafts, at most one mid-edit target per
/// entity class with its buffer, and the per-resolution composers.
///
/// Every command runs synchronously and either completes or is rejected with
/// the state untouched. Persistence is the caller's concern, applied after a
/// successful mutation.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: TrackerState,

    pub updates_query: String,
    pub updates_type: Option<CheckInType>,
    pub updates_resolution_id: String,
    pub resolutions_query: String,

    pub resolution_draft: ResolutionDraft,
    pub check_in_draft: CheckInDraft,

    editing_resolution: Option<String>,
    editing_task: Option<TaskEditTarget>,
    editing_note: Option<NoteEditTarget>,
    editing_check_in: Option<String>,

    pub resolution_edit: ResolutionEditBuffer,
    pub task_edit: TaskEditBuffer,
    pub note_edit: NoteEditBuffer,
    pub check_in_edit: CheckInEditBuffer,

    note_composers: HashMap<String, NoteComposer>,
    task_composers: HashMap<String, TaskComposer>,
}

fn new_id() -> String {
    Uuid::now_v7().to_string()
}

impl Session {
    pub fn new(state: TrackerState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn resolutions(&self) -> &[Resolution] {
        &self.state.resolutions
    }

    pub fn check_ins(&self) -> &[CheckIn] {
        &self.state.check_ins
    }

    #[allow(dead_code)]
    pub fn editing_resolution(&self) -> Option<&str> {
        self.editing_resolution.as_deref()
    }

    #[allow(dead_code)]
    pub fn editing_task(&self) -> Option<&TaskEditTarget> {
        self.editing_task.as_ref()
    }

    #[allow(dead_code)]
    pub fn editing_note(&self) -> Option<&NoteEditTarget> {
        self.editing_note.as_ref()
    }

    #[allow(dead_code)]
    pub fn editing_check_in(&self) -> Option<&str> {
        self.editing_check_in.as_deref()
    }

    // ----- resolutions -----

    /// Reset the add-resolution draft to one empty task row.
    pub fn open_resolution_draft(&mut self) {
        self.resolution_draft = ResolutionDraft {
            task_rows: vec![TaskRowDraft::default()],
            ..ResolutionDraft::default()
        };
    }

    #[allow(dead_code)]
    pub fn add_draft_task_row(&mut self) {
        self.resolution_draft.task_rows.push(TaskRowDraft::default());
    }

    #[allow(dead_code)]
    pub fn remove_draft_task_row(&mut self, index: usize) {
        if index < self.resolution_draft.task_rows.len() {
            self.resolution_draft.task_rows.remove(index);
        }
    }

    #[allow(dead_code)]
    pub fn update_draft_task_row(&mut self, index: usize, row: TaskRowDraft) {
        if let Some(slot) = self.resolution_draft.task_rows.get_mut(index) {
            *slot = row;
        }
    }

    /// Submit the add-resolution draft. Task rows that are empty after trim
    /// are dropped; the remaining rows become tasks in row order. The new
    /// resolution is prepended. Returns its id.
    pub fn create_resolution(&mut self) -> Result<String, ValidationError> {
        let name = self.resolution_draft.name.trim().to_string();

        let tasks: Vec<Task> = self
            .resolution_draft
            .task_rows
            .iter()
            .filter_map(|row| {
                let text = row.text.trim();
                if text.is_empty() {
                    return None;
                }
                Some(Task {
                    id: new_id(),
                    text: text.to_string(),
                    done: false,
                    deadline: non_empty(&row.deadline),
                    details: non_empty(&row.details),
                })
            })
            .collect();

        if name.is_empty() {
            return Err(ValidationError::new("Resolution Name is required."));
        }
        if tasks.is_empty() {
            return Err(ValidationError::new("Add at least 1 task."));
        }

        let resolution = Resolution {
            id: new_id(),
            name,
            description: self.resolution_draft.description.clone(),
            deadline: non_empty(&self.resolution_draft.deadline),
            tasks,
            notes: Vec::new(),
            priority: None,
            created_at: now_utc_rfc3339(),
        };
        let id = resolution.id.clone();
        self.state.resolutions.insert(0, resolution);
        self.open_resolution_draft();
        Ok(id)
    }

    /// Remove a resolution and everything it owns. Any in-progress edit that
    /// referenced the resolution, one of its tasks, or one of its notes is
    /// abandoned in the same step; check-ins pointing at it are left to
    /// dangle.
    pub fn delete_resolution(&mut self, resolution_id: &str) -> bool {
        let before = self.state.resolutions.len();
        self.state
            .resolutions
            .retain(|resolution| resolution.id != resolution_id);
        let removed = self.state.resolutions.len() != before;
        if !removed {
            return false;
        }

        if self.editing_resolution.as_deref() == Some(resolution_id) {
            self.cancel_edit_resolution();
        }
        if self
            .editing_task
            .as_ref()
            .is_some_and(|target| target.resolution_id == resolution_id)
        {
            self.cancel_edit_task();
        }
        if self
            .editing_note
            .as_ref()
            .is_some_and(|target| target.resolution_id == resolution_id)
        {
            self.cancel_edit_note();
        }
        self.note_composers.remove(resolution_id);
        self.task_composers.remove(resolution_id);
        true
    }

    /// Seed the resolution edit buffer from current values. Entering edit
    /// abandons any other resolution edit without saving it.
    pub fn start_edit_resolution(&mut self, resolution_id: &str) -> bool {
        let Some(resolution) = self
            .state
            .resolutions
            .iter()
            .find(|resolution| resolution.id == resolution_id)
        else {
            return false;
        };

        let buffer = ResolutionEditBuffer {
            name: resolution.name.clone(),
            description: resolution.description.clone(),
        };
        let target = resolution.id.clone();
        self.cancel_edit_resolution();
        self.resolution_edit = buffer;
        self.editing_resolution = Some(target);
        true
    }

    pub fn cancel_edit_resolution(&mut self) {
        self.editing_resolution = None;
        self.resolution_edit = ResolutionEditBuffer::default();
    }

    /// Apply the resolution edit buffer to its target atomically. No edit in
    /// progress is a no-op (`Ok(false)`).
    pub fn save_edit_resolution(&mut self) -> Result<bool, ValidationError> {
        let Some(target) = self.editing_resolution.clone() else {
            return Ok(false);
        };

        let name = self.resolution_edit.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::new("Resolution name can't be empty."));
        }
        let description = self.resolution_edit.description.clone();

        for resolution in &mut self.state.resolutions {
            if resolution.id == target {
                resolution.name = name;
                resolution.description = description;
                break;
            }
        }
        self.cancel_edit_resolution();
        Ok(true)
    }

    // ----- tasks -----

    pub fn toggle_task(&mut self, resolution_id: &str, task_id: &str) -> bool {
        let Some(resolution) = self
            .state
            .resolutions
            .iter_mut()
            .find(|resolution| resolution.id == resolution_id)
        else {
            return false;
        };
        let Some(task) = resolution.tasks.iter_mut().find(|task| task.id == task_id) else {
            return false;
        };
        task.done = !task.done;
        true
    }

    #[allow(dead_code)]
    pub fn toggle_task_composer(&mut self, resolution_id: &str) {
        let composer = self
            .task_composers
            .entry(resolution_id.to_string())
            .or_default();
        composer.open = !composer.open;
    }

    #[allow(dead_code)]
    pub fn task_composer(&self, resolution_id: &str) -> Option<&TaskComposer> {
        self.task_composers.get(resolution_id)
    }

    pub fn task_composer_mut(&mut self, resolution_id: &str) -> &mut TaskComposer {
        self.task_composers
            .entry(resolution_id.to_string())
            .or_default()
    }

    /// Submit the add-task composer for a resolution: the new task is
    /// appended and the composer cleared and closed. An unknown resolution is
    /// a no-op (`Ok(None)`).
    pub fn add_task(&mut self, resolution_id: &str) -> Result<Option<String>, ValidationError> {
        let composer = self
            .task_composers
            .get(resolution_id)
            .cloned()
            .unwrap_or_default();

        let text = composer.text.trim().to_string();
        if text.is_empty() {
            return Err(ValidationError::new("Task name is required."));
        }

        let Some(resolution) = self
            .state
            .resolutions
            .iter_mut()
            .find(|resolution| resolution.id == resolution_id)
        else {
            return Ok(None);
        };

        let task = Task {
            id: new_id(),
            text,
            done: false,
            deadline: non_empty(&composer.deadline),
            details: non_empty(&composer.details),
        };
        let id = task.id.clone();
        resolution.tasks.push(task);
        self.task_composers.remove(resolution_id);
        Ok(Some(id))
    }

    pub fn start_edit_task(&mut self, resolution_id: &str, task_id: &str) -> bool {
        let Some(task) = self
            .state
            .resolutions
            .iter()
            .find(|resolution| resolution.id == resolution_id)
            .and_then(|resolution| resolution.tasks.iter().find(|task| task.id == task_id))
        else {
            return false;
        };

        let buffer = TaskEditBuffer {
            text: task.text.clone(),
            deadline: task.deadline.clone().unwrap_or_default(),
            details: task.details.clone().unwrap_or_default(),
        };
        self.cancel_edit_task();
        self.task_edit = buffer;
        self.editing_task = Some(TaskEditTarget {
            resolution_id: resolution_id.to_string(),
            task_id: task_id.to_string(),
        });
        true
    }

    pub fn cancel_edit_task(&mut self) {
        self.editing_task = None;
        self.task_edit = TaskEditBuffer::default();
    }

    pub fn save_edit_task(&mut self) -> Result<bool, ValidationError> {
        let Some(target) = self.editing_task.clone() else {
            return Ok(false);
        };

        let text = self.task_edit.text.trim().to_string();
        if text.is_empty() {
            return Err(ValidationError::new("Task name can't be empty."));
        }
        let deadline = non_empty(&self.task_edit.deadline);
        let details = non_empty(&self.task_edit.details);

        if let Some(task) = self
            .state
            .resolutions
            .iter_mut()
            .find(|resolution| resolution.id == target.resolution_id)
            .and_then(|resolution| {
                resolution
                    .tasks
                    .iter_mut()
                    .find(|task| task.id == target.task_id)
            })
        {
            task.text = text;
            task.deadline = deadline;
            task.details = details;
        }
        self.cancel_edit_task();
        Ok(true)
    }

    /// Remove a task. Notes that referenced it are detached, not deleted;
    /// an in-progress edit of that task is abandoned.
    pub fn delete_task(&mut self, resolution_id: &str, task_id: &str) -> bool {
        let Some(resolution) = self
            .state
            .resolutions
            .iter_mut()
            .find(|resolution| resolution.id == resolution_id)
        else {
            return false;
        };

        let before = resolution.tasks.len();
        resolution.tasks.retain(|task| task.id != task_id);
        if resolution.tasks.len() == before {
            return false;
        }

        for note in &mut resolution.notes {
            if note.task_id.as_deref() == Some(task_id) {
                note.task_id = None;
            }
        }

        if self.editing_task.as_ref().is_some_and(|target| {
            target.resolution_id == resolution_id && target.task_id == task_id
        }) {
            self.cancel_edit_task();
        }
        true
    }

    // ----- notes -----

    #[allow(dead_code)]
    pub fn toggle_note_composer(&mut self, resolution_id: &str) {
        let composer = self
            .note_composers
            .entry(resolution_id.to_string())
            .or_default();
        composer.open = !composer.open;
    }

    #[allow(dead_code)]
    pub fn note_composer(&self, resolution_id: &str) -> Option<&NoteComposer> {
        self.note_composers.get(resolution_id)
    }

    pub fn note_composer_mut(&mut self, resolution_id: &str) -> &mut NoteComposer {
        self.note_composers
            .entry(resolution_id.to_string())
            .or_default()
    }

    /// Submit the note composer for a resolution: the note is prepended and
    /// the composer cleared and closed.
    pub fn add_note(&mut self, resolution_id: &str) -> Result<Option<String>, ValidationError> {
        let composer = self
            .note_composers
            .get(resolution_id)
            .cloned()
            .unwrap_or_default();

        let text = composer.text.trim().to_string();
        if text.is_empty() {
            return Err(ValidationError::new("Note text is required."));
        }

        let Some(resolution) = self
            .state
            .resolutions
            .iter_mut()
            .find(|resolution| resolution.id == resolution_id)
        else {
            return Ok(None);
        };

        let note = Note {
            id: new_id(),
            created_at: now_utc_rfc3339(),
            text,
            task_id: non_empty(&composer.task_id),
        };
        let id = note.id.clone();
        resolution.notes.insert(0, note);
        self.note_composers.remove(resolution_id);
        Ok(Some(id))
    }

    pub fn start_edit_note(&mut self, resolution_id: &str, note_id: &str) -> bool {
        let Some(note) = self
            .state
            .resolutions
            .iter()
            .find(|resolution| resolution.id == resolution_id)
            .and_then(|resolution| resolution.notes.iter().find(|note| note.id == note_id))
        else {
            return false;
        };

        let buffer = NoteEditBuffer {
            text: note.text.clone(),
            task_id: note.task_id.clone().unwrap_or_default(),
        };
        self.cancel_edit_note();
        self.note_edit = buffer;
        self.editing_note = Some(NoteEditTarget {
            resolution_id: resolution_id.to_string(),
            note_id: note_id.to_string(),
        });
        true
    }

    pub fn cancel_edit_note(&mut self) {
        self.editing_note = None;
        self.note_edit = NoteEditBuffer::default();
    }

    pub fn save_edit_note(&mut self) -> Result<bool, ValidationError> {
        let Some(target) = self.editing_note.clone() else {
            return Ok(false);
        };

        let text = self.note_edit.text.trim().to_string();
        if text.is_empty() {
            return Err(ValidationError::new("Note can't be empty."));
        }
        let task_id = non_empty(&self.note_edit.task_id);

        if let Some(note) = self
            .state
            .resolutions
            .iter_mut()
            .find(|resolution| resolution.id == target.resolution_id)
            .and_then(|resolution| {
                resolution
                    .notes
                    .iter_mut()
                    .find(|note| note.id == target.note_id)
            })
        {
            note.text = text;
            note.task_id = task_id;
        }
        self.cancel_edit_note();
        Ok(true)
    }

    pub fn delete_note(&mut self, resolution_id: &str, note_id: &str) -> bool {
        let Some(resolution) = self
            .state
            .resolutions
            .iter_mut()
            .find(|resolution| resolution.id == resolution_id)
        else {
            return false;
        };

        let before = resolution.notes.len();
        resolution.notes.retain(|note| note.id != note_id);
        if resolution.notes.len() == before {
            return false;
        }

        if self.editing_note.as_ref().is_some_and(|target| {
            target.resolution_id == resolution_id && target.note_id == note_id
        }) {
            self.cancel_edit_note();
        }
        true
    }

    // ----- check-ins -----

    /// Overwrite the check-in draft text wholesale with the template for
    /// `kind` and switch the draft to that type. Draft-only; canonical state
    /// is untouched.
    pub fn apply_template(&mut self, kind: CheckInType, templates: &TemplateRegistry) {
        self.check_in_draft.kind = kind;
        self.check_in_draft.text = templates.text(kind).to_string();
    }

    /// Submit the check-in draft: the new check-in is prepended to the global
    /// list and the draft reset. Returns its id.
    pub fn add_check_in(&mut self) -> Result<String, ValidationError> {
        let text = self.check_in_draft.text.trim().to_string();
        if text.is_empty() {
            return Err(ValidationError::new("Write something for your update."));
        }

        let check_in = CheckIn {
            id: new_id(),
            created_at: now_utc_rfc3339(),
            text,
            resolution_id: non_empty(&self.check_in_draft.resolution_id),
            kind: self.check_in_draft.kind,
        };
        let id = check_in.id.clone();
        self.state.check_ins.insert(0, check_in);
        self.check_in_draft = CheckInDraft::default();
        Ok(id)
    }

    pub fn start_edit_check_in(&mut self, check_in_id: &str) -> bool {
        let Some(check_in) = self
            .state
            .check_ins
            .iter()
            .find(|check_in| check_in.id == check_in_id)
        else {
            return false;
        };

        let buffer = CheckInEditBuffer {
            text: check_in.text.clone(),
            resolution_id: check_in.resolution_id.clone().unwrap_or_default(),
            kind: check_in.kind,
        };
        let target = check_in.id.clone();
        self.cancel_edit_check_in();
        self.check_in_edit = buffer;
        self.editing_check_in = Some(target);
        true
    }

    pub fn cancel_edit_check_in(&mut self) {
        self.editing_check_in = None;
        self.check_in_edit = CheckInEditBuffer::default();
    }

    pub fn save_edit_check_in(&mut self) -> Result<bool, ValidationError> {
        let Some(target) = self.editing_check_in.clone() else {
            return Ok(false);
        };

        let text = self.check_in_edit.text.trim().to_string();
        if text.is_empty() {
            return Err(ValidationError::new("Update can't be empty."));
        }
        let resolution_id = non_empty(&self.check_in_edit.resolution_id);
        let kind = self.check_in_edit.kind;

        for check_in in &mut self.state.check_ins {
            if check_in.id == target {
                check_in.text = text;
                check_in.resolution_id = resolution_id;
                check_in.kind = kind;
                break;
            }
        }
        self.cancel_edit_check_in();
        Ok(true)
    }

    pub fn delete_check_in(&mut self, check_in_id: &str) -> bool {
        let before = self.state.check_ins.len();
        self.state
            .check_ins
            .retain(|check_in| check_in.id != check_in_id);
        let removed = self.state.check_ins.len() != before;
        if removed && self.editing_check_in.as_deref() == Some(check_in_id) {
            self.cancel_edit_check_in();
        }
        removed
    }

    // ----- filters -----

    pub fn clear_updates_filters(&mut self) {
        self.updates_query.clear();
        self.updates_type = None;
        self.updates_resolution_id.clear();
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
