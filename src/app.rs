use std::error::Error;
use std::fmt;
use std::path::Path;

use rusqlite::Connection;
use serde::Serialize;

use crate::db;
use crate::domain::check_in_type::{CheckInType, ParseCheckInTypeError};
use crate::domain::model::{CheckIn, Note, Resolution, Task};
use crate::session::{Session, TaskRowDraft, ValidationError};
use crate::store;
use crate::templates::{TemplateError, TemplateRegistry};
use crate::util::pct;
use crate::views;

pub struct App {
    conn: Connection,
    templates: TemplateRegistry,
    session: Session,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: String,
    pub text: String,
    pub done: bool,
    pub deadline: Option<String>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
    pub id: String,
    pub created_at: String,
    pub text: String,
    pub task_label: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub deadline: Option<String>,
    pub created_at: String,
    pub task_total: usize,
    pub task_done: usize,
    pub task_completion: u32,
    pub next_task: Option<TaskView>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionDetail {
    pub id: String,
    pub name: String,
    pub description: String,
    pub deadline: Option<String>,
    pub created_at: String,
    pub task_total: usize,
    pub task_done: usize,
    pub task_completion: u32,
    pub next_task: Option<TaskView>,
    pub tasks: Vec<TaskView>,
    pub notes: Vec<NoteView>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckInView {
    pub id: String,
    pub created_at: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: CheckInType,
    pub resolution_id: Option<String>,
    pub resolution_name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub overall: views::OverallStats,
    pub latest_check_in: Option<CheckInView>,
    pub days_since_last_check_in: Option<i64>,
    pub needs_nudge: bool,
}

impl App {
    pub fn open(db_path: &str) -> Result<Self, AppError> {
        ensure_parent_dir(db_path)?;
        let conn = db::open_connection(db_path)?;
        let templates = TemplateRegistry::load(&template_override_path(db_path))?;
        let session = Session::new(store::load(&conn)?);
        Ok(Self {
            conn,
            templates,
            session,
        })
    }

    fn persist(&self) -> Result<(), AppError> {
        store::save(&self.conn, self.session.state())?;
        Ok(())
    }

    // ----- resolutions -----

    pub fn create_resolution(
        &mut self,
        name: &str,
        description: Option<&str>,
        deadline: Option<&str>,
        task_rows: Vec<TaskRowDraft>,
    ) -> Result<ResolutionSummary, AppError> {
        self.session.open_resolution_draft();
        self.session.resolution_draft.name = name.to_string();
        self.session.resolution_draft.description = description.unwrap_or_default().to_string();
        self.session.resolution_draft.deadline = deadline.unwrap_or_default().to_string();
        if !task_rows.is_empty() {
            self.session.resolution_draft.task_rows = task_rows;
        }

        let id = self.session.create_resolution()?;
        self.persist()?;

        let resolution = self
            .session
            .resolutions()
            .iter()
            .find(|resolution| resolution.id == id)
            .ok_or_else(|| AppError::NotFound(format!("resolution '{id}'")))?;
        Ok(summarize(resolution))
    }

    pub fn list_resolutions(&mut self, query: Option<&str>) -> Vec<ResolutionSummary> {
        self.session.resolutions_query = query.unwrap_or_default().to_string();
        views::filter_resolutions(self.session.resolutions(), &self.session.resolutions_query)
            .into_iter()
            .map(summarize)
            .collect()
    }

    pub fn show_resolution(&self, id: &str) -> Option<ResolutionDetail> {
        self.session
            .resolutions()
            .iter()
            .find(|resolution| resolution.id == id)
            .map(detail)
    }

    pub fn edit_resolution(
        &mut self,
        id: &str,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<ResolutionSummary, AppError> {
        if name.is_none() && description.is_none() {
            return Err(AppError::InvalidArgument(
                "edit requires at least one field change".to_string(),
            ));
        }

        if !self.session.start_edit_resolution(id) {
            return Err(AppError::NotFound(format!("resolution '{id}'")));
        }
        if let Some(name) = name {
            self.session.resolution_edit.name = name;
        }
        if let Some(description) = description {
            self.session.resolution_edit.description = description;
        }
        self.session.save_edit_resolution()?;
        self.persist()?;

        let resolution = self
            .session
            .resolutions()
            .iter()
            .find(|resolution| resolution.id == id)
            .ok_or_else(|| AppError::NotFound(format!("resolution '{id}'")))?;
        Ok(summarize(resolution))
    }

    pub fn delete_resolution(&mut self, id: &str) -> Result<(), AppError> {
        if !self.session.delete_resolution(id) {
            return Err(AppError::NotFound(format!("resolution '{id}'")));
        }
        self.persist()
    }

    // ----- tasks -----

    pub fn add_task(
        &mut self,
        resolution_id: &str,
        text: &str,
        deadline: Option<&str>,
        details: Option<&str>,
    ) -> Result<TaskView, AppError> {
        let composer = self.session.task_composer_mut(resolution_id);
        composer.open = true;
        composer.text = text.to_string();
        composer.deadline = deadline.unwrap_or_default().to_string();
        composer.details = details.unwrap_or_default().to_string();

        let Some(task_id) = self.session.add_task(resolution_id)? else {
            return Err(AppError::NotFound(format!(
                "resolution '{resolution_id}'"
            )));
        };
        self.persist()?;
        self.task_view(resolution_id, &task_id)
    }

    pub fn toggle_task(&mut self, resolution_id: &str, task_id: &str) -> Result<TaskView, AppError> {
        if !self.session.toggle_task(resolution_id, task_id) {
            return Err(AppError::NotFound(format!("task '{task_id}'")));
        }
        self.persist()?;
        self.task_view(resolution_id, task_id)
    }

    pub fn edit_task(
        &mut self,
        resolution_id: &str,
        task_id: &str,
        text: Option<String>,
        deadline: Option<String>,
        details: Option<String>,
    ) -> Result<TaskView, AppError> {
        if text.is_none() && deadline.is_none() && details.is_none() {
            return Err(AppError::InvalidArgument(
                "edit requires at least one field change".to_string(),
            ));
        }

        if !self.session.start_edit_task(resolution_id, task_id) {
            return Err(AppError::NotFound(format!("task '{task_id}'")));
        }
        if let Some(text) = text {
            self.session.task_edit.text = text;
        }
        if let Some(deadline) = deadline {
            self.session.task_edit.deadline = deadline;
        }
        if let Some(details) = details {
            self.session.task_edit.details = details;
        }
        self.session.save_edit_task()?;
        self.persist()?;
        self.task_view(resolution_id, task_id)
    }

    pub fn delete_task(&mut self, resolution_id: &str, task_id: &str) -> Result<(), AppError> {
        if !self.session.delete_task(resolution_id, task_id) {
            return Err(AppError::NotFound(format!("task '{task_id}'")));
        }
        self.persist()
    }

    // ----- notes -----

    pub fn add_note(
        &mut self,
        resolution_id: &str,
        text: &str,
        task_id: Option<&str>,
    ) -> Result<NoteView, AppError> {
        let composer = self.session.note_composer_mut(resolution_id);
        composer.open = true;
        composer.text = text.to_string();
        composer.task_id = task_id.unwrap_or_default().to_string();

        let Some(note_id) = self.session.add_note(resolution_id)? else {
            return Err(AppError::NotFound(format!(
                "resolution '{resolution_id}'"
            )));
        };
        self.persist()?;
        self.note_view(resolution_id, &note_id)
    }

    pub fn edit_note(
        &mut self,
        resolution_id: &str,
        note_id: &str,
        text: Option<String>,
        task_id: Option<String>,
    ) -> Result<NoteView, AppError> {
        if text.is_none() && task_id.is_none() {
            return Err(AppError::InvalidArgument(
                "edit requires at least one field change".to_string(),
            ));
        }

        if !self.session.start_edit_note(resolution_id, note_id) {
            return Err(AppError::NotFound(format!("note '{note_id}'")));
        }
        if let Some(text) = text {
            self.session.note_edit.text = text;
        }
        if let Some(task_id) = task_id {
            self.session.note_edit.task_id = task_id;
        }
        self.session.save_edit_note()?;
        self.persist()?;
        self.note_view(resolution_id, note_id)
    }

    pub fn delete_note(&mut self, resolution_id: &str, note_id: &str) -> Result<(), AppError> {
        if !self.session.delete_note(resolution_id, note_id) {
            return Err(AppError::NotFound(format!("note '{note_id}'")));
        }
        self.persist()
    }

    // ----- check-ins -----

    pub fn add_check_in(
        &mut self,
        text: Option<&str>,
        kind: Option<CheckInType>,
        resolution_id: Option<&str>,
        use_template: bool,
    ) -> Result<CheckInView, AppError> {
        if use_template && text.is_some() {
            return Err(AppError::InvalidArgument(
                "pass either update text or --template, not both".to_string(),
            ));
        }

        self.session.check_in_draft = Default::default();
        if let Some(kind) = kind {
            self.session.check_in_draft.kind = kind;
        }
        self.session.check_in_draft.resolution_id =
            resolution_id.unwrap_or_default().to_string();
        if use_template {
            let kind = self.session.check_in_draft.kind;
            let templates = self.templates.clone();
            self.session.apply_template(kind, &templates);
        } else {
            self.session.check_in_draft.text = text.unwrap_or_default().to_string();
        }

        let id = self.session.add_check_in()?;
        self.persist()?;
        self.check_in_view(&id)
    }

    pub fn list_check_ins(
        &mut self,
        query: Option<&str>,
        kind: Option<CheckInType>,
        resolution_id: Option<&str>,
    ) -> Vec<CheckInView> {
        self.session.clear_updates_filters();
        self.session.updates_query = query.unwrap_or_default().to_string();
        self.session.updates_type = kind;
        self.session.updates_resolution_id = resolution_id.unwrap_or_default().to_string();

        let filter = views::CheckInFilter {
            query: self.session.updates_query.clone(),
            kind: self.session.updates_type,
            resolution_id: self.session.updates_resolution_id.clone(),
        };
        let resolutions = self.session.resolutions();
        views::filter_check_ins(self.session.check_ins(), resolutions, &filter)
            .into_iter()
            .map(|check_in| check_in_view_of(check_in, resolutions))
            .collect()
    }

    pub fn edit_check_in(
        &mut self,
        id: &str,
        text: Option<String>,
        kind: Option<CheckInType>,
        resolution_id: Option<String>,
    ) -> Result<CheckInView, AppError> {
        if text.is_none() && kind.is_none() && resolution_id.is_none() {
            return Err(AppError::InvalidArgument(
                "edit requires at least one field change".to_string(),
            ));
        }

        if !self.session.start_edit_check_in(id) {
            return Err(AppError::NotFound(format!("check-in '{id}'")));
        }
        if let Some(text) = text {
            self.session.check_in_edit.text = text;
        }
        if let Some(kind) = kind {
            self.session.check_in_edit.kind = kind;
        }
        if let Some(resolution_id) = resolution_id {
            self.session.check_in_edit.resolution_id = resolution_id;
        }
        self.session.save_edit_check_in()?;
        self.persist()?;
        self.check_in_view(id)
    }

    pub fn delete_check_in(&mut self, id: &str) -> Result<(), AppError> {
        if !self.session.delete_check_in(id) {
            return Err(AppError::NotFound(format!("check-in '{id}'")));
        }
        self.persist()
    }

    pub fn template_text(&self, kind: CheckInType) -> &str {
        self.templates.text(kind)
    }

    // ----- derived views -----

    pub fn stats(&self) -> StatsView {
        let resolutions = self.session.resolutions();
        let check_ins = self.session.check_ins();
        let days = views::days_since_last_check_in(check_ins);
        StatsView {
            overall: views::overall_stats(resolutions),
            latest_check_in: views::latest_check_in(check_ins)
                .map(|check_in| check_in_view_of(check_in, resolutions)),
            days_since_last_check_in: days,
            needs_nudge: views::needs_nudge(days),
        }
    }

    fn task_view(&self, resolution_id: &str, task_id: &str) -> Result<TaskView, AppError> {
        self.session
            .resolutions()
            .iter()
            .find(|resolution| resolution.id == resolution_id)
            .and_then(|resolution| resolution.tasks.iter().find(|task| task.id == task_id))
            .map(TaskView::from)
            .ok_or_else(|| AppError::NotFound(format!("task '{task_id}'")))
    }

    fn note_view(&self, resolution_id: &str, note_id: &str) -> Result<NoteView, AppError> {
        let resolution = self
            .session
            .resolutions()
            .iter()
            .find(|resolution| resolution.id == resolution_id)
            .ok_or_else(|| AppError::NotFound(format!("resolution '{resolution_id}'")))?;
        resolution
            .notes
            .iter()
            .find(|note| note.id == note_id)
            .map(|note| note_view_of(note, resolution))
            .ok_or_else(|| AppError::NotFound(format!("note '{note_id}'")))
    }

    fn check_in_view(&self, id: &str) -> Result<CheckInView, AppError> {
        self.session
            .check_ins()
            .iter()
            .find(|check_in| check_in.id == id)
            .map(|check_in| check_in_view_of(check_in, self.session.resolutions()))
            .ok_or_else(|| AppError::NotFound(format!("check-in '{id}'")))
    }
}

fn template_override_path(db_path: &str) -> std::path::PathBuf {
    match Path::new(db_path).parent() {
        Some(parent) => parent.join("templates.toml"),
        None => std::path::PathBuf::from("templates.toml"),
    }
}

fn ensure_parent_dir(path: &str) -> Result<(), AppError> {
    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn summarize(resolution: &Resolution) -> ResolutionSummary {
    let task_total = resolution.tasks.len();
    let task_done = resolution.tasks.iter().filter(|task| task.done).count();
    ResolutionSummary {
        id: resolution.id.clone(),
        name: resolution.name.clone(),
        description: resolution.description.clone(),
        deadline: resolution.deadline.clone(),
        created_at: resolution.created_at.clone(),
        task_total,
        task_done,
        task_completion: pct(task_done, task_total),
        next_task: views::next_task(resolution).map(TaskView::from),
    }
}

fn detail(resolution: &Resolution) -> ResolutionDetail {
    let summary = summarize(resolution);
    ResolutionDetail {
        id: summary.id,
        name: summary.name,
        description: summary.description,
        deadline: summary.deadline,
        created_at: summary.created_at,
        task_total: summary.task_total,
        task_done: summary.task_done,
        task_completion: summary.task_completion,
        next_task: summary.next_task,
        tasks: resolution.tasks.iter().map(TaskView::from).collect(),
        notes: resolution
            .notes
            .iter()
            .map(|note| note_view_of(note, resolution))
            .collect(),
    }
}

fn note_view_of(note: &Note, resolution: &Resolution) -> NoteView {
    NoteView {
        id: note.id.clone(),
        created_at: note.created_at.clone(),
        text: note.text.clone(),
        task_label: views::task_label(resolution, note.task_id.as_deref()),
    }
}

fn check_in_view_of(check_in: &CheckIn, resolutions: &[Resolution]) -> CheckInView {
    CheckInView {
        id: check_in.id.clone(),
        created_at: check_in.created_at.clone(),
        text: check_in.text.clone(),
        kind: check_in.kind,
        resolution_id: check_in.resolution_id.clone(),
        resolution_name: views::resolution_name_by_id(
            resolutions,
            check_in.resolution_id.as_deref(),
        ),
    }
}

impl From<&Task> for TaskView {
    fn from(value: &Task) -> Self {
        Self {
            id: value.id.clone(),
            text: value.text.clone(),
            done: value.done,
            deadline: value.deadline.clone(),
            details: value.details.clone(),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    Io(std::io::Error),
    Db(rusqlite::Error),
    Template(TemplateError),
    Validation(ValidationError),
    ParseType(ParseCheckInTypeError),
    InvalidArgument(String),
    NotFound(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Io(err) => write!(f, "I/O error: {}", err),
            AppError::Db(err) => write!(f, "storage error: {}", err),
            AppError::Template(err) => write!(f, "{}", err),
            AppError::Validation(err) => write!(f, "{}", err),
            AppError::ParseType(err) => write!(f, "{}", err),
            AppError::InvalidArgument(message) => write!(f, "{}", message),
            AppError::NotFound(what) => write!(f, "{} not found", what),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Io(err) => Some(err),
            AppError::Db(err) => Some(err),
            AppError::Template(err) => Some(err),
            AppError::Validation(err) => Some(err),
            AppError::ParseType(err) => Some(err),
            AppError::InvalidArgument(_) => None,
            AppError::NotFound(_) => None,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::Io(value)
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(value: rusqlite::Error) -> Self {
        AppError::Db(value)
    }
}

impl From<TemplateError> for AppError {
    fn from(value: TemplateError) -> Self {
        AppError::Template(value)
    }
}

impl From<ValidationError> for AppError {
    fn from(value: ValidationError) -> Self {
        AppError::Validation(value)
    }
}

impl From<ParseCheckInTypeError> for AppError {
    fn from(value: ParseCheckInTypeError) -> Self {
        AppError::ParseType(value)
    }
}

#[cfg(test)]
mod tests;
