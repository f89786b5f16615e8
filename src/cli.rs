use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, CommandFactory, Parser, Subcommand};

fn cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::BrightCyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightGreen.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::BrightMagenta.on_default())
}

pub fn styled_command() -> clap::Command {
    Cli::command()
}

#[derive(Debug, Parser)]
#[command(name = "reso")]
#[command(bin_name = "reso")]
#[command(version)]
#[command(about = "A local-first resolution and goal tracker")]
#[command(styles = cli_styles())]
pub struct Cli {
    #[arg(
        short = 'd',
        long,
        env = "RESOLUTE_DB_PATH",
        default_value = ".resolute/tracker.sqlite",
        help = "Path to the local SQLite tracker database."
    )]
    pub db: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Create a new resolution with its initial tasks.")]
    New(NewArgs),
    #[command(about = "List resolutions with progress and next task.")]
    Ls(ListArgs),
    #[command(about = "Show one resolution with its tasks and notes.")]
    Show(ShowArgs),
    #[command(about = "Edit a resolution's name or description.")]
    Edit(EditArgs),
    #[command(about = "Delete a resolution and everything it owns.")]
    Rm(RemoveArgs),
    #[command(about = "Manage tasks within a resolution.")]
    Task(TaskArgs),
    #[command(about = "Manage notes within a resolution.")]
    Note(NoteArgs),
    #[command(about = "Log and browse check-in updates.")]
    Checkin(CheckinArgs),
    #[command(about = "Show overall progress and the last-update nudge.")]
    Stats(StatsArgs),
    #[command(about = "Generate or install shell completions.")]
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
#[command(about = "Create a new resolution.")]
pub struct NewArgs {
    #[arg(help = "Resolution name.")]
    pub name: String,

    #[arg(short = 'D', long = "desc", help = "Optional description text.")]
    pub desc: Option<String>,

    #[arg(long, help = "Optional deadline (YYYY-MM-DD).")]
    pub deadline: Option<String>,

    #[arg(
        short = 't',
        long = "task",
        help = "Initial task text (repeatable; at least one is required)."
    )]
    pub tasks: Vec<String>,
}

#[derive(Debug, Args)]
#[command(about = "List resolutions.")]
pub struct ListArgs {
    #[arg(short = 'q', long, help = "Text query over name and description.")]
    pub query: Option<String>,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
#[command(about = "Show one resolution.")]
pub struct ShowArgs {
    #[arg(help = "Resolution id.")]
    pub id: String,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
#[command(about = "Edit a resolution.")]
pub struct EditArgs {
    #[arg(help = "Resolution id.")]
    pub id: String,

    #[arg(short = 'n', long, help = "Set the resolution name.")]
    pub name: Option<String>,

    #[arg(short = 'D', long = "desc", help = "Set the description.")]
    pub desc: Option<String>,
}

#[derive(Debug, Args)]
#[command(about = "Delete a resolution.")]
pub struct RemoveArgs {
    #[arg(help = "Resolution id.")]
    pub id: String,

    #[arg(short = 'y', long, help = "Skip the confirmation prompt.")]
    pub yes: bool,
}

#[derive(Debug, Args)]
#[command(about = "Task operations.")]
pub struct TaskArgs {
    #[command(subcommand)]
    pub command: TaskSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum TaskSubcommands {
    #[command(about = "Append a task to a resolution.")]
    Add(TaskAddArgs),
    #[command(about = "Flip a task between done and not done.")]
    Toggle(TaskRefArgs),
    #[command(about = "Edit a task's text, deadline, or details.")]
    Edit(TaskEditArgs),
    #[command(about = "Delete a task; notes that referenced it are detached.")]
    Rm(TaskRemoveArgs),
}

#[derive(Debug, Args)]
#[command(about = "Add a task.")]
pub struct TaskAddArgs {
    #[arg(help = "Resolution id.")]
    pub resolution: String,

    #[arg(help = "Task text.")]
    pub text: String,

    #[arg(long, help = "Optional deadline (YYYY-MM-DD).")]
    pub deadline: Option<String>,

    #[arg(long, help = "Optional details text.")]
    pub details: Option<String>,
}

#[derive(Debug, Args)]
#[command(about = "Address one task.")]
pub struct TaskRefArgs {
    #[arg(help = "Resolution id.")]
    pub resolution: String,

    #[arg(help = "Task id.")]
    pub task: String,
}

#[derive(Debug, Args)]
#[command(about = "Edit a task.")]
pub struct TaskEditArgs {
    #[arg(help = "Resolution id.")]
    pub resolution: String,

    #[arg(help = "Task id.")]
    pub task: String,

    #[arg(short = 't', long, help = "Set the task text.")]
    pub text: Option<String>,

    #[arg(long, help = "Set the deadline; pass an empty string to clear it.")]
    pub deadline: Option<String>,

    #[arg(long, help = "Set the details; pass an empty string to clear them.")]
    pub details: Option<String>,
}

#[derive(Debug, Args)]
#[command(about = "Delete a task.")]
pub struct TaskRemoveArgs {
    #[arg(help = "Resolution id.")]
    pub resolution: String,

    #[arg(help = "Task id.")]
    pub task: String,

    #[arg(short = 'y', long, help = "Skip the confirmation prompt.")]
    pub yes: bool,
}

#[derive(Debug, Args)]
#[command(about = "Note operations.")]
pub struct NoteArgs {
    #[command(subcommand)]
    pub command: NoteSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum NoteSubcommands {
    #[command(about = "Add a note to a resolution, optionally attached to a task.")]
    Add(NoteAddArgs),
    #[command(about = "Edit a note's text or task attachment.")]
    Edit(NoteEditArgs),
    #[command(about = "Delete a note.")]
    Rm(NoteRemoveArgs),
}

#[derive(Debug, Args)]
#[command(about = "Add a note.")]
pub struct NoteAddArgs {
    #[arg(help = "Resolution id.")]
    pub resolution: String,

    #[arg(help = "Note text.")]
    pub text: String,

    #[arg(long = "task", help = "Attach the note to this task id.")]
    pub task: Option<String>,
}

#[derive(Debug, Args)]
#[command(about = "Edit a note.")]
pub struct NoteEditArgs {
    #[arg(help = "Resolution id.")]
    pub resolution: String,

    #[arg(help = "Note id.")]
    pub note: String,

    #[arg(short = 't', long, help = "Set the note text.")]
    pub text: Option<String>,

    #[arg(
        long = "task",
        help = "Attach to this task id; pass an empty string to detach."
    )]
    pub task: Option<String>,
}

#[derive(Debug, Args)]
#[command(about = "Delete a note.")]
pub struct NoteRemoveArgs {
    #[arg(help = "Resolution id.")]
    pub resolution: String,

    #[arg(help = "Note id.")]
    pub note: String,

    #[arg(short = 'y', long, help = "Skip the confirmation prompt.")]
    pub yes: bool,
}

#[derive(Debug, Args)]
#[command(about = "Check-in operations.")]
pub struct CheckinArgs {
    #[command(subcommand)]
    pub command: CheckinSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum CheckinSubcommands {
    #[command(about = "Log a new update.")]
    New(CheckinNewArgs),
    #[command(about = "List updates with filtering.")]
    Ls(CheckinListArgs),
    #[command(about = "Edit an update.")]
    Edit(CheckinEditArgs),
    #[command(about = "Delete an update.")]
    Rm(CheckinRemoveArgs),
    #[command(about = "Print the template text for an update type.")]
    Template(CheckinTemplateArgs),
}

#[derive(Debug, Args)]
#[command(about = "Log a new update.")]
pub struct CheckinNewArgs {
    #[arg(help = "Update text (omit when using --template).")]
    pub text: Option<String>,

    #[arg(
        short = 't',
        long = "type",
        help = "Update type: daily, weekly, blocked, win, other."
    )]
    pub kind: Option<String>,

    #[arg(short = 'r', long = "resolution", help = "Associate with a resolution id.")]
    pub resolution: Option<String>,

    #[arg(long, help = "Use the template body for the chosen type as the text.")]
    pub template: bool,
}

#[derive(Debug, Args)]
#[command(about = "List updates.")]
pub struct CheckinListArgs {
    #[arg(
        short = 'q',
        long,
        help = "Text query over update text, type, and resolution name."
    )]
    pub query: Option<String>,

    #[arg(short = 't', long = "type", help = "Filter by update type.")]
    pub kind: Option<String>,

    #[arg(short = 'r', long = "resolution", help = "Filter by resolution id.")]
    pub resolution: Option<String>,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
#[command(about = "Edit an update.")]
pub struct CheckinEditArgs {
    #[arg(help = "Update id.")]
    pub id: String,

    #[arg(long, help = "Set the update text.")]
    pub text: Option<String>,

    #[arg(long = "type", help = "Set the update type.")]
    pub kind: Option<String>,

    #[arg(
        long = "resolution",
        help = "Associate with this resolution id; pass an empty string to detach."
    )]
    pub resolution: Option<String>,
}

#[derive(Debug, Args)]
#[command(about = "Delete an update.")]
pub struct CheckinRemoveArgs {
    #[arg(help = "Update id.")]
    pub id: String,

    #[arg(short = 'y', long, help = "Skip the confirmation prompt.")]
    pub yes: bool,
}

#[derive(Debug, Args)]
#[command(about = "Print a check-in template.")]
pub struct CheckinTemplateArgs {
    #[arg(help = "Update type: daily, weekly, blocked, win, other.")]
    pub kind: String,
}

#[derive(Debug, Args)]
#[command(about = "Show overall statistics.")]
pub struct StatsArgs {
    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
#[command(about = "Generate or install shell completions.")]
pub struct CompletionsArgs {
    #[arg(help = "Shell name (bash, zsh, fish). Auto-detected if omitted.")]
    pub shell: Option<String>,

    #[arg(
        short = 'i',
        long = "install",
        help = "Write completions to the canonical path for the shell."
    )]
    pub install: bool,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
