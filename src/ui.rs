use std::io::{self, IsTerminal};

use crate::app::{CheckInView, ResolutionDetail, ResolutionSummary, StatsView};
use crate::util::format_date_time;

pub fn print_resolution_list(resolutions: &[ResolutionSummary], query: Option<&str>) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Resolutions"));
    if let Some(query) = query.and_then(non_empty) {
        println!("{}", palette.dim(&format!("filters: query={query}")));
    }

    if resolutions.is_empty() {
        println!("{}", palette.dim("no resolutions matched"));
        return;
    }

    for resolution in resolutions {
        println!("{}", format_resolution_row(resolution, &palette));
    }
    println!(
        "{}",
        palette.dim(&format!("{} resolution(s)", resolutions.len()))
    );
}

fn format_resolution_row(resolution: &ResolutionSummary, palette: &Palette) -> String {
    let mut line = format!(
        "{} {} {}",
        palette.id(&resolution.id),
        palette.progress(resolution.task_done, resolution.task_total),
        resolution.name
    );

    if let Some(deadline) = resolution.deadline.as_deref() {
        line.push(' ');
        line.push_str(&palette.dim(&format!("due {deadline}")));
    }

    match resolution.next_task.as_ref() {
        Some(task) => {
            line.push(' ');
            line.push_str(&palette.dim(&format!("next: {}", task.text)));
        }
        None if resolution.task_total > 0 => {
            line.push(' ');
            line.push_str(&palette.done("all done"));
        }
        None => {}
    }

    line
}

pub fn print_resolution_detail(detail: &ResolutionDetail) {
    let palette = Palette::auto();
    println!(
        "{} {} {}",
        palette.heading(&detail.name),
        palette.progress(detail.task_done, detail.task_total),
        palette.dim(&format!("({}%)", detail.task_completion))
    );
    println!("{}", palette.dim(&detail.id));
    if let Some(deadline) = detail.deadline.as_deref() {
        println!("due {deadline}");
    }
    if !detail.description.trim().is_empty() {
        println!("{}", detail.description);
    }

    if !detail.tasks.is_empty() {
        println!("{}", palette.heading("Tasks"));
        for task in &detail.tasks {
            let marker = if task.done { "[x]" } else { "[ ]" };
            let mut line = format!("  {} {} {}", marker, palette.id(&task.id), task.text);
            if let Some(deadline) = task.deadline.as_deref() {
                line.push(' ');
                line.push_str(&palette.dim(&format!("due {deadline}")));
            }
            if let Some(details) = task.details.as_deref() {
                line.push(' ');
                line.push_str(&palette.dim(details));
            }
            println!("{line}");
        }
    }

    if !detail.notes.is_empty() {
        println!("{}", palette.heading("Notes"));
        for note in &detail.notes {
            println!(
                "  {} {} {} {}",
                palette.id(&note.id),
                palette.dim(&format_date_time(&note.created_at)),
                palette.dim(&format!("[{}]", note.task_label)),
                first_line(&note.text)
            );
        }
    }
}

pub fn print_check_in_list(check_ins: &[CheckInView], filter_summary: Option<String>) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Updates"));
    if let Some(summary) = filter_summary {
        println!("{}", palette.dim(&format!("filters: {summary}")));
    }

    if check_ins.is_empty() {
        println!("{}", palette.dim("no updates matched"));
        return;
    }

    for check_in in check_ins {
        println!(
            "{} {} {} {} {}",
            palette.id(&check_in.id),
            palette.kind(check_in.kind.as_str()),
            palette.dim(&format_date_time(&check_in.created_at)),
            palette.dim(&check_in.resolution_name),
            first_line(&check_in.text)
        );
    }
    println!("{}", palette.dim(&format!("{} update(s)", check_ins.len())));
}

pub fn print_stats(stats: &StatsView) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Overall"));
    println!(
        "goals {} completed {} ({}%)",
        stats.overall.total_goals, stats.overall.completed_goals, stats.overall.goal_completion
    );
    println!(
        "tasks {} done {} ({}%)",
        stats.overall.total_tasks, stats.overall.done_tasks, stats.overall.task_completion
    );

    match (&stats.latest_check_in, stats.days_since_last_check_in) {
        (Some(latest), days) => {
            println!(
                "last update {} {} {}",
                palette.kind(latest.kind.as_str()),
                palette.dim(&format_date_time(&latest.created_at)),
                first_line(&latest.text)
            );
            if let Some(days) = days {
                if stats.needs_nudge {
                    println!(
                        "{}",
                        palette.nudge(&format!("{} day(s) since your last update", days))
                    );
                }
            }
        }
        (None, _) => println!("{}", palette.dim("no updates yet")),
    }
}

pub fn check_in_filter_summary(
    query: Option<&str>,
    kind: Option<&str>,
    resolution_id: Option<&str>,
) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(query) = query.and_then(non_empty) {
        parts.push(format!("query={query}"));
    }
    if let Some(kind) = kind.and_then(non_empty) {
        parts.push(format!("type={kind}"));
    }
    if let Some(resolution_id) = resolution_id.and_then(non_empty) {
        parts.push(format!("resolution={resolution_id}"));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

fn non_empty(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn auto() -> Self {
        let enabled = std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal();
        Self { enabled }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    pub fn heading(&self, text: &str) -> String {
        self.paint("1;36", text)
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }

    pub fn id(&self, text: &str) -> String {
        self.paint("1;94", text)
    }

    pub fn kind(&self, kind: &str) -> String {
        let upper = kind.to_ascii_uppercase();
        self.paint(kind_color_code(kind), &format!("[{upper}]"))
    }

    pub fn progress(&self, done: usize, total: usize) -> String {
        let code = if total > 0 && done == total { "32" } else { "33" };
        self.paint(code, &format!("{done}/{total}"))
    }

    pub fn done(&self, text: &str) -> String {
        self.paint("32", text)
    }

    pub fn nudge(&self, text: &str) -> String {
        self.paint("1;33", text)
    }
}

fn kind_color_code(kind: &str) -> &'static str {
    match kind.trim().to_ascii_lowercase().as_str() {
        "daily" => "34",
        "weekly" => "36",
        "blocked" => "31",
        "win" => "32",
        _ => "37",
    }
}
