mod app;
mod cli;
mod completions;
mod db;
mod domain;
mod session;
mod store;
mod templates;
mod ui;
mod util;
mod views;

use std::io::Write;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn print_json(value: &impl serde::Serialize) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).expect("json serialization should work")
    );
}

/// Destructive-action gate. Declining aborts the command silently.
fn confirm(prompt: &str, assume_yes: bool) -> bool {
    if assume_yes {
        return true;
    }
    print!("{prompt} [y/N] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut line = String::new();
    if std::io::stdin().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn run() -> Result<(), app::AppError> {
    use clap::Parser;
    use cli::{CheckinSubcommands, Commands, NoteSubcommands, TaskSubcommands};
    use domain::check_in_type::CheckInType;

    let cli = cli::Cli::parse();

    if let Commands::Completions(args) = &cli.command {
        return completions::run_completions_command(args.shell.as_deref(), args.install);
    }

    let mut app = app::App::open(&cli.db)?;

    match cli.command {
        Commands::New(args) => {
            let rows = args
                .tasks
                .iter()
                .map(|text| session::TaskRowDraft {
                    text: text.clone(),
                    ..session::TaskRowDraft::default()
                })
                .collect();
            let created = app.create_resolution(
                &args.name,
                args.desc.as_deref(),
                args.deadline.as_deref(),
                rows,
            )?;
            let palette = ui::Palette::auto();
            println!(
                "created {} {} ({} task(s))",
                palette.id(&created.id),
                created.name,
                created.task_total
            );
        }
        Commands::Ls(args) => {
            let resolutions = app.list_resolutions(args.query.as_deref());
            if args.json {
                print_json(&resolutions);
            } else {
                ui::print_resolution_list(&resolutions, args.query.as_deref());
            }
        }
        Commands::Show(args) => match app.show_resolution(&args.id) {
            Some(detail) => {
                if args.json {
                    print_json(&detail);
                } else {
                    ui::print_resolution_detail(&detail);
                }
            }
            None => {
                return Err(app::AppError::NotFound(format!(
                    "resolution '{}'",
                    args.id
                )))
            }
        },
        Commands::Edit(args) => {
            let updated = app.edit_resolution(&args.id, args.name, args.desc)?;
            let palette = ui::Palette::auto();
            println!("updated {} {}", palette.id(&updated.id), updated.name);
        }
        Commands::Rm(args) => {
            if !confirm("Delete this resolution?", args.yes) {
                return Ok(());
            }
            app.delete_resolution(&args.id)?;
            println!("deleted resolution {}", args.id);
        }
        Commands::Task(args) => match args.command {
            TaskSubcommands::Add(add_args) => {
                let task = app.add_task(
                    &add_args.resolution,
                    &add_args.text,
                    add_args.deadline.as_deref(),
                    add_args.details.as_deref(),
                )?;
                let palette = ui::Palette::auto();
                println!("added task {} {}", palette.id(&task.id), task.text);
            }
            TaskSubcommands::Toggle(ref_args) => {
                let task = app.toggle_task(&ref_args.resolution, &ref_args.task)?;
                let marker = if task.done { "[x]" } else { "[ ]" };
                println!("{} {}", marker, task.text);
            }
            TaskSubcommands::Edit(edit_args) => {
                let task = app.edit_task(
                    &edit_args.resolution,
                    &edit_args.task,
                    edit_args.text,
                    edit_args.deadline,
                    edit_args.details,
                )?;
                let palette = ui::Palette::auto();
                println!("updated task {} {}", palette.id(&task.id), task.text);
            }
            TaskSubcommands::Rm(rm_args) => {
                if !confirm("Delete this task?", rm_args.yes) {
                    return Ok(());
                }
                app.delete_task(&rm_args.resolution, &rm_args.task)?;
                println!("deleted task {}", rm_args.task);
            }
        },
        Commands::Note(args) => match args.command {
            NoteSubcommands::Add(add_args) => {
                let note = app.add_note(
                    &add_args.resolution,
                    &add_args.text,
                    add_args.task.as_deref(),
                )?;
                let palette = ui::Palette::auto();
                println!(
                    "added note {} [{}]",
                    palette.id(&note.id),
                    note.task_label
                );
            }
            NoteSubcommands::Edit(edit_args) => {
                let note = app.edit_note(
                    &edit_args.resolution,
                    &edit_args.note,
                    edit_args.text,
                    edit_args.task,
                )?;
                let palette = ui::Palette::auto();
                println!(
                    "updated note {} [{}]",
                    palette.id(&note.id),
                    note.task_label
                );
            }
            NoteSubcommands::Rm(rm_args) => {
                if !confirm("Delete this note?", rm_args.yes) {
                    return Ok(());
                }
                app.delete_note(&rm_args.resolution, &rm_args.note)?;
                println!("deleted note {}", rm_args.note);
            }
        },
        Commands::Checkin(args) => match args.command {
            CheckinSubcommands::New(new_args) => {
                let kind = new_args
                    .kind
                    .as_deref()
                    .map(str::parse::<CheckInType>)
                    .transpose()?;
                let check_in = app.add_check_in(
                    new_args.text.as_deref(),
                    kind,
                    new_args.resolution.as_deref(),
                    new_args.template,
                )?;
                let palette = ui::Palette::auto();
                println!(
                    "logged {} {} {}",
                    palette.id(&check_in.id),
                    palette.kind(check_in.kind.as_str()),
                    check_in.resolution_name
                );
            }
            CheckinSubcommands::Ls(ls_args) => {
                let kind = ls_args
                    .kind
                    .as_deref()
                    .map(str::parse::<CheckInType>)
                    .transpose()?;
                let check_ins = app.list_check_ins(
                    ls_args.query.as_deref(),
                    kind,
                    ls_args.resolution.as_deref(),
                );
                if ls_args.json {
                    print_json(&check_ins);
                } else {
                    let summary = ui::check_in_filter_summary(
                        ls_args.query.as_deref(),
                        ls_args.kind.as_deref(),
                        ls_args.resolution.as_deref(),
                    );
                    ui::print_check_in_list(&check_ins, summary);
                }
            }
            CheckinSubcommands::Edit(edit_args) => {
                let kind = edit_args
                    .kind
                    .as_deref()
                    .map(str::parse::<CheckInType>)
                    .transpose()?;
                let check_in =
                    app.edit_check_in(&edit_args.id, edit_args.text, kind, edit_args.resolution)?;
                let palette = ui::Palette::auto();
                println!(
                    "updated {} {}",
                    palette.id(&check_in.id),
                    palette.kind(check_in.kind.as_str())
                );
            }
            CheckinSubcommands::Rm(rm_args) => {
                if !confirm("Delete this update?", rm_args.yes) {
                    return Ok(());
                }
                app.delete_check_in(&rm_args.id)?;
                println!("deleted update {}", rm_args.id);
            }
            CheckinSubcommands::Template(template_args) => {
                let kind: CheckInType = template_args.kind.parse()?;
                print!("{}", app.template_text(kind));
            }
        },
        Commands::Stats(args) => {
            let stats = app.stats();
            if args.json {
                print_json(&stats);
            } else {
                ui::print_stats(&stats);
            }
        }
        Commands::Completions(_) => {
            unreachable!("completions are handled before app initialization")
        }
    }

    Ok(())
}
