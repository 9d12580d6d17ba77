//! Command implementations for the CLI interface.
//!
//! Each subcommand maps onto one or two `Board` calls. Mutating commands print
//! the notices the board queued, so the CLI and the terminal board report
//! changes the same way.

use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Args, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::board::{Board, BoardEvent, NoticeLevel};
use crate::cli::Cli;
use crate::due::{day_diff, due_label, parse_due_input, DueBucket};
use crate::error::{BoardError, Result};
use crate::fields::{DueSoonFilter, Priority, Status, TaskFilter};
use crate::labels::split_and_normalise_labels;
use crate::project::NewProject;
use crate::task::{NewTask, Task, TaskPatch};
use crate::theme::Theme;
use crate::tui::run::run_board_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive kanban board (the default).
    Board,

    /// Add a new task to the current project.
    Add(AddArgs),

    /// Change fields of an existing task.
    Update(UpdateArgs),

    /// Move a task to another column.
    Move {
        /// Task id, id prefix or exact title.
        id: String,
        /// Target column.
        #[arg(value_enum)]
        status: Status,
    },

    /// Delete a task.
    Delete {
        /// Task id, id prefix or exact title.
        id: String,
    },

    /// Show every field of a task.
    Show {
        /// Task id, id prefix or exact title.
        id: String,
    },

    /// List tasks of the current project column by column.
    List(ListArgs),

    /// Tasks due soon across all projects.
    Due {
        #[arg(long, value_enum, default_value_t = DueSoonFilter::All)]
        filter: DueSoonFilter,
        /// Only tasks whose title, description or labels contain this text.
        #[arg(long)]
        search: Option<String>,
    },

    /// Column counts, completed and overdue tasks for the current project.
    Stats,

    /// Manage projects.
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Show or change the colour theme.
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },

    /// Export the current project's tasks as JSON.
    Export {
        /// Output file. Defaults to taskflow-tasks-<date>.json; "-" writes to stdout.
        #[arg(long, short)]
        output: Option<String>,
    },

    /// Import tasks from a JSON array ("-" reads stdin).
    Import {
        input: String,
    },

    /// Delete every task in every project.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct AddArgs {
    /// Short title for the task.
    pub title: String,
    /// Optional longer description.
    #[arg(long)]
    pub desc: Option<String>,
    #[arg(long, value_enum)]
    pub status: Option<Status>,
    #[arg(long, value_enum)]
    pub priority: Option<Priority>,
    /// Assignee user id.
    #[arg(long)]
    pub assignee: Option<String>,
    /// Due date: YYYY-MM-DD, "today", "tomorrow", "in Nd", "fri".
    #[arg(long)]
    pub due: Option<String>,
    /// Comma-separated labels. May be repeated.
    #[arg(long = "label")]
    pub labels: Vec<String>,
    /// Project id. Defaults to the current project.
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Task id, id prefix or exact title.
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub desc: Option<String>,
    #[arg(long, value_enum)]
    pub status: Option<Status>,
    #[arg(long, value_enum)]
    pub priority: Option<Priority>,
    #[arg(long, conflicts_with = "clear_assignee")]
    pub assignee: Option<String>,
    #[arg(long)]
    pub clear_assignee: bool,
    #[arg(long, conflicts_with = "clear_due")]
    pub due: Option<String>,
    #[arg(long)]
    pub clear_due: bool,
    /// Labels to add. Comma-separated, may be repeated.
    #[arg(long = "add-label")]
    pub add_labels: Vec<String>,
    /// Labels to remove. Comma-separated, may be repeated.
    #[arg(long = "rm-label")]
    pub rm_labels: Vec<String>,
    /// Move the task to another project.
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only this column.
    #[arg(long, value_enum)]
    pub status: Option<Status>,
    /// Quick filter.
    #[arg(long, value_enum, default_value_t = TaskFilter::All)]
    pub filter: TaskFilter,
    /// Case-insensitive match on title, description and labels.
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// List projects with their task counts.
    List,
    /// Create a project.
    New {
        name: String,
        /// Hex colour such as #3498db. Random when omitted.
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        desc: Option<String>,
    },
    /// Make a project current.
    Switch { id: String },
}

#[derive(Subcommand)]
pub enum ThemeAction {
    Show,
    Toggle,
    Set {
        #[arg(value_enum)]
        theme: Theme,
    },
}

/// Run one subcommand against the board.
pub fn run(command: Commands, board: &mut Board) -> Result<()> {
    match command {
        Commands::Board => cmd_board(board),
        Commands::Add(args) => cmd_add(board, args),
        Commands::Update(args) => cmd_update(board, args),
        Commands::Move { id, status } => cmd_move(board, &id, status),
        Commands::Delete { id } => cmd_delete(board, &id),
        Commands::Show { id } => cmd_show(board, &id),
        Commands::List(args) => cmd_list(board, args),
        Commands::Due { filter, search } => cmd_due(board, filter, search.as_deref().unwrap_or("")),
        Commands::Stats => cmd_stats(board),
        Commands::Project { action } => cmd_project(board, action),
        Commands::Theme { action } => cmd_theme(board, action),
        Commands::Export { output } => cmd_export(board, output),
        Commands::Import { input } => cmd_import(board, &input),
        Commands::Clear { yes } => cmd_clear(board, yes),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Launch the terminal board.
pub fn cmd_board(board: &mut Board) -> Result<()> {
    run_board_tui(board)?;
    Ok(())
}

/// Create a task from the `add` arguments.
pub fn cmd_add(board: &mut Board, args: AddArgs) -> Result<()> {
    let due_date = parse_due_arg(args.due.as_deref())?;
    let data = NewTask {
        title: args.title,
        description: args.desc,
        status: args.status,
        priority: args.priority,
        assignee: args.assignee,
        due_date,
        labels: split_and_normalise_labels(&args.labels),
        project_id: args.project,
        ..Default::default()
    };
    let task = board.create_task(data, true)?;
    print_notices(board);
    println!("{}", task.id);
    Ok(())
}

/// Apply the `update` arguments as a patch.
pub fn cmd_update(board: &mut Board, args: UpdateArgs) -> Result<()> {
    let id = resolve_task(board, &args.id)?;
    let mut patch = TaskPatch {
        title: args.title,
        description: args.desc,
        status: args.status,
        priority: args.priority,
        add_labels: split_and_normalise_labels(&args.add_labels),
        remove_labels: split_and_normalise_labels(&args.rm_labels),
        project_id: args.project,
        ..Default::default()
    };
    if args.clear_assignee {
        patch.assignee = Some(None);
    } else if let Some(assignee) = args.assignee {
        patch.assignee = Some(Some(assignee));
    }
    if args.clear_due {
        patch.due_date = Some(None);
    } else if args.due.is_some() {
        patch.due_date = Some(parse_due_arg(args.due.as_deref())?);
    }
    if patch.is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }

    match board.update_task(&id, patch)? {
        Some(task) => {
            print_notices(board);
            println!("Updated {} ({})", task.id, task.title);
            Ok(())
        }
        None => Err(BoardError::TaskNotFound(args.id)),
    }
}

pub fn cmd_move(board: &mut Board, ident: &str, status: Status) -> Result<()> {
    let id = resolve_task(board, ident)?;
    board
        .move_task(&id, status)
        .ok_or_else(|| BoardError::TaskNotFound(ident.to_string()))?;
    print_notices(board);
    Ok(())
}

pub fn cmd_delete(board: &mut Board, ident: &str) -> Result<()> {
    let id = resolve_task(board, ident)?;
    if !board.delete_task(&id) {
        return Err(BoardError::TaskNotFound(ident.to_string()));
    }
    print_notices(board);
    Ok(())
}

/// View detailed information about a specific task.
pub fn cmd_show(board: &Board, ident: &str) -> Result<()> {
    let id = resolve_task(board, ident)?;
    let task = board
        .tasks()
        .get(&id)
        .ok_or_else(|| BoardError::TaskNotFound(ident.to_string()))?;
    let today = today();

    println!("ID:          {}", task.id);
    println!("Title:       {}", task.title);
    println!("Status:      {}", task.status.title());
    println!("Priority:    {}", task.priority);
    println!("Project:     {} ({})", board.project_name(&task.project_id), task.project_id);
    println!("Assignee:    {}", task.assignee.as_deref().unwrap_or("-"));
    println!(
        "Due:         {}",
        match task.due_date {
            Some(d) => format!("{d} ({})", due_label(day_diff(d, today))),
            None => "-".into(),
        }
    );
    println!("Labels:      {}", if task.labels.is_empty() { "-".into() } else { task.labels.join(", ") });
    println!("Created UTC: {}", task.created_at.to_rfc3339());
    println!("Updated UTC: {}", task.updated_at.to_rfc3339());
    println!(
        "Description:\n{}",
        if task.description.is_empty() { "-" } else { task.description.as_str() }
    );
    Ok(())
}

/// List the current project's tasks, one section per column.
pub fn cmd_list(board: &Board, args: ListArgs) -> Result<()> {
    let today = today();
    let search = args.search.unwrap_or_default();
    let searching = !search.trim().is_empty();
    let listed: Vec<&Task> = board
        .quick_filter(args.filter, today)
        .into_iter()
        .filter(|t| t.matches_search(&search))
        .collect();

    let name = board.current_project().map_or("Unknown Project", |p| p.name.as_str());
    println!("{name} ({} tasks)", board.task_count_for(board.current_project_id()));

    let columns: Vec<Status> = match args.status {
        Some(status) => vec![status],
        None => Status::ALL.to_vec(),
    };
    for status in columns {
        let tasks: Vec<&Task> = listed.iter().copied().filter(|t| t.status == status).collect();
        println!();
        println!("== {} ({}) ==", status.title(), tasks.len());
        if tasks.is_empty() {
            let filtered = searching || args.filter != TaskFilter::All;
            println!("  {}", if filtered { "No matching tasks" } else { status.empty_message() });
        } else {
            print_table(&tasks, today);
        }
    }
    Ok(())
}

/// Due-soon view across every project.
pub fn cmd_due(board: &Board, filter: DueSoonFilter, search: &str) -> Result<()> {
    let today = today();
    let tasks = board.due_soon_view(today, filter, search);
    if tasks.is_empty() {
        println!("No upcoming deadlines");
    } else {
        let mut current: Option<DueBucket> = None;
        for task in &tasks {
            let Some(due) = task.due_date else { continue };
            let bucket = DueBucket::for_date(due, today);
            if current != Some(bucket) {
                println!("{}:", bucket.title());
                current = Some(bucket);
            }
            println!(
                "  {:<10} {:<16} {:<14} {:<8} {}",
                due,
                due_label(day_diff(due, today)),
                truncate(board.project_name(&task.project_id), 14),
                task.priority,
                task.title
            );
        }
    }
    let summary = board.due_summary(&tasks, today);
    println!();
    println!(
        "Total: {}  Overdue: {}  Due soon: {}",
        summary.total, summary.overdue, summary.due_soon
    );
    Ok(())
}

pub fn cmd_stats(board: &Board) -> Result<()> {
    let stats = board.board_stats(today());
    let name = board.current_project().map_or("Unknown Project", |p| p.name.as_str());
    println!("Project:    {name}");
    println!("Total:      {}", stats.total);
    println!("Completed:  {}", stats.completed);
    println!("Overdue:    {}", stats.overdue);
    println!();
    println!("{:<12} {}", "Column", "Count");
    for status in Status::ALL {
        println!("{:<12} {}", status.title(), stats.count(status));
    }
    Ok(())
}

pub fn cmd_project(board: &mut Board, action: ProjectAction) -> Result<()> {
    match action {
        ProjectAction::List => {
            println!("{:<2} {:<24} {:<24} {:<8} {}", "", "ID", "Name", "Color", "Tasks");
            for project in board.projects().iter() {
                let marker = if project.id == board.current_project_id() { "*" } else { "" };
                println!(
                    "{:<2} {:<24} {:<24} {:<8} {}",
                    marker,
                    truncate(&project.id, 24),
                    truncate(&project.name, 24),
                    project.color,
                    board.task_count_for(&project.id)
                );
            }
        }
        ProjectAction::New { name, color, desc } => {
            let project = board.create_project(NewProject {
                name,
                color,
                description: desc,
                ..Default::default()
            })?;
            print_notices(board);
            println!("{}", project.id);
        }
        ProjectAction::Switch { id } => {
            if !board.switch_project(&id) {
                return Err(BoardError::UnknownProject(id));
            }
            print_notices(board);
        }
    }
    Ok(())
}

pub fn cmd_theme(board: &mut Board, action: ThemeAction) -> Result<()> {
    match action {
        ThemeAction::Show => println!("{}", board.theme()),
        ThemeAction::Toggle => println!("{}", board.toggle_theme()),
        ThemeAction::Set { theme } => {
            board.set_theme(theme);
            println!("{theme}");
        }
    }
    Ok(())
}

/// Write the current project's tasks to a file or stdout.
pub fn cmd_export(board: &Board, output: Option<String>) -> Result<()> {
    let json = board.export_tasks()?;
    match output.as_deref() {
        Some("-") => println!("{json}"),
        _ => {
            let path = output
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(format!("taskflow-tasks-{}.json", today())));
            fs::write(&path, json)?;
            println!("Exported {} tasks to {}", board.current_project_tasks().len(), path.display());
        }
    }
    Ok(())
}

pub fn cmd_import(board: &mut Board, input: &str) -> Result<()> {
    let json = if input == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(input)?
    };
    board.import_tasks(&json)?;
    print_notices(board);
    Ok(())
}

pub fn cmd_clear(board: &mut Board, yes: bool) -> Result<()> {
    if !yes && !confirm("Are you sure you want to clear all tasks? This cannot be undone.")? {
        println!("Cancelled.");
        return Ok(());
    }
    board.clear_all_tasks();
    print_notices(board);
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut io::stdout());
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn parse_due_arg(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_due_input(s, today())
            .map(Some)
            .ok_or_else(|| BoardError::InvalidDueDate(s.to_string())),
    }
}

/// Print queued notices and discard the render notifications.
fn print_notices(board: &mut Board) {
    for event in board.drain_events() {
        if let BoardEvent::Notice { level, message } = event {
            match level {
                NoticeLevel::Warning | NoticeLevel::Danger => eprintln!("{message}"),
                NoticeLevel::Info | NoticeLevel::Success => println!("{message}"),
            }
        }
    }
}

/// Resolve a task by exact id, unique id prefix, or exact title (case-insensitive).
pub fn resolve_task(board: &Board, ident: &str) -> Result<String> {
    let ident = ident.trim();
    if board.tasks().contains(ident) {
        return Ok(ident.to_string());
    }

    let by_prefix: Vec<&Task> = board.tasks().iter().filter(|t| t.id.starts_with(ident)).collect();
    let matches: Vec<&Task> = if by_prefix.is_empty() {
        let wanted = ident.to_lowercase();
        board.tasks().iter().filter(|t| t.title.to_lowercase() == wanted).collect()
    } else {
        by_prefix
    };

    match matches.as_slice() {
        [] => Err(BoardError::TaskNotFound(ident.to_string())),
        [task] => Ok(task.id.clone()),
        many => Err(BoardError::AmbiguousTask {
            ident: ident.to_string(),
            candidates: many
                .iter()
                .map(|t| format!("  {}: {} [{}]", t.id, t.title, board.project_name(&t.project_id)))
                .collect::<Vec<_>>()
                .join("\n"),
        }),
    }
}

/// Print tasks as an aligned table.
pub fn print_table(tasks: &[&Task], today: NaiveDate) {
    println!(
        "  {:<31} {:<7} {:<16} {:<12} {}",
        "ID", "Pri", "Due", "Assignee", "Title [labels]"
    );
    for t in tasks {
        let labels = if t.labels.is_empty() {
            String::new()
        } else {
            format!(" [{}]", t.labels.join(","))
        };
        let due = t.due_date.map_or_else(|| "-".to_string(), |d| due_label(day_diff(d, today)));
        println!(
            "  {:<31} {:<7} {:<16} {:<12} {}{}",
            t.id,
            t.priority,
            due,
            truncate(t.assignee.as_deref().unwrap_or("-"), 12),
            t.title,
            labels
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(board: &mut Board, title: &str) -> Task {
        board
            .create_task(NewTask { title: title.into(), ..Default::default() }, false)
            .unwrap()
    }

    #[test]
    fn resolve_by_id_prefix_and_title() {
        let mut board = Board::in_memory();
        let task = titled(&mut board, "Write docs");

        assert_eq!(resolve_task(&board, &task.id).unwrap(), task.id);
        assert_eq!(resolve_task(&board, &task.id[..task.id.len() - 2]).unwrap(), task.id);
        assert_eq!(resolve_task(&board, "write DOCS").unwrap(), task.id);
        assert!(matches!(resolve_task(&board, "nope"), Err(BoardError::TaskNotFound(_))));
    }

    #[test]
    fn duplicate_titles_are_ambiguous() {
        let mut board = Board::in_memory();
        titled(&mut board, "Same");
        titled(&mut board, "same");
        let err = resolve_task(&board, "SAME").unwrap_err();
        assert!(matches!(err, BoardError::AmbiguousTask { .. }));
        assert!(err.is_user_error());
    }

    #[test]
    fn move_and_delete_report_missing_tasks() {
        let mut board = Board::in_memory();
        let task = titled(&mut board, "Ship it");
        cmd_move(&mut board, &task.id, Status::Done).unwrap();
        assert_eq!(board.tasks().get(&task.id).unwrap().status, Status::Done);
        assert!(board.pending_events().is_empty());

        cmd_delete(&mut board, &task.id).unwrap();
        assert!(matches!(cmd_delete(&mut board, &task.id), Err(BoardError::TaskNotFound(_))));
    }

    #[test]
    fn add_rejects_bad_due_dates() {
        let mut board = Board::in_memory();
        for due in ["someday", "in 100000000d", "in 99999999999w"] {
            let args = AddArgs {
                title: "Dated".into(),
                desc: None,
                status: None,
                priority: None,
                assignee: None,
                due: Some(due.into()),
                labels: vec!["Bug, ui".into()],
                project: None,
            };
            assert!(matches!(cmd_add(&mut board, args), Err(BoardError::InvalidDueDate(_))));
        }
        assert!(board.tasks().is_empty());
    }

    #[test]
    fn update_clears_optional_fields() {
        let mut board = Board::in_memory();
        let task = board
            .create_task(
                NewTask {
                    title: "Assigned".into(),
                    assignee: Some("user1".into()),
                    due_date: NaiveDate::from_ymd_opt(2030, 1, 1),
                    ..Default::default()
                },
                false,
            )
            .unwrap();
        let args = UpdateArgs {
            id: task.id.clone(),
            title: None,
            desc: None,
            status: None,
            priority: None,
            assignee: None,
            clear_assignee: true,
            due: None,
            clear_due: true,
            add_labels: vec!["backend".into()],
            rm_labels: vec![],
            project: None,
        };
        cmd_update(&mut board, args).unwrap();
        let task = board.tasks().get(&task.id).unwrap();
        assert_eq!(task.assignee, None);
        assert_eq!(task.due_date, None);
        assert_eq!(task.labels, vec!["backend".to_string()]);
    }

    #[test]
    fn switching_to_unknown_project_is_rejected() {
        let mut board = Board::in_memory();
        let err = cmd_project(&mut board, ProjectAction::Switch { id: "nope".into() }).unwrap_err();
        assert!(matches!(err, BoardError::UnknownProject(_)));
        assert_eq!(board.current_project_id(), "project-1");
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Marketing Campaign", 10), "Marketing…");
    }
}
