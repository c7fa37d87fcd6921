mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};

use chrono::{Local, Utc};
use uuid::Uuid;

use crate::board::Board;
use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::store_io::{self, JsonStore};
use crate::model::config::BoardConfig;
use crate::model::project::{NewProject, ProjectPatch, ProjectStatus};
use crate::model::task::{Attachment, NewTask, Task, TaskId, TaskPatch};
use crate::ops::filter::{ProjectQuery, ProjectSort, StatusFilter, project_projects};
use crate::ops::{comment_ops, stats, validate, views};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Resolve the directory commands run against: `-C <dir>` or the cwd
pub fn start_dir(board_dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match board_dir {
        Some(dir) => Ok(std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?),
        None => Ok(std::env::current_dir()?),
    }
}

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let start = start_dir(cli.board_dir.as_deref())?;

    match cli.command {
        // Init runs before board discovery
        Commands::Init(args) => cmd_init(args, &start),

        // Read commands
        Commands::List(args) => cmd_list(args, &start, json),
        Commands::Show(args) => cmd_show(args, &start, json),
        Commands::Calendar(args) => cmd_calendar(args, &start, json),
        Commands::Timeline(args) => cmd_timeline(args, &start, json),
        Commands::Stats => cmd_stats(&start, json),
        Commands::Projects(args) => cmd_projects(args, &start, json),

        // Write commands
        Commands::Add(args) => cmd_add(args, &start, json),
        Commands::Edit(args) => cmd_edit(args, &start),
        Commands::Status(args) => cmd_status(args, &start),
        Commands::Rm(args) => cmd_rm(args, &start),
        Commands::Mv(args) => cmd_mv(args, &start, json),
        Commands::Comment(args) => cmd_comment(args, &start, json),
        Commands::Uncomment(args) => cmd_uncomment(args, &start),
        Commands::Attach(args) => cmd_attach(args, &start, json),
        Commands::Detach(args) => cmd_detach(args, &start),
        Commands::Project(args) => cmd_project(args, &start, json),

        Commands::Config(args) => cmd_config(args, &start, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// An open board plus its configuration
struct Session {
    config: BoardConfig,
    board: Board<JsonStore>,
}

fn open_session(start: &Path) -> Result<Session, Box<dyn std::error::Error>> {
    let root = store_io::discover_board(start)?;
    let store = JsonStore::open(&root)?;
    let (config, _doc) = config_io::read_config(store.dir())?;
    let board = Board::open(store, config.user.identity())
        .with_attachment_limits(config.attachments.clone());
    for warning in board.warnings() {
        eprintln!("warning: {}", warning);
    }
    Ok(Session { config, board })
}

fn parse_filter(arg: Option<&str>, config: &BoardConfig) -> Result<StatusFilter, String> {
    let raw = arg.unwrap_or(&config.view.default_filter);
    StatusFilter::parse(raw).ok_or_else(|| {
        format!(
            "unknown filter '{}' (expected: all, pending, in-progress, completed, today, upcoming)",
            raw
        )
    })
}

fn find_task<'a>(session: &'a Session, id: TaskId) -> Result<&'a Task, String> {
    session
        .board
        .task(id)
        .ok_or_else(|| format!("task not found: {}", id))
}

fn parse_project_status(s: &str) -> Result<ProjectStatus, String> {
    ProjectStatus::parse(s).ok_or_else(|| {
        format!(
            "unknown project status '{}' (expected: planning, active, on-hold, completed, cancelled)",
            s
        )
    })
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(args: ListArgs, start: &Path, json: bool) -> CmdResult {
    let session = open_session(start)?;
    let filter = parse_filter(args.filter.as_deref(), &session.config)?;
    let search = args.search.unwrap_or_default();
    let visible = session.board.visible(filter, &search, Local::now());

    if json {
        let rows: Vec<TaskLineJson> = visible
            .iter()
            .enumerate()
            .map(|(i, t)| task_line_json(i, t))
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else if visible.is_empty() {
        println!("no tasks");
    } else {
        let width = session.config.view.title_width;
        for (i, task) in visible.iter().enumerate() {
            println!("{}", format_task_line(i, task, width));
        }
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, start: &Path, json: bool) -> CmdResult {
    let session = open_session(start)?;
    let task = find_task(&session, args.id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(task)?);
    } else {
        print_lines(&format_task_detail(task, Utc::now()));
    }
    Ok(())
}

fn cmd_calendar(args: ViewArgs, start: &Path, json: bool) -> CmdResult {
    let session = open_session(start)?;
    let filter = parse_filter(args.filter.as_deref(), &session.config)?;
    let search = args.search.unwrap_or_default();
    let visible = session.board.visible(filter, &search, Local::now());
    let mut events = views::calendar_events(&visible);

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
    } else if events.is_empty() {
        println!("no dated tasks");
    } else {
        events.sort_by_key(|e| e.date);
        let width = session.config.view.title_width;
        for event in &events {
            println!("{}", format_calendar_event(event, width));
        }
    }
    Ok(())
}

fn cmd_timeline(args: ViewArgs, start: &Path, json: bool) -> CmdResult {
    let session = open_session(start)?;
    let filter = parse_filter(args.filter.as_deref(), &session.config)?;
    let search = args.search.unwrap_or_default();
    let visible = session.board.visible(filter, &search, Local::now());
    let groups = views::timeline(&visible);

    if json {
        let output: Vec<TimelineGroupJson> = groups
            .iter()
            .map(|(project, tasks)| TimelineGroupJson {
                project: project.clone(),
                tasks: tasks
                    .iter()
                    .enumerate()
                    .map(|(i, t)| task_line_json(i, t))
                    .collect(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if groups.is_empty() {
        println!("no tasks");
    } else {
        print_lines(&format_timeline(&groups, session.config.view.title_width));
    }
    Ok(())
}

fn cmd_stats(start: &Path, json: bool) -> CmdResult {
    let session = open_session(start)?;
    let tasks = session.board.tasks();
    let projects = session.board.projects();
    let output = StatsJson {
        summary: stats::summary(projects, tasks),
        status: stats::status_distribution(tasks),
        priority: stats::priority_distribution(tasks),
        category: stats::category_distribution(tasks),
        project_status: stats::project_status_distribution(projects),
        monthly: stats::monthly_series(
            tasks,
            &crate::model::task::TaskStatus::ALL,
            Utc::now(),
        ),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_lines(&format_stats(&output));
    }
    Ok(())
}

fn cmd_projects(args: ProjectsArgs, start: &Path, json: bool) -> CmdResult {
    let session = open_session(start)?;
    let status = args
        .status
        .as_deref()
        .map(parse_project_status)
        .transpose()?;
    let priority = args.priority.as_deref().map(parse_priority).transpose()?;
    let sort = ProjectSort::parse(&args.sort).ok_or_else(|| {
        format!(
            "unknown sort '{}' (expected: name, progress, budget, spent, start)",
            args.sort
        )
    })?;
    let query = ProjectQuery {
        search: args.search.unwrap_or_default(),
        status,
        priority,
        sort,
        descending: args.desc,
    };
    let projects = project_projects(session.board.projects(), &query);

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
    } else if projects.is_empty() {
        println!("no projects");
    } else {
        let width = projects
            .iter()
            .map(|p| crate::util::unicode::display_width(&p.name))
            .max()
            .unwrap_or(0)
            .min(session.config.view.title_width);
        for project in &projects {
            println!("{}", format_project_line(project, width));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, start: &Path, json: bool) -> CmdResult {
    let mut session = open_session(start)?;
    let mut fields = NewTask::new(args.title);
    fields.description = args.description.unwrap_or_default();
    fields.category = args.category.unwrap_or_default();
    fields.project = args.project.unwrap_or_default();
    if let Some(p) = args.priority.as_deref() {
        fields.priority = parse_priority(p)?;
    }
    if let Some(due) = args.due.as_deref() {
        fields.due_date = Some(validate::date(due)?);
    }
    if let Some(hours) = args.hours {
        fields.estimated_hours = hours;
    }

    let id = session.board.create_task(fields)?;
    if json {
        let task = find_task(&session, id)?;
        println!("{}", serde_json::to_string_pretty(task)?);
    } else {
        println!("{}", id);
    }
    Ok(())
}

fn cmd_edit(args: EditArgs, start: &Path) -> CmdResult {
    let mut session = open_session(start)?;
    let mut patch = TaskPatch {
        title: args.title,
        description: args.description,
        category: args.category,
        project: args.project,
        estimated_hours: args.hours,
        ..Default::default()
    };
    if let Some(p) = args.priority.as_deref() {
        patch.priority = Some(parse_priority(p)?);
    }
    if let Some(due) = args.due.as_deref() {
        patch.due_date = Some(Some(validate::date(due)?));
    } else if args.no_due {
        patch.due_date = Some(None);
    }
    if patch.is_empty() {
        return Err("nothing to change (see tb edit --help)".into());
    }

    session.board.update_task(args.id, patch)?;
    println!("updated #{}", args.id);
    Ok(())
}

fn cmd_status(args: StatusArgs, start: &Path) -> CmdResult {
    let mut session = open_session(start)?;
    let status = parse_task_status(&args.status)?;
    session.board.set_status(args.id, status)?;
    println!("#{} {}", args.id, status.label());
    Ok(())
}

fn cmd_rm(args: RmArgs, start: &Path) -> CmdResult {
    let mut session = open_session(start)?;
    let removed = session.board.delete_task(args.id)?;
    println!("deleted #{} {}", removed.id, removed.title);
    Ok(())
}

fn cmd_mv(args: MvArgs, start: &Path, json: bool) -> CmdResult {
    let mut session = open_session(start)?;
    let filter = parse_filter(args.filter.as_deref(), &session.config)?;
    let search = args.search.unwrap_or_default();
    let visible: Vec<TaskId> = session
        .board
        .visible(filter, &search, Local::now())
        .iter()
        .map(|t| t.id)
        .collect();
    let moved = *visible.get(args.from).ok_or_else(|| {
        format!(
            "no task at index {} (the listing has {} tasks)",
            args.from,
            visible.len()
        )
    })?;

    let updates = session.board.reorder(&visible, moved, args.from, args.to)?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&MoveJson { moved, updates })?
        );
    } else if updates.is_empty() {
        println!("#{} already at index {}", moved, args.to);
    } else {
        println!("moved #{} to index {}", moved, args.to);
    }
    Ok(())
}

fn cmd_comment(args: CommentArgs, start: &Path, json: bool) -> CmdResult {
    let mut session = open_session(start)?;
    let parent = match args.reply_to.as_deref() {
        Some(reference) => {
            let task = find_task(&session, args.id)?;
            Some(comment_ops::resolve_id(&task.comments, reference)?)
        }
        None => None,
    };

    let comment_id = session
        .board
        .add_comment(args.id, &args.text, parent.as_deref())?;
    let total = session.board.comment_count(args.id)?;
    if json {
        let output = CommentAddedJson {
            task_id: args.id,
            comment_id,
            total_comments: total,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", short_id(&comment_id));
    }
    Ok(())
}

fn cmd_uncomment(args: UncommentArgs, start: &Path) -> CmdResult {
    let mut session = open_session(start)?;
    let task = find_task(&session, args.id)?;
    let comment_id = comment_ops::resolve_id(&task.comments, &args.comment)?;
    let removed = session.board.delete_comment(args.id, &comment_id)?;
    println!(
        "removed {} comment{}",
        removed,
        if removed == 1 { "" } else { "s" }
    );
    Ok(())
}

fn cmd_attach(args: AttachArgs, start: &Path, json: bool) -> CmdResult {
    let mut session = open_session(start)?;
    let attachment = Attachment {
        id: Uuid::new_v4().to_string(),
        name: args.name,
        size: args.size,
        mime_type: args.mime_type,
        url: args.url,
        uploaded_at: Utc::now(),
    };
    let id = attachment.id.clone();
    session.board.attach(args.id, attachment.clone())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&attachment)?);
    } else {
        println!("{}", id);
    }
    Ok(())
}

fn cmd_detach(args: DetachArgs, start: &Path) -> CmdResult {
    let mut session = open_session(start)?;
    let removed = session.board.detach(args.id, &args.attachment)?;
    println!("detached {}", removed.name);
    Ok(())
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

fn cmd_project(args: ProjectCmd, start: &Path, json: bool) -> CmdResult {
    let mut session = open_session(start)?;
    match args.action {
        ProjectAction::Add(add) => {
            let mut fields = NewProject::new(add.name, add.description)
                .with_dates(validate::date(&add.start)?, validate::date(&add.end)?);
            let extra = project_patch(add.fields)?;
            if let Some(status) = extra.status {
                fields.status = status;
            }
            if let Some(priority) = extra.priority {
                fields.priority = priority;
            }
            fields.progress = extra.progress.unwrap_or(fields.progress);
            fields.budget = extra.budget.unwrap_or(fields.budget);
            fields.spent = extra.spent.unwrap_or(fields.spent);
            fields.category = extra.category.unwrap_or_default();
            fields.team = extra.team.unwrap_or_default();
            fields.tags = extra.tags.unwrap_or_default();

            let id = session.board.create_project(fields)?;
            match session.board.project(id) {
                Some(project) if json => println!("{}", serde_json::to_string_pretty(project)?),
                _ => println!("{}", id),
            }
        }
        ProjectAction::Edit(edit) => {
            let mut patch = project_patch(edit.fields)?;
            patch.name = edit.name;
            patch.description = edit.description;
            patch.start_date = edit.start.as_deref().map(validate::date).transpose()?;
            patch.end_date = edit.end.as_deref().map(validate::date).transpose()?;
            if patch.is_empty() {
                return Err("nothing to change (see tb project edit --help)".into());
            }
            session.board.update_project(edit.id, patch)?;
            println!("updated project #{}", edit.id);
        }
        ProjectAction::Rm(rm) => {
            let removed = session.board.delete_project(rm.id)?;
            println!("deleted project #{} {}", removed.id, removed.name);
        }
    }
    Ok(())
}

/// The optional project fields as a patch
fn project_patch(args: ProjectFieldArgs) -> Result<ProjectPatch, Box<dyn std::error::Error>> {
    Ok(ProjectPatch {
        status: args.status.as_deref().map(parse_project_status).transpose()?,
        priority: args.priority.as_deref().map(parse_priority).transpose()?,
        progress: args.progress,
        budget: args.budget,
        spent: args.spent,
        category: args.category,
        team: args.team,
        tags: args.tags,
        ..Default::default()
    })
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config(args: ConfigCmd, start: &Path, json: bool) -> CmdResult {
    let root = store_io::discover_board(start)?;
    let board_dir = root.join(store_io::BOARD_DIR);
    match args.action {
        ConfigAction::Show => {
            let (config, _doc) = config_io::read_config(&board_dir)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        }
        ConfigAction::User(user) => {
            if user.name.trim().is_empty() {
                return Err("user name cannot be empty".into());
            }
            let (_config, mut doc) = config_io::read_config(&board_dir)?;
            config_io::set_user(&mut doc, user.name.trim(), user.avatar.as_deref());
            config_io::write_config(&board_dir, &doc)?;
            println!("comments will be attributed to {}", user.name.trim());
        }
    }
    Ok(())
}
