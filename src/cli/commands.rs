use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tb", about = concat!("taskboard v", env!("CARGO_PKG_VERSION"), " - tasks, threads and charts in your terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different board directory
    #[arg(short = 'C', long = "board-dir", global = true)]
    pub board_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new board in the current directory
    Init(InitArgs),
    /// List tasks in display order
    List(ListArgs),
    /// Show a task with its comments and attachments
    Show(ShowArgs),
    /// Add a task at the end of the board
    Add(AddArgs),
    /// Edit task fields
    Edit(EditArgs),
    /// Change task status
    Status(StatusArgs),
    /// Delete a task
    Rm(RmArgs),
    /// Move a task within the listed order
    Mv(MvArgs),
    /// Comment on a task, or reply to a comment
    Comment(CommentArgs),
    /// Delete a comment and its replies
    Uncomment(UncommentArgs),
    /// Record a file attachment on a task
    Attach(AttachArgs),
    /// Remove an attachment from a task
    Detach(DetachArgs),
    /// Tasks with due dates, for a calendar
    Calendar(ViewArgs),
    /// Tasks by due date, grouped by project
    Timeline(ViewArgs),
    /// Board statistics
    Stats,
    /// List projects
    Projects(ProjectsArgs),
    /// Create, edit or delete a project
    Project(ProjectCmd),
    /// Board configuration
    Config(ConfigCmd),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Board name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Comment author name
    #[arg(long)]
    pub user: Option<String>,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Status filter (all, pending, in-progress, completed, today, upcoming)
    #[arg(long)]
    pub filter: Option<String>,
    /// Case-insensitive text to find in title, description or category
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Task ID
    pub id: u64,
}

#[derive(Args)]
pub struct ViewArgs {
    /// Status filter (all, pending, in-progress, completed, today, upcoming)
    #[arg(long)]
    pub filter: Option<String>,
    /// Case-insensitive text to find in title, description or category
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct ProjectsArgs {
    /// Text to find in project name or description
    #[arg(long)]
    pub search: Option<String>,
    /// Project status (planning, active, on-hold, completed, cancelled)
    #[arg(long)]
    pub status: Option<String>,
    /// Project priority (low, medium, high)
    #[arg(long)]
    pub priority: Option<String>,
    /// Sort key (name, progress, budget, spent, start)
    #[arg(long, default_value = "name")]
    pub sort: String,
    /// Sort descending
    #[arg(long)]
    pub desc: bool,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    #[arg(long, short = 'd')]
    pub description: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub project: Option<String>,
    /// low, medium or high
    #[arg(long)]
    pub priority: Option<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
    /// Estimated effort in hours
    #[arg(long)]
    pub hours: Option<f64>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID
    pub id: u64,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long, short = 'd')]
    pub description: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub project: Option<String>,
    /// low, medium or high
    #[arg(long)]
    pub priority: Option<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long, conflicts_with = "no_due")]
    pub due: Option<String>,
    /// Clear the due date
    #[arg(long)]
    pub no_due: bool,
    /// Estimated effort in hours
    #[arg(long)]
    pub hours: Option<f64>,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Task ID
    pub id: u64,
    /// pending, in-progress or completed
    pub status: String,
}

#[derive(Args)]
pub struct RmArgs {
    /// Task ID
    pub id: u64,
}

#[derive(Args)]
pub struct MvArgs {
    /// Current index in the listed order (0-based)
    pub from: usize,
    /// New index in the listed order (0-based)
    pub to: usize,
    /// Status filter of the listing the indices refer to
    #[arg(long)]
    pub filter: Option<String>,
    /// Search text of the listing the indices refer to
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct CommentArgs {
    /// Task ID
    pub id: u64,
    /// Comment text
    pub text: String,
    /// Comment ID (or unique prefix) to reply to
    #[arg(long)]
    pub reply_to: Option<String>,
}

#[derive(Args)]
pub struct UncommentArgs {
    /// Task ID
    pub id: u64,
    /// Comment ID or unique prefix
    pub comment: String,
}

#[derive(Args)]
pub struct AttachArgs {
    /// Task ID
    pub id: u64,
    /// File name
    pub name: String,
    /// Size in bytes
    #[arg(long)]
    pub size: u64,
    /// MIME type, e.g. application/pdf
    #[arg(long = "type")]
    pub mime_type: String,
    /// Where the file is stored
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(Args)]
pub struct DetachArgs {
    /// Task ID
    pub id: u64,
    /// Attachment ID
    pub attachment: String,
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ProjectCmd {
    #[command(subcommand)]
    pub action: ProjectAction,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a project
    Add(ProjectAddArgs),
    /// Edit project fields
    Edit(ProjectEditArgs),
    /// Delete a project
    Rm(ProjectRmArgs),
}

#[derive(Args)]
pub struct ProjectAddArgs {
    /// Project name
    pub name: String,
    #[arg(long, short = 'd')]
    pub description: String,
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: String,
    /// End date (YYYY-MM-DD), after the start date
    #[arg(long)]
    pub end: String,
    #[command(flatten)]
    pub fields: ProjectFieldArgs,
}

#[derive(Args)]
pub struct ProjectEditArgs {
    /// Project ID
    pub id: u64,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, short = 'd')]
    pub description: Option<String>,
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,
    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,
    #[command(flatten)]
    pub fields: ProjectFieldArgs,
}

/// Optional fields shared by `project add` and `project edit`
#[derive(Args)]
pub struct ProjectFieldArgs {
    /// planning, active, on-hold, completed or cancelled
    #[arg(long)]
    pub status: Option<String>,
    /// low, medium or high
    #[arg(long)]
    pub priority: Option<String>,
    /// Completion percentage (0-100)
    #[arg(long)]
    pub progress: Option<u8>,
    #[arg(long)]
    pub budget: Option<f64>,
    #[arg(long)]
    pub spent: Option<f64>,
    #[arg(long)]
    pub category: Option<String>,
    /// Team members, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub team: Option<Vec<String>>,
    /// Tags, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<String>>,
}

#[derive(Args)]
pub struct ProjectRmArgs {
    /// Project ID
    pub id: u64,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Set who comments are attributed to
    User(ConfigUserArgs),
}

#[derive(Args)]
pub struct ConfigUserArgs {
    /// Display name
    pub name: String,
    /// Avatar URL
    #[arg(long)]
    pub avatar: Option<String>,
}
