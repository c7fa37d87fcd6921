use std::fs;
use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::store_io::{self, BOARD_DIR, CONFIG_FILE, PROJECTS_FILE, TASKS_FILE};

const CONFIG_TEMPLATE: &str = r##"[board]
name = "{name}"

# Comments are attributed to this identity. Change with: tb config user <NAME>
[user]
name = "{user}"
# avatar = "https://example.com/me.png"

[view]
# all, pending, in-progress, completed, today, upcoming
default_filter = "all"
title_width = 60

# --- Attachments ---
# Uncomment to override the defaults (10 MB, common documents and images).
#
# [attachments]
# max_size = 10485760
# allowed_types = ["application/pdf", "image/png", "image/jpeg"]
"##;

const DEFAULT_USER: &str = "Current User";

/// Infer a board name from a directory name: replace hyphens with spaces, title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Escape a value for a basic TOML string
fn toml_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn render_config(name: &str, user: &str) -> String {
    CONFIG_TEMPLATE
        .replace("{name}", &toml_escape(name))
        .replace("{user}", &toml_escape(user))
}

pub fn cmd_init(args: InitArgs, root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let board_dir = root.join(BOARD_DIR);
    if board_dir.is_dir() {
        return Err(format!("a board already exists in {}/", board_dir.display()).into());
    }

    if let Some(parent) = root.parent()
        && let Ok(parent_root) = store_io::discover_board(parent)
    {
        eprintln!(
            "Note: parent board found at {}/",
            parent_root.join(BOARD_DIR).display()
        );
        eprintln!("Creating new board in {}/", board_dir.display());
    }

    let name = args.name.unwrap_or_else(|| {
        root.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Untitled".to_string())
    });
    let user = args.user.unwrap_or_else(|| DEFAULT_USER.to_string());

    fs::create_dir_all(&board_dir)?;
    fs::write(board_dir.join(CONFIG_FILE), render_config(&name, &user))?;
    fs::write(board_dir.join(TASKS_FILE), "[]\n")?;
    fs::write(board_dir.join(PROJECTS_FILE), "[]\n")?;

    tracing::info!(root = %root.display(), "initialized board");
    println!("Initialized board: {}", name);
    Ok(())
}
