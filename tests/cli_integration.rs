//! Integration tests for the `tb` CLI.
//!
//! Each test creates a temp board directory, runs `tb` as a subprocess,
//! and verifies stdout and/or file contents.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use pretty_assertions::assert_eq;

/// Get the path to the built `tb` binary.
fn tb_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("tb");
    path
}

/// Create a board with four tasks and two projects.
fn create_test_board(root: &Path) {
    let dir = root.join(".taskboard");
    fs::create_dir_all(&dir).unwrap();

    fs::write(
        dir.join("config.toml"),
        r#"[board]
name = "Launch"

[user]
name = "Ada"

[view]
default_filter = "all"
title_width = 40
"#,
    )
    .unwrap();

    fs::write(
        dir.join("tasks.json"),
        r#"[
  {"id": 1, "title": "Design landing page", "category": "Design", "project": "Website",
   "priority": "high", "status": "pending", "dueDate": "2025-05-20", "position": 0,
   "createdAt": "2025-04-02T10:00:00Z"},
  {"id": 2, "title": "Build API", "description": "REST endpoints", "category": "Development",
   "project": "Website", "status": "in-progress", "dueDate": "2025-05-10", "position": 1,
   "createdAt": "2025-04-10T10:00:00Z"},
  {"id": 3, "title": "Write docs", "status": "completed", "position": 2,
   "createdAt": "2025-05-01T10:00:00Z"},
  {"id": 4, "title": "User research", "project": "Mobile App", "priority": "low",
   "position": 3, "createdAt": "2025-05-03T10:00:00Z"}
]
"#,
    )
    .unwrap();

    fs::write(
        dir.join("projects.json"),
        r#"[
  {"id": 1, "name": "Website", "description": "Redesign", "status": "active",
   "priority": "high", "progress": 65, "budget": 50000, "spent": 32500},
  {"id": 2, "name": "Mobile App", "description": "Customer app", "status": "planning",
   "priority": "medium", "progress": 15, "budget": 80000, "spent": 12000}
]
"#,
    )
    .unwrap();
}

/// Run `tb` with the given args in the given directory, returning (stdout, stderr, success).
fn run_tb(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(tb_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("TB_LOG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run tb");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `tb` expecting success, return stdout.
fn run_tb_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_tb(dir, args);
    if !success {
        panic!(
            "tb {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

fn run_tb_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let mut full = args.to_vec();
    full.push("--json");
    let out = run_tb_ok(dir, &full);
    serde_json::from_str(&out).unwrap()
}

fn listed_ids(dir: &Path, args: &[&str]) -> Vec<u64> {
    let mut full = vec!["list"];
    full.extend_from_slice(args);
    run_tb_json(dir, &full)
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_u64().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

#[test]
fn test_init_then_add() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_tb_ok(tmp.path(), &["init", "--name", "Demo"]);
    assert!(out.contains("Initialized board: Demo"));
    assert!(tmp.path().join(".taskboard/config.toml").is_file());

    let id = run_tb_ok(tmp.path(), &["add", "First task"]);
    assert_eq!(id.trim(), "1");
    assert_eq!(listed_ids(tmp.path(), &[]), vec![1]);

    let (_, stderr, success) = run_tb(tmp.path(), &["init"]);
    assert!(!success);
    assert!(stderr.contains("already exists"));
}

#[test]
fn test_not_a_board() {
    let tmp = tempfile::TempDir::new().unwrap();
    let (_, stderr, success) = run_tb(tmp.path(), &["list"]);
    assert!(!success);
    assert!(stderr.contains("not a task board"));
}

#[test]
fn test_board_dir_flag() {
    let tmp = tempfile::TempDir::new().unwrap();
    let board = tmp.path().join("board");
    fs::create_dir_all(&board).unwrap();
    create_test_board(&board);

    let out = run_tb_ok(tmp.path(), &["-C", board.to_str().unwrap(), "list"]);
    assert!(out.contains("Design landing page"));
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

#[test]
fn test_list_in_position_order() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    let out = run_tb_ok(tmp.path(), &["list"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("  0  [ ] #1"));
    assert!(lines[1].contains("[>] #2"));
    assert!(lines[2].contains("[x] #3"));
}

#[test]
fn test_list_filter_and_search() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    assert_eq!(listed_ids(tmp.path(), &["--filter", "completed"]), vec![3]);
    assert_eq!(listed_ids(tmp.path(), &["--filter", "pending"]), vec![1, 4]);
    // description and category are searched too
    assert_eq!(listed_ids(tmp.path(), &["--search", "rest"]), vec![2]);
    assert_eq!(listed_ids(tmp.path(), &["--search", "DESIGN"]), vec![1]);

    let (_, stderr, success) = run_tb(tmp.path(), &["list", "--filter", "soon"]);
    assert!(!success);
    assert!(stderr.contains("unknown filter"));
}

#[test]
fn test_show_json_has_nested_comments() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    let root = run_tb_json(tmp.path(), &["comment", "1", "Looks good"]);
    let root_id = root["commentId"].as_str().unwrap().to_string();
    run_tb_ok(
        tmp.path(),
        &["comment", "1", "Agreed", "--reply-to", &root_id[..8]],
    );

    let task = run_tb_json(tmp.path(), &["show", "1"]);
    let comments = task["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["author"], "Ada");
    assert_eq!(comments[0]["replies"][0]["text"], "Agreed");
    assert_eq!(comments[0]["replies"][0]["parentId"], root_id.as_str());

    let out = run_tb_ok(tmp.path(), &["show", "1"]);
    assert!(out.contains("comments (2):"));
}

#[test]
fn test_calendar_and_timeline() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    let events = run_tb_json(tmp.path(), &["calendar"]);
    let ids: Vec<u64> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["taskId"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2]);

    let out = run_tb_ok(tmp.path(), &["calendar"]);
    let first = out.lines().next().unwrap();
    assert!(first.starts_with("2025-05-10"));

    let groups = run_tb_json(tmp.path(), &["timeline"]);
    let names: Vec<&str> = groups
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["project"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Website", "Unassigned", "Mobile App"]);
    let website: Vec<u64> = groups[0]["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_u64().unwrap())
        .collect();
    assert_eq!(website, vec![2, 1]);
}

#[test]
fn test_stats_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    let stats = run_tb_json(tmp.path(), &["stats"]);
    assert_eq!(stats["summary"]["totalProjects"], 2);
    assert_eq!(stats["summary"]["totalTasks"], 4);
    assert_eq!(stats["summary"]["pending"], 2);
    assert_eq!(stats["summary"]["completionRate"], 25);
    assert_eq!(stats["category"]["Other"], 2);
    assert_eq!(stats["projectStatus"]["active"], 1);
    assert_eq!(
        stats["monthly"]["categories"],
        serde_json::json!(["2025-04", "2025-05"])
    );
    assert_eq!(stats["monthly"]["series"][0]["name"], "Pending");
    assert_eq!(stats["monthly"]["series"][0]["data"], serde_json::json!([1, 1]));
}

#[test]
fn test_projects_sorted_and_filtered() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    let names = |args: &[&str]| -> Vec<String> {
        let mut full = vec!["projects"];
        full.extend_from_slice(args);
        run_tb_json(tmp.path(), &full)
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap().to_string())
            .collect()
    };
    assert_eq!(names(&[]), vec!["Mobile App", "Website"]);
    assert_eq!(names(&["--sort", "progress", "--desc"]), vec!["Website", "Mobile App"]);
    assert_eq!(names(&["--status", "active"]), vec!["Website"]);
    assert_eq!(names(&["--search", "customer"]), vec!["Mobile App"]);
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

#[test]
fn test_mv_last_to_first() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    let out = run_tb_ok(tmp.path(), &["mv", "3", "0"]);
    assert_eq!(out.trim(), "moved #4 to index 0");
    assert_eq!(listed_ids(tmp.path(), &[]), vec![4, 1, 2, 3]);

    let positions: Vec<u64> = run_tb_json(tmp.path(), &["list"])
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["position"].as_u64().unwrap())
        .collect();
    assert_eq!(positions, vec![0, 1, 2, 3]);
}

#[test]
fn test_mv_within_filter() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    // pending view is [1, 4]; hidden tasks keep their slots
    run_tb_ok(tmp.path(), &["mv", "1", "0", "--filter", "pending"]);
    assert_eq!(listed_ids(tmp.path(), &["--filter", "pending"]), vec![4, 1]);
    assert_eq!(listed_ids(tmp.path(), &[]), vec![4, 2, 3, 1]);
}

#[test]
fn test_mv_out_of_range() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());
    let (_, stderr, success) = run_tb(tmp.path(), &["mv", "7", "0"]);
    assert!(!success);
    assert!(stderr.contains("no task at index 7"));
}

#[test]
fn test_status_edit_and_rm() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    let out = run_tb_ok(tmp.path(), &["status", "4", "completed"]);
    assert_eq!(out.trim(), "#4 Completed");
    run_tb_ok(
        tmp.path(),
        &["edit", "4", "--title", "Interview users", "--due", "2025-06-01"],
    );
    let task = run_tb_json(tmp.path(), &["show", "4"]);
    assert_eq!(task["status"], "completed");
    assert_eq!(task["title"], "Interview users");
    assert_eq!(task["dueDate"], "2025-06-01");

    run_tb_ok(tmp.path(), &["edit", "4", "--no-due"]);
    let task = run_tb_json(tmp.path(), &["show", "4"]);
    assert!(task.get("dueDate").is_none());

    let out = run_tb_ok(tmp.path(), &["rm", "4"]);
    assert!(out.contains("deleted #4"));
    assert_eq!(listed_ids(tmp.path(), &[]), vec![1, 2, 3]);

    let (_, stderr, success) = run_tb(tmp.path(), &["rm", "4"]);
    assert!(!success);
    assert!(stderr.contains("task not found: 4"));
}

#[test]
fn test_add_validation() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    let (_, stderr, success) = run_tb(tmp.path(), &["add", "   "]);
    assert!(!success);
    assert!(stderr.contains("title is required"));

    let (_, stderr, success) = run_tb(tmp.path(), &["add", "Later", "--due", "2025-02-30"]);
    assert!(!success);
    assert!(stderr.contains("invalid date"));

    let task = run_tb_json(
        tmp.path(),
        &["add", "Launch", "--priority", "high", "--project", "Website"],
    );
    assert_eq!(task["id"], 5);
    assert_eq!(task["position"], 4);
    assert_eq!(task["priority"], "high");
}

#[test]
fn test_uncomment_removes_subtree() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    let root = run_tb_json(tmp.path(), &["comment", "2", "Root"]);
    let root_id = root["commentId"].as_str().unwrap().to_string();
    let reply = run_tb_json(tmp.path(), &["comment", "2", "Reply", "--reply-to", &root_id]);
    assert_eq!(reply["totalComments"], 2);
    run_tb_ok(tmp.path(), &["comment", "2", "Standalone"]);

    let out = run_tb_ok(tmp.path(), &["uncomment", "2", &root_id]);
    assert_eq!(out.trim(), "removed 2 comments");
    let task = run_tb_json(tmp.path(), &["show", "2"]);
    let comments = task["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["text"], "Standalone");

    let (_, stderr, success) = run_tb(tmp.path(), &["comment", "2", "x", "--reply-to", "zzz"]);
    assert!(!success);
    assert!(stderr.contains("comment not found"));
}

#[test]
fn test_comment_too_long() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());
    let long = "a".repeat(501);
    let (_, stderr, success) = run_tb(tmp.path(), &["comment", "1", &long]);
    assert!(!success);
    assert!(stderr.contains("maximum 500"));
}

#[test]
fn test_attach_and_detach() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    let att = run_tb_json(
        tmp.path(),
        &["attach", "1", "brief.pdf", "--size", "2048", "--type", "application/pdf"],
    );
    let att_id = att["id"].as_str().unwrap().to_string();
    let out = run_tb_ok(tmp.path(), &["show", "1"]);
    assert!(out.contains("brief.pdf (2 KB, application/pdf)"));

    let (_, stderr, success) = run_tb(
        tmp.path(),
        &["attach", "1", "big.pdf", "--size", "20971520", "--type", "application/pdf"],
    );
    assert!(!success);
    assert!(stderr.contains("too large"));

    let out = run_tb_ok(tmp.path(), &["detach", "1", &att_id]);
    assert_eq!(out.trim(), "detached brief.pdf");
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[test]
fn test_config_user_sets_comment_author() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    run_tb_ok(tmp.path(), &["config", "user", "Grace", "--avatar", "https://example.com/g.png"]);
    let text = fs::read_to_string(tmp.path().join(".taskboard/config.toml")).unwrap();
    assert!(text.contains("name = \"Grace\""));
    assert!(text.contains("[view]"));

    run_tb_ok(tmp.path(), &["comment", "3", "Done and dusted"]);
    let task = run_tb_json(tmp.path(), &["show", "3"]);
    assert_eq!(task["comments"][0]["author"], "Grace");
    assert_eq!(task["comments"][0]["avatar"], "https://example.com/g.png");
}

#[test]
fn test_rm_then_add_keeps_order_across_runs() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    run_tb_ok(tmp.path(), &["rm", "2"]);
    run_tb_ok(tmp.path(), &["rm", "3"]);
    run_tb_ok(tmp.path(), &["add", "Ship"]);
    assert_eq!(listed_ids(tmp.path(), &[]), vec![1, 4, 5]);

    let text = fs::read_to_string(tmp.path().join(".taskboard/tasks.json")).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&text).unwrap();
    let mut positions: Vec<(u64, u64)> = stored
        .as_array()
        .unwrap()
        .iter()
        .map(|t| (t["id"].as_u64().unwrap(), t["position"].as_u64().unwrap()))
        .collect();
    positions.sort();
    assert_eq!(positions, vec![(1, 0), (4, 1), (5, 2)]);
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[test]
fn test_project_add_edit_rm() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    let project = run_tb_json(
        tmp.path(),
        &[
            "project", "add", "Docs Site", "-d", "Developer portal", "--start", "2025-03-01",
            "--end", "2025-09-30", "--status", "active", "--tags", "docs,web",
        ],
    );
    assert_eq!(project["id"], 3);
    assert_eq!(project["status"], "active");
    assert_eq!(project["startDate"], "2025-03-01");
    assert_eq!(project["tags"], serde_json::json!(["docs", "web"]));

    let out = run_tb_ok(tmp.path(), &["project", "edit", "3", "--progress", "40"]);
    assert_eq!(out.trim(), "updated project #3");

    let names: Vec<String> = run_tb_json(tmp.path(), &["projects", "--sort", "progress"])
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Mobile App", "Docs Site", "Website"]);

    let out = run_tb_ok(tmp.path(), &["project", "rm", "3"]);
    assert_eq!(out.trim(), "deleted project #3 Docs Site");
    let (_, stderr, success) = run_tb(tmp.path(), &["project", "rm", "3"]);
    assert!(!success);
    assert!(stderr.contains("project not found: 3"));
}

#[test]
fn test_project_dates_are_validated() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    let (_, stderr, success) = run_tb(
        tmp.path(),
        &["project", "add", "Docs", "-d", "Portal", "--start", "2025-06-01", "--end", "2025-01-01"],
    );
    assert!(!success);
    assert!(stderr.contains("must be after start date"));

    let (_, stderr, success) = run_tb(
        tmp.path(),
        &["project", "add", "Docs", "-d", "  ", "--start", "2025-01-01", "--end", "2025-06-01"],
    );
    assert!(!success);
    assert!(stderr.contains("project description is required"));

    // Stored projects have no dates yet, so an edit must supply both
    let (_, stderr, success) = run_tb(tmp.path(), &["project", "edit", "1", "--progress", "70"]);
    assert!(!success);
    assert!(stderr.contains("start date and end date are required"));

    let text = fs::read_to_string(tmp.path().join(".taskboard/projects.json")).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(stored.as_array().unwrap().len(), 2);
    assert_eq!(stored[0]["progress"], 65);
}

#[test]
fn test_store_file_is_valid_json_after_writes() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());
    run_tb_ok(tmp.path(), &["mv", "0", "2"]);
    run_tb_ok(tmp.path(), &["comment", "1", "hi"]);

    let text = fs::read_to_string(tmp.path().join(".taskboard/tasks.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 4);
    assert!(!tmp.path().join(".taskboard/write.lock").exists());
}
