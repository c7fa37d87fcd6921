use serde::{Deserialize, Serialize};

use super::comment::Identity;

/// Configuration from `.taskboard/config.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    pub board: BoardInfo,
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub attachments: AttachmentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardInfo {
    pub name: String,
}

/// Identity used as comment author
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    /// Default: see `init` template
    #[serde(default = "default_user_name")]
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl Default for UserConfig {
    fn default() -> Self {
        UserConfig {
            name: default_user_name(),
            avatar: None,
        }
    }
}

impl UserConfig {
    pub fn identity(&self) -> Identity {
        Identity {
            name: self.name.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

fn default_user_name() -> String {
    "Current User".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Filter applied by `list`, `calendar` and `timeline` when none is given
    #[serde(default = "default_filter")]
    pub default_filter: String,
    /// Titles wider than this many terminal cells are truncated in listings
    #[serde(default = "default_title_width")]
    pub title_width: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            default_filter: default_filter(),
            title_width: default_title_width(),
        }
    }
}

fn default_filter() -> String {
    "all".to_string()
}

fn default_title_width() -> usize {
    60
}

/// Limits checked before attachment metadata is stored on a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentConfig {
    /// Maximum size in bytes
    #[serde(default = "default_max_size")]
    pub max_size: u64,
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        AttachmentConfig {
            max_size: default_max_size(),
            allowed_types: default_allowed_types(),
        }
    }
}

fn default_max_size() -> u64 {
    10 * 1024 * 1024
}

fn default_allowed_types() -> Vec<String> {
    [
        "application/pdf",
        "application/msword",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "application/vnd.ms-excel",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "text/plain",
        "image/jpeg",
        "image/png",
        "image/gif",
        "image/webp",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
