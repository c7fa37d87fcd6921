use std::fs;
use std::path::{Path, PathBuf};

use crate::io::store_io::{CONFIG_FILE, atomic_write};
use crate::model::config::BoardConfig;

/// Error type for board configuration I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not parse config.toml for editing: {0}")]
    Edit(#[from] toml_edit::TomlError),
}

/// Read the board config, returning both the parsed config and the raw
/// document so edits keep the user's comments and layout.
pub fn read_config(board_dir: &Path) -> Result<(BoardConfig, toml_edit::DocumentMut), ConfigError> {
    let path = board_dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let config: BoardConfig = toml::from_str(&text)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((config, doc))
}

pub fn write_config(board_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    let path = board_dir.join(CONFIG_FILE);
    atomic_write(&path, doc.to_string().as_bytes())
        .map_err(|source| ConfigError::Write { path, source })
}

/// Set the comment author identity. `avatar: None` leaves any existing avatar alone.
pub fn set_user(doc: &mut toml_edit::DocumentMut, name: &str, avatar: Option<&str>) {
    if !doc.contains_key("user") {
        doc["user"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["user"]["name"] = toml_edit::value(name);
    if let Some(avatar) = avatar {
        doc["user"]["avatar"] = toml_edit::value(avatar);
    }
}
