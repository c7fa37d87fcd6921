use chrono::NaiveDate;

use crate::model::config::AttachmentConfig;
use crate::model::project::Project;
use crate::model::task::Attachment;
use crate::util::format::format_file_size;

/// Longest comment accepted, in characters
pub const MAX_COMMENT_CHARS: usize = 500;

/// Input rejected at the boundary, before any state is touched
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("task title is required")]
    EmptyTitle,
    #[error("comment cannot be empty")]
    EmptyComment,
    #[error("comment is {len} characters long (maximum {max})")]
    CommentTooLong { len: usize, max: usize },
    #[error("file {name} is too large ({size}); maximum is {max}")]
    AttachmentTooLarge {
        name: String,
        size: String,
        max: String,
    },
    #[error("file type {0} is not supported")]
    UnsupportedFileType(String),
    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("project name is required")]
    EmptyProjectName,
    #[error("project description is required")]
    EmptyProjectDescription,
    #[error("start date and end date are required")]
    MissingProjectDates,
    #[error("end date {end} must be after start date {start}")]
    InvertedProjectDates { start: NaiveDate, end: NaiveDate },
    #[error("progress must be between 0 and 100 (got {0})")]
    ProgressOutOfRange(u8),
}

/// Trimmed, non-empty task title
pub fn task_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

/// Trimmed, non-empty comment text within the length limit
pub fn comment_text(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyComment);
    }
    let len = trimmed.chars().count();
    if len > MAX_COMMENT_CHARS {
        return Err(ValidationError::CommentTooLong {
            len,
            max: MAX_COMMENT_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

pub fn attachment(att: &Attachment, limits: &AttachmentConfig) -> Result<(), ValidationError> {
    if att.size > limits.max_size {
        return Err(ValidationError::AttachmentTooLarge {
            name: att.name.clone(),
            size: format_file_size(att.size),
            max: format_file_size(limits.max_size),
        });
    }
    if !limits.allowed_types.iter().any(|t| t == &att.mime_type) {
        return Err(ValidationError::UnsupportedFileType(att.mime_type.clone()));
    }
    Ok(())
}

/// Parse a `YYYY-MM-DD` date
pub fn date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

/// A project as it would be stored: name and description present, both
/// dates set with the end strictly after the start, progress a percentage.
pub fn project(project: &Project) -> Result<(), ValidationError> {
    if project.name.trim().is_empty() {
        return Err(ValidationError::EmptyProjectName);
    }
    if project.description.trim().is_empty() {
        return Err(ValidationError::EmptyProjectDescription);
    }
    let (Some(start), Some(end)) = (project.start_date, project.end_date) else {
        return Err(ValidationError::MissingProjectDates);
    };
    if start >= end {
        return Err(ValidationError::InvertedProjectDates { start, end });
    }
    if project.progress > 100 {
        return Err(ValidationError::ProgressOutOfRange(project.progress));
    }
    Ok(())
}
