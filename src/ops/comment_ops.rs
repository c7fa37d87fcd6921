use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::comment::{Comment, CommentError, CommentId, CommentTree, Identity};
use crate::ops::validate::{self, ValidationError};

/// Build a comment authored by `identity`, with a fresh client-side id.
///
/// The text is trimmed and must be non-empty and within the length limit.
pub fn new_comment(
    text: &str,
    identity: &Identity,
    parent: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Comment, ValidationError> {
    let text = validate::comment_text(text)?;
    Ok(Comment {
        id: Uuid::new_v4().to_string(),
        text,
        author: identity.name.clone(),
        avatar: identity.avatar.clone(),
        created_at: now,
        parent_id: parent.map(str::to_string),
    })
}

/// Resolve a comment reference given on the command line.
///
/// Accepts a full id or an unambiguous prefix of one.
pub fn resolve_id(tree: &CommentTree, reference: &str) -> Result<CommentId, CommentError> {
    if tree.contains(reference) {
        return Ok(reference.to_string());
    }
    let mut matches = tree
        .walk()
        .into_iter()
        .map(|(_, c)| &c.id)
        .filter(|id| !reference.is_empty() && id.starts_with(reference));
    match (matches.next(), matches.next()) {
        (Some(id), None) => Ok(id.clone()),
        (Some(_), Some(_)) => Err(CommentError::Malformed(format!(
            "comment reference '{}' is ambiguous",
            reference
        ))),
        (None, _) => Err(CommentError::NotFound(reference.to_string())),
    }
}
