use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client-generated comment identifier (UUID v4 text)
pub type CommentId = String;

/// Who is writing a comment. Passed in explicitly, never looked up globally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Identity {
            name: name.into(),
            avatar: None,
        }
    }
}

/// A single comment's own data (without its replies)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub text: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Owning comment within the same task, `None` for a root comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
}

/// Nested form of a comment and its replies, used on the wire and for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: Comment,
    #[serde(default)]
    pub replies: Vec<CommentThread>,
}

/// Error type for comment tree operations
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommentError {
    #[error("comment not found: {0}")]
    NotFound(String),
    #[error("duplicate comment id: {0}")]
    DuplicateId(String),
    #[error("malformed comment tree: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CommentNode {
    comment: Comment,
    children: Vec<CommentId>,
}

/// The comment forest of one task, stored as an arena.
///
/// Every node lives in a flat id → node map and refers to its replies by id;
/// `roots` keeps the top-level order. Insertion order is display order at
/// every level. Serialized as a nested list of [`CommentThread`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CommentThread>", into = "Vec<CommentThread>")]
pub struct CommentTree {
    nodes: HashMap<CommentId, CommentNode>,
    roots: Vec<CommentId>,
}

impl CommentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of comments at every depth
    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Comment> {
        self.nodes.get(id).map(|n| &n.comment)
    }

    /// Top-level comment ids in display order
    pub fn roots(&self) -> &[CommentId] {
        &self.roots
    }

    /// Direct reply ids of a comment in display order (empty if unknown)
    pub fn replies(&self, id: &str) -> &[CommentId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Attach `comment` under `parent`, or as a new root when `parent` is `None`.
    ///
    /// The comment's `parent_id` is overwritten to match where it was placed.
    /// A missing parent leaves the tree untouched and reports `NotFound`.
    pub fn insert_reply(
        &mut self,
        parent: Option<&str>,
        mut comment: Comment,
    ) -> Result<(), CommentError> {
        if comment.id.is_empty() {
            return Err(CommentError::Malformed("comment without id".into()));
        }
        if self.nodes.contains_key(&comment.id) {
            return Err(CommentError::DuplicateId(comment.id));
        }

        let id = comment.id.clone();
        match parent {
            None => {
                comment.parent_id = None;
                self.roots.push(id.clone());
            }
            Some(parent_id) => {
                let parent_node = self
                    .nodes
                    .get_mut(parent_id)
                    .ok_or_else(|| CommentError::NotFound(parent_id.to_string()))?;
                parent_node.children.push(id.clone());
                comment.parent_id = Some(parent_id.to_string());
            }
        }

        self.nodes.insert(
            id,
            CommentNode {
                comment,
                children: Vec::new(),
            },
        );
        Ok(())
    }

    /// Remove a comment together with its whole reply subtree.
    /// Returns how many comments were removed.
    pub fn delete(&mut self, id: &str) -> Result<usize, CommentError> {
        let parent_id = self
            .nodes
            .get(id)
            .ok_or_else(|| CommentError::NotFound(id.to_string()))?
            .comment
            .parent_id
            .clone();

        match parent_id {
            Some(pid) => {
                if let Some(parent) = self.nodes.get_mut(&pid) {
                    parent.children.retain(|c| c.as_str() != id);
                }
            }
            None => self.roots.retain(|r| r.as_str() != id),
        }

        let mut removed = 0;
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                removed += 1;
                stack.extend(node.children);
            }
        }
        Ok(removed)
    }

    /// Number of comments in the subtree rooted at `id`, the root included
    pub fn count_subtree(&self, id: &str) -> Option<usize> {
        self.nodes.get(id)?;
        let mut count = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(current) {
                count += 1;
                stack.extend(node.children.iter().map(String::as_str));
            }
        }
        Some(count)
    }

    /// Depth-first pre-order traversal, yielding `(depth, comment)` in display order
    pub fn walk(&self) -> Vec<(usize, &Comment)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, &str)> =
            self.roots.iter().rev().map(|id| (0, id.as_str())).collect();
        while let Some((depth, id)) = stack.pop() {
            if let Some(node) = self.nodes.get(id) {
                out.push((depth, &node.comment));
                stack.extend(node.children.iter().rev().map(|c| (depth + 1, c.as_str())));
            }
        }
        out
    }

    /// Rebuild the nested form
    pub fn to_threads(&self) -> Vec<CommentThread> {
        self.roots.iter().filter_map(|id| self.thread(id)).collect()
    }

    fn thread(&self, id: &str) -> Option<CommentThread> {
        let node = self.nodes.get(id)?;
        Some(CommentThread {
            comment: node.comment.clone(),
            replies: node
                .children
                .iter()
                .filter_map(|c| self.thread(c))
                .collect(),
        })
    }

    /// Build the arena from the nested form. Fails on empty or duplicate ids
    /// and on replies whose `parent_id` names a different comment.
    pub fn from_threads(threads: Vec<CommentThread>) -> Result<Self, CommentError> {
        let mut tree = CommentTree::new();
        for thread in threads {
            tree.adopt(None, thread)?;
        }
        Ok(tree)
    }

    fn adopt(&mut self, parent: Option<&str>, thread: CommentThread) -> Result<(), CommentError> {
        let CommentThread { comment, replies } = thread;
        if let Some(declared) = comment.parent_id.as_deref()
            && Some(declared) != parent
        {
            return Err(CommentError::Malformed(format!(
                "comment {} declares parent {} but is nested under {}",
                comment.id,
                declared,
                parent.unwrap_or("the task")
            )));
        }
        let id = comment.id.clone();
        self.insert_reply(parent, comment).map_err(|e| match e {
            CommentError::DuplicateId(dup) => {
                CommentError::Malformed(format!("comment id {} appears twice", dup))
            }
            other => other,
        })?;
        for reply in replies {
            self.adopt(Some(&id), reply)?;
        }
        Ok(())
    }
}

impl TryFrom<Vec<CommentThread>> for CommentTree {
    type Error = CommentError;

    fn try_from(threads: Vec<CommentThread>) -> Result<Self, Self::Error> {
        CommentTree::from_threads(threads)
    }
}

impl From<CommentTree> for Vec<CommentThread> {
    fn from(tree: CommentTree) -> Self {
        tree.to_threads()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn comment(id: &str, text: &str) -> Comment {
        Comment {
            id: id.to_string(),
            text: text.to_string(),
            author: "Ada".to_string(),
            avatar: None,
            created_at: Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap(),
            parent_id: None,
        }
    }

    /// 1
    /// ├── 2
    /// │   └── 4
    /// └── 3
    /// 5
    fn sample_tree() -> CommentTree {
        let mut tree = CommentTree::new();
        tree.insert_reply(None, comment("1", "root one")).unwrap();
        tree.insert_reply(Some("1"), comment("2", "reply")).unwrap();
        tree.insert_reply(Some("1"), comment("3", "another reply")).unwrap();
        tree.insert_reply(Some("2"), comment("4", "deep reply")).unwrap();
        tree.insert_reply(None, comment("5", "root two")).unwrap();
        tree
    }

    #[test]
    fn test_insert_root_appends_in_order() {
        let tree = sample_tree();
        assert_eq!(tree.roots(), &["1".to_string(), "5".to_string()]);
        assert_eq!(tree.get("5").unwrap().parent_id, None);
    }

    #[test]
    fn test_insert_reply_sets_parent() {
        let tree = sample_tree();
        assert_eq!(tree.replies("1"), &["2".to_string(), "3".to_string()]);
        assert_eq!(tree.get("4").unwrap().parent_id.as_deref(), Some("2"));
    }

    #[test]
    fn test_insert_reply_overwrites_stale_parent_id() {
        let mut tree = CommentTree::new();
        tree.insert_reply(None, comment("1", "root")).unwrap();
        let mut c = comment("2", "reply");
        c.parent_id = Some("elsewhere".into());
        tree.insert_reply(Some("1"), c).unwrap();
        assert_eq!(tree.get("2").unwrap().parent_id.as_deref(), Some("1"));
    }

    #[test]
    fn test_insert_reply_missing_parent_is_noop() {
        let mut tree = sample_tree();
        let before = tree.clone();
        let result = tree.insert_reply(Some("404"), comment("9", "lost"));
        assert_eq!(result, Err(CommentError::NotFound("404".into())));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_insert_duplicate_id_rejected() {
        let mut tree = sample_tree();
        let before = tree.clone();
        let result = tree.insert_reply(Some("3"), comment("2", "again"));
        assert_eq!(result, Err(CommentError::DuplicateId("2".into())));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_insert_empty_id_rejected() {
        let mut tree = CommentTree::new();
        assert!(matches!(
            tree.insert_reply(None, comment("", "x")),
            Err(CommentError::Malformed(_))
        ));
    }

    #[test]
    fn test_count_matches_inserts() {
        let tree = sample_tree();
        assert_eq!(tree.count(), 5);
        assert_eq!(CommentTree::new().count(), 0);
    }

    #[test]
    fn test_count_equals_sum_over_roots() {
        let tree = sample_tree();
        let by_roots: usize = tree
            .roots()
            .iter()
            .map(|r| tree.count_subtree(r).unwrap())
            .sum();
        assert_eq!(by_roots, tree.count());
        assert_eq!(tree.count_subtree("1"), Some(4));
        assert_eq!(tree.count_subtree("404"), None);
    }

    #[test]
    fn test_delete_removes_subtree() {
        let mut tree = sample_tree();
        let removed = tree.delete("2").unwrap();
        assert_eq!(removed, 2);
        assert!(!tree.contains("2"));
        assert!(!tree.contains("4"));
        assert_eq!(tree.replies("1"), &["3".to_string()]);
        assert_eq!(tree.count(), 3);
    }

    #[test]
    fn test_delete_root_with_descendants() {
        let mut tree = sample_tree();
        assert_eq!(tree.delete("1").unwrap(), 4);
        assert_eq!(tree.roots(), &["5".to_string()]);
        for gone in ["1", "2", "3", "4"] {
            assert!(tree.get(gone).is_none(), "{} should be gone", gone);
        }
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let mut tree = sample_tree();
        let before = tree.clone();
        assert_eq!(tree.delete("404"), Err(CommentError::NotFound("404".into())));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_single_reply_scenario() {
        let mut tree = CommentTree::new();
        tree.insert_reply(None, comment("1", "first")).unwrap();
        tree.insert_reply(Some("1"), comment("2", "hi")).unwrap();

        let threads = tree.to_threads();
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].comment.id, "1");
        assert_eq!(threads[0].replies.len(), 1);
        assert_eq!(threads[0].replies[0].comment.id, "2");
        assert!(threads[0].replies[0].replies.is_empty());
        assert_eq!(tree.count(), 2);

        tree.delete("1").unwrap();
        assert!(tree.is_empty());
        assert!(tree.to_threads().is_empty());
    }

    #[test]
    fn test_walk_is_preorder_with_depth() {
        let tree = sample_tree();
        let order: Vec<(usize, &str)> = tree
            .walk()
            .into_iter()
            .map(|(d, c)| (d, c.id.as_str()))
            .collect();
        assert_eq!(order, vec![(0, "1"), (1, "2"), (2, "4"), (1, "3"), (0, "5")]);
    }

    #[test]
    fn test_threads_round_trip_through_json() {
        let tree = sample_tree();
        let json = serde_json::to_string(&tree).unwrap();
        let back: CommentTree = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
        assert_eq!(back.walk().len(), 5);
    }

    #[test]
    fn test_from_threads_fills_missing_parent_ids() {
        let json = r#"[{"id":"a","text":"t","author":"x","createdAt":"2025-05-01T00:00:00Z",
                        "replies":[{"id":"b","text":"r","author":"y","createdAt":"2025-05-01T00:00:00Z"}]}]"#;
        let tree: CommentTree = serde_json::from_str(json).unwrap();
        assert_eq!(tree.get("b").unwrap().parent_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_from_threads_rejects_duplicate_ids() {
        let mut dup = CommentThread {
            comment: comment("a", "root"),
            replies: Vec::new(),
        };
        dup.replies.push(CommentThread {
            comment: comment("a", "same id"),
            replies: Vec::new(),
        });
        assert!(matches!(
            CommentTree::from_threads(vec![dup]),
            Err(CommentError::Malformed(_))
        ));
    }

    #[test]
    fn test_from_threads_rejects_parent_mismatch() {
        let mut child = comment("b", "reply");
        child.parent_id = Some("zzz".into());
        let thread = CommentThread {
            comment: comment("a", "root"),
            replies: vec![CommentThread {
                comment: child,
                replies: Vec::new(),
            }],
        };
        assert!(matches!(
            CommentTree::from_threads(vec![thread]),
            Err(CommentError::Malformed(_))
        ));
    }

    #[test]
    fn test_from_threads_rejects_empty_id() {
        let thread = CommentThread {
            comment: comment("", "root"),
            replies: Vec::new(),
        };
        assert!(CommentTree::from_threads(vec![thread]).is_err());
    }
}
