use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub const AUTHOR_KIND_ANONYMOUS: &str = "anonymous";
pub const AUTHOR_KIND_USER: &str = "user";

/// An externally resolved identity. The core never inspects tokens or
/// sessions; it receives the outcome of that verification as a plain value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorRef {
    Anonymous,
    User { id: String, name: String },
}

impl AuthorRef {
    /// Column triple `(author_kind, author_id, author_name)` for persistence.
    pub(crate) fn columns(&self) -> (&str, Option<&str>, Option<&str>) {
        match self {
            AuthorRef::Anonymous => (AUTHOR_KIND_ANONYMOUS, None, None),
            AuthorRef::User { id, name } => (AUTHOR_KIND_USER, Some(id), Some(name)),
        }
    }
}

/// Represents the 'posts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,

    /// The author's input, verbatim.
    pub content_source: String,
    /// Escaped, display-safe rendering of the content.
    pub content_rendered: String,

    pub author_kind: String,
    pub author_id: Option<String>,
    pub author_name: Option<String>,

    /// Immediate parent; NULL for a root post.
    pub parent_id: Option<i64>,
    /// Top of the thread; NULL for a root post (a root is its own root).
    pub root_id: Option<i64>,
    /// 0 for a root, parent depth + 1 for a reply.
    pub depth: i64,

    /// Denormalized count of live direct children.
    pub reply_count: i64,

    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Tombstone timestamp. A tombstoned row is excluded from listings but
    /// retained so its children keep a resolvable parent.
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Post {
    pub fn author(&self) -> AuthorRef {
        match (self.author_kind.as_str(), &self.author_id, &self.author_name) {
            (AUTHOR_KIND_USER, Some(id), Some(name)) => AuthorRef::User {
                id: id.clone(),
                name: name.clone(),
            },
            _ => AuthorRef::Anonymous,
        }
    }

    /// The id of this post's thread root (its own id when it is the root).
    pub fn thread_root(&self) -> i64 {
        self.root_id.unwrap_or(self.id)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// UI helper: "anonymous" for unsigned posts, "@name" otherwise.
    pub fn display_name(&self) -> String {
        match self.author_name.as_deref() {
            Some(name) if self.author_kind == AUTHOR_KIND_USER => format!("@{}", name),
            _ => AUTHOR_KIND_ANONYMOUS.to_string(),
        }
    }
}

/// A post together with its reply subtree, as returned by thread fetches.
#[derive(Debug, Clone, Serialize)]
pub struct PostNode {
    #[serde(flatten)]
    pub post: Post,
    pub children: Vec<PostNode>,
}

impl PostNode {
    /// Total number of posts in this subtree, the node itself included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(PostNode::node_count).sum::<usize>()
    }
}

/// DTO for creating a new post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(
        min = 8,
        max = 10000,
        message = "Content length must be between 8 and 10000 chars"
    ))]
    pub content: String,

    /// Optional: the ID of the post being replied to.
    pub parent_id: Option<i64>,
}
