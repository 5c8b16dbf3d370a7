// src/board.rs

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use validator::Validate;

use crate::config::Config;
use crate::content;
use crate::error::BoardError;
use crate::models::post::{AuthorRef, CreatePostRequest, Post, PostNode};
use crate::store::PostStore;
use crate::tree;

/// The public surface of the content store, consumed by request handlers.
///
/// Deletion policy: an admin may delete any live post at any time; an
/// author may delete their own post only within the configured window of
/// its creation. Anonymous posts carry no provable authorship and can only
/// be deleted by an admin.
#[derive(Clone)]
pub struct Board {
    store: PostStore,
    delete_window: Duration,
}

impl Board {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        Self {
            store: PostStore::new(pool),
            delete_window: Duration::seconds(config.delete_window_secs),
        }
    }

    /// Validate, sanitize and persist a new post or reply.
    ///
    /// Validation runs before any write, so a rejected request leaves no
    /// partial state behind.
    pub async fn create_post(
        &self,
        author: &AuthorRef,
        payload: CreatePostRequest,
    ) -> Result<i64, BoardError> {
        payload
            .validate()
            .map_err(|e| BoardError::Validation(e.to_string()))?;

        let content = content::sanitize(&payload.content);
        if content.is_degenerate() {
            return Err(BoardError::Validation(
                "Content is empty after sanitization".to_string(),
            ));
        }

        self.store.insert(&content, author, payload.parent_id).await
    }

    /// All live root posts, newest first, each carrying its reply count.
    pub async fn list_root_posts(&self) -> Result<Vec<Post>, BoardError> {
        self.store.fetch_roots().await
    }

    /// The full thread containing `post_id`, whether that id is the root or
    /// any reply within it. One flat scan, one linking pass.
    pub async fn get_thread(&self, post_id: i64) -> Result<PostNode, BoardError> {
        let root_id = self
            .store
            .resolve_root(post_id)
            .await?
            .ok_or(BoardError::NotFound)?;

        let rows = self.store.fetch_thread(root_id).await?;
        let full = tree::assemble(rows, root_id)?;

        // A thread whose every post is tombstoned no longer exists as far
        // as readers are concerned.
        tree::prune_deleted(full).ok_or(BoardError::NotFound)
    }

    /// Live direct replies to a post, oldest first.
    pub async fn list_replies(&self, post_id: i64) -> Result<Vec<Post>, BoardError> {
        self.store.fetch_children(post_id).await
    }

    /// Soft-delete a post. Checks run in order: existence, then
    /// authorship/privilege, then the deletion window. Descendants are
    /// never touched; they stay anchored under the tombstoned id.
    pub async fn delete_post(
        &self,
        post_id: i64,
        requester: &AuthorRef,
        is_admin: bool,
    ) -> Result<(), BoardError> {
        let post = self
            .store
            .get_post(post_id)
            .await?
            .filter(|p| !p.is_deleted())
            .ok_or(BoardError::NotFound)?;

        if !is_admin {
            if !is_author(&post, requester) {
                return Err(BoardError::Denied);
            }
            if Utc::now() - post.created_at > self.delete_window {
                return Err(BoardError::Denied);
            }
        }

        self.store.tombstone(post_id).await?;

        Ok(())
    }

    /// Repository access for callers needing operations below the service
    /// surface, such as direct lookups of tombstoned posts.
    pub fn store(&self) -> &PostStore {
        &self.store
    }
}

fn is_author(post: &Post, requester: &AuthorRef) -> bool {
    match requester {
        AuthorRef::User { id, .. } => post.author_id.as_deref() == Some(id.as_str()),
        AuthorRef::Anonymous => false,
    }
}
