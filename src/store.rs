// src/store.rs

use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use crate::content::SafeContent;
use crate::error::BoardError;
use crate::models::post::{AuthorRef, Post};

/// Embedded schema migrations, exported so tests can migrate their own
/// (typically in-memory) pools.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Open a pool against the configured database and bring the schema up to
/// date.
pub async fn connect(database_url: &str) -> Result<SqlitePool, BoardError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await?;

    MIGRATOR.run(&pool).await?;

    Ok(pool)
}

/// Linkage fields read from a prospective parent row.
#[derive(Debug, FromRow)]
struct ParentLink {
    id: i64,
    root_id: Option<i64>,
    depth: i64,
}

/// The post repository. Owns all SQL touching the posts table; the only
/// paths that ever mutate a row are [`PostStore::insert`] (creation),
/// [`PostStore::tombstone`] (deleted_at) and the reply-count recompute.
#[derive(Clone)]
pub struct PostStore {
    pool: SqlitePool,
}

impl PostStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new post, deriving its thread linkage from the parent.
    ///
    /// The parent lookup deliberately does not filter on `deleted_at`:
    /// tombstoned posts remain valid anchors so late replies still land in
    /// the right thread. Lookup, insert and counter repair run in one
    /// transaction to keep concurrent replies under the same parent from
    /// racing each other's counts.
    pub async fn insert(
        &self,
        content: &SafeContent,
        author: &AuthorRef,
        parent_id: Option<i64>,
    ) -> Result<i64, BoardError> {
        let mut tx = self.pool.begin().await?;

        let link = match parent_id {
            Some(pid) => {
                let parent = sqlx::query_as::<_, ParentLink>(
                    "SELECT id, root_id, depth FROM posts WHERE id = ?",
                )
                .bind(pid)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(BoardError::ParentNotFound)?;

                // A parent with no root_id is itself the thread root.
                Some((parent.id, parent.root_id.unwrap_or(parent.id), parent.depth + 1))
            }
            None => None,
        };

        let (root_id, depth) = match link {
            Some((_, root, depth)) => (Some(root), depth),
            None => (None, 0),
        };

        let (author_kind, author_id, author_name) = author.columns();

        let new_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO posts
                (content_source, content_rendered, author_kind, author_id,
                 author_name, parent_id, root_id, depth, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&content.source)
        .bind(&content.rendered)
        .bind(author_kind)
        .bind(author_id)
        .bind(author_name)
        .bind(parent_id)
        .bind(root_id)
        .bind(depth)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        // Counter repair is best effort: the inserted row is the durable
        // source of truth and the count can always be rederived.
        if let Some((pid, _, _)) = link {
            if let Err(err) = recompute_on(&mut *tx, pid).await {
                tracing::error!("Failed to update reply count for post {}: {}", pid, err);
            }
        }

        tx.commit().await?;

        Ok(new_id)
    }

    /// All live root posts, newest first. Summary only, no descendants.
    pub async fn fetch_roots(&self) -> Result<Vec<Post>, BoardError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, content_source, content_rendered, author_kind, author_id,
                   author_name, parent_id, root_id, depth, reply_count,
                   created_at, deleted_at
            FROM posts
            WHERE parent_id IS NULL AND deleted_at IS NULL
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Every row of a thread in a single ordered scan, tombstones included
    /// so the assembler can keep live replies anchored under deleted
    /// ancestors. Depth-ascending order is the assembler's precondition;
    /// id-ascending within a depth gives children their listing order.
    pub async fn fetch_thread(&self, root_id: i64) -> Result<Vec<Post>, BoardError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, content_source, content_rendered, author_kind, author_id,
                   author_name, parent_id, root_id, depth, reply_count,
                   created_at, deleted_at
            FROM posts
            WHERE id = ? OR root_id = ?
            ORDER BY depth ASC, id ASC
            "#,
        )
        .bind(root_id)
        .bind(root_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Map any post id, live or tombstoned, to its thread root.
    pub async fn resolve_root(&self, post_id: i64) -> Result<Option<i64>, BoardError> {
        let root = sqlx::query_scalar::<_, i64>(
            "SELECT coalesce(root_id, id) FROM posts WHERE id = ?",
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(root)
    }

    /// Live direct children of a post, oldest first. No further nesting.
    pub async fn fetch_children(&self, post_id: i64) -> Result<Vec<Post>, BoardError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, content_source, content_rendered, author_kind, author_id,
                   author_name, parent_id, root_id, depth, reply_count,
                   created_at, deleted_at
            FROM posts
            WHERE parent_id = ? AND deleted_at IS NULL
            ORDER BY id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Direct row lookup. Tombstoned posts still resolve here; only listing
    /// and thread queries hide them.
    pub async fn get_post(&self, post_id: i64) -> Result<Option<Post>, BoardError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, content_source, content_rendered, author_kind, author_id,
                   author_name, parent_id, root_id, depth, reply_count,
                   created_at, deleted_at
            FROM posts
            WHERE id = ?
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    /// Tombstone a live post, returning its parent id (if any) after
    /// repairing that parent's reply count. `NotFound` when the post does
    /// not exist or is already tombstoned.
    pub async fn tombstone(&self, post_id: i64) -> Result<Option<i64>, BoardError> {
        let mut tx = self.pool.begin().await?;

        let parent_id: Option<i64> = sqlx::query_scalar::<_, Option<i64>>(
            r#"
            UPDATE posts SET deleted_at = ?
            WHERE id = ? AND deleted_at IS NULL
            RETURNING parent_id
            "#,
        )
        .bind(Utc::now())
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(BoardError::NotFound)?;

        if let Some(pid) = parent_id {
            if let Err(err) = recompute_on(&mut *tx, pid).await {
                tracing::error!("Failed to update reply count for post {}: {}", pid, err);
            }
        }

        tx.commit().await?;

        Ok(parent_id)
    }

    /// Recount a post's live direct children and store the result. Safe to
    /// call at any time; the counter is always rederivable from the rows.
    pub async fn recompute_reply_count(&self, post_id: i64) -> Result<(), BoardError> {
        let mut conn = self.pool.acquire().await?;
        recompute_on(&mut *conn, post_id).await
    }
}

async fn recompute_on(conn: &mut SqliteConnection, post_id: i64) -> Result<(), BoardError> {
    sqlx::query(
        r#"
        UPDATE posts
        SET reply_count = (SELECT count(*) FROM posts c
                           WHERE c.deleted_at IS NULL AND c.parent_id = posts.id)
        WHERE id = ?
        "#,
    )
    .bind(post_id)
    .execute(&mut *conn)
    .await
    .map_err(|err| BoardError::CounterMaintenance(err.to_string()))?;

    Ok(())
}
