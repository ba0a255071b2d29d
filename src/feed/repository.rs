// Repository pattern - isolates all database side effects
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use thiserror::Error;

use crate::db::models::{
    CommentRecord, PostRecord, UserRecord, COMMENT_COLUMNS, POST_COLUMNS, USER_COLUMNS,
};
use crate::db::{self, format_timestamp};
use crate::feed::domain::{NewComment, NewPost, NewUser, PostId};
use crate::state::DbPool;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database unavailable: {0}")]
    Unavailable(#[from] r2d2::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Repository trait - all database operations of the feed
#[async_trait]
pub trait FeedRepository: Send + Sync {
    /// Insert a user. Fails with `Conflict` when the username is taken.
    async fn create_user(&self, user: &NewUser) -> Result<UserRecord, RepositoryError>;

    async fn find_user_by_id(&self, id: &str) -> Result<Option<UserRecord>, RepositoryError>;

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, RepositoryError>;

    /// All posts, newest first
    async fn list_posts(&self) -> Result<Vec<PostRecord>, RepositoryError>;

    /// Posts by one author, newest first
    async fn list_posts_by_author(
        &self,
        author_id: &str,
    ) -> Result<Vec<PostRecord>, RepositoryError>;

    async fn find_post(&self, id: &PostId) -> Result<Option<PostRecord>, RepositoryError>;

    async fn create_post(&self, post: &NewPost) -> Result<PostRecord, RepositoryError>;

    /// Insert-or-ignore. Returns whether a new like was written; an existing
    /// (post, user) like is left untouched and is not an error.
    async fn like_post(&self, post_id: &PostId, user_id: &str) -> Result<bool, RepositoryError>;

    /// Returns whether a like was removed.
    async fn unlike_post(&self, post_id: &PostId, user_id: &str)
        -> Result<bool, RepositoryError>;

    async fn count_likes(&self, post_id: &str) -> Result<i64, RepositoryError>;

    async fn has_liked(&self, post_id: &str, user_id: &str) -> Result<bool, RepositoryError>;

    async fn create_comment(&self, comment: &NewComment)
        -> Result<CommentRecord, RepositoryError>;

    async fn count_comments(&self, post_id: &str) -> Result<i64, RepositoryError>;

    /// Comments on a post, oldest first
    async fn list_comments(&self, post_id: &str) -> Result<Vec<CommentRecord>, RepositoryError>;
}

/// SQLite implementation
pub struct SqliteFeedRepository {
    pool: DbPool,
}

impl SqliteFeedRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn query_posts(
        &self,
        filter: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<PostRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM posts {} ORDER BY created_at DESC, id DESC",
            POST_COLUMNS, filter
        );
        let mut stmt = conn.prepare(&sql)?;
        let posts = stmt
            .query_map(args, PostRecord::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    fn find_user_where(
        &self,
        column: &str,
        value: &str,
    ) -> Result<Option<UserRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE {} = ?1", USER_COLUMNS, column),
                params![value],
                UserRecord::from_row,
            )
            .optional()?;
        Ok(user)
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

#[async_trait]
impl FeedRepository for SqliteFeedRepository {
    async fn create_user(&self, user: &NewUser) -> Result<UserRecord, RepositoryError> {
        let conn = self.pool.get()?;
        let id = uuid::Uuid::now_v7().to_string();
        let created_at = db::now();

        let result = conn.execute(
            "INSERT INTO users (id, username, name, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                user.username,
                user.name,
                user.password_hash,
                format_timestamp(created_at)
            ],
        );

        match result {
            Ok(_) => Ok(UserRecord {
                id,
                username: user.username.clone(),
                name: user.name.clone(),
                password_hash: user.password_hash.clone(),
                created_at,
            }),
            Err(e) if is_unique_violation(&e) => Err(RepositoryError::Conflict(format!(
                "username '{}' already taken",
                user.username
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<UserRecord>, RepositoryError> {
        self.find_user_where("id", id)
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, RepositoryError> {
        self.find_user_where("username", username)
    }

    async fn list_posts(&self) -> Result<Vec<PostRecord>, RepositoryError> {
        self.query_posts("", &[])
    }

    async fn list_posts_by_author(
        &self,
        author_id: &str,
    ) -> Result<Vec<PostRecord>, RepositoryError> {
        self.query_posts("WHERE author_id = ?1", &[&author_id])
    }

    async fn find_post(&self, id: &PostId) -> Result<Option<PostRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let post = conn
            .query_row(
                &format!("SELECT {} FROM posts WHERE id = ?1", POST_COLUMNS),
                params![id.as_str()],
                PostRecord::from_row,
            )
            .optional()?;
        Ok(post)
    }

    async fn create_post(&self, post: &NewPost) -> Result<PostRecord, RepositoryError> {
        let conn = self.pool.get()?;
        let id = PostId::generate();
        let created_at = db::now();
        let repost_of = post.repost_of.as_ref().map(|p| p.as_str().to_string());

        conn.execute(
            "INSERT INTO posts (id, author_id, text, image_url, repost_of, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id.as_str(),
                post.author_id,
                post.text,
                post.image_url,
                repost_of,
                format_timestamp(created_at)
            ],
        )?;

        Ok(PostRecord {
            id: id.as_str().to_string(),
            author_id: post.author_id.clone(),
            text: post.text.clone(),
            image_url: post.image_url.clone(),
            repost_of,
            created_at,
        })
    }

    async fn like_post(&self, post_id: &PostId, user_id: &str) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let rows = conn.execute(
            "INSERT INTO likes (id, post_id, user_id, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(post_id, user_id) DO NOTHING",
            params![
                uuid::Uuid::now_v7().to_string(),
                post_id.as_str(),
                user_id,
                format_timestamp(db::now())
            ],
        )?;
        Ok(rows > 0)
    }

    async fn unlike_post(
        &self,
        post_id: &PostId,
        user_id: &str,
    ) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let rows = conn.execute(
            "DELETE FROM likes WHERE post_id = ?1 AND user_id = ?2",
            params![post_id.as_str(), user_id],
        )?;
        Ok(rows > 0)
    }

    async fn count_likes(&self, post_id: &str) -> Result<i64, RepositoryError> {
        let conn = self.pool.get()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM likes WHERE post_id = ?1",
            params![post_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    async fn has_liked(&self, post_id: &str, user_id: &str) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let liked = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM likes WHERE post_id = ?1 AND user_id = ?2)",
            params![post_id, user_id],
            |row| row.get(0),
        )?;
        Ok(liked)
    }

    async fn create_comment(
        &self,
        comment: &NewComment,
    ) -> Result<CommentRecord, RepositoryError> {
        let conn = self.pool.get()?;
        let id = uuid::Uuid::now_v7().to_string();
        let created_at = db::now();

        conn.execute(
            "INSERT INTO comments (id, post_id, author_id, text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                comment.post_id.as_str(),
                comment.author_id,
                comment.text,
                format_timestamp(created_at)
            ],
        )?;

        Ok(CommentRecord {
            id,
            post_id: comment.post_id.as_str().to_string(),
            author_id: comment.author_id.clone(),
            text: comment.text.clone(),
            created_at,
        })
    }

    async fn count_comments(&self, post_id: &str) -> Result<i64, RepositoryError> {
        let conn = self.pool.get()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM comments WHERE post_id = ?1",
            params![post_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    async fn list_comments(&self, post_id: &str) -> Result<Vec<CommentRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM comments WHERE post_id = ?1 ORDER BY created_at ASC, id ASC",
            COMMENT_COLUMNS
        ))?;
        let comments = stmt
            .query_map(params![post_id], CommentRecord::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(comments)
    }
}

/// Type alias for Arc-wrapped repository (for AppState)
pub type DynFeedRepository = Arc<dyn FeedRepository>;
