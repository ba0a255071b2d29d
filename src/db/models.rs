use chrono::{DateTime, Utc};
use rusqlite::Row;

use super::parse_timestamp;

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostRecord {
    pub id: String,
    pub author_id: String,
    pub text: Option<String>,
    pub image_url: Option<String>,
    pub repost_of: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentRecord {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

pub const USER_COLUMNS: &str = "id, username, name, password_hash, created_at";
pub const POST_COLUMNS: &str = "id, author_id, text, image_url, repost_of, created_at";
pub const COMMENT_COLUMNS: &str = "id, post_id, author_id, text, created_at";

impl UserRecord {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            name: row.get(2)?,
            password_hash: row.get(3)?,
            created_at: parse_timestamp(&row.get::<_, String>(4)?)?,
        })
    }
}

impl PostRecord {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            author_id: row.get(1)?,
            text: row.get(2)?,
            image_url: row.get(3)?,
            repost_of: row.get(4)?,
            created_at: parse_timestamp(&row.get::<_, String>(5)?)?,
        })
    }

    pub fn is_repost(&self) -> bool {
        self.repost_of.is_some()
    }
}

impl CommentRecord {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            post_id: row.get(1)?,
            author_id: row.get(2)?,
            text: row.get(3)?,
            created_at: parse_timestamp(&row.get::<_, String>(4)?)?,
        })
    }
}
