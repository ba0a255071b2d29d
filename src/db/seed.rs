use rusqlite::{params, TransactionBehavior};

use super::now_timestamp;
use crate::state::DbPool;

/// Placeholder password for the demo accounts. Development only.
pub const DEMO_PASSWORD: &str = "dev";

const DEMO_USERS: &[(&str, &str, &str)] = &[
    ("alice", "Alice", "Welcome to SocialX! This is a default post."),
    ("bob", "Bob", "Another sample post from Bob."),
];

/// Insert the demo users and one post each when both users and posts are empty.
///
/// Returns whether anything was written. The emptiness check and the inserts
/// share one immediate transaction, so two initializers cannot both seed.
pub fn seed_demo_data(pool: &DbPool, bcrypt_cost: u32) -> anyhow::Result<bool> {
    let mut conn = pool.get()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let user_count: i64 = tx.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    let post_count: i64 = tx.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
    if user_count > 0 || post_count > 0 {
        return Ok(false);
    }

    // Hashed like signup so the demo accounts can actually log in
    let password_hash = bcrypt::hash(DEMO_PASSWORD, bcrypt_cost)?;

    for (username, name, text) in DEMO_USERS {
        let user_id = uuid::Uuid::now_v7().to_string();
        tx.execute(
            "INSERT INTO users (id, username, name, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, username, name, password_hash, now_timestamp()],
        )?;
        tx.execute(
            "INSERT INTO posts (id, author_id, text, image_url, repost_of, created_at)
             VALUES (?1, ?2, ?3, NULL, NULL, ?4)",
            params![uuid::Uuid::now_v7().to_string(), user_id, text, now_timestamp()],
        )?;
    }

    tx.commit()?;
    Ok(true)
}
