use std::sync::OnceLock;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Hash a password with a fresh salt. Runs on the blocking pool.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    let password = password.to_string();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

/// Check a password against a stored hash.
///
/// A stored value that is not a bcrypt hash never matches.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let password = password.to_string();
    let hash = hash.to_string();
    let result = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await?;

    match result {
        Ok(matches) => Ok(matches),
        Err(bcrypt::BcryptError::InvalidHash(_))
        | Err(bcrypt::BcryptError::InvalidPrefix(_))
        | Err(bcrypt::BcryptError::InvalidCost(_)) => {
            tracing::warn!("Stored password hash is not a valid bcrypt hash; login disabled");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Spend one verification on a throwaway hash so an unknown username takes
/// as long as a wrong password.
pub async fn verify_dummy(password: &str, cost: u32) -> Result<(), PasswordError> {
    static DUMMY_HASH: OnceLock<String> = OnceLock::new();

    let hash = match DUMMY_HASH.get() {
        Some(hash) => hash.clone(),
        None => {
            let hash = hash_password("socialx-dummy-password", cost).await?;
            DUMMY_HASH.get_or_init(|| hash).clone()
        }
    };

    verify_password(password, &hash).await?;
    Ok(())
}
