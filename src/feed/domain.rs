// Domain types - validated inputs for the feed, no side effects
use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing fields")]
    MissingFields,

    #[error("Provide text or imageUrl")]
    EmptyPost,

    #[error("Comment text is required")]
    EmptyComment,
}

/// Identifier of a stored post. Only constructible from a well-formed UUID,
/// so a `PostId` in hand never needs a second format check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostId(String);

impl PostId {
    /// Parse caller input. Malformed ids yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        uuid::Uuid::parse_str(raw.trim())
            .ok()
            .map(|id| Self(id.to_string()))
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Keep a value only if it has visible content.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub author_id: String,
    pub text: Option<String>,
    pub image_url: Option<String>,
    pub repost_of: Option<PostId>,
}

impl NewPost {
    /// An authored post. At least one of text and image must carry content.
    pub fn original(
        author_id: impl Into<String>,
        text: Option<String>,
        image_url: Option<String>,
    ) -> Result<Self, ValidationError> {
        let text = non_blank(text);
        let image_url = non_blank(image_url);
        if text.is_none() && image_url.is_none() {
            return Err(ValidationError::EmptyPost);
        }
        Ok(Self {
            author_id: author_id.into(),
            text,
            image_url,
            repost_of: None,
        })
    }

    /// A repost carries no content of its own.
    pub fn repost(author_id: impl Into<String>, original: PostId) -> Self {
        Self {
            author_id: author_id.into(),
            text: None,
            image_url: None,
            repost_of: Some(original),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub post_id: PostId,
    pub author_id: String,
    pub text: String,
}

impl NewComment {
    pub fn new(
        post_id: PostId,
        author_id: impl Into<String>,
        text: String,
    ) -> Result<Self, ValidationError> {
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyComment);
        }
        Ok(Self {
            post_id,
            author_id: author_id.into(),
            text,
        })
    }
}
