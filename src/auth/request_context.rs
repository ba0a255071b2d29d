use crate::auth::tokens::{TokenKeys, TokenRejection};

/// The caller a request acts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
}

/// Outcome of resolving the `Authorization` header of a request.
///
/// `Anonymous` and `Rejected` both carry no identity; they stay distinct so
/// callers can tell a missing token from a bad one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authentication {
    /// No `Authorization` header was sent
    Anonymous,
    /// A credential was sent but did not verify
    Rejected(TokenRejection),
    /// A valid, unexpired bearer token
    Authenticated(Identity),
}

impl Authentication {
    /// Resolve a raw `Authorization` header value.
    pub fn from_header(header: Option<&str>, keys: &TokenKeys) -> Self {
        let Some(value) = header else {
            return Authentication::Anonymous;
        };

        let Some(token) = value.strip_prefix("Bearer ") else {
            return Authentication::Rejected(TokenRejection::UnsupportedScheme);
        };

        match keys.verify(token.trim()) {
            Ok(claims) => Authentication::Authenticated(Identity {
                user_id: claims.sub,
                username: claims.username,
            }),
            Err(rejection) => Authentication::Rejected(rejection),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Authentication::Authenticated(identity) => Some(identity),
            Authentication::Anonymous | Authentication::Rejected(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn keys() -> TokenKeys {
        TokenKeys::new(b"context-secret", 30)
    }

    #[test]
    fn missing_header_is_anonymous() {
        let auth = Authentication::from_header(None, &keys());
        assert_eq!(auth, Authentication::Anonymous);
        assert!(auth.identity().is_none());
    }

    #[test]
    fn valid_bearer_token_authenticates() {
        let keys = keys();
        let token = keys.issue("user-1", "carol").unwrap();
        let header = format!("Bearer {}", token);

        let auth = Authentication::from_header(Some(&header), &keys);
        assert_eq!(
            auth.identity(),
            Some(&Identity {
                user_id: "user-1".to_string(),
                username: "carol".to_string(),
            })
        );
    }

    #[test]
    fn other_schemes_are_rejected() {
        let auth = Authentication::from_header(Some("Basic Y2Fyb2w6cHcx"), &keys());
        assert_eq!(
            auth,
            Authentication::Rejected(TokenRejection::UnsupportedScheme)
        );
        assert!(auth.identity().is_none());
    }

    #[test]
    fn expired_token_is_rejected_not_anonymous() {
        let keys = keys();
        let token = keys
            .issue_at("user-1", "carol", Utc::now() - Duration::days(60))
            .unwrap();
        let header = format!("Bearer {}", token);

        let auth = Authentication::from_header(Some(&header), &keys);
        assert_eq!(auth, Authentication::Rejected(TokenRejection::Expired));
        assert!(auth.identity().is_none());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let auth = Authentication::from_header(Some("Bearer garbage"), &keys());
        assert_eq!(auth, Authentication::Rejected(TokenRejection::Malformed));
    }
}
