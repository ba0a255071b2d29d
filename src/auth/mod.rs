pub mod handlers;
pub mod password;
pub mod request_context;
pub mod service;
pub mod tokens;

pub use request_context::{Authentication, Identity};
pub use service::{AuthError, AuthService, PublicUser};
