use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::auth::service::AuthService;
use crate::auth::tokens::TokenKeys;
use crate::config::Config;
use crate::feed::DynFeedRepository;
use crate::graphql::FeedSchema;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub graphql_schema: FeedSchema,
}

impl AppState {
    pub fn new(config: &Config, repo: DynFeedRepository, tokens: TokenKeys) -> Self {
        let auth = AuthService::new(repo.clone(), Arc::new(tokens), config.auth.bcrypt_cost);
        let graphql_schema = crate::graphql::build_schema(repo);
        Self {
            auth,
            graphql_schema,
        }
    }
}
