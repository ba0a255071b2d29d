use async_graphql::http::{parse_query_string, playground_source, GraphQLPlaygroundConfig};
use async_graphql::parser::parse_query;
use async_graphql::parser::types::OperationType;
use axum::extract::rejection::JsonRejection;
use axum::extract::{RawQuery, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;

use crate::auth::Authentication;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GraphQL endpoint handler
async fn graphql_handler(
    State(state): State<AppState>,
    auth: Authentication,
    payload: Result<Json<async_graphql::Request>, JsonRejection>,
) -> AppResult<Json<async_graphql::Response>> {
    let Json(req) = payload.map_err(|e| {
        tracing::debug!("Rejected GraphQL body: {}", e);
        AppError::BadRequest("Invalid GraphQL request".into())
    })?;

    // The caller's identity travels with the request, never on the schema
    let response = state.graphql_schema.execute(req.data(auth)).await;
    Ok(Json(response))
}

/// GET /graphql: runs `?query=` requests, otherwise serves the playground.
/// Mutations are refused; a GET may be replayed by caches and proxies.
async fn graphql_get(
    State(state): State<AppState>,
    auth: Authentication,
    RawQuery(query): RawQuery,
) -> Response {
    let Some(query) = query.filter(|q| !q.is_empty()) else {
        return Html(playground_source(GraphQLPlaygroundConfig::new("/graphql"))).into_response();
    };

    let req = match parse_query_string(&query) {
        Ok(req) => req,
        Err(e) => {
            tracing::debug!("Rejected GraphQL query string: {}", e);
            return AppError::BadRequest("Invalid GraphQL request".into()).into_response();
        }
    };

    if selects_mutation(&req) {
        return (
            [(header::ALLOW, "POST")],
            AppError::MethodNotAllowed("Mutations must be sent with POST".into()),
        )
            .into_response();
    }

    Json(state.graphql_schema.execute(req.data(auth)).await).into_response()
}

// Documents that fail to parse are left to the executor to report.
fn selects_mutation(req: &async_graphql::Request) -> bool {
    let Ok(document) = parse_query(&req.query) else {
        return false;
    };
    let selected = req.operation_name.as_deref();

    document.operations.iter().any(|(name, operation)| {
        operation.node.ty == OperationType::Mutation
            && selected.map_or(true, |wanted| name.map(|n| n.as_str()) == Some(wanted))
    })
}

/// GraphQL router
pub fn router() -> Router<AppState> {
    Router::new().route("/graphql", get(graphql_get).post(graphql_handler))
}
