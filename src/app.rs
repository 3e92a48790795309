//! Application state and HTTP router construction.
//!
//! The whole API lives on /graphql: GET serves GraphiQL to browsers, POST
//! executes queries. The Authorization header is resolved to a caller
//! identity here, before execution: a missing header means an anonymous
//! request, while a header carrying an invalid token fails the request
//! outright instead of downgrading it to anonymous.

use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Database;
use crate::graphql::{verify_token, BookshelfSchema};

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
    pub schema: BookshelfSchema,
}

/// Build the full Axum router: /graphql plus CORS and trace layers.
pub fn build_app(state: AppState) -> Router<()> {
    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Pull the bearer token out of the Authorization header. The "Bearer "
/// prefix is optional; clients historically sent the bare token.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|h| h.strip_prefix("Bearer ").unwrap_or(h).to_string())
        .filter(|t| !t.is_empty())
}

async fn graphiql(headers: HeaderMap) -> impl IntoResponse {
    let accepts_html = headers
        .get(axum::http::header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("text/html"))
        .unwrap_or(false);

    if accepts_html {
        axum::response::Html(GraphiQLSource::build().endpoint("/graphql").finish())
            .into_response()
    } else {
        (
            axum::http::StatusCode::METHOD_NOT_ALLOWED,
            axum::Json(serde_json::json!({
                "error": "GET requests are not supported for GraphQL queries. Use POST with Content-Type: application/json"
            })),
        )
            .into_response()
    }
}

async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();

    if let Some(token) = extract_token(&headers) {
        match verify_token(&token, &state.config.jwt_secret) {
            Ok(user) => {
                tracing::debug!(user_id = %user.user_id, "Authenticated request");
                request = request.data(user);
            }
            Err(e) => {
                // Fail closed: a bad token is a request-level authentication
                // failure, never an anonymous request.
                tracing::debug!("Token verification failed");
                let pos = async_graphql::Pos { line: 0, column: 0 };
                return async_graphql::Response::from_errors(vec![e.into_server_error(pos)])
                    .into();
            }
        }
    }

    state.schema.execute(request).await.into()
}
