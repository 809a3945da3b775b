//! Application router configuration.

use axum::{
    Router,
    http::Uri,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    AppState, Error,
    api::{api_endpoint, get_health},
    auth::identity_middleware,
    endpoints,
};

/// Return a router with all the app's routes.
///
/// Every request passes through the identity middleware, which never rejects
/// a request. Operations that need a caller check for one themselves.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::API, post(api_endpoint))
        .route(endpoints::HEALTH, get(get_health))
        .fallback(get_404_not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            identity_middleware,
        ))
        .with_state(state)
}

/// Respond to requests for unknown routes with the API error envelope.
async fn get_404_not_found(uri: Uri) -> Response {
    tracing::debug!("No route for {uri}");
    Error::NotFound.into_response()
}

#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use serde_json::Value;

    use crate::{endpoints, test_utils::get_test_server};

    #[tokio::test]
    async fn unknown_route_returns_not_found_envelope() {
        let server = get_test_server();

        let response = server.get("/graphiql").await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body = response.json::<Value>();
        assert_eq!(body["data"], Value::Null);
        assert_eq!(body["errors"][0]["extensions"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn api_route_only_accepts_post() {
        let server = get_test_server();

        let response = server.get(endpoints::API).await;

        response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    }
}
