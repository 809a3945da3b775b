//! Middleware that resolves the caller of a request from its bearer token.

use axum::{
    extract::{FromRef, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{
    AppState, Error,
    auth::{AuthService, Identity},
};

/// The identity resolved for a request, if any.
///
/// Route handlers behind [identity_middleware] can use the function argument
/// `Extension(identity): Extension<RequestIdentity>` to receive it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestIdentity(pub Option<Identity>);

impl RequestIdentity {
    /// Get the identity or fail with [Error::Unauthenticated].
    pub fn require(&self) -> Result<&Identity, Error> {
        self.0.as_ref().ok_or(Error::Unauthenticated)
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

/// Middleware function that verifies the bearer token of the request.
///
/// The request always continues to the handler. A missing, malformed,
/// expired or forged token results in an empty [RequestIdentity], it is up to
/// the handler to reject requests that need an identity.
pub async fn identity_middleware(
    State(auth): State<AuthService>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let identity = auth.authenticate(header);

    match &identity {
        Some(identity) => tracing::debug!("Request authenticated as user {}", identity.user_id),
        None => tracing::debug!("Request has no valid bearer token"),
    }

    request.extensions_mut().insert(RequestIdentity(identity));

    next.run(request).await
}

#[cfg(test)]
mod identity_middleware_tests {
    use axum::{Extension, Router, middleware, routing::get};
    use axum_test::TestServer;

    use crate::{auth::AuthService, user::UserID};

    use super::{RequestIdentity, identity_middleware};

    async fn echo_user_id(Extension(identity): Extension<RequestIdentity>) -> String {
        match identity.0 {
            Some(identity) => identity.user_id.to_string(),
            None => "anonymous".to_owned(),
        }
    }

    const TEST_ROUTE: &str = "/whoami";

    fn get_test_server(auth: AuthService) -> TestServer {
        let app = Router::new()
            .route(TEST_ROUTE, get(echo_user_id))
            .layer(middleware::from_fn_with_state(auth, identity_middleware));

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn valid_token_resolves_identity() {
        let auth = AuthService::new("nafstenoas", 4);
        let token = auth.issue_token(UserID::new(42), "a@x.com").unwrap();
        let server = get_test_server(auth);

        let response = server
            .get(TEST_ROUTE)
            .add_header("Authorization", format!("Bearer {token}"))
            .await;

        response.assert_status_ok();
        response.assert_text("42");
    }

    #[tokio::test]
    async fn missing_token_continues_without_identity() {
        let server = get_test_server(AuthService::new("nafstenoas", 4));

        let response = server.get(TEST_ROUTE).await;

        response.assert_status_ok();
        response.assert_text("anonymous");
    }

    #[tokio::test]
    async fn invalid_token_continues_without_identity() {
        let server = get_test_server(AuthService::new("nafstenoas", 4));

        let response = server
            .get(TEST_ROUTE)
            .add_header("Authorization", "Bearer FOOBAR")
            .await;

        response.assert_status_ok();
        response.assert_text("anonymous");
    }

    #[test]
    fn require_fails_without_identity() {
        assert!(RequestIdentity(None).require().is_err());
    }
}
