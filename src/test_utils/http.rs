use axum_test::{TestResponse, TestServer};
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{AppState, build_router, endpoints};

pub(crate) const TEST_SECRET: &str = "test-secret";

/// The lowest cost bcrypt allows, keeps tests that sign up users fast.
const TEST_PASSWORD_COST: u32 = 4;

pub(crate) fn get_test_server() -> TestServer {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    let state = AppState::new(connection, TEST_SECRET, TEST_PASSWORD_COST)
        .expect("Could not create app state");

    TestServer::try_new(build_router(state)).expect("Could not create test server.")
}

pub(crate) async fn run_operation(
    server: &TestServer,
    token: Option<&str>,
    body: Value,
) -> TestResponse {
    let request = server.post(endpoints::API).json(&body);

    let request = match token {
        Some(token) => request.add_header("Authorization", format!("Bearer {token}")),
        None => request,
    };

    request.await
}

/// Sign up a user with the password "pw1" and return their token.
pub(crate) async fn signup_token(server: &TestServer, email: &str) -> String {
    let response = run_operation(
        server,
        None,
        json!({
            "operation": "signup",
            "variables": {"email": email, "password": "pw1", "name": "Test User"}
        }),
    )
    .await;

    response.assert_status_ok();

    response.json::<Value>()["data"]["token"]
        .as_str()
        .expect("signup response is missing the token")
        .to_owned()
}
