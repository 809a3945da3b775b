//! The API endpoints URIs.

/// The route that accepts every API operation.
pub const API: &str = "/graphql";
/// The route for checking that the server is up.
pub const HEALTH: &str = "/health";
