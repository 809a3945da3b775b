//! Parsing of the `Authorization: Bearer <token>` header.

const BEARER_SCHEME: &str = "Bearer";

/// Get the token from an `Authorization` header value.
///
/// The header must consist of exactly the scheme `Bearer` and a non-empty
/// token separated by a single space. Any other shape is treated as if no
/// token was sent.
pub fn extract_bearer(authorization_header: Option<&str>) -> Option<&str> {
    let header = authorization_header?;
    let mut parts = header.split(' ');

    match (parts.next(), parts.next(), parts.next()) {
        (Some(BEARER_SCHEME), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}
