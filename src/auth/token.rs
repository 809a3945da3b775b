//! Password hashing and the signed bearer tokens that identify users between requests.

use std::fmt::Debug;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::bearer::extract_bearer, password::PasswordHash, user::UserID};

/// How long a token stays valid after it was issued.
pub const TOKEN_DURATION: Duration = Duration::days(7);

/// The secret used to sign tokens when none is configured.
///
/// Only suitable for local development, anyone who reads this can forge tokens.
pub const DEVELOPMENT_SECRET: &str = "ledgerly-development-secret";

/// The contents of a JSON Web Token.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// The user the token was issued to.
    pub user_id: UserID,
    /// The email of the user at the time the token was issued.
    pub email: String,
    /// When the token was issued as a unix timestamp.
    pub iat: i64,
    /// When the token expires as a unix timestamp.
    pub exp: i64,
}

/// The caller of a request as proven by a valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The ID of the authenticated user.
    pub user_id: UserID,
    /// The email the token was issued for.
    pub email: String,
}

/// Hashes and verifies passwords, and issues and verifies bearer tokens.
///
/// The signing secret is read once at start up and never changes afterwards.
#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    password_cost: u32,
}

impl AuthService {
    /// Create an auth service that signs tokens with `secret` and hashes
    /// passwords with the bcrypt cost `password_cost`.
    pub fn new(secret: &str, password_cost: u32) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            password_cost,
        }
    }

    /// Salt and hash `raw_password`.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if the hashing library failed.
    pub fn hash_password(&self, raw_password: &str) -> Result<PasswordHash, Error> {
        PasswordHash::new(raw_password, self.password_cost)
    }

    /// Check `raw_password` against `password_hash`.
    pub fn verify_password(&self, raw_password: &str, password_hash: &PasswordHash) -> bool {
        password_hash.verify(raw_password)
    }

    /// Issue a token for the user that expires after [TOKEN_DURATION].
    ///
    /// # Errors
    ///
    /// Returns [Error::TokenCreation] if the token could not be signed.
    pub fn issue_token(&self, user_id: UserID, email: &str) -> Result<String, Error> {
        self.issue_token_at(user_id, email, OffsetDateTime::now_utc())
    }

    fn issue_token_at(
        &self,
        user_id: UserID,
        email: &str,
        issued_at: OffsetDateTime,
    ) -> Result<String, Error> {
        let claims = Claims {
            user_id,
            email: email.to_owned(),
            iat: issued_at.unix_timestamp(),
            exp: (issued_at + TOKEN_DURATION).unix_timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|error| Error::TokenCreation(error.to_string()))
    }

    /// Check the signature and expiry of `token`.
    ///
    /// Returns `None` for any token that is not valid. The reason is only
    /// logged, callers cannot tell a forged token from an expired one.
    pub fn verify_token(&self, token: &str) -> Option<Identity> {
        let validation = Validation::new(Algorithm::HS256);

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(token_data) => Some(Identity {
                user_id: token_data.claims.user_id,
                email: token_data.claims.email,
            }),
            Err(error) => {
                tracing::debug!("Rejected bearer token: {error}");
                None
            }
        }
    }

    /// Resolve the caller from the value of an `Authorization` header.
    pub fn authenticate(&self, authorization_header: Option<&str>) -> Option<Identity> {
        extract_bearer(authorization_header).and_then(|token| self.verify_token(token))
    }
}

impl Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("password_cost", &self.password_cost)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod auth_service_tests {
    use time::{Duration, OffsetDateTime};

    use crate::user::UserID;

    use super::{AuthService, Identity, TOKEN_DURATION};

    fn get_auth_service() -> AuthService {
        AuthService::new("nafstenoas", 4)
    }

    #[test]
    fn issued_token_verifies_to_same_identity() {
        let auth = get_auth_service();

        let token = auth.issue_token(UserID::new(7), "a@x.com").unwrap();

        assert_eq!(
            auth.verify_token(&token),
            Some(Identity {
                user_id: UserID::new(7),
                email: "a@x.com".to_owned(),
            })
        );
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let auth = get_auth_service();
        let other_auth = AuthService::new("not the same secret", 4);

        let token = other_auth.issue_token(UserID::new(7), "a@x.com").unwrap();

        assert_eq!(auth.verify_token(&token), None);
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = get_auth_service();
        let issued_at = OffsetDateTime::now_utc() - TOKEN_DURATION - Duration::days(1);

        let token = auth
            .issue_token_at(UserID::new(7), "a@x.com", issued_at)
            .unwrap();

        assert_eq!(auth.verify_token(&token), None);
    }

    #[test]
    fn token_issued_six_days_ago_is_accepted() {
        let auth = get_auth_service();
        let issued_at = OffsetDateTime::now_utc() - Duration::days(6);

        let token = auth
            .issue_token_at(UserID::new(7), "a@x.com", issued_at)
            .unwrap();

        assert!(auth.verify_token(&token).is_some());
    }

    #[test]
    fn malformed_token_is_rejected() {
        let auth = get_auth_service();

        assert_eq!(auth.verify_token("not.a.token"), None);
        assert_eq!(auth.verify_token(""), None);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let auth = get_auth_service();
        let token = auth.issue_token(UserID::new(7), "a@x.com").unwrap();
        let mut tampered = token.clone();
        tampered.push('x');

        assert_eq!(auth.verify_token(&tampered), None);
    }

    #[test]
    fn authenticate_reads_bearer_header() {
        let auth = get_auth_service();
        let token = auth.issue_token(UserID::new(3), "b@x.com").unwrap();
        let header = format!("Bearer {token}");

        let identity = auth.authenticate(Some(&header)).unwrap();

        assert_eq!(identity.user_id, UserID::new(3));
        assert_eq!(auth.authenticate(Some(&token)), None);
        assert_eq!(auth.authenticate(None), None);
    }

    #[test]
    fn hashed_password_verifies() {
        let auth = get_auth_service();

        let hash = auth.hash_password("secret123").unwrap();

        assert!(auth.verify_password("secret123", &hash));
        assert!(!auth.verify_password("secret124", &hash));
    }
}
