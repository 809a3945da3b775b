//! Authentication: password hashing, bearer tokens and request identities.

mod bearer;
mod middleware;
mod token;

pub use middleware::{RequestIdentity, identity_middleware};
pub use token::{AuthService, Claims, DEVELOPMENT_SECRET, Identity, TOKEN_DURATION};
