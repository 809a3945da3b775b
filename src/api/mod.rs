//! The single JSON endpoint through which clients run operations.
//!
//! A request names an operation and its variables, e.g.
//! `{"operation": "createCategory", "variables": {"name": "Food"}}`, and the
//! response wraps the result as `{"data": ...}` or the failure as
//! `{"data": null, "errors": [...]}`.

mod endpoint;
mod operation;
mod resolvers;
mod response;

pub use endpoint::{api_endpoint, get_health};
pub use response::ErrorResponse;
