//! Application services composing the ports into the blog's use cases.

mod auth;
mod posts;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{AuthService, Session};
pub use posts::{CoverUpload, DEFAULT_LIST_LIMIT, PostService};
