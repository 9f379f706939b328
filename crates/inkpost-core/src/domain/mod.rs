//! Domain entities - the core business objects.

mod ids;
mod post;
mod user;

pub use ids::{PostId, UserId};
pub use post::{Author, Post, PostDraft, PostWithAuthor};
pub use user::{MAX_USERNAME_LEN, User};
