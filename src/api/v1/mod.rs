mod auth;
mod cookie;
mod error;
mod handler;
mod router;

pub use auth::*;
pub use cookie::REFRESH_TOKEN_COOKIE;
pub use error::*;
pub use router::routes;
