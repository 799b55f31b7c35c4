mod auth_service_impl;
mod credential_hasher_argon2;
mod jwt_maker;
mod paseto_maker;

pub use auth_service_impl::*;
pub use credential_hasher_argon2::*;
pub use jwt_maker::*;
pub use paseto_maker::*;
