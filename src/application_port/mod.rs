mod auth_service;
mod token_maker;

pub use auth_service::*;
pub use token_maker::*;
