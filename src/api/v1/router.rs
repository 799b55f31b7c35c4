use super::auth::with_auth;
use super::cookie::REFRESH_TOKEN_COOKIE;
use super::handler;
use crate::domain_model::BorrowerId;
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let sign_up = warp::path("sign_up")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::sign_up);

    let sign_in = warp::path("sign_in")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::sign_in);

    let refresh_token = warp::path("refresh_token")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::cookie::optional::<String>(REFRESH_TOKEN_COOKIE))
        .and(with(server.auth_service.clone()))
        .and_then(handler::refresh_token);

    let sign_out = warp::path("sign_out")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::cookie::optional::<String>(REFRESH_TOKEN_COOKIE))
        .and(with(server.auth_service.clone()))
        .and_then(handler::sign_out);

    // Path before method so unknown paths reject as 404, not 405.
    // Non-uuid segments never reach the bearer gate.
    let get_borrower = warp::path::param::<BorrowerId>()
        .and(warp::path::end())
        .and(warp::get())
        .and(with_auth(server.token_maker.clone()))
        .and(with(server.auth_service.clone()))
        .and_then(handler::get_borrower);

    warp::path("borrowers").and(
        sign_up
            .or(sign_in)
            .or(refresh_token)
            .or(sign_out)
            .or(get_borrower),
    )
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}
