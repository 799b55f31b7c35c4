pub mod v1;

use crate::server::Server;
use std::sync::Arc;
use warp::Filter;

/// The full `/api/v1` tree with error recovery attached.
pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = std::convert::Infallible> + Clone {
    warp::path("api")
        .and(warp::path("v1"))
        .and(v1::routes(server))
        .recover(v1::recover_error)
}
