mod page;
mod trigger;

use std::sync::Arc;

use salvo::affix_state;
use salvo::http::StatusError;
use salvo::prelude::{CatchPanic, Router};
use salvo::Depot;

use crate::cache::CacheCoordinator;

pub use page::get_page;
pub use trigger::refresh;

pub(crate) fn coordinator(depot: &Depot) -> Result<&Arc<CacheCoordinator>, StatusError> {
    depot.obtain::<Arc<CacheCoordinator>>().map_err(|_| {
        tracing::error!("Cache coordinator missing from depot");
        StatusError::internal_server_error()
    })
}

pub fn router(coordinator: Arc<CacheCoordinator>) -> Router {
    Router::new()
        .hoop(CatchPanic::new())
        .hoop(affix_state::inject(coordinator))
        .get(get_page)
        .push(Router::with_path("refresh").get(refresh).post(refresh))
}
