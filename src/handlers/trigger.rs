use salvo::http::{StatusCode, StatusError};
use salvo::prelude::{handler, Response};
use salvo::Depot;

use super::coordinator;

/// Queues a rebuild and answers right away; the outcome only shows up on the page.
#[handler]
pub async fn refresh(res: &mut Response, depot: &mut Depot) -> Result<(), StatusError> {
    let queued = coordinator(depot)?.request_refresh();

    res.status_code(StatusCode::ACCEPTED);
    if queued {
        res.render("Refresh requested");
    } else {
        res.render("Refresh already pending");
    }
    Ok(())
}
