use chrono::DateTime;
use salvo::http::header::{
    CACHE_CONTROL, CONTENT_TYPE, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED,
};
use salvo::http::{HeaderValue, StatusCode, StatusError};
use salvo::prelude::{handler, Request, Response};
use salvo::Depot;

use crate::models::Snapshot;

use super::coordinator;

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

fn not_modified(req: &Request, snapshot: &Snapshot) -> bool {
    if let Some(if_none_match) = req.headers().get(IF_NONE_MATCH) {
        return if_none_match.as_bytes() == snapshot.etag().as_bytes();
    }

    let since = req
        .headers()
        .get(IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| DateTime::parse_from_rfc2822(v).ok());
    if let Some(since) = since {
        return snapshot.produced_at.timestamp() <= since.timestamp();
    }

    false
}

/// Serves the latest published page, asking for a rebuild when it has outlived the cache
/// lifetime. Never fails on upstream trouble: stale or placeholder content is served instead.
#[handler]
pub async fn get_page(
    req: &mut Request,
    res: &mut Response,
    depot: &mut Depot,
) -> Result<(), StatusError> {
    let coordinator = coordinator(depot)?;
    let snapshot = coordinator.current_snapshot().await;

    if snapshot.is_stale(coordinator.max_age()) {
        coordinator.request_refresh();
    }

    res.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );

    if snapshot.is_placeholder() {
        res.headers_mut()
            .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    } else {
        if not_modified(req, &snapshot) {
            res.status_code(StatusCode::NOT_MODIFIED);
            return Ok(());
        }

        let max_age = format!("public, max-age={}", coordinator.max_age().as_secs());
        let last_modified = snapshot.produced_at.format(HTTP_DATE_FORMAT).to_string();
        for (name, value) in [
            (ETAG, snapshot.etag()),
            (CACHE_CONTROL, max_age),
            (LAST_MODIFIED, last_modified),
        ] {
            match HeaderValue::from_str(&value) {
                Ok(value) => {
                    res.headers_mut().insert(name, value);
                }
                Err(e) => tracing::warn!(header = name.as_str(), error = %e, "Skipping invalid header"),
            }
        }
    }

    if let Err(e) = res.write_body(snapshot.body.clone()) {
        tracing::error!("Error writing body: {}", e);
    }
    Ok(())
}
