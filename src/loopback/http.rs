use std::sync::{Arc, Mutex};

use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use tracing::debug;
use url::Url;

/// What the listener has seen of the browser so far.
#[derive(Debug, Default)]
pub(super) struct Observed {
    pub(super) location: Option<Url>,
    pub(super) failure: Option<String>,
    pub(super) closed: bool,
}

pub(super) type SharedObserved = Arc<Mutex<Observed>>;

#[derive(Clone)]
pub(super) struct LoopbackState {
    pub(super) callback: Url,
    pub(super) success_html: String,
    pub(super) error_html: String,
    pub(super) observed: SharedObserved,
}

pub(super) fn record_failure(observed: &SharedObserved, message: String) {
    if let Ok(mut guard) = observed.lock() {
        guard.failure.get_or_insert(message);
    }
}

/// Records the callback URL with the request's raw query as the popup location.
pub(super) async fn callback_handler(
    State(state): State<LoopbackState>,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    let mut location = state.callback;
    location.set_query(query.as_deref().filter(|query| !query.is_empty()));
    debug!(%location, "browser reached callback");

    if let Ok(mut guard) = state.observed.lock() {
        guard.location = Some(location);
    }
    (StatusCode::OK, Html(state.success_html))
}

pub(super) async fn fallback_handler(State(state): State<LoopbackState>) -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(state.error_html))
}
