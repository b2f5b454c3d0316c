//! Single-page web UI for browsing bins and their captured events.

use axum::response::Html;
use axum::routing::get;
use axum::Router;

use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// GET /
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Returns the web UI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}
