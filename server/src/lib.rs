//! Static host for the WebAssembly build of the viewer

use std::path::Path;
use std::sync::Arc;

use axum::{handler::Handler, response::Html, routing::get, Router};
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};

pub mod listing;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// `/` serves the embedded page, `/static/*` serves files from `static_dir`
/// and lists its directories
pub fn router(static_dir: impl AsRef<Path>) -> Router {
    let root = Arc::new(static_dir.as_ref().to_path_buf());
    let files = ServeDir::new(root.as_ref())
        .append_index_html_on_directories(false)
        .fallback(listing::list_directory.with_state(root));

    Router::new()
        .route("/", get(home))
        .nest_service("/static", files)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

async fn home() -> Html<&'static str> {
    Html(INDEX_HTML)
}
