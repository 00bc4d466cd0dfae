//! HTML index pages for directories under the static root

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{OriginalUri, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
};

/// Fallback for `ServeDir`: lists the directory the request points at, 404 otherwise
pub async fn list_directory(
    State(root): State<Arc<PathBuf>>,
    OriginalUri(original): OriginalUri,
    uri: Uri,
) -> Response {
    let Some(dir) = resolve(&root, uri.path()) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if !tokio::fs::metadata(&dir)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
    {
        return StatusCode::NOT_FOUND.into_response();
    }

    // Relative links only resolve against a trailing slash
    let shown = original.path();
    if !shown.ends_with('/') {
        return Redirect::permanent(&format!("{shown}/")).into_response();
    }

    match read_entries(&dir).await {
        Ok(entries) => Html(render(shown, &entries)).into_response(),
        Err(err) => {
            tracing::warn!("failed to list {}: {err}", dir.display());
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Map a request path onto `root`, refusing anything that could climb out of it
fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = Path::new(request_path.trim_start_matches('/'));
    let mut dir = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => dir.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(dir)
}

/// Sorted entry names; directories carry a trailing slash
async fn read_entries(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut entries = Vec::new();
    let mut read_dir = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let mut name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type().await?.is_dir() {
            name.push('/');
        }
        entries.push(name);
    }
    entries.sort();
    Ok(entries)
}

fn render(shown: &str, entries: &[String]) -> String {
    let title = escape(shown);
    let mut html = format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>Index of {title}</title></head>\n\
         <body><h1>Index of {title}</h1>\n<ul>\n"
    );
    for name in entries {
        let name = escape(name);
        html.push_str(&format!("<li><a href=\"{name}\">{name}</a></li>\n"));
    }
    html.push_str("</ul></body></html>\n");
    html
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_stays_under_root() {
        let root = Path::new("/srv/static");
        assert_eq!(resolve(root, "/"), Some(PathBuf::from("/srv/static")));
        assert_eq!(
            resolve(root, "/sub/./deeper/"),
            Some(PathBuf::from("/srv/static/sub/deeper"))
        );
        assert_eq!(resolve(root, "/../etc/"), None);
        assert_eq!(resolve(root, "/sub/../../etc"), None);
    }

    #[test]
    fn test_render_escapes_names() {
        let html = render("/static/", &["a&b.txt".to_string(), "sub/".to_string()]);
        assert!(html.contains("Index of /static/"));
        assert!(html.contains("<a href=\"a&amp;b.txt\">a&amp;b.txt</a>"));
        assert!(html.contains("<a href=\"sub/\">sub/</a>"));
    }
}
