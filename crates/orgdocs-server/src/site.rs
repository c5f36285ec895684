//! Serving a built site under its base URL.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{StatusCode, Uri},
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};

/// Where the built site lives and the URL prefix it is served under.
#[derive(Debug, Clone)]
struct SiteRoot {
    dir: PathBuf,
    base_url: String,
}

/// Router serving a built site the way the static host does.
///
/// Pages live under `base_url`; `/` redirects there. Extensionless routes map
/// to `<route>.html` when that file exists, directories to `index.html`, and
/// anything else, including paths outside `base_url`, gets `404.html`.
pub fn static_site(dir: PathBuf, base_url: &str) -> Router {
    let root = Arc::new(SiteRoot {
        base_url: base_url.to_string(),
        dir: dir.clone(),
    });

    let files = ServeDir::new(&dir).not_found_service(ServeFile::new(dir.join("404.html")));

    Router::new()
        .fallback_service(files)
        .layer(middleware::map_request_with_state(root, rewrite_request))
}

async fn rewrite_request(
    State(root): State<Arc<SiteRoot>>,
    mut request: Request,
) -> Result<Request, Response> {
    let path = request.uri().path();

    if root.base_url != "/" && (path == "/" || path == root.base_url.trim_end_matches('/')) {
        return Err(Redirect::temporary(&root.base_url).into_response());
    }

    let Some(file_path) = file_path(&root.dir, &root.base_url, path) else {
        return Err(not_found(&root.dir).await);
    };

    let rewritten = match request.uri().query() {
        Some(query) => format!("{}?{}", file_path, query),
        None => file_path,
    };
    if let Ok(uri) = rewritten.parse::<Uri>() {
        *request.uri_mut() = uri;
    }

    Ok(request)
}

async fn not_found(dir: &Path) -> Response {
    let page = tokio::fs::read_to_string(dir.join("404.html"))
        .await
        .unwrap_or_default();
    (StatusCode::NOT_FOUND, Html(page)).into_response()
}

/// Path inside the output directory for a request path, or `None` when the
/// request is outside the base URL.
fn file_path(dir: &Path, base_url: &str, path: &str) -> Option<String> {
    let relative = path.strip_prefix(base_url)?;

    if relative.is_empty() || relative.ends_with('/') {
        return Some(format!("/{}", relative));
    }

    let last = relative.rsplit('/').next().unwrap_or(relative);
    if !last.contains('.') {
        let html = format!("{}.html", relative);
        if dir.join(&html).is_file() {
            return Some(format!("/{}", html));
        }
    }

    Some(format!("/{}", relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const BASE: &str = "/StarCitizen-Discord-OrgBot/";

    #[test]
    fn maps_routes_to_files() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("setup-commands.html"), "").unwrap();

        let path = |p: &str| file_path(temp.path(), BASE, p);

        assert_eq!(path(BASE).as_deref(), Some("/"));
        assert_eq!(
            path("/StarCitizen-Discord-OrgBot/setup-commands").as_deref(),
            Some("/setup-commands.html")
        );
        assert_eq!(
            path("/StarCitizen-Discord-OrgBot/assets/main.css").as_deref(),
            Some("/assets/main.css")
        );
        assert_eq!(
            path("/StarCitizen-Discord-OrgBot/missing").as_deref(),
            Some("/missing")
        );
        assert_eq!(path("/other/page"), None);
    }

    fn site_root(dir: &Path) -> State<Arc<SiteRoot>> {
        State(Arc::new(SiteRoot {
            dir: dir.to_path_buf(),
            base_url: BASE.to_string(),
        }))
    }

    fn get(uri: &str) -> Request {
        axum::http::Request::builder()
            .uri(uri)
            .body(axum::body::Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn paths_outside_base_url_get_not_found_page() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("404.html"), "<h1>Page Not Found</h1>").unwrap();
        fs::write(temp.path().join("setup-commands.html"), "").unwrap();

        let response = rewrite_request(site_root(temp.path()), get("/setup-commands.html"))
            .await
            .unwrap_err();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"<h1>Page Not Found</h1>");
    }

    #[tokio::test]
    async fn rewrites_requests_under_base_url() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("setup-commands.html"), "").unwrap();

        let request = rewrite_request(
            site_root(temp.path()),
            get("/StarCitizen-Discord-OrgBot/setup-commands?tab=roles"),
        )
        .await
        .unwrap();
        assert_eq!(request.uri().to_string(), "/setup-commands.html?tab=roles");

        let response = rewrite_request(site_root(temp.path()), get("/"))
            .await
            .unwrap_err();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()["location"], BASE);
    }

    #[test]
    fn root_base_url_serves_everything() {
        let temp = tempdir().unwrap();

        assert_eq!(
            file_path(temp.path(), "/", "/docs/intro").as_deref(),
            Some("/docs/intro")
        );
    }
}
