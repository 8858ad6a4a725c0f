//! Axum adapter.
//!
//! Mount the service with [`axum::Router::nest_service`]. A request is a root
//! request when the path seen below the mount point ends with `/`; Axum
//! presents both `/docs` and `/docs/` to the nested service as `/`.
//!
//! # Example
//!
//! ```no_run
//! use axum::Router;
//! use swagger_ui_middleware::adapter::axum::service;
//! use swagger_ui_middleware::options::UiOptions;
//! use swagger_ui_middleware::service::SwaggerUi;
//!
//! let config = UiOptions::new().title("Pet Store").build().unwrap();
//! let ui = SwaggerUi::new(config).unwrap();
//! let app: Router = Router::new().nest_service("/docs", service(ui));
//! ```

use super::{DocsAdapter, RequestKind};
use crate::error::Error;
use crate::service::{ServeTarget, SwaggerUi};
use axum::body::Body;
use axum::extract::{OriginalUri, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, MethodRouter};
use log::{debug, error};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};

/// Root detection for Axum: the nested path ends with a slash.
pub struct AxumAdapter;

impl DocsAdapter for AxumAdapter {
    fn classify(&self, path: &str) -> RequestKind {
        if path.ends_with('/') {
            RequestKind::Root
        } else {
            RequestKind::Asset
        }
    }
}

/// Builds a `GET`/`HEAD` service serving the page and its assets.
pub fn service(ui: SwaggerUi) -> MethodRouter {
    get(serve_docs).with_state(Arc::new(ui))
}

async fn serve_docs(
    State(ui): State<Arc<SwaggerUi>>,
    OriginalUri(original_uri): OriginalUri,
    request: Request,
) -> Response {
    let path = request.uri().path().to_string();
    debug!("Docs request {} (nested path {})", original_uri, path);

    let target = match AxumAdapter.classify(&path) {
        RequestKind::Asset => ui.directory_only(),
        RequestKind::Root => {
            let route_prefix = AxumAdapter.route_prefix(original_uri.path());
            let rendered =
                tokio::task::spawn_blocking(move || ui.render_and_write(&route_prefix)).await;
            match rendered {
                Ok(Ok(target)) => target,
                Ok(Err(err)) => return err.into_response(),
                Err(join_error) => {
                    error!("Swagger UI render task failed: {}", join_error);
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            }
        }
    };

    serve(target, request).await
}

/// Hands the request to `tower-http`'s file services.
async fn serve(target: ServeTarget, request: Request) -> Response {
    let served = match target.index_path() {
        Some(index) => ServeFile::new(index).oneshot(request).await,
        None => {
            ServeDir::new(&target.dist_dir)
                .append_index_html_on_directories(false)
                .oneshot(request)
                .await
        }
    };

    match served {
        Ok(response) => response.map(Body::new).into_response(),
        Err(never) => match never {},
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("Failed to serve Swagger UI: {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(AxumAdapter.classify("/"), RequestKind::Root);
        assert_eq!(AxumAdapter.classify("/nested/"), RequestKind::Root);
        assert_eq!(AxumAdapter.classify("/index.css"), RequestKind::Asset);
        assert_eq!(AxumAdapter.classify(""), RequestKind::Asset);
    }

    #[test]
    fn test_route_prefix_from_original_uri() {
        assert_eq!(AxumAdapter.route_prefix("/docs"), "/docs/");
        assert_eq!(AxumAdapter.route_prefix("/docs/"), "/docs/");
    }

    #[test]
    fn test_error_response_status() {
        let response = Error::InvalidConfig("broken".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
