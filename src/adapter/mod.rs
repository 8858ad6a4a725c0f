//! Framework adapters that mount the documentation service into a web application.
//!
//! Each adapter is a thin shim over [`crate::service::SwaggerUi`]: it decides
//! whether a request targets the documentation root, derives the route prefix
//! from the request URL, picks [`SwaggerUi::render_and_write`] or
//! [`SwaggerUi::directory_only`], and hands the result to the framework's own
//! static file server.
//!
//! # Supported Frameworks
//!
//! - **Axum**: See [`axum::service`]
//! - **Actix-Web**: See [`actix::configure`]
//!
//! [`SwaggerUi::render_and_write`]: crate::service::SwaggerUi::render_and_write
//! [`SwaggerUi::directory_only`]: crate::service::SwaggerUi::directory_only

pub mod actix;
pub mod axum;

use std::path::{Component, Path, PathBuf};

/// How a request to the mounted documentation path is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// The documentation entry point: render and serve the page
    Root,
    /// Anything below it: serve a file from the served directory
    Asset,
}

/// Per-framework request classification.
///
/// Frameworks differ only in what they expose about the part of the URL below
/// the mount point, so each adapter decides for itself which requests are root
/// requests. Rendering is the same for every framework.
pub trait DocsAdapter {
    /// Classifies a request from the path the framework exposes below the mount point.
    fn classify(&self, path: &str) -> RequestKind;

    /// Derives the route prefix the page uses to build asset URLs.
    fn route_prefix(&self, original_path: &str) -> String {
        normalize_route_prefix(original_path)
    }
}

/// Normalizes a request path into a route prefix.
///
/// Drops any query or fragment, collapses repeated slashes, applies `.` and `..`
/// segments and guarantees exactly one leading and one trailing slash.
///
/// # Example
///
/// ```
/// use swagger_ui_middleware::adapter::normalize_route_prefix;
///
/// assert_eq!(normalize_route_prefix("/api-docs"), "/api-docs/");
/// assert_eq!(normalize_route_prefix("//api//docs/?x=1"), "/api/docs/");
/// ```
pub fn normalize_route_prefix(original_path: &str) -> String {
    let path = original_path
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or("");

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", segments.join("/"))
    }
}

/// Maps a request path below the mount point to a file in `dist_dir`.
///
/// Returns `None` for paths that would leave the directory and for anything
/// that is not a regular file.
pub fn asset_path(dist_dir: &Path, request_path: &str) -> Option<PathBuf> {
    let mut path = dist_dir.to_path_buf();
    for component in Path::new(request_path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(segment) => path.push(segment),
            Component::CurDir => {}
            _ => return None,
        }
    }
    path.is_file().then_some(path)
}
