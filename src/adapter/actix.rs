//! Actix-Web adapter.
//!
//! [`configure`] registers one resource matching the mount path and everything
//! below it. A request is a root request when nothing follows the mount path
//! (`/docs` or `/docs/`); anything else is looked up in the served directory.
//!
//! # Example
//!
//! ```no_run
//! use actix_web::{App, HttpServer};
//! use swagger_ui_middleware::adapter::actix::configure;
//! use swagger_ui_middleware::options::UiOptions;
//! use swagger_ui_middleware::service::SwaggerUi;
//!
//! # async fn run() -> std::io::Result<()> {
//! HttpServer::new(|| {
//!     let config = UiOptions::new().spec_file("docs/openapi.yaml").build().unwrap();
//!     let ui = SwaggerUi::new(config).unwrap();
//!     App::new().configure(configure("/docs", ui))
//! })
//! .bind(("127.0.0.1", 8080))?
//! .run()
//! .await
//! # }
//! ```

use super::{asset_path, DocsAdapter, RequestKind};
use crate::error::Error;
use crate::service::SwaggerUi;
use actix_files::NamedFile;
use actix_web::http::StatusCode;
use actix_web::{error, web, HttpRequest, HttpResponse, ResponseError};
use log::debug;

/// Name of the match segment holding the path below the mount point.
const TAIL: &str = "tail";

/// Root detection for Actix-Web: the wildcard tail is absent or empty.
pub struct ActixAdapter;

impl DocsAdapter for ActixAdapter {
    fn classify(&self, tail: &str) -> RequestKind {
        if tail.is_empty() {
            RequestKind::Root
        } else {
            RequestKind::Asset
        }
    }
}

/// Returns a configuration callback mounting `ui` at `mount_path`, for use with
/// [`actix_web::App::configure`].
pub fn configure(mount_path: &str, ui: SwaggerUi) -> impl FnOnce(&mut web::ServiceConfig) {
    let mount = mount_path.trim_end_matches('/').to_string();
    let patterns = vec![mount.clone(), format!("{}/{{{}:.*}}", mount, TAIL)];
    let ui = web::Data::new(ui);

    move |cfg: &mut web::ServiceConfig| {
        cfg.service(
            web::resource(patterns)
                .app_data(ui)
                .route(web::get().to(serve_docs))
                .route(web::head().to(serve_docs)),
        );
    }
}

async fn serve_docs(req: HttpRequest, ui: web::Data<SwaggerUi>) -> actix_web::Result<HttpResponse> {
    let tail = req.match_info().get(TAIL).unwrap_or_default().to_string();
    debug!("Docs request {} (tail '{}')", req.path(), tail);

    let target = match ActixAdapter.classify(&tail) {
        RequestKind::Asset => ui.directory_only(),
        RequestKind::Root => {
            let route_prefix = ActixAdapter.route_prefix(req.path());
            let ui = ui.into_inner();
            web::block(move || ui.render_and_write(&route_prefix)).await??
        }
    };

    let file = match target.index_path() {
        Some(index) => index,
        None => asset_path(&target.dist_dir, &tail)
            .ok_or_else(|| error::ErrorNotFound(format!("{} not found", tail)))?,
    };

    let named = NamedFile::open_async(&file).await?;
    Ok(named.into_response(&req))
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        log::error!("Failed to serve Swagger UI: {}", self);
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(ActixAdapter.classify(""), RequestKind::Root);
        assert_eq!(ActixAdapter.classify("index.css"), RequestKind::Asset);
        assert_eq!(ActixAdapter.classify("css/theme.css"), RequestKind::Asset);
    }

    #[test]
    fn test_route_prefix() {
        assert_eq!(ActixAdapter.route_prefix("/api-docs"), "/api-docs/");
        assert_eq!(ActixAdapter.route_prefix("/api-docs/"), "/api-docs/");
    }

    #[test]
    fn test_error_status() {
        let err = Error::InvalidSpecFile("spec.txt".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
