//! Swagger UI middleware - serve an interactive OpenAPI documentation page from Rust web applications.
//!
//! This library renders a Swagger UI entry page from user configuration and serves it,
//! together with a directory of static assets, through Axum or Actix-Web. When the
//! configuration points at a local OpenAPI document, every `$ref` in it is resolved on the
//! server and the self-contained document is embedded in the page.
//!
//! # Supported Frameworks
//!
//! - **Axum**: mount [`adapter::axum::service`] with `Router::nest_service`
//! - **Actix-Web**: register [`adapter::actix::configure`] with `App::configure`
//!
//! # Architecture
//!
//! The library is organized into several modules that work together:
//!
//! 1. [`options`] - Merges user options over the defaults into a validated configuration
//! 2. [`resolver`] - Loads a YAML/JSON spec file and inlines its `$ref` pointers
//! 3. [`template`] - Renders the HTML page from the configuration
//! 4. [`service`] - Writes the page into the served directory, or returns the directory alone
//! 5. [`assets`] - Swagger UI distribution embedded in the binary
//! 6. [`adapter`] - Classifies requests and delegates file serving to each framework
//!
//! On every request the adapter decides whether the documentation root or an asset
//! was requested. Root requests render and write the page again; asset requests go
//! straight to the framework's static file server.
//!
//! # Example Usage
//!
//! ```no_run
//! use axum::Router;
//! use swagger_ui_middleware::{adapter, options::UiOptions, service::SwaggerUi};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = UiOptions::new()
//!     .title("Pet Store")
//!     .spec_file("docs/openapi.yaml")
//!     .build()?;
//! let ui = SwaggerUi::new(config)?;
//!
//! let app: Router = Router::new().nest_service("/docs", adapter::axum::service(ui));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod assets;
pub mod error;
pub mod options;
pub mod resolver;
pub mod service;
pub mod template;

pub use error::{Error, Result};
pub use options::{UiConfig, UiOptions};
pub use service::{ServeTarget, SwaggerUi};
