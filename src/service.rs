//! The documentation service shared by the framework adapters.
//!
//! [`SwaggerUi`] owns the validated configuration, the directory served to the
//! browser and the page renderer. It offers the two operations the adapters
//! choose between on every request:
//!
//! - [`SwaggerUi::render_and_write`] for requests to the documentation root:
//!   resolve the spec file (when configured), render the page and write it into
//!   the served directory,
//! - [`SwaggerUi::directory_only`] for asset requests: hand back the directory
//!   without touching the filesystem.
//!
//! Every root request renders and writes the page again, so configuration or
//! spec file changes show up on the next visit.
//!
//! By default the served directory is a fresh temporary directory holding the
//! bundled assets; it is removed when the service is dropped.

use crate::assets::write_bundled_assets;
use crate::error::Result;
use crate::options::{SpecSource, UiConfig};
use crate::resolver::resolve_spec_file;
use crate::template::{RenderContext, TemplateRenderer};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// File name the rendered page is written to inside the served directory.
pub const INDEX_FILE: &str = "index.html";

/// Name prefix of the temporary directory the bundled assets are written to.
const RUNTIME_DIR_PREFIX: &str = "swagger-ui-";

/// What the static file server should serve for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeTarget {
    /// The served directory
    pub dist_dir: PathBuf,
    /// The rendered page, set only for documentation root requests
    pub index_file: Option<&'static str>,
}

impl ServeTarget {
    /// Full path of the rendered page, if this target has one.
    pub fn index_path(&self) -> Option<PathBuf> {
        self.index_file.map(|file| self.dist_dir.join(file))
    }
}

/// Renders and serves the Swagger UI page for one mounted configuration.
#[derive(Debug)]
pub struct SwaggerUi {
    config: UiConfig,
    dist_dir: PathBuf,
    renderer: TemplateRenderer,
    /// Owns the default served directory; `None` once a caller-provided one is used
    runtime_dir: Option<TempDir>,
}

impl SwaggerUi {
    /// Creates a service serving the bundled assets from a new temporary
    /// directory under [`std::env::temp_dir`].
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled page template does not compile or the
    /// assets cannot be written.
    pub fn new(config: UiConfig) -> Result<Self> {
        let runtime_dir = tempfile::Builder::new()
            .prefix(RUNTIME_DIR_PREFIX)
            .tempdir()?;
        write_bundled_assets(runtime_dir.path())?;
        debug!("Serving Swagger UI from {}", runtime_dir.path().display());

        Ok(Self {
            config,
            dist_dir: runtime_dir.path().to_path_buf(),
            renderer: TemplateRenderer::new()?,
            runtime_dir: Some(runtime_dir),
        })
    }

    /// Serves from `dist_dir` instead of the temporary directory, which is
    /// removed. The rendered page is written there too; the directory must hold
    /// the assets already (see [`crate::assets::write_bundled_assets`]).
    pub fn with_dist_dir(mut self, dist_dir: impl Into<PathBuf>) -> Self {
        self.dist_dir = dist_dir.into();
        self.runtime_dir = None;
        self
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    pub fn dist_dir(&self) -> &Path {
        &self.dist_dir
    }

    /// Renders the page for `route_prefix` without writing it.
    ///
    /// When a `specFile` is configured it is resolved first and embedded
    /// inline, replacing `specFile`.
    ///
    /// # Errors
    ///
    /// Returns an error if the spec file is invalid or cannot be resolved, or
    /// if rendering fails.
    pub fn render_page(&self, route_prefix: &str) -> Result<String> {
        let mut config = self.config.with_route_prefix(route_prefix);

        let spec_file = match config.spec_source() {
            Some(SpecSource::File(path)) => Some(path.to_path_buf()),
            _ => None,
        };
        if let Some(path) = spec_file {
            let spec = resolve_spec_file(&path)?;
            config = config.with_resolved_spec(spec);
        }

        self.renderer.render(&RenderContext::new(&config))
    }

    /// Renders the page and writes it to [`INDEX_FILE`] in the served directory,
    /// replacing any earlier render.
    ///
    /// # Returns
    ///
    /// Returns the served directory together with the index file name.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails or the file cannot be written. Nothing
    /// is written when rendering fails.
    pub fn render_and_write(&self, route_prefix: &str) -> Result<ServeTarget> {
        debug!("Index file requested, rendering for route '{}'", route_prefix);
        let page = self.render_page(route_prefix)?;

        let target = ServeTarget {
            dist_dir: self.dist_dir.clone(),
            index_file: Some(INDEX_FILE),
        };
        let index_path = self.dist_dir.join(INDEX_FILE);
        write_to_file(&page, &index_path)?;
        info!("Wrote Swagger UI page to {}", index_path.display());

        Ok(target)
    }

    /// Returns the served directory without rendering anything.
    pub fn directory_only(&self) -> ServeTarget {
        debug!("Index file not requested, serving {}", self.dist_dir.display());
        ServeTarget {
            dist_dir: self.dist_dir.clone(),
            index_file: None,
        }
    }
}

/// Writes `content` to `path`, creating parent directories and overwriting any
/// existing file.
fn write_to_file(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::options::UiOptions;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn service(options: UiOptions, dist_dir: &Path) -> SwaggerUi {
        SwaggerUi::new(options.build().unwrap())
            .unwrap()
            .with_dist_dir(dist_dir)
    }

    #[test]
    fn test_default_dist_dir_is_runtime_directory() {
        let ui = SwaggerUi::new(UiOptions::new().build().unwrap()).unwrap();
        let dist_dir = ui.dist_dir().to_path_buf();

        assert!(dist_dir.starts_with(std::env::temp_dir()));
        assert!(!dist_dir.starts_with(env!("CARGO_MANIFEST_DIR")));
        assert!(dist_dir.join("index.css").is_file());
        assert!(dist_dir.join("swagger-ui-bundle.js").is_file());

        ui.render_and_write("/docs/").unwrap();
        assert!(dist_dir.join(INDEX_FILE).is_file());

        drop(ui);
        assert!(!dist_dir.exists());
    }

    #[test]
    fn test_with_dist_dir_releases_runtime_directory() {
        let temp_dir = TempDir::new().unwrap();
        let ui = SwaggerUi::new(UiOptions::new().build().unwrap()).unwrap();
        let runtime_dir = ui.dist_dir().to_path_buf();

        let ui = ui.with_dist_dir(temp_dir.path());

        assert_eq!(ui.dist_dir(), temp_dir.path());
        assert!(!runtime_dir.exists());
    }

    #[test]
    fn test_directory_only_touches_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let ui = service(UiOptions::new(), temp_dir.path());

        let target = ui.directory_only();

        assert_eq!(target.dist_dir, temp_dir.path());
        assert_eq!(target.index_file, None);
        assert_eq!(target.index_path(), None);
        assert!(!temp_dir.path().join(INDEX_FILE).exists());
    }

    #[test]
    fn test_render_and_write() {
        let temp_dir = TempDir::new().unwrap();
        let ui = service(UiOptions::new().title("Billing"), temp_dir.path());

        let target = ui.render_and_write("/docs/").unwrap();

        assert_eq!(target.index_file, Some(INDEX_FILE));
        let written = fs::read_to_string(target.index_path().unwrap()).unwrap();
        assert!(written.contains("<title>Billing</title>"));
    }

    #[test]
    fn test_render_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dist_dir = temp_dir.path().join("nested").join("public");
        let ui = service(UiOptions::new(), &dist_dir);

        ui.render_and_write("/docs/").unwrap();
        assert!(dist_dir.join(INDEX_FILE).is_file());
    }

    #[test]
    fn test_render_does_not_mutate_config() {
        let temp_dir = TempDir::new().unwrap();
        let ui = service(UiOptions::new(), temp_dir.path());

        ui.render_and_write("/first/").unwrap();
        ui.render_and_write("/second/").unwrap();

        assert_eq!(ui.config().route_prefix, "");
    }

    #[test]
    fn test_invalid_spec_file_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let spec_path = temp_dir.path().join("openapi.txt");
        fs::write(&spec_path, "openapi: 3.0.0").unwrap();
        let ui = service(UiOptions::new().spec_file(&spec_path), temp_dir.path());

        let result = ui.render_and_write("/docs/");

        assert!(matches!(result, Err(Error::InvalidSpecFile(_))));
        assert!(!temp_dir.path().join(INDEX_FILE).exists());
    }
}
