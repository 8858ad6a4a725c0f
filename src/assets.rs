//! Static assets served next to the rendered page.
//!
//! The Swagger UI distribution is embedded at build time by `utoipa-swagger-ui`
//! and the crate's own stylesheet by `include_str!`. [`write_bundled_assets`]
//! copies both into a directory so the framework's static file server can
//! serve them from disk.

use crate::error::{Error, Result};
use log::debug;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use utoipa_swagger_ui::Config;

/// Stylesheet linked by the page; hides the top bar when `hideTopbar` is set.
pub const INDEX_CSS: &str = include_str!("../public/index.css");

/// Files of the Swagger UI distribution the page loads.
pub const DIST_FILES: &[&str] = &[
    "swagger-ui.css",
    "swagger-ui-bundle.js",
    "swagger-ui-standalone-preset.js",
    "favicon-32x32.png",
    "favicon-16x16.png",
    "oauth2-redirect.html",
];

/// Returns the embedded bytes of a Swagger UI distribution file.
///
/// # Errors
///
/// Returns [`Error::AssetError`] if the embedded distribution cannot be read.
pub fn dist_file(name: &str) -> Result<Option<Vec<u8>>> {
    // Only the initializer script depends on the config; plain files ignore it
    let config = Arc::new(Config::from(""));
    let file = utoipa_swagger_ui::serve(name, config)
        .map_err(|e| Error::AssetError(format!("{}: {}", name, e)))?;
    Ok(file.map(|file| file.bytes.into_owned()))
}

/// Writes the Swagger UI distribution and `index.css` into `dir`, creating it
/// if needed. Existing files are overwritten.
///
/// # Errors
///
/// Returns an error if a file cannot be written or the embedded distribution
/// cannot be read.
pub fn write_bundled_assets(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;

    for name in DIST_FILES {
        match dist_file(name)? {
            Some(bytes) => fs::write(dir.join(name), bytes)?,
            None => debug!("{} is not part of the embedded distribution", name),
        }
    }
    fs::write(dir.join("index.css"), INDEX_CSS)?;

    debug!("Wrote bundled Swagger UI assets to {}", dir.display());
    Ok(())
}
