//! Layered configuration for the Swagger UI page.
//!
//! Configuration is assembled from three ordered layers:
//!
//! 1. the built-in defaults ([`default_options`]),
//! 2. the user overrides ([`UiOptions`]), deep-merged over the defaults,
//! 3. the route prefix of the current request ([`UiConfig::with_route_prefix`]).
//!
//! Each layer produces a new value. The validated [`UiConfig`] shared by the
//! adapters is never mutated; every request works on its own copy.
//!
//! # Example
//!
//! ```
//! use swagger_ui_middleware::options::UiOptions;
//!
//! let config = UiOptions::new()
//!     .title("Pet Store")
//!     .spec_file("docs/openapi.yaml")
//!     .hide_topbar(true)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.title, "Pet Store");
//! assert_eq!(config.swagger_options.layout, "StandaloneLayout");
//! assert!(config.swagger_options.url.is_none());
//! ```

use crate::error::{Error, Result};
use anyhow::Context;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Location the Swagger UI bundle is loaded from unless overridden. Empty means
/// the served directory, which holds the bundled distribution.
pub const DEFAULT_ASSETS_URL: &str = "";

/// Key of the request-derived route prefix. Users cannot set it.
const ROUTE_PREFIX_KEY: &str = "routePrefix";

/// Returns the base configuration layer.
///
/// ```text
/// title:          "Swagger UI"
/// oauthOptions:   false
/// swaggerOptions: { dom_id: "#swagger-ui", url: <petstore>, layout: "StandaloneLayout", deepLinking: true }
/// hideTopbar:     false
/// assetsUrl:      "" (the served directory)
/// ```
pub fn default_options() -> Value {
    json!({
        "title": "Swagger UI",
        "oauthOptions": false,
        "swaggerOptions": {
            "dom_id": "#swagger-ui",
            "url": "http://petstore.swagger.io/v2/swagger.json",
            "layout": "StandaloneLayout",
            "deepLinking": true
        },
        "hideTopbar": false,
        "assetsUrl": DEFAULT_ASSETS_URL
    })
}

/// Deep-merges `overrides` over `defaults` and returns the merged value.
///
/// Objects are merged key by key, recursively. Any other override value replaces
/// the default wholesale. A `null` override counts as "not set" and keeps the
/// default (or is dropped when there is no default).
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use swagger_ui_middleware::options::deep_merge;
///
/// let merged = deep_merge(
///     &json!({ "a": 1, "nested": { "b": 2, "c": 3 } }),
///     &json!({ "nested": { "c": 30 } }),
/// );
/// assert_eq!(merged, json!({ "a": 1, "nested": { "b": 2, "c": 30 } }));
/// ```
pub fn deep_merge(defaults: &Value, overrides: &Value) -> Value {
    match (defaults, overrides) {
        (Value::Object(base), Value::Object(layer)) => {
            let mut merged = base.clone();
            for (key, value) in layer {
                match base.get(key) {
                    Some(default) => {
                        merged.insert(key.clone(), deep_merge(default, value));
                    }
                    None if value.is_null() => {}
                    None => {
                        merged.insert(key.clone(), value.clone());
                    }
                }
            }
            Value::Object(merged)
        }
        (_, Value::Null) => defaults.clone(),
        (_, value) => value.clone(),
    }
}

/// OAuth settings handed to `ui.initOAuth`.
///
/// `Flag(false)` disables OAuth initialisation; `Settings` is passed to the page verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OAuthOptions {
    Flag(bool),
    Settings(Map<String, Value>),
}

impl OAuthOptions {
    fn to_value(&self) -> Value {
        match self {
            OAuthOptions::Flag(enabled) => Value::Bool(*enabled),
            OAuthOptions::Settings(settings) => Value::Object(settings.clone()),
        }
    }
}

/// Options forwarded to the `SwaggerUIBundle` constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerOptions {
    /// CSS selector of the element the UI mounts into
    #[serde(rename = "dom_id")]
    pub dom_id: String,
    /// Remote document fetched by the browser
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Local document resolved on the server before rendering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_file: Option<PathBuf>,
    /// Inline document embedded in the page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<Value>,
    pub layout: String,
    pub deep_linking: bool,
    /// Any other Swagger UI option, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Where the page gets its OpenAPI document from, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpecSource<'a> {
    File(&'a Path),
    Inline(&'a Value),
    Url(&'a str),
}

/// Fully merged and validated configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiConfig {
    pub title: String,
    pub oauth_options: OAuthOptions,
    pub swagger_options: SwaggerOptions,
    pub hide_topbar: bool,
    /// Base URL of the Swagger UI bundle; empty means the served directory
    #[serde(default)]
    pub assets_url: String,
    /// Set per request from the incoming URL
    #[serde(skip_deserializing)]
    pub route_prefix: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UiConfig {
    /// Builds a configuration from an already merged value.
    ///
    /// `specFile` takes precedence over an inline `spec`, which takes precedence
    /// over `url`; the lower-precedence sources are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the value does not have the expected
    /// shape or fails validation.
    pub fn from_value(merged: Value) -> Result<Self> {
        let mut config: UiConfig =
            serde_json::from_value(merged).map_err(|e| Error::InvalidConfig(e.to_string()))?;

        let swagger = &mut config.swagger_options;
        if swagger.spec_file.is_some() {
            swagger.spec = None;
            swagger.url = None;
        } else if swagger.spec.is_some() {
            swagger.url = None;
        }
        config.assets_url = config.assets_url.trim_end_matches('/').to_string();
        config.extra.remove(ROUTE_PREFIX_KEY);

        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants every page needs.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidConfig("title must not be empty".to_string()));
        }
        if self.swagger_options.dom_id.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "swaggerOptions.dom_id must not be empty".to_string(),
            ));
        }
        if self.swagger_options.layout.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "swaggerOptions.layout must not be empty".to_string(),
            ));
        }
        let swagger = &self.swagger_options;
        if swagger.spec_file.is_none() && swagger.spec.is_none() && swagger.url.is_none() {
            return Err(Error::InvalidConfig(
                "one of swaggerOptions.specFile, swaggerOptions.spec or swaggerOptions.url is required"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Returns a copy of this configuration carrying the given route prefix.
    pub fn with_route_prefix(&self, route_prefix: &str) -> Self {
        let mut config = self.clone();
        config.route_prefix = route_prefix.to_string();
        config
    }

    /// Returns a copy with `spec` set to the resolved document, replacing `specFile`.
    pub fn with_resolved_spec(mut self, spec: Value) -> Self {
        self.swagger_options.spec_file = None;
        self.swagger_options.url = None;
        self.swagger_options.spec = Some(spec);
        self
    }

    pub fn spec_source(&self) -> Option<SpecSource<'_>> {
        let swagger = &self.swagger_options;
        if let Some(path) = &swagger.spec_file {
            Some(SpecSource::File(path))
        } else if let Some(spec) = &swagger.spec {
            Some(SpecSource::Inline(spec))
        } else {
            swagger.url.as_deref().map(SpecSource::Url)
        }
    }
}

/// User-supplied configuration layer.
///
/// Holds only the keys the user set. [`UiOptions::build`] merges them over
/// [`default_options`] and validates the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiOptions {
    overrides: Map<String, Value>,
}

impl UiOptions {
    /// Creates an empty override layer; building it yields the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an override layer from an arbitrary JSON object.
    ///
    /// A `null` value, at any depth, means "not set": the default stays in
    /// place and cannot be removed this way. The default `swaggerOptions.url`
    /// is dropped by configuring `specFile` or `spec` instead, which take
    /// precedence over it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `value` is not an object (`null` is
    /// accepted and treated as empty).
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(overrides) => Ok(Self { overrides }),
            Value::Null => Ok(Self::new()),
            other => Err(Error::InvalidConfig(format!(
                "options must be an object, got {}",
                other
            ))),
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(value)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(content)?;
        Self::from_value(value)
    }

    /// Loads an override layer from a JSON or YAML file.
    ///
    /// Files ending in `.yaml` or `.yml` are read as YAML, everything else as JSON.
    /// `null` values keep the defaults, as in [`UiOptions::from_value`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not hold an object.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        debug!("Loading options from: {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file: {}", path.display()))?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);

        let options = if is_yaml {
            Self::from_yaml_str(&content)
        } else {
            Self::from_json_str(&content)
        };
        options.with_context(|| format!("Failed to load options from {}", path.display()))
    }

    pub fn title(self, title: impl Into<String>) -> Self {
        self.set("title", Value::String(title.into()))
    }

    pub fn oauth_options(self, oauth: OAuthOptions) -> Self {
        self.set("oauthOptions", oauth.to_value())
    }

    pub fn hide_topbar(self, hide: bool) -> Self {
        self.set("hideTopbar", Value::Bool(hide))
    }

    /// Loads the Swagger UI bundle from another location, e.g. a CDN such as
    /// `https://unpkg.com/swagger-ui-dist@5`. An empty string (the default)
    /// serves it from the served directory.
    pub fn assets_url(self, url: impl Into<String>) -> Self {
        self.set("assetsUrl", Value::String(url.into()))
    }

    pub fn dom_id(self, dom_id: impl Into<String>) -> Self {
        self.swagger_option("dom_id", Value::String(dom_id.into()))
    }

    pub fn url(self, url: impl Into<String>) -> Self {
        self.swagger_option("url", Value::String(url.into()))
    }

    pub fn spec_file(self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.swagger_option("specFile", Value::String(path.to_string_lossy().into_owned()))
    }

    pub fn spec(self, spec: Value) -> Self {
        self.swagger_option("spec", spec)
    }

    pub fn layout(self, layout: impl Into<String>) -> Self {
        self.swagger_option("layout", Value::String(layout.into()))
    }

    pub fn deep_linking(self, enabled: bool) -> Self {
        self.swagger_option("deepLinking", Value::Bool(enabled))
    }

    /// Sets any `swaggerOptions` key, e.g. `docExpansion` or `filter`.
    pub fn swagger_option(mut self, key: impl Into<String>, value: Value) -> Self {
        let entry = self
            .overrides
            .entry("swaggerOptions")
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(swagger) = entry {
            swagger.insert(key.into(), value);
        }
        self
    }

    /// Returns the override layer as a JSON value.
    pub fn overrides(&self) -> Value {
        Value::Object(self.overrides.clone())
    }

    /// Merges the overrides over the defaults and validates the result.
    ///
    /// A user-supplied `routePrefix` is discarded; it always comes from the request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the merged configuration is invalid.
    pub fn build(&self) -> Result<UiConfig> {
        let mut overrides = self.overrides.clone();
        if overrides.remove(ROUTE_PREFIX_KEY).is_some() {
            warn!("Ignoring configured routePrefix, it is derived from each request");
        }

        let merged = deep_merge(&default_options(), &Value::Object(overrides));
        debug!("Merged options: {}", merged);
        UiConfig::from_value(merged)
    }

    fn set(mut self, key: &str, value: Value) -> Self {
        self.overrides.insert(key.to_string(), value);
        self
    }
}
