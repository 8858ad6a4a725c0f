//! `$ref` resolution for OpenAPI documents stored on disk.
//!
//! [`resolve_spec_file`] reads a YAML or JSON document and returns a copy of it
//! in which every `$ref` reachable from the root has been replaced by the value
//! it points to. Three kinds of reference are followed:
//!
//! - same-document pointers (`#/components/schemas/Pet`),
//! - relative files (`schemas/pet.yaml#/Pet`), resolved against the referencing document,
//! - remote documents (`https://example.com/common.yaml#/Error`), fetched over HTTP.
//!
//! # Example
//!
//! ```no_run
//! use swagger_ui_middleware::resolver::resolve_spec_file;
//! use std::path::Path;
//!
//! let spec = resolve_spec_file(Path::new("docs/openapi.yaml")).unwrap();
//! println!("{}", spec["info"]["title"]);
//! ```

use crate::error::{Error, Result};
use log::{debug, warn};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const REF_KEY: &str = "$ref";

/// Serialization format of a specification document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    Yaml,
    Json,
}

impl SpecFormat {
    /// Picks the format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSpecFile`] for anything other than `yaml`, `yml` or `json`.
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_extension(path).ok_or_else(|| Error::InvalidSpecFile(path.to_path_buf()))
    }

    fn from_extension(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "yaml" | "yml" => Some(SpecFormat::Yaml),
            "json" => Some(SpecFormat::Json),
            _ => None,
        }
    }

    /// Parses `content` into a JSON value tree.
    pub fn parse(self, content: &str, origin: &str) -> Result<Value> {
        let parsed = match self {
            SpecFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            SpecFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| Error::ParseError {
            origin: origin.to_string(),
            message,
        })
    }
}

/// Resolves every `$ref` in the document at `path`.
///
/// # Errors
///
/// - [`Error::InvalidSpecFile`] if the extension is not supported; nothing is read in that case
/// - [`Error::IoError`] / [`Error::ParseError`] if a document cannot be read or parsed
/// - [`Error::FetchError`] if a remote document cannot be downloaded
/// - [`Error::ReferenceError`] if a pointer has no target
///
/// References that close a cycle (recursive schemas) cannot be inlined. They
/// are kept as `$ref`s: `#/...` when they point into the root document,
/// absolute `file://` or `http(s)://` references otherwise.
pub fn resolve_spec_file(path: &Path) -> Result<Value> {
    let format = SpecFormat::from_path(path)?;
    debug!("Resolving specification file: {}", path.display());

    let content = fs::read_to_string(path)?;
    let root = format.parse(&content, &path.display().to_string())?;

    let mut resolver = RefResolver::new(format);
    resolver.resolve_document(root, DocumentLocation::file(path))
}

/// Where a document came from; relative references are resolved against it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DocumentLocation {
    File(PathBuf),
    Remote(Url),
}

impl DocumentLocation {
    fn file(path: &Path) -> Self {
        DocumentLocation::File(fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()))
    }

    /// Resolves the document part of a reference (everything before `#`).
    fn join(&self, reference: &str) -> Result<DocumentLocation> {
        if let Ok(url) = Url::parse(reference) {
            return match url.scheme() {
                "http" | "https" => Ok(DocumentLocation::Remote(url)),
                "file" => url
                    .to_file_path()
                    .map(|path| DocumentLocation::file(&path))
                    .map_err(|_| reference_error(reference, "invalid file URL")),
                scheme => Err(reference_error(
                    reference,
                    &format!("unsupported scheme '{}'", scheme),
                )),
            };
        }

        match self {
            DocumentLocation::File(base) => {
                let decoded = urlencoding::decode(reference)
                    .map_err(|e| reference_error(reference, &e.to_string()))?;
                let dir = base.parent().unwrap_or_else(|| Path::new(""));
                Ok(DocumentLocation::file(&dir.join(decoded.as_ref())))
            }
            DocumentLocation::Remote(base) => base
                .join(reference)
                .map(DocumentLocation::Remote)
                .map_err(|e| reference_error(reference, &e.to_string())),
        }
    }
}

impl fmt::Display for DocumentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentLocation::File(path) => write!(f, "{}", path.display()),
            DocumentLocation::Remote(url) => write!(f, "{}", url),
        }
    }
}

/// One resolution pass over a document graph.
struct RefResolver {
    /// Format of the root document; remote documents are parsed with it
    format: SpecFormat,
    /// Location of the document being resolved; back-edges into it stay as `#/...` pointers
    root: Option<DocumentLocation>,
    documents: HashMap<DocumentLocation, Value>,
    /// Fully resolved targets keyed by `location#pointer`
    resolved: HashMap<String, Value>,
    /// Targets currently being expanded, for cycle detection
    in_progress: Vec<String>,
    client: Option<reqwest::blocking::Client>,
}

impl RefResolver {
    fn new(format: SpecFormat) -> Self {
        Self {
            format,
            root: None,
            documents: HashMap::new(),
            resolved: HashMap::new(),
            in_progress: Vec::new(),
            client: None,
        }
    }

    fn resolve_document(&mut self, root: Value, location: DocumentLocation) -> Result<Value> {
        self.documents.insert(location.clone(), root.clone());
        self.root = Some(location.clone());
        let resolved = self.resolve_value(&root, &location)?;
        debug!(
            "Resolved {} with {} external document(s)",
            location,
            self.documents.len() - 1
        );
        Ok(resolved)
    }

    fn resolve_value(&mut self, value: &Value, base: &DocumentLocation) -> Result<Value> {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(reference)) = map.get(REF_KEY) {
                    let target = self.resolve_ref(reference, base)?;
                    if map.len() == 1 {
                        return Ok(target);
                    }
                    // Keys next to `$ref` override the referenced object
                    let mut merged = match target {
                        Value::Object(object) => object,
                        other => return Ok(other),
                    };
                    for (key, sibling) in map {
                        if key != REF_KEY {
                            merged.insert(key.clone(), self.resolve_value(sibling, base)?);
                        }
                    }
                    return Ok(Value::Object(merged));
                }

                let mut resolved = Map::with_capacity(map.len());
                for (key, child) in map {
                    resolved.insert(key.clone(), self.resolve_value(child, base)?);
                }
                Ok(Value::Object(resolved))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve_value(item, base))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    fn resolve_ref(&mut self, reference: &str, base: &DocumentLocation) -> Result<Value> {
        let (document_part, fragment) = reference.split_once('#').unwrap_or((reference, ""));
        let location = if document_part.is_empty() {
            base.clone()
        } else {
            base.join(document_part)?
        };

        let key = format!("{}#{}", location, fragment);
        if let Some(done) = self.resolved.get(&key) {
            return Ok(done.clone());
        }
        if self.in_progress.contains(&key) {
            let back_edge = self.back_edge(&location, fragment);
            warn!(
                "Circular reference '{}' left unresolved as '{}'",
                reference, back_edge
            );
            return Ok(json!({ REF_KEY: back_edge }));
        }

        let target = {
            let document = self.load(&location)?;
            lookup(document, fragment, reference)?.clone()
        };

        self.in_progress.push(key.clone());
        let resolved = self.resolve_value(&target, &location);
        self.in_progress.pop();

        let resolved = resolved?;
        self.resolved.insert(key, resolved.clone());
        Ok(resolved)
    }

    /// Rewrites a reference that closes a cycle so it still points at its
    /// target from inside the resolved document.
    fn back_edge(&self, location: &DocumentLocation, fragment: &str) -> String {
        if self.root.as_ref() == Some(location) {
            return format!("#{}", fragment);
        }
        match location {
            DocumentLocation::File(path) => match Url::from_file_path(path) {
                Ok(url) => format!("{}#{}", url, fragment),
                Err(()) => format!("{}#{}", path.display(), fragment),
            },
            DocumentLocation::Remote(url) => format!("{}#{}", url, fragment),
        }
    }

    fn load(&mut self, location: &DocumentLocation) -> Result<&Value> {
        if !self.documents.contains_key(location) {
            let document = match location {
                DocumentLocation::File(path) => {
                    debug!("Loading referenced file: {}", path.display());
                    let format = SpecFormat::from_extension(path).unwrap_or(self.format);
                    let content = fs::read_to_string(path)?;
                    format.parse(&content, &path.display().to_string())?
                }
                DocumentLocation::Remote(url) => {
                    let content = self.fetch(url)?;
                    self.format.parse(&content, url.as_str())?
                }
            };
            self.documents.insert(location.clone(), document);
        }

        self.documents
            .get(location)
            .ok_or_else(|| reference_error(&location.to_string(), "document not loaded"))
    }

    fn fetch(&mut self, url: &Url) -> Result<String> {
        debug!("Fetching remote reference: {}", url);
        let fetch_error = |e: reqwest::Error| Error::FetchError {
            url: url.to_string(),
            message: e.to_string(),
        };

        let client = match self.client.take() {
            Some(client) => client,
            None => reqwest::blocking::Client::builder()
                .timeout(None::<Duration>)
                .build()
                .map_err(fetch_error)?,
        };
        let body = client
            .get(url.clone())
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(fetch_error);
        self.client = Some(client);
        body
    }
}

/// Follows a JSON pointer fragment (possibly percent-encoded) inside `document`.
fn lookup<'a>(document: &'a Value, fragment: &str, reference: &str) -> Result<&'a Value> {
    if fragment.is_empty() {
        return Ok(document);
    }
    let pointer =
        urlencoding::decode(fragment).map_err(|e| reference_error(reference, &e.to_string()))?;
    if !pointer.starts_with('/') {
        return Err(reference_error(reference, "only JSON pointer fragments are supported"));
    }
    document
        .pointer(&pointer)
        .ok_or_else(|| reference_error(reference, "target not found"))
}

fn reference_error(reference: &str, message: &str) -> Error {
    Error::ReferenceError {
        reference: reference.to_string(),
        message: message.to_string(),
    }
}

/// Returns true if any `$ref` key is reachable from `value`.
pub fn contains_ref(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.contains_key(REF_KEY) || map.values().any(contains_ref),
        Value::Array(items) => items.iter().any(contains_ref),
        _ => false,
    }
}
