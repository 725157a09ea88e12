//! lf-project: network description formats and validation.
//!
//! A network can be described in YAML, JSON or a line-oriented text form.
//! Every loader validates before returning.

pub mod schema;
pub mod text;
pub mod validate;

use std::path::Path;

pub use schema::*;
pub use text::parse;
pub use validate::{ValidationError, validate_network};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Parse error on line {line}: {what}")]
    Parse { line: usize, what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk format, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
    Text,
}

impl Format {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => Format::Yaml,
            Some("json") => Format::Json,
            _ => Format::Text,
        }
    }
}

pub fn load_yaml(path: &Path) -> ProjectResult<NetworkDef> {
    let content = std::fs::read_to_string(path)?;
    let network: NetworkDef = serde_yaml::from_str(&content)?;
    validate_network(&network)?;
    Ok(network)
}

pub fn save_yaml(path: &Path, network: &NetworkDef) -> ProjectResult<()> {
    validate_network(network)?;
    let content = serde_yaml::to_string(network)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<NetworkDef> {
    let content = std::fs::read_to_string(path)?;
    let network: NetworkDef = serde_json::from_str(&content)?;
    validate_network(&network)?;
    Ok(network)
}

pub fn save_json(path: &Path, network: &NetworkDef) -> ProjectResult<()> {
    validate_network(network)?;
    let content = serde_json::to_string_pretty(network)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_text(path: &Path) -> ProjectResult<NetworkDef> {
    let content = std::fs::read_to_string(path)?;
    let network = parse(&content)?;
    validate_network(&network)?;
    Ok(network)
}

/// Load a description in whichever format its extension names.
pub fn load(path: &Path) -> ProjectResult<NetworkDef> {
    match Format::from_path(path) {
        Format::Yaml => load_yaml(path),
        Format::Json => load_json(path),
        Format::Text => load_text(path),
    }
}

/// Save a description in whichever format its extension names.
///
/// The text form is input only; any other extension is an error.
pub fn save(path: &Path, network: &NetworkDef) -> ProjectResult<()> {
    match Format::from_path(path) {
        Format::Yaml => save_yaml(path, network),
        Format::Json => save_json(path, network),
        Format::Text => Err(ProjectError::Io(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            format!("cannot write text descriptions: {}", path.display()),
        ))),
    }
}
