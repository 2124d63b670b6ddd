//! Spec Document - Handlers, Routes, Output Settings
//!
//! Message and response types are opaque tokens. Nothing here resolves them.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub type HandlerName = String;

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("Failed to read spec file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}{}: {message}", .path.display(), location_suffix(.line, .column))]
    Parse {
        path: PathBuf,
        line: Option<usize>,
        column: Option<usize>,
        message: String,
    },
}

fn location_suffix(line: &Option<usize>, column: &Option<usize>) -> String {
    match (*line, *column) {
        (Some(l), Some(c)) => format!(" at line {}, column {}", l, c),
        (Some(l), None) => format!(" at line {}", l),
        _ => String::new(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Spec {
    pub package: String,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default = "default_context")]
    pub context: String,
    #[serde(default = "default_error")]
    pub error: String,
    #[serde(default = "default_messenger")]
    pub messenger: String,
    #[serde(default = "default_interfaces")]
    pub interfaces: String,
    #[serde(default = "default_strip_suffixes")]
    pub strip_suffixes: Vec<String>,
    #[serde(default)]
    pub min_generator_version: Option<String>,
    #[serde(default)]
    pub handlers: Vec<HandlerDecl>,
    #[serde(default)]
    pub routes: Vec<RouteDecl>,
}

fn default_context() -> String { "Context".to_string() }
fn default_error() -> String { "Error".to_string() }
fn default_messenger() -> String { "Messenger".to_string() }
fn default_interfaces() -> String { "super::interfaces".to_string() }
fn default_strip_suffixes() -> Vec<String> { vec!["Proto".to_string()] }

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HandlerDecl {
    pub name: HandlerName,
    #[serde(rename = "type")]
    pub implementation_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RouteDecl {
    pub source: HandlerName,
    #[serde(default)]
    pub messages: Vec<MessageRouteDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MessageRouteDecl {
    #[serde(rename = "message")]
    pub message_type: String,
    #[serde(rename = "response", default, skip_serializing_if = "Option::is_none")]
    pub response_type: Option<String>,
    #[serde(default)]
    pub receivers: Vec<HandlerName>,
}

impl Spec {
    /// Read and parse a spec document. Does not validate it.
    pub fn load(path: &Path) -> Result<Self, SpecError> {
        let content = fs::read_to_string(path).map_err(|source| SpecError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = content.len(), "read spec document");
        Self::parse(&content, path)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, SpecError> {
        Self::parse(content, Path::new("<inline>"))
    }

    fn parse(content: &str, path: &Path) -> Result<Self, SpecError> {
        serde_yaml::from_str(content).map_err(|e| {
            let location = e.location();
            SpecError::Parse {
                path: path.to_path_buf(),
                line: location.as_ref().map(|l| l.line()),
                column: location.as_ref().map(|l| l.column()),
                message: e.to_string(),
            }
        })
    }

    pub fn handler(&self, name: &str) -> Option<&HandlerDecl> {
        self.handlers.iter().find(|h| h.name == name)
    }

    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name.as_str()).collect()
    }

    /// Routes where `name` is the source.
    pub fn routes_from(&self, name: &str) -> impl Iterator<Item = &RouteDecl> + '_ {
        let name = name.to_string();
        self.routes.iter().filter(move |r| r.source == name)
    }

    pub fn receives_messages(&self, name: &str) -> bool {
        self.routes
            .iter()
            .flat_map(|r| r.messages.iter())
            .any(|m| m.receivers.iter().any(|r| r == name))
    }

    /// Handlers that appear in at least one receiver list, in declaration order.
    pub fn receiving_handlers(&self) -> Vec<&HandlerDecl> {
        self.handlers
            .iter()
            .filter(|h| self.receives_messages(&h.name))
            .collect()
    }
}
