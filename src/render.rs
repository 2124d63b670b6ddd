//! Template Renderer - Handlebars In, Canonical Rust Out
//!
//! Templates only lay out text. Every name and signature is computed by the
//! emitters before rendering.

use handlebars::Handlebars;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub const INTERFACES_TEMPLATE: &str = "interfaces";
pub const MESSENGER_TEMPLATE: &str = "messenger";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),

    /// The rendered text is not valid Rust. `raw` keeps the unformatted output.
    #[error("generated code does not parse at line {line}, column {column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
        raw: String,
    },
}

impl RenderError {
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            RenderError::Syntax { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

pub struct Renderer {
    handlebars: Handlebars<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_template_string(
            INTERFACES_TEMPLATE,
            include_str!("templates/interfaces.rs.hbs"),
        )?;
        handlebars.register_template_string(
            MESSENGER_TEMPLATE,
            include_str!("templates/messenger.rs.hbs"),
        )?;
        Ok(Self { handlebars })
    }

    /// Render a registered template and canonicalize the result.
    pub fn render<T: Serialize>(&self, template: &str, view: &T) -> Result<String, RenderError> {
        let raw = self.handlebars.render(template, view)?;
        debug!(template, bytes = raw.len(), "rendered template");
        canonicalize(&raw)
    }
}

/// One `use` line per import path, in the given order.
pub fn use_block(imports: &[String]) -> String {
    imports
        .iter()
        .map(|path| format!("use {};", path))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check that `raw` parses as a Rust file, then normalize its whitespace.
///
/// Trailing whitespace is trimmed, leading blank lines are dropped, blank-line
/// runs collapse to one, blank lines right after `{` or right before `}` are
/// removed, and the text ends with exactly one newline.
pub fn canonicalize(raw: &str) -> Result<String, RenderError> {
    if let Err(e) = syn::parse_file(raw) {
        let start = e.span().start();
        return Err(RenderError::Syntax {
            message: e.to_string(),
            line: start.line,
            column: start.column + 1,
            raw: raw.to_string(),
        });
    }

    let mut out = String::with_capacity(raw.len());
    let mut pending_blank = false;
    for line in raw.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            pending_blank = !out.is_empty() && !out.trim_end().ends_with('{');
            continue;
        }
        if pending_blank && !line.trim_start().starts_with('}') {
            out.push('\n');
        }
        pending_blank = false;
        out.push_str(line);
        out.push('\n');
    }
    Ok(out)
}
