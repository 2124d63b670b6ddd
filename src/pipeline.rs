//! Generation Pipeline - Single Entry Point
//!
//! Every output goes through `Generator`, and a `Generator` only exists for a
//! document that passed validation and model construction.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::hashing::spec_fingerprint;
use crate::model::{ChainModel, ModelError};
use crate::render::{RenderError, Renderer};
use crate::spec::{Spec, SpecError};
use crate::validation::{ValidationError, Validator};
use crate::{interfaces, messenger};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Fingerprint error: {0}")]
    Fingerprint(#[from] serde_json::Error),

    #[error("cannot write {}: {source}", .path.display())]
    OutputIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Which file to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emitter {
    Interfaces,
    Messenger,
}

impl Emitter {
    pub fn tool_name(self) -> &'static str {
        match self {
            Emitter::Interfaces => interfaces::TOOL_NAME,
            Emitter::Messenger => messenger::TOOL_NAME,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// The file already held the generated text and was left untouched.
    Unchanged,
}

pub struct Generator {
    spec: Spec,
    model: ChainModel,
    renderer: Renderer,
}

impl Generator {
    pub fn load(path: &Path) -> Result<Self, GenerateError> {
        info!(path = %path.display(), "loading spec");
        Self::from_spec(Spec::load(path)?)
    }

    /// Validate `spec` and build its chain model.
    ///
    /// This is the ONLY way to obtain a `Generator`.
    pub fn from_spec(spec: Spec) -> Result<Self, GenerateError> {
        Validator::new().validate(&spec)?;
        let model = ChainModel::build(&spec)?;
        debug!(
            handlers = model.handlers.len(),
            chains = model.chains.len(),
            "built chain model"
        );
        Ok(Self {
            spec,
            model,
            renderer: Renderer::new()?,
        })
    }

    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    pub fn model(&self) -> &ChainModel {
        &self.model
    }

    /// Produce the canonical text of one generated file.
    pub fn generate(&self, emitter: Emitter) -> Result<String, GenerateError> {
        let fingerprint = spec_fingerprint(&self.spec, emitter.tool_name())?;
        debug!(tool = emitter.tool_name(), %fingerprint, "rendering");
        let code = match emitter {
            Emitter::Interfaces => interfaces::emit(&self.model, &fingerprint, &self.renderer)?,
            Emitter::Messenger => messenger::emit(&self.model, &fingerprint, &self.renderer)?,
        };
        info!(tool = emitter.tool_name(), bytes = code.len(), "generated");
        Ok(code)
    }

    /// Generate and write atomically to `path`.
    pub fn write_to_file(&self, emitter: Emitter, path: &Path) -> Result<WriteOutcome, GenerateError> {
        let code = self.generate(emitter)?;
        if read_existing(path)?.as_deref() == Some(code.as_bytes()) {
            debug!(path = %path.display(), "output unchanged, not rewriting");
            return Ok(WriteOutcome::Unchanged);
        }
        write_atomic(path, &code).map_err(|source| GenerateError::OutputIo {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "wrote output");
        Ok(WriteOutcome::Written)
    }

    /// Whether `path` already holds exactly what `generate` would produce.
    pub fn check_file(&self, emitter: Emitter, path: &Path) -> Result<bool, GenerateError> {
        let code = self.generate(emitter)?;
        Ok(read_existing(path)?.as_deref() == Some(code.as_bytes()))
    }
}

/// Raw bytes of the current output. Non-UTF-8 content compares as stale.
fn read_existing(path: &Path) -> Result<Option<Vec<u8>>, GenerateError> {
    match fs::read(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(GenerateError::OutputIo {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file().set_permissions(fs::Permissions::from_mode(0o644))?;
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
