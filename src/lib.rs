//! Chaingen Core - Chain Compiler
//!
//! Turns a handler/route document into two Rust files: role-tagged handler
//! traits and a router that walks each receiver chain in order.
//!
//! # Guarantees
//! 1. Same document, same bytes
//! 2. Every name resolves or nothing is written
//! 3. Intermediate receivers cannot produce a response
//! 4. The first failing intermediate ends the chain

pub mod spec;
pub mod validation;
pub mod naming;
pub mod model;
pub mod hashing;
pub mod render;
pub mod interfaces;
pub mod messenger;
pub mod pipeline;
pub mod cli;

pub use spec::{HandlerDecl, MessageRouteDecl, RouteDecl, Spec, SpecError};
pub use validation::{ValidationError, ValidationRule, ValidationViolation, Validator};
pub use model::{ChainModel, ModelError, Role};
pub use hashing::{canonical_json, sha256_hex, spec_fingerprint};
pub use render::{canonicalize, RenderError, Renderer};
pub use pipeline::{Emitter, GenerateError, Generator, WriteOutcome};

pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");
