//! Identifier Derivation
//!
//! Maps opaque type tokens and handler names to Rust identifiers.
//! Every mapping is checked: two inputs never share one output.

use heck::{ToSnakeCase, ToUpperCamelCase};
use std::collections::BTreeMap;

use crate::model::ModelError;

/// Strip reference and pointer decoration from a type token.
///
/// `&mut pb::Foo`, `*const pb::Foo` and `pb::Foo` all canonicalize to `pb::Foo`.
pub fn canonical_type(token: &str) -> String {
    let mut t = token.trim();
    loop {
        let stripped = if let Some(rest) = t.strip_prefix('&') {
            let rest = rest.trim_start();
            rest.strip_prefix("mut ").unwrap_or(rest)
        } else if let Some(rest) = t.strip_prefix('*') {
            let rest = rest.trim_start();
            rest.strip_prefix("const ")
                .or_else(|| rest.strip_prefix("mut "))
                .unwrap_or(rest)
        } else {
            break;
        };
        t = stripped.trim_start();
    }
    t.to_string()
}

/// Derive the message base name from a type token.
///
/// `&configpb::AccountCreationRequestProto` becomes `AccountCreationRequest`
/// when `Proto` is one of the envelope suffixes.
pub fn base_name(token: &str, suffixes: &[String]) -> Result<String, ModelError> {
    let canonical = canonical_type(token);
    let without_generics = canonical.split('<').next().unwrap_or_default();
    let last = without_generics
        .rsplit("::")
        .next()
        .and_then(|s| s.rsplit('.').next())
        .unwrap_or_default()
        .trim();

    let base = suffixes
        .iter()
        .filter(|suffix| !suffix.is_empty())
        .find_map(|suffix| last.strip_suffix(suffix.as_str()).filter(|rest| !rest.is_empty()))
        .unwrap_or(last);

    if !is_identifier(base) {
        return Err(ModelError::InvalidIdentifier {
            what: "message type".to_string(),
            value: token.to_string(),
        });
    }
    Ok(base.to_string())
}

/// True when `s` parses as a plain, non-keyword Rust identifier.
pub fn is_identifier(s: &str) -> bool {
    !s.is_empty() && syn::parse_str::<syn::Ident>(s).is_ok()
}

pub fn snake(s: &str) -> String {
    s.to_snake_case()
}

pub fn pascal(s: &str) -> String {
    s.to_upper_camel_case()
}

/// Identifiers derived from one handler name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerIdents {
    /// Field and method fragment, e.g. `auth_gate`.
    pub snake: String,
    /// Trait prefix, e.g. `AuthGate`.
    pub pascal: String,
}

impl HandlerIdents {
    pub fn derive(name: &str) -> Result<Self, ModelError> {
        let idents = Self {
            snake: snake(name),
            pascal: pascal(name),
        };
        if !is_identifier(&idents.snake) || !is_identifier(&idents.pascal) {
            return Err(ModelError::InvalidIdentifier {
                what: "handler name".to_string(),
                value: name.to_string(),
            });
        }
        Ok(idents)
    }
}

/// Records which input produced each derived name and rejects collisions.
///
/// Backed by a `BTreeMap` so iteration order never leaks into output.
#[derive(Debug, Default)]
pub struct NameTable {
    owners: BTreeMap<String, String>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `name` for `owner`. Claiming it again for the same owner is a no-op.
    pub fn claim(&mut self, kind: &str, name: &str, owner: &str) -> Result<(), ModelError> {
        match self.owners.get(name) {
            Some(existing) if existing != owner => Err(ModelError::NameCollision {
                kind: kind.to_string(),
                name: name.to_string(),
                first: existing.clone(),
                second: owner.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.owners.insert(name.to_string(), owner.to_string());
                Ok(())
            }
        }
    }
}
