//! Validation System - Ordered Rules, Fail Fast
//!
//! Rules produce structured violations.
//! The validator stops at the first rule that reports anything.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::spec::Spec;
use crate::GENERATOR_VERSION;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationViolation {
    pub rule: String,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub remediation: Vec<String>,
}

impl fmt::Display for ValidationViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("validation failed ({rule}): {}", join_messages(.violations))]
pub struct ValidationError {
    pub rule: String,
    pub violations: Vec<ValidationViolation>,
}

fn join_messages(violations: &[ValidationViolation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validation rule trait - produces violations
pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(&self, spec: &Spec) -> Vec<ValidationViolation>;
}

fn violation(rule: &str, message: String) -> ValidationViolation {
    ValidationViolation {
        rule: rule.to_string(),
        message,
        expected: None,
        actual: None,
        remediation: vec![],
    }
}

fn unknown_handler(rule: &str, location: String, name: &str, spec: &Spec) -> ValidationViolation {
    let known = spec.handler_names().join(", ");
    ValidationViolation {
        rule: rule.to_string(),
        message: format!("{}: unknown handler '{}' (available handlers: {})", location, name, known),
        expected: Some(format!("one of: {}", known)),
        actual: Some(name.to_string()),
        remediation: vec![format!("Declare '{}' under handlers or fix the reference", name)],
    }
}

// --- Concrete Rules ---

pub struct OutputIdentifiersRule;

impl ValidationRule for OutputIdentifiersRule {
    fn name(&self) -> &'static str { "output_identifiers" }

    fn validate(&self, spec: &Spec) -> Vec<ValidationViolation> {
        [
            ("package", &spec.package),
            ("messenger", &spec.messenger),
            ("interfaces", &spec.interfaces),
            ("context", &spec.context),
            ("error", &spec.error),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| violation(self.name(), format!("{} is required", field)))
        .collect()
    }
}

pub struct HandlersPresentRule;

impl ValidationRule for HandlersPresentRule {
    fn name(&self) -> &'static str { "handlers_present" }

    fn validate(&self, spec: &Spec) -> Vec<ValidationViolation> {
        if spec.handlers.is_empty() {
            vec![violation(self.name(), "at least one handler is required".to_string())]
        } else {
            vec![]
        }
    }
}

pub struct RoutesPresentRule;

impl ValidationRule for RoutesPresentRule {
    fn name(&self) -> &'static str { "routes_present" }

    fn validate(&self, spec: &Spec) -> Vec<ValidationViolation> {
        if spec.routes.is_empty() {
            vec![violation(self.name(), "at least one route is required".to_string())]
        } else {
            vec![]
        }
    }
}

pub struct HandlerFieldsRule;

impl ValidationRule for HandlerFieldsRule {
    fn name(&self) -> &'static str { "handler_fields" }

    fn validate(&self, spec: &Spec) -> Vec<ValidationViolation> {
        let mut violations = vec![];
        for (i, h) in spec.handlers.iter().enumerate() {
            if h.name.trim().is_empty() {
                violations.push(violation(self.name(), format!("handler {}: name is required", i)));
            }
            if h.implementation_type.trim().is_empty() {
                violations.push(violation(self.name(), format!("handler {}: type is required", i)));
            }
        }
        violations
    }
}

pub struct UniqueHandlerNamesRule;

impl ValidationRule for UniqueHandlerNamesRule {
    fn name(&self) -> &'static str { "unique_handler_names" }

    fn validate(&self, spec: &Spec) -> Vec<ValidationViolation> {
        let mut seen = HashSet::new();
        spec.handlers
            .iter()
            .enumerate()
            .filter(|&(_, h)| !seen.insert(h.name.as_str()))
            .map(|(i, h)| ValidationViolation {
                rule: self.name().to_string(),
                message: format!("handler {}: duplicate handler name '{}'", i, h.name),
                expected: Some("unique handler names".to_string()),
                actual: Some(h.name.clone()),
                remediation: vec!["Rename or remove the duplicate declaration".to_string()],
            })
            .collect()
    }
}

pub struct RouteSourcesRule;

impl ValidationRule for RouteSourcesRule {
    fn name(&self) -> &'static str { "route_sources" }

    fn validate(&self, spec: &Spec) -> Vec<ValidationViolation> {
        let mut violations = vec![];
        for (i, r) in spec.routes.iter().enumerate() {
            if r.source.trim().is_empty() {
                violations.push(violation(self.name(), format!("route {}: source is required", i)));
            } else if spec.handler(&r.source).is_none() {
                violations.push(unknown_handler(
                    self.name(),
                    format!("route {}: source", i),
                    &r.source,
                    spec,
                ));
            }
        }
        violations
    }
}

pub struct RouteMessagesRule;

impl ValidationRule for RouteMessagesRule {
    fn name(&self) -> &'static str { "route_messages" }

    fn validate(&self, spec: &Spec) -> Vec<ValidationViolation> {
        let mut violations = vec![];
        for (i, r) in spec.routes.iter().enumerate() {
            if r.messages.is_empty() {
                violations.push(violation(
                    self.name(),
                    format!("route {}: at least one message is required for source {}", i, r.source),
                ));
            }
            for (j, m) in r.messages.iter().enumerate() {
                if m.message_type.trim().is_empty() {
                    violations.push(violation(
                        self.name(),
                        format!("route {}, message {}: message type is required", i, j),
                    ));
                }
            }
        }
        violations
    }
}

pub struct ReceiversPresentRule;

impl ValidationRule for ReceiversPresentRule {
    fn name(&self) -> &'static str { "receivers_present" }

    fn validate(&self, spec: &Spec) -> Vec<ValidationViolation> {
        let mut violations = vec![];
        for (i, r) in spec.routes.iter().enumerate() {
            for (j, m) in r.messages.iter().enumerate() {
                if m.receivers.is_empty() {
                    violations.push(violation(
                        self.name(),
                        format!("route {}, message {}: at least one receiver is required", i, j),
                    ));
                }
            }
        }
        violations
    }
}

pub struct ReceiversResolveRule;

impl ValidationRule for ReceiversResolveRule {
    fn name(&self) -> &'static str { "receivers_resolve" }

    fn validate(&self, spec: &Spec) -> Vec<ValidationViolation> {
        let mut violations = vec![];
        for (i, r) in spec.routes.iter().enumerate() {
            for (j, m) in r.messages.iter().enumerate() {
                for (k, receiver) in m.receivers.iter().enumerate() {
                    if spec.handler(receiver).is_none() {
                        violations.push(unknown_handler(
                            self.name(),
                            format!("route {}, message {}, receiver {}", i, j, k),
                            receiver,
                            spec,
                        ));
                    }
                }
            }
        }
        violations
    }
}

pub struct GeneratorVersionRule;

impl ValidationRule for GeneratorVersionRule {
    fn name(&self) -> &'static str { "generator_version" }

    fn validate(&self, spec: &Spec) -> Vec<ValidationViolation> {
        let Some(required) = &spec.min_generator_version else {
            return vec![];
        };
        let current = match semver::Version::parse(GENERATOR_VERSION) {
            Ok(v) => v,
            Err(e) => return vec![violation(self.name(), format!("invalid generator version: {}", e))],
        };
        match semver::Version::parse(required) {
            Ok(min) if current < min => vec![ValidationViolation {
                rule: self.name().to_string(),
                message: format!("spec requires generator >= {}, current is {}", min, current),
                expected: Some(format!(">= {}", min)),
                actual: Some(current.to_string()),
                remediation: vec!["Upgrade the generator".to_string()],
            }],
            Ok(_) => vec![],
            Err(e) => vec![violation(
                self.name(),
                format!("min_generator_version '{}' is not a semantic version: {}", required, e),
            )],
        }
    }
}

/// Validator runs rules in order and fails on the first rule with violations
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(OutputIdentifiersRule),
                Box::new(HandlersPresentRule),
                Box::new(RoutesPresentRule),
                Box::new(HandlerFieldsRule),
                Box::new(UniqueHandlerNamesRule),
                Box::new(RouteSourcesRule),
                Box::new(RouteMessagesRule),
                Box::new(ReceiversPresentRule),
                Box::new(ReceiversResolveRule),
                Box::new(GeneratorVersionRule),
            ],
        }
    }

    pub fn validate(&self, spec: &Spec) -> Result<(), ValidationError> {
        for rule in &self.rules {
            let violations = rule.validate(spec);
            if !violations.is_empty() {
                return Err(ValidationError {
                    rule: rule.name().to_string(),
                    violations,
                });
            }
        }
        Ok(())
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
