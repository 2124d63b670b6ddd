//! Chain Model - Roles, Receiving Methods, Forwarders, Sendables
//!
//! Built once from a validated spec. Both emitters read from it so the
//! interfaces and the router always agree on every name and signature.

use serde::Serialize;
use thiserror::Error;

use crate::naming::{base_name, canonical_type, pascal, snake, HandlerIdents, NameTable};
use crate::spec::Spec;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid {what} '{value}': does not map to a Rust identifier")]
    InvalidIdentifier { what: String, value: String },

    #[error("{kind} name '{name}' is derived from both '{first}' and '{second}'")]
    NameCollision {
        kind: String,
        name: String,
        first: String,
        second: String,
    },

    #[error("handler '{handler}' would need two different signatures for method '{method}'")]
    ConflictingSignatures { handler: String, method: String },

    #[error("source '{source_name}' declares message '{message}' more than once")]
    DuplicateRoute { source_name: String, message: String },

    #[error("unknown handler '{0}'")]
    UnknownHandler(String),
}

/// Position of a receiver inside a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Any receiver but the last; reports success or failure only.
    Intermediate,
    /// The last receiver; produces the chain's response.
    Terminal,
}

impl Role {
    pub fn at(index: usize, len: usize) -> Self {
        if index + 1 == len {
            Role::Terminal
        } else {
            Role::Intermediate
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Decoration-free type token, used as `&{type_path}` in signatures.
    pub type_path: String,
    pub base: String,
    pub snake: String,
}

/// One `(route, message)` entry: a single chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub source: usize,
    pub message: Message,
    pub response_type: String,
    /// Indices into `ChainModel::handlers`.
    pub receivers: Vec<usize>,
}

impl Chain {
    pub fn role_at(&self, index: usize) -> Role {
        Role::at(index, self.receivers.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivingMethod {
    pub method: String,
    pub message_type: String,
    pub base: String,
    pub response_type: String,
    pub role: Role,
    /// Forwarding trait passed as `next`; set for intermediate methods only.
    pub next_trait: Option<String>,
}

/// Narrow capability handed to an intermediate receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forwarder {
    pub trait_name: String,
    pub method: String,
    pub message_type: String,
    pub base: String,
    pub response_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendingMethod {
    pub method: String,
    pub message_type: String,
    pub base: String,
    pub response_type: String,
    pub chain: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerPlan {
    pub name: String,
    pub implementation_type: String,
    pub idents: HandlerIdents,
    pub receives: Vec<ReceivingMethod>,
    pub forwarders: Vec<Forwarder>,
    pub sends: Vec<SendingMethod>,
}

impl HandlerPlan {
    pub fn receiver_trait(&self) -> String {
        format!("{}Receiver", self.idents.pascal)
    }

    pub fn sendable_trait(&self) -> String {
        format!("{}Sendable", self.idents.pascal)
    }

    pub fn is_receiver(&self) -> bool {
        !self.receives.is_empty()
    }

    pub fn is_source(&self) -> bool {
        !self.sends.is_empty()
    }

    pub fn receiving_method(&self, method: &str) -> Option<&ReceivingMethod> {
        self.receives.iter().find(|m| m.method == method)
    }

    fn add_receiving(&mut self, method: ReceivingMethod) -> Result<(), ModelError> {
        match self.receives.iter().find(|m| m.method == method.method) {
            Some(existing) if *existing == method => Ok(()),
            Some(_) => Err(ModelError::ConflictingSignatures {
                handler: self.name.clone(),
                method: method.method,
            }),
            None => {
                self.receives.push(method);
                Ok(())
            }
        }
    }

    fn add_forwarder(&mut self, forwarder: Forwarder) -> Result<(), ModelError> {
        match self.forwarders.iter().find(|f| f.trait_name == forwarder.trait_name) {
            Some(existing) if *existing == forwarder => Ok(()),
            Some(_) => Err(ModelError::ConflictingSignatures {
                handler: self.name.clone(),
                method: forwarder.method,
            }),
            None => {
                self.forwarders.push(forwarder);
                Ok(())
            }
        }
    }
}

pub fn handle_method(message: &Message) -> String {
    format!("handle_{}", message.snake)
}

pub fn send_method(message: &Message, from: &HandlerIdents) -> String {
    format!("send_{}_from_{}", message.snake, from.snake)
}

pub fn forwarder_trait(message: &Message, from: &HandlerIdents) -> String {
    format!("{}{}Next", from.pascal, pascal(&message.base))
}

/// Router method that runs a chain from receiver `index` onwards.
pub fn hop_fn(message: &Message, source: &HandlerIdents, index: usize) -> String {
    format!("{}_from_{}_at_{}", message.snake, source.snake, index)
}

/// Continuation type that resumes a chain at receiver `index`.
pub fn continuation_struct(message: &Message, source: &HandlerIdents, index: usize) -> String {
    format!("{}From{}At{}", pascal(&message.base), source.pascal, index)
}

/// Every identifier the two generated files define, checked for clashes.
///
/// Names are joined with `_from_`, so distinct inputs can still meet here
/// (`AFromB` sent by `c` and `A` sent by `b_from_c`).
fn claim_emitted_names(messenger: &str, handlers: &[HandlerPlan], chains: &[Chain]) -> Result<(), ModelError> {
    let mut types = NameTable::new();
    types.claim("type", messenger, "router")?;
    for plan in handlers {
        if plan.is_receiver() {
            types.claim("type", &plan.receiver_trait(), &plan.name)?;
        }
        if plan.is_source() {
            types.claim("type", &plan.sendable_trait(), &plan.name)?;
        }
        for forwarder in &plan.forwarders {
            let owner = format!("{} resuming {}", plan.name, forwarder.message_type);
            types.claim("type", &forwarder.trait_name, &owner)?;
        }
    }

    let mut methods = NameTable::new();
    methods.claim("router method", "new", "router constructor")?;
    methods.claim("router method", "from_receivers", "router constructor")?;
    for chain in chains {
        let source = &handlers[chain.source];
        let owner = format!("{} from {}", chain.message.type_path, source.name);
        methods.claim("router method", &send_method(&chain.message, &source.idents), &owner)?;
        for index in 0..chain.receivers.len() {
            methods.claim("router method", &hop_fn(&chain.message, &source.idents, index), &owner)?;
            if index > 0 {
                types.claim("type", &continuation_struct(&chain.message, &source.idents, index), &owner)?;
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainModel {
    pub package: String,
    pub imports: Vec<String>,
    pub context_type: String,
    pub error_type: String,
    pub messenger: String,
    pub interfaces_path: String,
    pub handlers: Vec<HandlerPlan>,
    pub chains: Vec<Chain>,
}

impl ChainModel {
    /// Derive every generated name and signature from a validated spec.
    pub fn build(spec: &Spec) -> Result<Self, ModelError> {
        if !crate::naming::is_identifier(&spec.messenger) {
            return Err(ModelError::InvalidIdentifier {
                what: "messenger name".to_string(),
                value: spec.messenger.clone(),
            });
        }

        let mut handler_names = NameTable::new();
        let mut handlers = Vec::with_capacity(spec.handlers.len());
        for decl in &spec.handlers {
            let idents = HandlerIdents::derive(&decl.name)?;
            handler_names.claim("handler field", &idents.snake, &decl.name)?;
            handler_names.claim("handler trait", &idents.pascal, &decl.name)?;
            handlers.push(HandlerPlan {
                name: decl.name.clone(),
                implementation_type: decl.implementation_type.trim().to_string(),
                idents,
                receives: vec![],
                forwarders: vec![],
                sends: vec![],
            });
        }

        let index_of = |name: &str| {
            spec.handlers
                .iter()
                .position(|h| h.name == name)
                .ok_or_else(|| ModelError::UnknownHandler(name.to_string()))
        };

        let mut message_names = NameTable::new();
        let mut chains = vec![];
        for route in &spec.routes {
            let source = index_of(route.source.as_str())?;
            for decl in &route.messages {
                let type_path = canonical_type(&decl.message_type);
                let base = base_name(&decl.message_type, &spec.strip_suffixes)?;
                message_names.claim("message", &base, &type_path)?;
                message_names.claim("message method", &snake(&base), &type_path)?;
                message_names.claim("message type", &pascal(&base), &type_path)?;
                let receivers = decl
                    .receivers
                    .iter()
                    .map(|r| index_of(r.as_str()))
                    .collect::<Result<Vec<_>, _>>()?;
                chains.push(Chain {
                    source,
                    message: Message {
                        snake: snake(&base),
                        base,
                        type_path,
                    },
                    response_type: decl
                        .response_type
                        .as_deref()
                        .map(str::trim)
                        .filter(|r| !r.is_empty())
                        .unwrap_or("()")
                        .to_string(),
                    receivers,
                });
            }
        }

        for (chain_index, chain) in chains.iter().enumerate() {
            let source = &mut handlers[chain.source];
            let method = send_method(&chain.message, &source.idents);
            if source.sends.iter().any(|s| s.method == method) {
                return Err(ModelError::DuplicateRoute {
                    source_name: source.name.clone(),
                    message: chain.message.type_path.clone(),
                });
            }
            source.sends.push(SendingMethod {
                method,
                message_type: chain.message.type_path.clone(),
                base: chain.message.base.clone(),
                response_type: chain.response_type.clone(),
                chain: chain_index,
            });

            for (position, &receiver) in chain.receivers.iter().enumerate() {
                let plan = &mut handlers[receiver];
                let role = chain.role_at(position);
                let next_trait = match role {
                    Role::Terminal => None,
                    Role::Intermediate => {
                        let forwarder = Forwarder {
                            trait_name: forwarder_trait(&chain.message, &plan.idents),
                            method: send_method(&chain.message, &plan.idents),
                            message_type: chain.message.type_path.clone(),
                            base: chain.message.base.clone(),
                            response_type: chain.response_type.clone(),
                        };
                        let name = forwarder.trait_name.clone();
                        plan.add_forwarder(forwarder)?;
                        Some(name)
                    }
                };
                plan.add_receiving(ReceivingMethod {
                    method: handle_method(&chain.message),
                    message_type: chain.message.type_path.clone(),
                    base: chain.message.base.clone(),
                    response_type: chain.response_type.clone(),
                    role,
                    next_trait,
                })?;
            }
        }

        claim_emitted_names(&spec.messenger, &handlers, &chains)?;

        Ok(Self {
            package: spec.package.trim().to_string(),
            imports: spec.imports.iter().map(|i| i.trim().to_string()).collect(),
            context_type: spec.context.trim().to_string(),
            error_type: spec.error.trim().to_string(),
            messenger: spec.messenger.clone(),
            interfaces_path: spec.interfaces.trim().to_string(),
            handlers,
            chains,
        })
    }

    /// Handlers that become router fields, in declaration order.
    pub fn receivers(&self) -> impl Iterator<Item = &HandlerPlan> + '_ {
        self.handlers.iter().filter(|h| h.is_receiver())
    }

    pub fn sources(&self) -> impl Iterator<Item = &HandlerPlan> + '_ {
        self.handlers.iter().filter(|h| h.is_source())
    }
}
