//! Chain-Position Interface Emitter
//!
//! One `Sendable` trait per source, one `Receiver` trait per receiving handler,
//! and one single-method `Next` trait per intermediate `(handler, message)`.

use serde::Serialize;

use crate::model::{ChainModel, Forwarder, HandlerPlan, ReceivingMethod, Role, SendingMethod};
use crate::render::{use_block, RenderError, Renderer, INTERFACES_TEMPLATE};

pub const TOOL_NAME: &str = "interface-gen";

#[derive(Debug, Serialize)]
struct InterfacesView {
    tool: &'static str,
    fingerprint: String,
    package: String,
    imports_block: String,
    sendables: Vec<TraitView>,
    receivers: Vec<ReceiverView>,
}

#[derive(Debug, Serialize)]
struct TraitView {
    doc: String,
    trait_name: String,
    bounds: &'static str,
    methods: Vec<MethodView>,
}

#[derive(Debug, Serialize)]
struct ReceiverView {
    #[serde(flatten)]
    receiver: TraitView,
    forwarders: Vec<TraitView>,
}

#[derive(Debug, Serialize)]
struct MethodView {
    doc: String,
    signature: String,
}

pub fn sending_signature(model: &ChainModel, send: &SendingMethod) -> String {
    format!(
        "fn {}(&self, ctx: &{}, msg: &{}) -> Result<{}, {}>",
        send.method, model.context_type, send.message_type, send.response_type, model.error_type
    )
}

pub fn receiving_signature(model: &ChainModel, method: &ReceivingMethod) -> String {
    match (&method.role, &method.next_trait) {
        (Role::Intermediate, Some(next)) => format!(
            "fn {}(&self, ctx: &{}, msg: &{}, next: &mut dyn {}) -> Result<(), {}>",
            method.method, model.context_type, method.message_type, next, model.error_type
        ),
        _ => format!(
            "fn {}(&self, ctx: &{}, msg: &{}) -> Result<{}, {}>",
            method.method, model.context_type, method.message_type, method.response_type, model.error_type
        ),
    }
}

pub fn forwarding_signature(model: &ChainModel, forwarder: &Forwarder) -> String {
    format!(
        "fn {}(&mut self, ctx: &{}, msg: &{}) -> Result<&{}, &{}>",
        forwarder.method, model.context_type, forwarder.message_type, forwarder.response_type, model.error_type
    )
}

fn sendable_view(model: &ChainModel, handler: &HandlerPlan) -> TraitView {
    TraitView {
        doc: format!("Messages originated by `{}`. The router implements this trait.", handler.name),
        trait_name: handler.sendable_trait(),
        bounds: ": Send + Sync",
        methods: handler
            .sends
            .iter()
            .map(|send| MethodView {
                doc: format!("Starts the `{}` chain.", send.base),
                signature: sending_signature(model, send),
            })
            .collect(),
    }
}

fn receiver_view(model: &ChainModel, handler: &HandlerPlan) -> ReceiverView {
    let methods = handler
        .receives
        .iter()
        .map(|method| {
            let label = &method.base;
            let doc = match method.role {
                Role::Terminal => format!("Terminal receiver of `{}`: produces the response.", label),
                Role::Intermediate => {
                    format!("Intermediate receiver of `{}`: `next` resumes the chain.", label)
                }
            };
            MethodView {
                doc,
                signature: receiving_signature(model, method),
            }
        })
        .collect();

    let forwarders = handler
        .forwarders
        .iter()
        .map(|forwarder| TraitView {
            doc: format!(
                "Resumes the `{}` chain after `{}`.",
                forwarder.base,
                handler.name
            ),
            trait_name: forwarder.trait_name.clone(),
            bounds: "",
            methods: vec![MethodView {
                doc: "Runs the rest of the chain at most once and returns its result.".to_string(),
                signature: forwarding_signature(model, forwarder),
            }],
        })
        .collect();

    ReceiverView {
        receiver: TraitView {
            doc: format!("Messages received by `{}`.", handler.name),
            trait_name: handler.receiver_trait(),
            bounds: ": Send + Sync",
            methods,
        },
        forwarders,
    }
}

/// Render the interfaces file for `model`.
pub fn emit(model: &ChainModel, fingerprint: &str, renderer: &Renderer) -> Result<String, RenderError> {
    let view = InterfacesView {
        tool: TOOL_NAME,
        fingerprint: fingerprint.to_string(),
        package: model.package.clone(),
        imports_block: use_block(&model.imports),
        sendables: model.sources().map(|h| sendable_view(model, h)).collect(),
        receivers: model.receivers().map(|h| receiver_view(model, h)).collect(),
    };
    renderer.render(INTERFACES_TEMPLATE, &view)
}
