//! Messenger (Router) Emitter
//!
//! The router holds one trait object per receiving handler and one private hop
//! function per `(chain, receiver index)`. A hop for an intermediate receiver
//! builds a continuation for the next index; a terminal hop returns the
//! handler's result unchanged.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::interfaces::{forwarding_signature, sending_signature};
use crate::model::{Chain, ChainModel, Role};
use crate::render::{use_block, RenderError, Renderer, MESSENGER_TEMPLATE};

pub const TOOL_NAME: &str = "messenger-gen";

#[derive(Debug, Serialize)]
struct MessengerView {
    tool: &'static str,
    fingerprint: String,
    package: String,
    imports_block: String,
    interfaces_use: String,
    name: String,
    fields: Vec<FieldView>,
    new_params: String,
    new_args: String,
    from_params: String,
    field_list: String,
    hops: Vec<HopView>,
    sendables: Vec<SendableImplView>,
    continuations: Vec<ContinuationView>,
}

#[derive(Debug, Serialize)]
struct FieldView {
    field: String,
    receiver_trait: String,
}

#[derive(Debug, Serialize)]
struct HopView {
    signature: String,
    intermediate: bool,
    field: String,
    handle_method: String,
    next_struct: String,
    next_fn: String,
}

#[derive(Debug, Serialize)]
struct SendableImplView {
    trait_name: String,
    messenger: String,
    methods: Vec<EntryView>,
}

#[derive(Debug, Serialize)]
struct EntryView {
    signature: String,
    entry: String,
}

#[derive(Debug, Serialize)]
struct ContinuationView {
    doc: String,
    struct_name: String,
    messenger: String,
    next_trait: String,
    response_type: String,
    error_type: String,
    signature: String,
    resume_fn: String,
}

/// Private method that runs `chain` from receiver `index` onwards.
pub fn hop_fn(model: &ChainModel, chain: &Chain, index: usize) -> String {
    crate::model::hop_fn(&chain.message, &model.handlers[chain.source].idents, index)
}

/// Continuation type that resumes `chain` at receiver `index`.
pub fn continuation_struct(model: &ChainModel, chain: &Chain, index: usize) -> String {
    crate::model::continuation_struct(&chain.message, &model.handlers[chain.source].idents, index)
}

fn hop_view(model: &ChainModel, chain: &Chain, index: usize) -> HopView {
    let receiver = &model.handlers[chain.receivers[index]];
    let intermediate = chain.role_at(index) == Role::Intermediate;
    let (next_struct, next_fn) = if intermediate {
        (
            continuation_struct(model, chain, index + 1),
            hop_fn(model, chain, index + 1),
        )
    } else {
        (String::new(), String::new())
    };
    HopView {
        signature: format!(
            "fn {}(&self, ctx: &{}, msg: &{}) -> Result<{}, {}>",
            hop_fn(model, chain, index),
            model.context_type,
            chain.message.type_path,
            chain.response_type,
            model.error_type
        ),
        intermediate,
        field: receiver.idents.snake.clone(),
        handle_method: crate::model::handle_method(&chain.message),
        next_struct,
        next_fn,
    }
}

fn continuation_view(model: &ChainModel, chain: &Chain, index: usize) -> Option<ContinuationView> {
    // Continuation `index` is handed to the receiver at `index - 1`.
    let forwarding_handler = &model.handlers[chain.receivers[index - 1]];
    let trait_name = crate::model::forwarder_trait(&chain.message, &forwarding_handler.idents);
    let forwarder = forwarding_handler
        .forwarders
        .iter()
        .find(|f| f.trait_name == trait_name)?;
    Some(ContinuationView {
        doc: format!(
            "Resumes `{}` from `{}` at receiver {}.",
            chain.message.base, model.handlers[chain.source].name, index
        ),
        struct_name: continuation_struct(model, chain, index),
        messenger: model.messenger.clone(),
        next_trait: forwarder.trait_name.clone(),
        response_type: chain.response_type.clone(),
        error_type: model.error_type.clone(),
        signature: forwarding_signature(model, forwarder),
        resume_fn: hop_fn(model, chain, index),
    })
}

fn interfaces_use(model: &ChainModel) -> String {
    let mut traits = BTreeSet::new();
    for handler in &model.handlers {
        if handler.is_receiver() {
            traits.insert(handler.receiver_trait());
        }
        if handler.is_source() {
            traits.insert(handler.sendable_trait());
        }
        for forwarder in &handler.forwarders {
            traits.insert(forwarder.trait_name.clone());
        }
    }
    format!(
        "{}::{{{}}}",
        model.interfaces_path,
        traits.into_iter().collect::<Vec<_>>().join(", ")
    )
}

/// Render the router file for `model`.
pub fn emit(model: &ChainModel, fingerprint: &str, renderer: &Renderer) -> Result<String, RenderError> {
    let receivers: Vec<_> = model.receivers().collect();

    let fields = receivers
        .iter()
        .map(|h| FieldView {
            field: h.idents.snake.clone(),
            receiver_trait: h.receiver_trait(),
        })
        .collect();
    let new_params = receivers
        .iter()
        .map(|h| format!("{}: {}", h.idents.snake, h.implementation_type))
        .collect::<Vec<_>>()
        .join(", ");
    let new_args = receivers
        .iter()
        .map(|h| format!("Arc::new({})", h.idents.snake))
        .collect::<Vec<_>>()
        .join(", ");
    let from_params = receivers
        .iter()
        .map(|h| format!("{}: Arc<dyn {}>", h.idents.snake, h.receiver_trait()))
        .collect::<Vec<_>>()
        .join(", ");
    let field_list = receivers
        .iter()
        .map(|h| h.idents.snake.clone())
        .collect::<Vec<_>>()
        .join(", ");

    let mut hops = vec![];
    let mut continuations = vec![];
    for chain in &model.chains {
        for index in 0..chain.receivers.len() {
            hops.push(hop_view(model, chain, index));
            if index > 0 {
                continuations.extend(continuation_view(model, chain, index));
            }
        }
    }

    let sendables = model
        .sources()
        .map(|h| SendableImplView {
            trait_name: h.sendable_trait(),
            messenger: model.messenger.clone(),
            methods: h
                .sends
                .iter()
                .map(|send| EntryView {
                    signature: sending_signature(model, send),
                    entry: hop_fn(model, &model.chains[send.chain], 0),
                })
                .collect(),
        })
        .collect();

    let view = MessengerView {
        tool: TOOL_NAME,
        fingerprint: fingerprint.to_string(),
        package: model.package.clone(),
        imports_block: use_block(&model.imports),
        interfaces_use: interfaces_use(model),
        name: model.messenger.clone(),
        fields,
        new_params,
        new_args,
        from_params,
        field_list,
        hops,
        sendables,
        continuations,
    };
    renderer.render(MESSENGER_TEMPLATE, &view)
}
