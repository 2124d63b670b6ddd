//! Contract Invariant Tests
//!
//! These tests verify the non-negotiable guarantees.

use chaingen_core::{Emitter, GenerateError, Generator, ModelError, Spec};
use quote::ToTokens;
use test_case::test_case;

const THREE_RECEIVERS: &str = r#"
package: interfaces
imports: ["crate::pb", "crate::rt::{Context, Error}"]
handlers:
  - { name: api, type: api::Api }
  - { name: auth, type: auth::Auth }
  - { name: audit, type: audit::Audit }
  - { name: repo, type: repo::Repo }
routes:
  - source: api
    messages:
      - message: "&pb::CreateAccountRequestProto"
        response: pb::AccountProto
        receivers: [auth, audit, repo]
"#;

fn generator(doc: &str) -> Result<Generator, GenerateError> {
    Generator::from_spec(Spec::from_yaml_str(doc).unwrap())
}

fn parsed(doc: &str, emitter: Emitter) -> syn::File {
    let code = generator(doc).unwrap().generate(emitter).unwrap();
    syn::parse_file(&code).unwrap()
}

fn find_trait<'a>(file: &'a syn::File, name: &str) -> &'a syn::ItemTrait {
    file.items
        .iter()
        .find_map(|item| match item {
            syn::Item::Trait(t) if t.ident == name => Some(t),
            _ => None,
        })
        .unwrap_or_else(|| panic!("trait {name} not generated"))
}

fn trait_fns(item: &syn::ItemTrait) -> Vec<&syn::Signature> {
    item.items
        .iter()
        .filter_map(|i| match i {
            syn::TraitItem::Fn(f) => Some(&f.sig),
            _ => None,
        })
        .collect()
}

fn tokens<T: ToTokens>(value: &T) -> String {
    value.to_token_stream().to_string()
}

fn return_type(src: &str) -> String {
    tokens(&syn::parse_str::<syn::ReturnType>(src).unwrap())
}

#[test]
fn invariant_generation_is_deterministic() {
    for emitter in [Emitter::Interfaces, Emitter::Messenger] {
        let first = generator(THREE_RECEIVERS).unwrap().generate(emitter).unwrap();
        let second = generator(THREE_RECEIVERS).unwrap().generate(emitter).unwrap();
        assert_eq!(first, second, "{emitter:?} output differs between runs");
    }
}

#[test]
fn invariant_unknown_receiver_rejected_with_available_handlers() {
    let doc = r#"
package: interfaces
handlers:
  - { name: A, type: a::A }
  - { name: B, type: b::B }
routes:
  - source: A
    messages:
      - message: pb::X
        receivers: [B, C]
"#;
    let err = generator(doc).err().unwrap();
    assert!(matches!(err, GenerateError::Validation(_)));
    let message = err.to_string();
    assert!(message.contains("route 0, message 0, receiver 1: unknown handler 'C'"), "{message}");
    assert!(message.contains("(available handlers: A, B)"), "{message}");
}

#[test]
fn invariant_unknown_source_rejected() {
    let doc = THREE_RECEIVERS.replace("source: api", "source: gateway");
    let err = generator(&doc).err().unwrap();
    assert!(err.to_string().contains("unknown handler 'gateway'"));
}

#[test]
fn invariant_roles_follow_chain_position() {
    let file = parsed(THREE_RECEIVERS, Emitter::Interfaces);

    for intermediate in ["AuthReceiver", "AuditReceiver"] {
        let sigs = trait_fns(find_trait(&file, intermediate));
        assert_eq!(sigs.len(), 1);
        assert_eq!(sigs[0].inputs.len(), 4, "{intermediate} must take a next capability");
        assert_eq!(tokens(&sigs[0].output), return_type("-> Result<(), Error>"));
    }

    let terminal = trait_fns(find_trait(&file, "RepoReceiver"));
    assert_eq!(terminal.len(), 1);
    assert_eq!(terminal[0].inputs.len(), 3);
    assert_eq!(
        tokens(&terminal[0].output),
        return_type("-> Result<pb::AccountProto, Error>")
    );
}

#[test]
fn invariant_next_capability_only_resumes_its_chain() {
    let file = parsed(THREE_RECEIVERS, Emitter::Interfaces);
    let next = trait_fns(find_trait(&file, "AuthCreateAccountRequestNext"));
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].ident, "send_create_account_request_from_auth");
    assert_eq!(
        tokens(&next[0].output),
        return_type("-> Result<&pb::AccountProto, &Error>")
    );
}

#[test]
fn invariant_router_fields_are_receivers_in_declaration_order() {
    let file = parsed(THREE_RECEIVERS, Emitter::Messenger);
    let router = file
        .items
        .iter()
        .find_map(|item| match item {
            syn::Item::Struct(s) if s.ident == "Messenger" => Some(s),
            _ => None,
        })
        .unwrap();

    let fields: Vec<String> = router
        .fields
        .iter()
        .map(|f| f.ident.as_ref().unwrap().to_string())
        .collect();
    assert_eq!(fields, vec!["auth", "audit", "repo"]);
}

#[test]
fn invariant_every_intermediate_hop_propagates_errors() {
    let code = generator(THREE_RECEIVERS)
        .unwrap()
        .generate(Emitter::Messenger)
        .unwrap();
    assert_eq!(code.matches("(ctx, msg, &mut next)?;").count(), 2);
    assert!(code.contains("self.repo.handle_create_account_request(ctx, msg)\n"));
}

#[test]
fn invariant_interfaces_and_router_agree_on_names() {
    let interfaces = parsed(THREE_RECEIVERS, Emitter::Interfaces);
    let router = generator(THREE_RECEIVERS)
        .unwrap()
        .generate(Emitter::Messenger)
        .unwrap();

    for item in &interfaces.items {
        if let syn::Item::Trait(t) = item {
            assert!(
                router.contains(&t.ident.to_string()),
                "router never references {}",
                t.ident
            );
        }
    }
}

#[test_case("other::CreateAccountRequest" ; "message base collision")]
#[test_case("pb::CreateAccountRequestProto" ; "duplicate route")]
fn invariant_ambiguous_messages_fail(second_message: &str) {
    let doc = format!(
        "{}      - message: {}\n        receivers: [repo]\n",
        THREE_RECEIVERS, second_message
    );
    let err = generator(&doc).err().unwrap();
    assert!(
        matches!(
            err,
            GenerateError::Model(ModelError::NameCollision { .. } | ModelError::DuplicateRoute { .. })
        ),
        "{err}"
    );
}

#[test]
fn invariant_handler_identifier_collision_fails() {
    let doc = THREE_RECEIVERS.replace(
        "  - { name: repo, type: repo::Repo }",
        "  - { name: repo, type: repo::Repo }\n  - { name: Repo, type: repo::Other }",
    );
    let err = generator(&doc).err().unwrap();
    assert!(matches!(err, GenerateError::Model(ModelError::NameCollision { .. })), "{err}");
}

#[test]
fn invariant_fingerprint_tracks_document() {
    let original = generator(THREE_RECEIVERS).unwrap().generate(Emitter::Messenger).unwrap();
    let changed_doc = THREE_RECEIVERS.replace("repo::Repo", "repo::Postgres");
    let changed = generator(&changed_doc).unwrap().generate(Emitter::Messenger).unwrap();

    let header = |code: &str| code.lines().nth(1).unwrap().to_string();
    assert!(header(&original).starts_with("// Fingerprint: sha256:"));
    assert_ne!(header(&original), header(&changed));
    assert!(changed.contains("repo: repo::Postgres"));
}

const JOINED_NAMES: &str = r#"
package: interfaces
handlers:
  - { name: c, type: c::C }
  - { name: b_from_c, type: b::B }
  - { name: repo, type: repo::Repo }
routes:
  - source: c
    messages:
      - { message: pb::AFromB, receivers: [repo] }
  - source: b_from_c
    messages:
      - { message: pb::A, receivers: [repo] }
"#;

const CASE_COLLAPSED: &str = r#"
package: interfaces
handlers:
  - { name: api, type: api::Api }
  - { name: repo, type: repo::Repo }
routes:
  - source: api
    messages:
      - { message: pb::HTTPRequest, receivers: [repo] }
      - { message: other::HttpRequest, receivers: [repo] }
"#;

#[test_case(JOINED_NAMES ; "names joined with from")]
#[test_case(CASE_COLLAPSED ; "names differing only in case")]
fn invariant_emitted_identifiers_never_collide(doc: &str) {
    let err = generator(doc).err().unwrap();
    assert!(
        matches!(err, GenerateError::Model(ModelError::NameCollision { .. })),
        "{err}"
    );
}

#[test]
fn invariant_distinct_chains_get_distinct_router_items() {
    let doc = JOINED_NAMES.replace("pb::AFromB", "pb::Audit");
    let file = parsed(&doc, Emitter::Messenger);

    let mut methods: Vec<String> = file
        .items
        .iter()
        .filter_map(|item| match item {
            syn::Item::Impl(i) if i.trait_.is_none() => Some(i),
            _ => None,
        })
        .flat_map(|i| i.items.iter())
        .filter_map(|item| match item {
            syn::ImplItem::Fn(f) => Some(f.sig.ident.to_string()),
            _ => None,
        })
        .collect();
    let total = methods.len();
    methods.sort();
    methods.dedup();
    assert_eq!(methods.len(), total, "duplicate router methods: {methods:?}");
}
