use std::collections::BTreeSet;

const RPC_MOD_SOURCE: &str = include_str!("../src/rpc/mod.rs");
const TEXTS_SOURCE: &str = include_str!("../src/rpc/texts.rs");
const COMMENTS_SOURCE: &str = include_str!("../src/rpc/comments.rs");
const APP_SOURCE: &str = include_str!("../src/app.rs");
const METHOD_REGISTRY: &str = include_str!("../../../contracts/rpc-methods.json");

fn registry() -> serde_json::Value {
    serde_json::from_str(METHOD_REGISTRY).expect("method registry should be valid json")
}

fn handler_for(method: &str) -> (&'static str, String) {
    let snake: String = method
        .chars()
        .flat_map(|c| {
            if c.is_ascii_uppercase() {
                vec!['_', c.to_ascii_lowercase()]
            } else {
                vec![c]
            }
        })
        .collect();
    let source = if method.contains("Comment") { COMMENTS_SOURCE } else { TEXTS_SOURCE };
    (source, snake)
}

fn const_name(method: &str) -> String {
    let (_, snake) = handler_for(method);
    snake.to_ascii_uppercase()
}

#[test]
fn every_registered_method_is_routed_to_its_handler() {
    let mut missing = BTreeSet::new();
    for entry in registry()["methods"].as_array().expect("methods array") {
        let method = entry["name"].as_str().expect("method name");
        let (_, handler) = handler_for(method);
        let module = if method.contains("Comment") { "comments" } else { "texts" };
        let binding = format!(
            "route(&rpc_path(rpc_methods::{}), post({module}::{handler}))",
            const_name(method)
        );
        if !RPC_MOD_SOURCE.contains(&binding) {
            missing.insert(binding);
        }
    }

    assert!(missing.is_empty(), "missing route bindings: {missing:?}");
}

#[test]
fn every_handler_authorizes_with_its_own_method() {
    for entry in registry()["methods"].as_array().expect("methods array") {
        let method = entry["name"].as_str().expect("method name");
        let (source, handler) = handler_for(method);

        assert!(
            source.contains(&format!("async fn {handler}(")),
            "handler `{handler}` must exist"
        );
        assert!(
            source.contains(&format!("RpcCall::authorize(&state, {}, caller", const_name(method))),
            "handler `{handler}` must authorize against `{method}`"
        );
    }
}

#[test]
fn every_handler_logs_its_action() {
    for entry in registry()["methods"].as_array().expect("methods array") {
        let method = entry["name"].as_str().expect("method name");
        let (source, handler) = handler_for(method);
        assert!(
            source.contains(&format!("action = \"{handler}\"")),
            "handler `{handler}` must log a structured success event"
        );
    }
}

#[test]
fn caller_identity_guards_every_procedure() {
    assert!(RPC_MOD_SOURCE.contains("from_fn_with_state(identity, require_caller)"));
    assert!(RPC_MOD_SOURCE.contains("post(unknown_method)"));
}

#[test]
fn probes_and_middleware_are_wired() {
    for needle in [
        "route(\"/healthz\", get(healthz))",
        "route(\"/readyz\", get(readyz))",
        "DefaultBodyLimit::max(MAX_BODY_BYTES)",
        "from_fn(panic_handler)",
        "from_fn(request_context_middleware)",
        "cors_layer(cors_origins)",
    ] {
        assert!(APP_SOURCE.contains(needle), "app router must contain `{needle}`");
    }
}

#[test]
fn handlers_do_not_unwrap() {
    for (name, source) in [("texts", TEXTS_SOURCE), ("comments", COMMENTS_SOURCE)] {
        let production = source.split("#[cfg(test)]").next().unwrap_or_default();
        assert!(!production.contains(".unwrap()"), "{name} handlers must propagate errors");
        assert!(!production.contains(".expect("), "{name} handlers must propagate errors");
    }
}
