use std::collections::BTreeSet;

use folio_common::protocol::envelope::codes;
use folio_common::protocol::rpc_methods::{minimum_role, IMPLEMENTED_METHODS, RPC_PATH_PREFIX};
use folio_common::roles::WorkspaceRole;

fn load_contract() -> serde_json::Value {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../contracts/rpc-methods.json");
    let content = std::fs::read_to_string(path).expect("contract file should be readable");
    serde_json::from_str(&content).expect("contract file should be valid JSON")
}

fn contract_methods(contract: &serde_json::Value) -> &Vec<serde_json::Value> {
    contract["methods"].as_array().expect("methods should be an array")
}

#[test]
fn implemented_methods_match_contract() {
    let contract = load_contract();
    let expected: BTreeSet<&str> = contract_methods(&contract)
        .iter()
        .map(|m| m["name"].as_str().expect("method name should be a string"))
        .collect();

    let actual: BTreeSet<&str> = IMPLEMENTED_METHODS.iter().copied().collect();
    assert_eq!(actual, expected, "IMPLEMENTED_METHODS diverged from contract");
}

#[test]
fn minimum_roles_match_contract() {
    let contract = load_contract();
    for method in contract_methods(&contract) {
        let name = method["name"].as_str().expect("method name should be a string");
        let role = method["minimum_role"].as_str().expect("minimum_role should be a string");
        let expected = WorkspaceRole::parse(role).expect("contract role should be known");
        assert_eq!(minimum_role(name), Some(expected), "minimum role diverged for {name}");
    }
}

#[test]
fn every_method_requires_a_workspace_token() {
    let contract = load_contract();
    for method in contract_methods(&contract) {
        let fields: Vec<&str> = method["required_fields"]
            .as_array()
            .expect("required_fields should be an array")
            .iter()
            .map(|v| v.as_str().expect("field should be a string"))
            .collect();
        assert!(fields.contains(&"workspaceToken"), "{} must require workspaceToken", method["name"]);
    }
}

#[test]
fn path_prefix_and_error_codes_match_contract() {
    let contract = load_contract();
    assert_eq!(contract["path_prefix"], RPC_PATH_PREFIX);

    let expected: BTreeSet<&str> = contract["error_codes"]
        .as_array()
        .expect("error_codes should be an array")
        .iter()
        .map(|v| v.as_str().expect("code should be a string"))
        .collect();
    let actual: BTreeSet<&str> = [
        codes::INVALID_INPUT,
        codes::UNAUTHENTICATED,
        codes::WORKSPACE_UNAUTHORIZED,
        codes::NOT_FOUND,
        codes::UPDATE_FAILED,
        codes::INTERNAL_ERROR,
    ]
    .into_iter()
    .collect();
    assert_eq!(actual, expected, "error code registry diverged from contract");
}
