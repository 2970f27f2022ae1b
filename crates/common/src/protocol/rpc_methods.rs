// Remote procedure names and the minimum workspace role each one requires.

use crate::roles::WorkspaceRole;

// ── Texts ──────────────────────────────────────────────────────────
pub const CREATE_TEXT: &str = "createText";
pub const GET_TEXTS: &str = "getTexts";
pub const COUNT_TEXTS: &str = "countTexts";
pub const UPDATE_TEXT: &str = "updateText";
pub const DELETE_TEXT: &str = "deleteText";

// ── Comments ───────────────────────────────────────────────────────
pub const CREATE_COMMENT: &str = "createComment";
pub const GET_COMMENTS: &str = "getComments";
pub const UPDATE_COMMENT: &str = "updateComment";
pub const DELETE_COMMENT: &str = "deleteComment";

/// All procedures the server dispatches.
pub const IMPLEMENTED_METHODS: &[&str] = &[
    CREATE_TEXT,
    GET_TEXTS,
    COUNT_TEXTS,
    UPDATE_TEXT,
    DELETE_TEXT,
    CREATE_COMMENT,
    GET_COMMENTS,
    UPDATE_COMMENT,
    DELETE_COMMENT,
];

/// Path prefix under which every procedure is mounted.
pub const RPC_PATH_PREFIX: &str = "/v1/rpc";

/// Minimum role a caller must hold to invoke `method`.
///
/// Destructive procedures are admin-only; everything else needs an editor.
pub fn minimum_role(method: &str) -> Option<WorkspaceRole> {
    match method {
        DELETE_TEXT | DELETE_COMMENT => Some(WorkspaceRole::Admin),
        CREATE_TEXT | GET_TEXTS | COUNT_TEXTS | UPDATE_TEXT | CREATE_COMMENT | GET_COMMENTS
        | UPDATE_COMMENT => Some(WorkspaceRole::Editor),
        _ => None,
    }
}

pub fn rpc_path(method: &str) -> String {
    format!("{RPC_PATH_PREFIX}/{method}")
}
