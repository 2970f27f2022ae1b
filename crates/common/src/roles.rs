// Workspace roles and the role hierarchy.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role a user holds inside one workspace.
///
/// Roles form a total order by [`WorkspaceRole::priority`]: a lower number
/// carries more privilege.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceRole {
    Admin,
    Editor,
}

impl WorkspaceRole {
    pub const fn priority(self) -> u8 {
        match self {
            Self::Admin => 0,
            Self::Editor => 1,
        }
    }

    /// True when a caller holding `self` may run an operation gated at `required`.
    pub const fn allows(self, required: Self) -> bool {
        self.priority() <= required.priority()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "editor" => Some(Self::Editor),
            _ => None,
        }
    }
}

impl fmt::Display for WorkspaceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A credential proving a role inside one workspace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkspaceToken {
    pub role: WorkspaceRole,
    pub token: String,
}

/// Workspace id to credential, round-tripped on every successful call.
pub type WorkspaceTokenMap = BTreeMap<Uuid, WorkspaceToken>;

#[cfg(test)]
mod tests {
    use super::WorkspaceRole;

    #[test]
    fn admin_outranks_editor() {
        assert!(WorkspaceRole::Admin.allows(WorkspaceRole::Editor));
        assert!(WorkspaceRole::Admin.allows(WorkspaceRole::Admin));
        assert!(WorkspaceRole::Editor.allows(WorkspaceRole::Editor));
        assert!(!WorkspaceRole::Editor.allows(WorkspaceRole::Admin));
    }

    #[test]
    fn roles_roundtrip_through_strings() {
        for role in [WorkspaceRole::Admin, WorkspaceRole::Editor] {
            assert_eq!(WorkspaceRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(WorkspaceRole::parse("owner"), None);
    }
}
