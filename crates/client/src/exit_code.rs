// Consistent exit codes for the folio CLI.
//
//   0  = success
//   1  = general error
//   2  = usage/argument error
//   4  = not found
//   11 = authentication or authorization error
//   13 = network error

use std::process;

use folio_client::ClientError;
use folio_common::protocol::envelope::codes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    Error = 1,
    Usage = 2,
    NotFound = 4,
    Auth = 11,
    Network = 13,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Map an anyhow error to an exit code by inspecting the error chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(client_err) = cause.downcast_ref::<ClientError>() {
                return Self::from_client_error(client_err);
            }
        }
        Self::Error
    }

    pub fn from_client_error(err: &ClientError) -> Self {
        match err {
            ClientError::Rpc { code, .. } => Self::from_rpc_code(code),
            ClientError::MissingWorkspaceToken(_) => Self::Auth,
            ClientError::InvalidUrl(_) => Self::Usage,
            ClientError::Transport(_) => Self::Network,
            ClientError::InvalidResponse(_) => Self::Error,
        }
    }

    /// Map a server error code to an exit code.
    pub fn from_rpc_code(code: &str) -> Self {
        match code {
            codes::UNAUTHENTICATED | codes::WORKSPACE_UNAUTHORIZED => Self::Auth,
            codes::INVALID_INPUT => Self::Usage,
            codes::NOT_FOUND => Self::NotFound,
            _ => Self::Error,
        }
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code.code() as u8)
    }
}
