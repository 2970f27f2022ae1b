// Output format auto-detection for the CLI.
//
// TTY → human-readable text. Piped/redirected → structured JSON.
// `--json` forces JSON output regardless of terminal.

use std::io::{self, IsTerminal, Write};

use folio_client::ClientError;
use folio_common::protocol::envelope::codes;
use serde::Serialize;

const ANSI_RED: &str = "\x1b[31m";
const ANSI_RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    /// JSON if `--json` was passed or stdout is not a TTY.
    pub fn detect(json_flag: bool) -> Self {
        if json_flag {
            return Self::Json;
        }
        Self::detect_from_terminal(io::stdout().is_terminal())
    }

    pub fn detect_from_terminal(is_tty: bool) -> Self {
        if is_tty {
            Self::Human
        } else {
            Self::Json
        }
    }
}

pub fn print_output<T, F>(format: OutputFormat, value: &T, human_fn: F) -> io::Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    write_output(&mut io::stdout().lock(), format, value, human_fn)
}

pub fn write_output<W, T, F>(
    writer: &mut W,
    format: OutputFormat,
    value: &T,
    human_fn: F,
) -> io::Result<()>
where
    W: Write,
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Human => writeln!(writer, "{}", human_fn(value)),
        OutputFormat::Json => {
            serde_json::to_writer(&mut *writer, value).map_err(io::Error::other)?;
            writeln!(writer)
        }
    }
}

pub fn print_error(format: OutputFormat, code: &str, message: &str) {
    let mut err = io::stderr().lock();
    match format {
        OutputFormat::Human => {
            let line = render_human_error(message, io::stderr().is_terminal());
            let _ = writeln!(err, "{line}");
        }
        OutputFormat::Json => {
            let obj = serde_json::json!({ "error": { "code": code, "message": message } });
            let _ = serde_json::to_writer(&mut err, &obj);
            let _ = writeln!(err);
        }
    }
}

/// Print a command failure with a hint for the errors a user can fix.
pub fn print_anyhow_error(format: OutputFormat, error: &anyhow::Error) {
    let (code, message) = actionable_error(error);
    print_error(format, code, &message);
}

fn actionable_error(error: &anyhow::Error) -> (&'static str, String) {
    let message = format!("{error:#}");

    if let Some(client_error) = error.chain().find_map(|cause| cause.downcast_ref::<ClientError>()) {
        match client_error {
            ClientError::MissingWorkspaceToken(workspace_id) => {
                return (
                    "MISSING_WORKSPACE_TOKEN",
                    format!("No token for workspace {workspace_id}. Run: folio login --workspace {workspace_id} --token <token>"),
                );
            }
            ClientError::Rpc { code, message: server_message, .. } => match code.as_str() {
                codes::UNAUTHENTICATED => {
                    return (
                        codes::UNAUTHENTICATED,
                        format!("{server_message}. Run: folio login --identity <token>"),
                    );
                }
                codes::WORKSPACE_UNAUTHORIZED => {
                    return (
                        codes::WORKSPACE_UNAUTHORIZED,
                        format!("{server_message}. Your workspace token may lack the required role or have expired."),
                    );
                }
                codes::INVALID_INPUT => return (codes::INVALID_INPUT, server_message.clone()),
                codes::NOT_FOUND => return (codes::NOT_FOUND, server_message.clone()),
                _ => {}
            },
            ClientError::Transport(transport) if transport.is_timeout() => {
                return ("NETWORK_TIMEOUT", "Timed out waiting for the server.".to_owned());
            }
            ClientError::Transport(transport) if transport.is_connect() => {
                return (
                    "SERVER_UNREACHABLE",
                    "Could not reach the server. Check base_url in ~/.folio/client.toml".to_owned(),
                );
            }
            _ => {}
        }
    }

    ("RPC_ERROR", message)
}

fn render_human_error(message: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{ANSI_RED}error:{ANSI_RESET} {message}")
    } else {
        format!("error: {message}")
    }
}
