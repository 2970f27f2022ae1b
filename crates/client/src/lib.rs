// Folio client: transport, typed services, the query cache and data hooks.

pub mod cache;
pub mod config;
pub mod hooks;
pub mod services;
pub mod tokens;
pub mod transport;

pub use cache::{QueryCache, QueryKey, QueryState};
pub use hooks::{CommentsHook, MutationStrategy, TextsHook};
pub use services::{CommentInput, FolioApi, TextInput};
pub use transport::{ClientError, HttpTransport, RpcTransport};
