// Workspace-scoped data access for texts and comments.
//
// Every method takes the workspace id as a mandatory argument and never
// returns rows from another workspace. "Not found" is expressed through
// `Option`/`bool` results; `RepositoryError` is reserved for storage faults.

use std::sync::Arc;

use async_trait::async_trait;
use folio_common::types::{Comment, PublicationStatus, Text};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::{MemoryCommentRepository, MemoryTextRepository};
pub use postgres::{PgCommentRepository, PgTextRepository};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database query failed")]
    Database(#[from] sqlx::Error),
    #[error("stored row is invalid: {0}")]
    CorruptRow(String),
}

// ── Inputs ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewText {
    /// Stored as `DEFAULT_TEXT_TITLE` when absent or blank.
    pub title: Option<String>,
    pub content: String,
    pub status: PublicationStatus,
    pub created_by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<PublicationStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub text_id: Uuid,
    pub content: String,
    pub status: PublicationStatus,
    pub author_id: String,
    pub author_name: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentPatch {
    pub content: Option<String>,
    pub status: Option<PublicationStatus>,
}

// ── Traits ─────────────────────────────────────────────────────────

#[async_trait]
pub trait TextRepository: Send + Sync {
    /// Texts of one workspace, newest first.
    async fn get_by_workspace(&self, workspace_id: Uuid) -> Result<Vec<Text>, RepositoryError>;

    async fn get_by_id(&self, id: Uuid, workspace_id: Uuid)
        -> Result<Option<Text>, RepositoryError>;

    async fn create(&self, workspace_id: Uuid, text: NewText) -> Result<Text, RepositoryError>;

    /// Apply the supplied fields and refresh `updated_at`. `None` when no row matched.
    async fn update(
        &self,
        id: Uuid,
        workspace_id: Uuid,
        patch: TextPatch,
    ) -> Result<Option<Text>, RepositoryError>;

    /// `true` iff a row existed and was removed.
    async fn delete(&self, id: Uuid, workspace_id: Uuid) -> Result<bool, RepositoryError>;

    async fn count(&self, workspace_id: Uuid) -> Result<i64, RepositoryError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Comments of one workspace, newest first.
    async fn get_by_workspace(&self, workspace_id: Uuid) -> Result<Vec<Comment>, RepositoryError>;

    /// Comments attached to one text, oldest first.
    async fn get_by_text(
        &self,
        workspace_id: Uuid,
        text_id: Uuid,
    ) -> Result<Vec<Comment>, RepositoryError>;

    async fn get_by_id(
        &self,
        id: Uuid,
        workspace_id: Uuid,
    ) -> Result<Option<Comment>, RepositoryError>;

    async fn create(
        &self,
        workspace_id: Uuid,
        comment: NewComment,
    ) -> Result<Comment, RepositoryError>;

    async fn update(
        &self,
        id: Uuid,
        workspace_id: Uuid,
        patch: CommentPatch,
    ) -> Result<Option<Comment>, RepositoryError>;

    async fn delete(&self, id: Uuid, workspace_id: Uuid) -> Result<bool, RepositoryError>;
}

// ── Wiring ─────────────────────────────────────────────────────────

#[derive(Clone)]
enum Backend {
    Postgres(PgPool),
    Memory,
}

/// The repositories a running server talks to.
#[derive(Clone)]
pub struct Repositories {
    pub texts: Arc<dyn TextRepository>,
    pub comments: Arc<dyn CommentRepository>,
    backend: Backend,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            texts: Arc::new(PgTextRepository::new(pool.clone())),
            comments: Arc::new(PgCommentRepository::new(pool.clone())),
            backend: Backend::Postgres(pool),
        }
    }

    /// In-memory repositories seeded with the demo fixtures.
    pub fn memory_with_fixtures() -> Self {
        Self::memory(MemoryTextRepository::with_fixtures(), MemoryCommentRepository::with_fixtures())
    }

    pub fn memory(texts: MemoryTextRepository, comments: MemoryCommentRepository) -> Self {
        Self { texts: Arc::new(texts), comments: Arc::new(comments), backend: Backend::Memory }
    }

    /// Process-local backend built from arbitrary repository implementations.
    pub fn in_process(texts: Arc<dyn TextRepository>, comments: Arc<dyn CommentRepository>) -> Self {
        Self { texts, comments, backend: Backend::Memory }
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Postgres(_) => "postgres",
            Backend::Memory => "memory",
        }
    }

    pub async fn check_health(&self) -> anyhow::Result<()> {
        match &self.backend {
            Backend::Postgres(pool) => crate::db::pool::check_pool_health(pool).await,
            Backend::Memory => Ok(()),
        }
    }
}

pub(crate) fn parse_status(value: &str) -> Result<PublicationStatus, RepositoryError> {
    PublicationStatus::parse(value)
        .ok_or_else(|| RepositoryError::CorruptRow(format!("unknown status '{value}'")))
}
