use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_common::types::{Comment, Text, DEFAULT_TEXT_TITLE};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    parse_status, CommentPatch, CommentRepository, NewComment, NewText, RepositoryError,
    TextPatch, TextRepository,
};

const TEXT_COLUMNS: &str = "id, workspace_id, title, content, status, created_by, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, workspace_id, text_id, content, status, author_id, author_name, \
                               created_at, updated_at, parent_id";

// ── SQL Rows ───────────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct TextRow {
    id: Uuid,
    workspace_id: Uuid,
    title: String,
    content: String,
    status: String,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TextRow> for Text {
    type Error = RepositoryError;

    fn try_from(row: TextRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            workspace_id: row.workspace_id,
            title: row.title,
            content: row.content,
            status: parse_status(&row.status)?,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    workspace_id: Uuid,
    text_id: Uuid,
    content: String,
    status: String,
    author_id: String,
    author_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    parent_id: Option<Uuid>,
}

impl TryFrom<CommentRow> for Comment {
    type Error = RepositoryError;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            workspace_id: row.workspace_id,
            text_id: row.text_id,
            content: row.content,
            status: parse_status(&row.status)?,
            author_id: row.author_id,
            author_name: row.author_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
            parent_id: row.parent_id,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, RepositoryError>
where
    T: TryFrom<R, Error = RepositoryError>,
{
    rows.into_iter().map(T::try_from).collect()
}

// ── Texts ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct PgTextRepository {
    pool: PgPool,
}

impl PgTextRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TextRepository for PgTextRepository {
    async fn get_by_workspace(&self, workspace_id: Uuid) -> Result<Vec<Text>, RepositoryError> {
        let rows = sqlx::query_as::<_, TextRow>(&format!(
            "SELECT {TEXT_COLUMNS} FROM texts WHERE workspace_id = $1 ORDER BY created_at DESC, seq DESC"
        ))
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;

        convert_all(rows)
    }

    async fn get_by_id(
        &self,
        id: Uuid,
        workspace_id: Uuid,
    ) -> Result<Option<Text>, RepositoryError> {
        let row = sqlx::query_as::<_, TextRow>(&format!(
            "SELECT {TEXT_COLUMNS} FROM texts WHERE id = $1 AND workspace_id = $2"
        ))
        .bind(id)
        .bind(workspace_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Text::try_from).transpose()
    }

    async fn create(&self, workspace_id: Uuid, text: NewText) -> Result<Text, RepositoryError> {
        let title = text
            .title
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TEXT_TITLE.to_owned());

        let row = sqlx::query_as::<_, TextRow>(&format!(
            r#"
            INSERT INTO texts (workspace_id, title, content, status, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TEXT_COLUMNS}
            "#
        ))
        .bind(workspace_id)
        .bind(title)
        .bind(text.content)
        .bind(text.status.as_str())
        .bind(text.created_by)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn update(
        &self,
        id: Uuid,
        workspace_id: Uuid,
        patch: TextPatch,
    ) -> Result<Option<Text>, RepositoryError> {
        let row = sqlx::query_as::<_, TextRow>(&format!(
            r#"
            UPDATE texts
            SET title = COALESCE($3, title),
                content = COALESCE($4, content),
                status = COALESCE($5, status),
                updated_at = now()
            WHERE id = $1 AND workspace_id = $2
            RETURNING {TEXT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(workspace_id)
        .bind(patch.title)
        .bind(patch.content)
        .bind(patch.status.map(|status| status.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Text::try_from).transpose()
    }

    async fn delete(&self, id: Uuid, workspace_id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM texts WHERE id = $1 AND workspace_id = $2")
            .bind(id)
            .bind(workspace_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, workspace_id: Uuid) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM texts WHERE workspace_id = $1")
            .bind(workspace_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// ── Comments ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn get_by_workspace(&self, workspace_id: Uuid) -> Result<Vec<Comment>, RepositoryError> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE workspace_id = $1 ORDER BY created_at DESC, seq DESC"
        ))
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;

        convert_all(rows)
    }

    async fn get_by_text(
        &self,
        workspace_id: Uuid,
        text_id: Uuid,
    ) -> Result<Vec<Comment>, RepositoryError> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments
            WHERE workspace_id = $1 AND text_id = $2
            ORDER BY created_at ASC, seq ASC
            "#
        ))
        .bind(workspace_id)
        .bind(text_id)
        .fetch_all(&self.pool)
        .await?;

        convert_all(rows)
    }

    async fn get_by_id(
        &self,
        id: Uuid,
        workspace_id: Uuid,
    ) -> Result<Option<Comment>, RepositoryError> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1 AND workspace_id = $2"
        ))
        .bind(id)
        .bind(workspace_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Comment::try_from).transpose()
    }

    async fn create(
        &self,
        workspace_id: Uuid,
        comment: NewComment,
    ) -> Result<Comment, RepositoryError> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            INSERT INTO comments
                (workspace_id, text_id, content, status, author_id, author_name, parent_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(workspace_id)
        .bind(comment.text_id)
        .bind(comment.content)
        .bind(comment.status.as_str())
        .bind(comment.author_id)
        .bind(comment.author_name)
        .bind(comment.parent_id)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn update(
        &self,
        id: Uuid,
        workspace_id: Uuid,
        patch: CommentPatch,
    ) -> Result<Option<Comment>, RepositoryError> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            UPDATE comments
            SET content = COALESCE($3, content),
                status = COALESCE($4, status),
                updated_at = now()
            WHERE id = $1 AND workspace_id = $2
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(workspace_id)
        .bind(patch.content)
        .bind(patch.status.map(|status| status.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Comment::try_from).transpose()
    }

    async fn delete(&self, id: Uuid, workspace_id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND workspace_id = $2")
            .bind(id)
            .bind(workspace_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
