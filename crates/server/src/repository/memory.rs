// In-memory repositories for local runs and tests.
//
// Rows live in insertion order inside each instance. Ids come from a
// per-instance sequence, so a given fixture plus call sequence always yields
// the same ids. Ties on `created_at` resolve by insertion order.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use folio_common::types::{Comment, PublicationStatus, Text, DEFAULT_TEXT_TITLE};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    CommentPatch, CommentRepository, NewComment, NewText, RepositoryError, TextPatch,
    TextRepository,
};

const TEXT_ID_NAMESPACE: u64 = 0x7465_7874; // "text"
const COMMENT_ID_NAMESPACE: u64 = 0x636f_6d6d; // "comm"

pub const DEMO_WORKSPACE_ID: Uuid = Uuid::from_u128(0xd3e0_0000_0000_4000_8000_0000_0000_0123);
pub const DEMO_USER_ID: &str = "demo-user-123";
pub const DEMO_TEXT_1: Uuid = Uuid::from_u128(0xd3e0_0000_0000_4000_8000_7e47_0000_0001);
pub const DEMO_TEXT_2: Uuid = Uuid::from_u128(0xd3e0_0000_0000_4000_8000_7e47_0000_0002);
pub const DEMO_COMMENT_1: Uuid = Uuid::from_u128(0xd3e0_0000_0000_4000_8000_c033_0000_0001);
pub const DEMO_COMMENT_2: Uuid = Uuid::from_u128(0xd3e0_0000_0000_4000_8000_c033_0000_0002);
pub const DEMO_COMMENT_3: Uuid = Uuid::from_u128(0xd3e0_0000_0000_4000_8000_c033_0000_0003);

fn fixture_time(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, minute, 0).single().unwrap_or_default()
}

fn newest_first<T>(mut rows: Vec<T>, created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    rows.reverse();
    rows.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    rows
}

fn oldest_first<T>(mut rows: Vec<T>, created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    rows.sort_by(|a, b| created_at(a).cmp(&created_at(b)));
    rows
}

// ── Texts ──────────────────────────────────────────────────────────

#[derive(Default)]
struct TextRows {
    rows: Vec<Text>,
    next_seq: u64,
}

#[derive(Default)]
pub struct MemoryTextRepository {
    state: RwLock<TextRows>,
}

impl MemoryTextRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fixtures() -> Self {
        Self::from_rows(vec![
            Text {
                id: DEMO_TEXT_1,
                workspace_id: DEMO_WORKSPACE_ID,
                title: "Demo text".into(),
                content: "This is a demonstration text for trying out the application.".into(),
                status: PublicationStatus::Draft,
                created_by: DEMO_USER_ID.into(),
                created_at: fixture_time(1, 10, 0),
                updated_at: fixture_time(1, 10, 0),
            },
            Text {
                id: DEMO_TEXT_2,
                workspace_id: DEMO_WORKSPACE_ID,
                title: "Another text".into(),
                content: "Another text for exercising the text list.".into(),
                status: PublicationStatus::Published,
                created_by: DEMO_USER_ID.into(),
                created_at: fixture_time(2, 14, 30),
                updated_at: fixture_time(2, 14, 30),
            },
        ])
    }

    pub fn from_rows(rows: Vec<Text>) -> Self {
        Self { state: RwLock::new(TextRows { rows, next_seq: 1 }) }
    }
}

#[async_trait]
impl TextRepository for MemoryTextRepository {
    async fn get_by_workspace(&self, workspace_id: Uuid) -> Result<Vec<Text>, RepositoryError> {
        let state = self.state.read().await;
        let rows: Vec<Text> =
            state.rows.iter().filter(|text| text.workspace_id == workspace_id).cloned().collect();
        Ok(newest_first(rows, |text| text.created_at))
    }

    async fn get_by_id(
        &self,
        id: Uuid,
        workspace_id: Uuid,
    ) -> Result<Option<Text>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .rows
            .iter()
            .find(|text| text.id == id && text.workspace_id == workspace_id)
            .cloned())
    }

    async fn create(&self, workspace_id: Uuid, text: NewText) -> Result<Text, RepositoryError> {
        let mut state = self.state.write().await;
        let id = Uuid::from_u64_pair(TEXT_ID_NAMESPACE, state.next_seq);
        state.next_seq += 1;

        let now = Utc::now();
        let title = text
            .title
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TEXT_TITLE.to_owned());
        let created = Text {
            id,
            workspace_id,
            title,
            content: text.content,
            status: text.status,
            created_by: text.created_by,
            created_at: now,
            updated_at: now,
        };
        state.rows.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: Uuid,
        workspace_id: Uuid,
        patch: TextPatch,
    ) -> Result<Option<Text>, RepositoryError> {
        let mut state = self.state.write().await;
        let Some(text) =
            state.rows.iter_mut().find(|text| text.id == id && text.workspace_id == workspace_id)
        else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            text.title = title;
        }
        if let Some(content) = patch.content {
            text.content = content;
        }
        if let Some(status) = patch.status {
            text.status = status;
        }
        text.updated_at = Utc::now();
        Ok(Some(text.clone()))
    }

    async fn delete(&self, id: Uuid, workspace_id: Uuid) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        let before = state.rows.len();
        state.rows.retain(|text| !(text.id == id && text.workspace_id == workspace_id));
        Ok(state.rows.len() < before)
    }

    async fn count(&self, workspace_id: Uuid) -> Result<i64, RepositoryError> {
        let state = self.state.read().await;
        let count = state.rows.iter().filter(|text| text.workspace_id == workspace_id).count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

// ── Comments ───────────────────────────────────────────────────────

#[derive(Default)]
struct CommentRows {
    rows: Vec<Comment>,
    next_seq: u64,
}

#[derive(Default)]
pub struct MemoryCommentRepository {
    state: RwLock<CommentRows>,
}

impl MemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fixtures() -> Self {
        let comment = |id, text_id, content: &str, status, author_id: &str, author_name: &str, at| {
            Comment {
                id,
                workspace_id: DEMO_WORKSPACE_ID,
                text_id,
                content: content.to_owned(),
                status,
                author_id: author_id.to_owned(),
                author_name: author_name.to_owned(),
                created_at: at,
                updated_at: at,
                parent_id: None,
            }
        };

        Self::from_rows(vec![
            comment(
                DEMO_COMMENT_1,
                DEMO_TEXT_1,
                "Excellent text! Very well structured and informative.",
                PublicationStatus::Published,
                DEMO_USER_ID,
                "Elisa",
                fixture_time(1, 11, 0),
            ),
            comment(
                DEMO_COMMENT_2,
                DEMO_TEXT_1,
                "I suggest adding a section on good practices.",
                PublicationStatus::Draft,
                "demo-user-456",
                "Benoit",
                fixture_time(1, 12, 30),
            ),
            comment(
                DEMO_COMMENT_3,
                DEMO_TEXT_2,
                "Perfect for our internal documentation.",
                PublicationStatus::Published,
                DEMO_USER_ID,
                "Elisa",
                fixture_time(2, 15, 45),
            ),
        ])
    }

    pub fn from_rows(rows: Vec<Comment>) -> Self {
        Self { state: RwLock::new(CommentRows { rows, next_seq: 1 }) }
    }
}

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    async fn get_by_workspace(&self, workspace_id: Uuid) -> Result<Vec<Comment>, RepositoryError> {
        let state = self.state.read().await;
        let rows: Vec<Comment> = state
            .rows
            .iter()
            .filter(|comment| comment.workspace_id == workspace_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |comment| comment.created_at))
    }

    async fn get_by_text(
        &self,
        workspace_id: Uuid,
        text_id: Uuid,
    ) -> Result<Vec<Comment>, RepositoryError> {
        let state = self.state.read().await;
        let rows: Vec<Comment> = state
            .rows
            .iter()
            .filter(|comment| comment.workspace_id == workspace_id && comment.text_id == text_id)
            .cloned()
            .collect();
        Ok(oldest_first(rows, |comment| comment.created_at))
    }

    async fn get_by_id(
        &self,
        id: Uuid,
        workspace_id: Uuid,
    ) -> Result<Option<Comment>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .rows
            .iter()
            .find(|comment| comment.id == id && comment.workspace_id == workspace_id)
            .cloned())
    }

    async fn create(
        &self,
        workspace_id: Uuid,
        comment: NewComment,
    ) -> Result<Comment, RepositoryError> {
        let mut state = self.state.write().await;
        let id = Uuid::from_u64_pair(COMMENT_ID_NAMESPACE, state.next_seq);
        state.next_seq += 1;

        let now = Utc::now();
        let created = Comment {
            id,
            workspace_id,
            text_id: comment.text_id,
            content: comment.content,
            status: comment.status,
            author_id: comment.author_id,
            author_name: comment.author_name,
            created_at: now,
            updated_at: now,
            parent_id: comment.parent_id,
        };
        state.rows.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: Uuid,
        workspace_id: Uuid,
        patch: CommentPatch,
    ) -> Result<Option<Comment>, RepositoryError> {
        let mut state = self.state.write().await;
        let Some(comment) = state
            .rows
            .iter_mut()
            .find(|comment| comment.id == id && comment.workspace_id == workspace_id)
        else {
            return Ok(None);
        };

        if let Some(content) = patch.content {
            comment.content = content;
        }
        if let Some(status) = patch.status {
            comment.status = status;
        }
        comment.updated_at = Utc::now();
        Ok(Some(comment.clone()))
    }

    async fn delete(&self, id: Uuid, workspace_id: Uuid) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        let before = state.rows.len();
        state.rows.retain(|comment| !(comment.id == id && comment.workspace_id == workspace_id));
        Ok(state.rows.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W1: Uuid = Uuid::from_u128(1);
    const W2: Uuid = Uuid::from_u128(2);

    fn new_text(content: &str) -> NewText {
        NewText {
            title: Some("Demo".into()),
            content: content.into(),
            status: PublicationStatus::Draft,
            created_by: "user-1".into(),
        }
    }

    fn new_comment(text_id: Uuid, content: &str) -> NewComment {
        NewComment {
            text_id,
            content: content.into(),
            status: PublicationStatus::Draft,
            author_id: "user-1".into(),
            author_name: "Ada".into(),
            parent_id: None,
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let repo = MemoryTextRepository::new();
        let created = repo.create(W1, new_text("Hello world")).await.expect("create");

        let fetched = repo.get_by_id(created.id, W1).await.expect("get").expect("row exists");
        assert_eq!(fetched, created);
        assert_eq!(fetched.status, PublicationStatus::Draft);
        assert_eq!(fetched.title, "Demo");
    }

    #[tokio::test]
    async fn workspaces_are_isolated() {
        let repo = MemoryTextRepository::new();
        let created = repo.create(W1, new_text("Hello world")).await.expect("create");

        assert_eq!(repo.get_by_workspace(W1).await.expect("list").len(), 1);
        assert!(repo.get_by_workspace(W2).await.expect("list").is_empty());
        assert!(repo.get_by_id(created.id, W2).await.expect("get").is_none());
        assert!(repo.update(created.id, W2, TextPatch::default()).await.expect("update").is_none());
        assert!(!repo.delete(created.id, W2).await.expect("delete"));
        assert_eq!(repo.count(W1).await.expect("count"), 1);
        assert_eq!(repo.count(W2).await.expect("count"), 0);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let repo = MemoryTextRepository::new();
        let created = repo.create(W1, new_text("Hello world")).await.expect("create");

        assert!(repo.delete(created.id, W1).await.expect("first delete"));
        assert!(!repo.delete(created.id, W1).await.expect("second delete"));
    }

    #[tokio::test]
    async fn blank_title_falls_back_to_default() {
        let repo = MemoryTextRepository::new();
        let created = repo
            .create(W1, NewText { title: Some("  ".into()), ..new_text("Hello world") })
            .await
            .expect("create");
        assert_eq!(created.title, DEFAULT_TEXT_TITLE);
    }

    #[tokio::test]
    async fn empty_patch_still_refreshes_updated_at() {
        let repo = MemoryTextRepository::new();
        let created = repo.create(W1, new_text("Hello world")).await.expect("create");
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let updated =
            repo.update(created.id, W1, TextPatch::default()).await.expect("update").expect("row");
        assert_eq!(updated.content, created.content);
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn patch_changes_only_supplied_fields() {
        let repo = MemoryTextRepository::new();
        let created = repo.create(W1, new_text("Hello world")).await.expect("create");

        let updated = repo
            .update(
                created.id,
                W1,
                TextPatch { status: Some(PublicationStatus::Published), ..Default::default() },
            )
            .await
            .expect("update")
            .expect("row");
        assert_eq!(updated.status, PublicationStatus::Published);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.content, created.content);
    }

    #[tokio::test]
    async fn ids_are_deterministic_per_instance() {
        let first = MemoryTextRepository::new();
        let second = MemoryTextRepository::new();
        for repo in [&first, &second] {
            repo.create(W1, new_text("one")).await.expect("create");
            repo.create(W1, new_text("two")).await.expect("create");
        }

        let ids = |texts: Vec<Text>| texts.into_iter().map(|text| text.id).collect::<Vec<_>>();
        assert_eq!(
            ids(first.get_by_workspace(W1).await.expect("list")),
            ids(second.get_by_workspace(W1).await.expect("list"))
        );
    }

    #[tokio::test]
    async fn ties_resolve_by_insertion_order() {
        let at = fixture_time(3, 9, 0);
        let text = |n: u128| Text {
            id: Uuid::from_u128(n),
            workspace_id: W1,
            title: format!("t{n}"),
            content: "same instant".into(),
            status: PublicationStatus::Draft,
            created_by: "user-1".into(),
            created_at: at,
            updated_at: at,
        };
        let repo = MemoryTextRepository::from_rows(vec![text(1), text(2), text(3)]);

        let order: Vec<u128> = repo
            .get_by_workspace(W1)
            .await
            .expect("list")
            .into_iter()
            .map(|text| text.id.as_u128())
            .collect();
        assert_eq!(order, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn fixtures_list_newest_text_first() {
        let repo = MemoryTextRepository::with_fixtures();
        let texts = repo.get_by_workspace(DEMO_WORKSPACE_ID).await.expect("list");
        assert_eq!(texts.iter().map(|t| t.id).collect::<Vec<_>>(), vec![DEMO_TEXT_2, DEMO_TEXT_1]);
    }

    #[tokio::test]
    async fn comment_orderings_differ_by_scope() {
        let repo = MemoryCommentRepository::with_fixtures();

        let by_text = repo.get_by_text(DEMO_WORKSPACE_ID, DEMO_TEXT_1).await.expect("by text");
        assert_eq!(
            by_text.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![DEMO_COMMENT_1, DEMO_COMMENT_2]
        );

        let by_workspace = repo.get_by_workspace(DEMO_WORKSPACE_ID).await.expect("by workspace");
        assert_eq!(
            by_workspace.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![DEMO_COMMENT_3, DEMO_COMMENT_2, DEMO_COMMENT_1]
        );
    }

    #[tokio::test]
    async fn new_comments_append_to_their_text_thread() {
        let repo = MemoryCommentRepository::with_fixtures();
        let reply = NewComment {
            parent_id: Some(DEMO_COMMENT_1),
            ..new_comment(DEMO_TEXT_1, "Agreed with this")
        };
        let created = repo.create(DEMO_WORKSPACE_ID, reply).await.expect("create");

        let thread = repo.get_by_text(DEMO_WORKSPACE_ID, DEMO_TEXT_1).await.expect("by text");
        assert_eq!(thread.last().map(|c| c.id), Some(created.id));
        assert_eq!(created.parent_id, Some(DEMO_COMMENT_1));
    }

    #[tokio::test]
    async fn comment_crud_is_workspace_scoped() {
        let repo = MemoryCommentRepository::new();
        let text_id = Uuid::from_u128(77);
        let created = repo.create(W1, new_comment(text_id, "First!")).await.expect("create");

        assert!(repo.get_by_id(created.id, W2).await.expect("get").is_none());
        assert!(repo.get_by_text(W2, text_id).await.expect("by text").is_empty());
        assert!(repo
            .update(created.id, W2, CommentPatch::default())
            .await
            .expect("update")
            .is_none());

        let updated = repo
            .update(
                created.id,
                W1,
                CommentPatch { content: Some("Edited".into()), status: None },
            )
            .await
            .expect("update")
            .expect("row");
        assert_eq!(updated.content, "Edited");
        assert_eq!(updated.status, PublicationStatus::Draft);

        assert!(repo.delete(created.id, W1).await.expect("delete"));
        assert!(!repo.delete(created.id, W1).await.expect("delete again"));
    }
}
