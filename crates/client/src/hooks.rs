// Data hooks: a cached collection per view plus its mutations.
//
// `MutationStrategy::Optimistic` edits the cache before the call resolves
// and rolls back to the snapshot on failure. `MutationStrategy::Invalidate`
// leaves the cache alone and refetches once the server confirms.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use folio_common::types::{Comment, PublicationStatus, Text, DEFAULT_TEXT_TITLE};
use tracing::warn;
use uuid::Uuid;

use crate::cache::{QueryCache, QueryKey, QueryState};
use crate::services::{CommentInput, FolioApi, TextInput};
use crate::transport::ClientError;

/// Author name shown on optimistic comments when no display name is configured.
pub const FALLBACK_AUTHOR_NAME: &str = "Anonymous";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MutationStrategy {
    #[default]
    Optimistic,
    Invalidate,
}

/// Cached records addressable by id.
pub trait Record: Clone + Send {
    fn id(&self) -> Uuid;
}

impl Record for Text {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Comment {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Swap the record carrying `id` for `record`, keeping its position.
/// Inserts at `fallback_index` when the id is no longer present.
fn replace_in_place<T: Record>(items: &mut Vec<T>, id: Uuid, record: T, fallback_index: Option<usize>) {
    match items.iter().position(|item| item.id() == id) {
        Some(index) => items[index] = record,
        None => match fallback_index {
            Some(index) => items.insert(index.min(items.len()), record),
            None => items.push(record),
        },
    }
}

fn remove_by_id<T: Record>(items: &mut Vec<T>, id: Uuid) {
    items.retain(|item| item.id() != id);
}

fn parse_status(status: Option<&str>) -> Option<PublicationStatus> {
    status.and_then(PublicationStatus::parse)
}

/// Counts mutations in flight; cleared on drop so early returns stay balanced.
struct Pending(Arc<AtomicUsize>);

impl Pending {
    fn start(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for Pending {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

// ── Texts ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct TextsHook {
    api: FolioApi,
    cache: Arc<QueryCache<Text>>,
    workspace_id: Uuid,
    user_id: String,
    strategy: MutationStrategy,
    pending: Arc<AtomicUsize>,
}

impl TextsHook {
    pub fn new(
        api: FolioApi,
        cache: Arc<QueryCache<Text>>,
        workspace_id: Uuid,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            api,
            cache,
            workspace_id,
            user_id: user_id.into(),
            strategy: MutationStrategy::default(),
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_strategy(mut self, strategy: MutationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn key(&self) -> QueryKey {
        QueryKey::texts(self.workspace_id)
    }

    /// Cached texts, newest first; empty before the first load.
    pub async fn texts(&self) -> Vec<Text> {
        self.cache.get(&self.key()).await.unwrap_or_default()
    }

    pub async fn state(&self) -> QueryState<Text> {
        self.cache.state(&self.key()).await
    }

    pub fn is_mutating(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }

    pub async fn load(&self) -> Result<Vec<Text>, ClientError> {
        let (api, workspace_id) = (self.api.clone(), self.workspace_id);
        self.cache.ensure(self.key(), move || async move { api.get_texts(workspace_id).await }).await
    }

    pub async fn refetch(&self) -> Result<Vec<Text>, ClientError> {
        let (api, workspace_id) = (self.api.clone(), self.workspace_id);
        self.cache.refetch(self.key(), move || async move { api.get_texts(workspace_id).await }).await
    }

    async fn invalidate_and_refetch(&self) {
        self.cache.invalidate(&self.key()).await;
        if let Err(error) = self.refetch().await {
            warn!(workspace_id = %self.workspace_id, %error, "refetch after mutation failed");
        }
    }

    pub async fn create(&self, input: TextInput) -> Result<Text, ClientError> {
        let _pending = Pending::start(&self.pending);
        if self.strategy == MutationStrategy::Invalidate {
            let text = self.api.create_text(self.workspace_id, input).await?;
            self.invalidate_and_refetch().await;
            return Ok(text);
        }

        let key = self.key();
        let now = Utc::now();
        let temporary = Text {
            id: Uuid::new_v4(),
            workspace_id: self.workspace_id,
            title: input
                .title
                .clone()
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TEXT_TITLE.to_owned()),
            content: input.content.clone().unwrap_or_default(),
            status: parse_status(input.status.as_deref()).unwrap_or_default(),
            created_by: self.user_id.clone(),
            created_at: now,
            updated_at: now,
        };
        let temporary_id = temporary.id;

        self.cache.snapshot(&key).await;
        self.cache.optimistic_apply(&key, |texts| texts.insert(0, temporary)).await;

        match self.api.create_text(self.workspace_id, input).await {
            Ok(text) => {
                let record = text.clone();
                self.cache
                    .commit(&key, |texts| replace_in_place(texts, temporary_id, record, Some(0)))
                    .await;
                Ok(text)
            }
            Err(error) => {
                self.cache.rollback(&key).await;
                Err(error)
            }
        }
    }

    pub async fn update(&self, text_id: Uuid, input: TextInput) -> Result<Text, ClientError> {
        let _pending = Pending::start(&self.pending);
        if self.strategy == MutationStrategy::Invalidate {
            let text = self.api.update_text(self.workspace_id, text_id, input).await?;
            self.invalidate_and_refetch().await;
            return Ok(text);
        }

        let key = self.key();
        let speculative = input.clone();
        self.cache.snapshot(&key).await;
        self.cache
            .optimistic_apply(&key, |texts| {
                if let Some(text) = texts.iter_mut().find(|text| text.id == text_id) {
                    if let Some(title) = speculative.title {
                        text.title = title;
                    }
                    if let Some(content) = speculative.content {
                        text.content = content;
                    }
                    if let Some(status) = parse_status(speculative.status.as_deref()) {
                        text.status = status;
                    }
                    text.updated_at = Utc::now();
                }
            })
            .await;

        match self.api.update_text(self.workspace_id, text_id, input).await {
            Ok(text) => {
                let record = text.clone();
                self.cache.commit(&key, |texts| replace_in_place(texts, text_id, record, Some(0))).await;
                Ok(text)
            }
            Err(error) => {
                self.cache.rollback(&key).await;
                Err(error)
            }
        }
    }

    pub async fn delete(&self, text_id: Uuid) -> Result<bool, ClientError> {
        let _pending = Pending::start(&self.pending);
        if self.strategy == MutationStrategy::Invalidate {
            let deleted = self.api.delete_text(self.workspace_id, text_id).await?;
            self.invalidate_and_refetch().await;
            return Ok(deleted);
        }

        let key = self.key();
        self.cache.snapshot(&key).await;
        self.cache.optimistic_apply(&key, |texts| remove_by_id(texts, text_id)).await;

        match self.api.delete_text(self.workspace_id, text_id).await {
            Ok(deleted) => {
                self.cache.commit(&key, |_| {}).await;
                Ok(deleted)
            }
            Err(error) => {
                self.cache.rollback(&key).await;
                Err(error)
            }
        }
    }
}

// ── Comments ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct CommentsHook {
    api: FolioApi,
    cache: Arc<QueryCache<Comment>>,
    workspace_id: Uuid,
    text_id: Uuid,
    user_id: String,
    display_name: Option<String>,
    strategy: MutationStrategy,
    pending: Arc<AtomicUsize>,
}

impl CommentsHook {
    pub fn new(
        api: FolioApi,
        cache: Arc<QueryCache<Comment>>,
        workspace_id: Uuid,
        text_id: Uuid,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            api,
            cache,
            workspace_id,
            text_id,
            user_id: user_id.into(),
            display_name: None,
            strategy: MutationStrategy::default(),
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_display_name(mut self, display_name: Option<String>) -> Self {
        self.display_name = display_name;
        self
    }

    pub fn with_strategy(mut self, strategy: MutationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn key(&self) -> QueryKey {
        QueryKey::comments(self.workspace_id, self.text_id)
    }

    /// Cached comments of the text, oldest first.
    pub async fn comments(&self) -> Vec<Comment> {
        self.cache.get(&self.key()).await.unwrap_or_default()
    }

    pub async fn state(&self) -> QueryState<Comment> {
        self.cache.state(&self.key()).await
    }

    pub fn is_mutating(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }

    pub async fn load(&self) -> Result<Vec<Comment>, ClientError> {
        let (api, workspace_id, text_id) = (self.api.clone(), self.workspace_id, self.text_id);
        self.cache
            .ensure(self.key(), move || async move { api.get_comments(workspace_id, text_id).await })
            .await
    }

    pub async fn refetch(&self) -> Result<Vec<Comment>, ClientError> {
        let (api, workspace_id, text_id) = (self.api.clone(), self.workspace_id, self.text_id);
        self.cache
            .refetch(self.key(), move || async move { api.get_comments(workspace_id, text_id).await })
            .await
    }

    async fn invalidate_and_refetch(&self) {
        self.cache.invalidate(&self.key()).await;
        if let Err(error) = self.refetch().await {
            warn!(
                workspace_id = %self.workspace_id,
                text_id = %self.text_id,
                %error,
                "refetch after mutation failed"
            );
        }
    }

    pub async fn create(&self, input: CommentInput) -> Result<Comment, ClientError> {
        let _pending = Pending::start(&self.pending);
        if self.strategy == MutationStrategy::Invalidate {
            let comment = self.api.create_comment(self.workspace_id, self.text_id, input).await?;
            self.invalidate_and_refetch().await;
            return Ok(comment);
        }

        let key = self.key();
        let now = Utc::now();
        let temporary = Comment {
            id: Uuid::new_v4(),
            workspace_id: self.workspace_id,
            text_id: self.text_id,
            content: input.content.clone().unwrap_or_default(),
            status: parse_status(input.status.as_deref()).unwrap_or_default(),
            author_id: self.user_id.clone(),
            author_name: self
                .display_name
                .clone()
                .unwrap_or_else(|| FALLBACK_AUTHOR_NAME.to_owned()),
            created_at: now,
            updated_at: now,
            parent_id: input.parent_id,
        };
        let temporary_id = temporary.id;

        self.cache.snapshot(&key).await;
        self.cache.optimistic_apply(&key, |comments| comments.push(temporary)).await;

        match self.api.create_comment(self.workspace_id, self.text_id, input).await {
            Ok(comment) => {
                let record = comment.clone();
                self.cache
                    .commit(&key, |comments| replace_in_place(comments, temporary_id, record, None))
                    .await;
                Ok(comment)
            }
            Err(error) => {
                self.cache.rollback(&key).await;
                Err(error)
            }
        }
    }

    pub async fn update(&self, comment_id: Uuid, input: CommentInput) -> Result<Comment, ClientError> {
        let _pending = Pending::start(&self.pending);
        if self.strategy == MutationStrategy::Invalidate {
            let comment = self.api.update_comment(self.workspace_id, comment_id, input).await?;
            self.invalidate_and_refetch().await;
            return Ok(comment);
        }

        let key = self.key();
        let speculative = input.clone();
        self.cache.snapshot(&key).await;
        self.cache
            .optimistic_apply(&key, |comments| {
                if let Some(comment) = comments.iter_mut().find(|comment| comment.id == comment_id) {
                    if let Some(content) = speculative.content {
                        comment.content = content;
                    }
                    if let Some(status) = parse_status(speculative.status.as_deref()) {
                        comment.status = status;
                    }
                    comment.updated_at = Utc::now();
                }
            })
            .await;

        match self.api.update_comment(self.workspace_id, comment_id, input).await {
            Ok(comment) => {
                let record = comment.clone();
                self.cache
                    .commit(&key, |comments| replace_in_place(comments, comment_id, record, None))
                    .await;
                Ok(comment)
            }
            Err(error) => {
                self.cache.rollback(&key).await;
                Err(error)
            }
        }
    }

    pub async fn delete(&self, comment_id: Uuid) -> Result<bool, ClientError> {
        let _pending = Pending::start(&self.pending);
        if self.strategy == MutationStrategy::Invalidate {
            let deleted = self.api.delete_comment(self.workspace_id, comment_id).await?;
            self.invalidate_and_refetch().await;
            return Ok(deleted);
        }

        let key = self.key();
        self.cache.snapshot(&key).await;
        self.cache.optimistic_apply(&key, |comments| remove_by_id(comments, comment_id)).await;

        match self.api.delete_comment(self.workspace_id, comment_id).await {
            Ok(deleted) => {
                self.cache.commit(&key, |_| {}).await;
                Ok(deleted)
            }
            Err(error) => {
                self.cache.rollback(&key).await;
                Err(error)
            }
        }
    }
}
