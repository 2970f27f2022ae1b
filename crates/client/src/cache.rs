// Client-side query cache.
//
// Each `QueryKey` maps to one cached collection plus bookkeeping:
//   - `generation` / `settled` order reads; a read whose generation is no
//     longer current when it resolves is dropped.
//   - a per-key fetch lock lets concurrent `ensure` calls share one read.
//   - a single rollback snapshot slot per key. A second mutation taking a
//     snapshot before the first resolves replaces it (last writer wins).

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::transport::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Texts,
    Comments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub workspace_id: Uuid,
    pub kind: QueryKind,
    /// Owning entity for nested collections (the text of a comment list).
    pub parent: Option<Uuid>,
}

impl QueryKey {
    pub fn texts(workspace_id: Uuid) -> Self {
        Self { workspace_id, kind: QueryKind::Texts, parent: None }
    }

    pub fn comments(workspace_id: Uuid, text_id: Uuid) -> Self {
        Self { workspace_id, kind: QueryKind::Comments, parent: Some(text_id) }
    }
}

/// What a view renders for one key.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    /// Last known data; kept visible while a refetch runs.
    pub data: Option<Vec<T>>,
    /// No data yet and a read is running.
    pub is_loading: bool,
    pub is_fetching: bool,
    pub is_stale: bool,
    pub error: Option<String>,
}

struct Entry<T> {
    data: Option<Vec<T>>,
    stale: bool,
    error: Option<String>,
    generation: u64,
    settled: u64,
    snapshot: Option<Option<Vec<T>>>,
    fetch_lock: Arc<Mutex<()>>,
}

impl<T> Default for Entry<T> {
    fn default() -> Self {
        Self {
            data: None,
            stale: false,
            error: None,
            generation: 0,
            settled: 0,
            snapshot: None,
            fetch_lock: Arc::new(Mutex::new(())),
        }
    }
}

impl<T> Entry<T> {
    fn is_fetching(&self) -> bool {
        self.generation > self.settled
    }
}

pub struct QueryCache<T> {
    entries: Mutex<HashMap<QueryKey, Entry<T>>>,
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self { entries: Mutex::new(HashMap::new()) }
    }
}

impl<T: Clone + Send> QueryCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &QueryKey) -> Option<Vec<T>> {
        self.entries.lock().await.get(key).and_then(|entry| entry.data.clone())
    }

    pub async fn state(&self, key: &QueryKey) -> QueryState<T> {
        let entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) => QueryState {
                data: entry.data.clone(),
                is_loading: entry.data.is_none() && entry.is_fetching(),
                is_fetching: entry.is_fetching(),
                is_stale: entry.stale,
                error: entry.error.clone(),
            },
            None => QueryState {
                data: None,
                is_loading: false,
                is_fetching: false,
                is_stale: false,
                error: None,
            },
        }
    }

    pub async fn set(&self, key: QueryKey, data: Vec<T>) {
        let mut entries = self.entries.lock().await;
        let entry = entries.entry(key).or_default();
        entry.data = Some(data);
        entry.stale = false;
        entry.error = None;
    }

    async fn fresh(&self, key: &QueryKey) -> Option<Vec<T>> {
        let entries = self.entries.lock().await;
        entries.get(key).filter(|entry| !entry.stale).and_then(|entry| entry.data.clone())
    }

    /// Return cached data, reading through `fetch` when absent or stale.
    /// Concurrent callers for the same key share a single read.
    pub async fn ensure<F, Fut>(&self, key: QueryKey, fetch: F) -> Result<Vec<T>, ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, ClientError>>,
    {
        if let Some(data) = self.fresh(&key).await {
            return Ok(data);
        }

        let fetch_lock = Arc::clone(&self.entries.lock().await.entry(key).or_default().fetch_lock);
        let _guard = fetch_lock.lock().await;
        if let Some(data) = self.fresh(&key).await {
            return Ok(data);
        }
        self.run_fetch(key, fetch).await
    }

    /// Start a new read for `key`, superseding any read still in flight.
    pub async fn refetch<F, Fut>(&self, key: QueryKey, fetch: F) -> Result<Vec<T>, ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, ClientError>>,
    {
        self.run_fetch(key, fetch).await
    }

    async fn run_fetch<F, Fut>(&self, key: QueryKey, fetch: F) -> Result<Vec<T>, ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, ClientError>>,
    {
        let generation = {
            let mut entries = self.entries.lock().await;
            let entry = entries.entry(key).or_default();
            entry.generation += 1;
            entry.generation
        };

        let result = fetch().await;

        let mut entries = self.entries.lock().await;
        let entry = entries.entry(key).or_default();
        if entry.generation != generation {
            debug!(?key, generation, current = entry.generation, "dropping superseded read");
            return result;
        }

        entry.settled = generation;
        match &result {
            Ok(data) => {
                entry.data = Some(data.clone());
                entry.stale = false;
                entry.error = None;
            }
            Err(error) => entry.error = Some(error.to_string()),
        }
        result
    }

    /// Take the rollback snapshot for a mutation and cancel in-flight reads
    /// so they cannot overwrite the optimistic state. Returns `true` when an
    /// unresolved snapshot was replaced.
    pub async fn snapshot(&self, key: &QueryKey) -> bool {
        let mut entries = self.entries.lock().await;
        let entry = entries.entry(*key).or_default();

        entry.generation += 1;
        entry.settled = entry.generation;

        let replaced = entry.snapshot.is_some();
        if replaced {
            warn!(
                ?key,
                "replacing an unresolved rollback snapshot; the earlier mutation can no longer roll back"
            );
        }
        entry.snapshot = Some(entry.data.clone());
        replaced
    }

    pub async fn optimistic_apply<F>(&self, key: &QueryKey, apply: F)
    where
        F: FnOnce(&mut Vec<T>),
    {
        let mut entries = self.entries.lock().await;
        let entry = entries.entry(*key).or_default();
        apply(entry.data.get_or_insert_with(Vec::new));
    }

    /// Restore the snapshot. `false` when there was none to restore.
    pub async fn rollback(&self, key: &QueryKey) -> bool {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get_mut(key) else {
            return false;
        };
        match entry.snapshot.take() {
            Some(snapshot) => {
                entry.data = snapshot;
                true
            }
            None => {
                warn!(?key, "no rollback snapshot left; keeping optimistic state");
                false
            }
        }
    }

    /// Reconcile the optimistic state with the server result and release the snapshot.
    pub async fn commit<F>(&self, key: &QueryKey, reconcile: F)
    where
        F: FnOnce(&mut Vec<T>),
    {
        let mut entries = self.entries.lock().await;
        let entry = entries.entry(*key).or_default();
        reconcile(entry.data.get_or_insert_with(Vec::new));
        entry.snapshot = None;
    }

    /// Mark `key` stale; the next `ensure` reads through.
    pub async fn invalidate(&self, key: &QueryKey) {
        if let Some(entry) = self.entries.lock().await.get_mut(key) {
            entry.stale = true;
        }
    }

    pub async fn has_snapshot(&self, key: &QueryKey) -> bool {
        self.entries.lock().await.get(key).is_some_and(|entry| entry.snapshot.is_some())
    }
}
