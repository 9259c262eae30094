//! Live Query Streams
//!
//! Reads are served as watch channels: the receiver always holds the latest
//! materialized snapshot and is refreshed when a write touches one of the
//! tables the query depends on. A slow consumer only ever sees the newest
//! snapshot; intermediate ones coalesce away. A late subscriber reads the
//! current snapshot immediately via `borrow()`.

use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch, Mutex};

use crate::domain::{DomainError, DomainResult};
use crate::repository::db::{Store, Table};

/// Runs `query` now and again after every relevant table change, publishing
/// each snapshot to the returned receiver.
///
/// The refresh task stops when every receiver is gone. A re-query failure
/// also stops it; the stream terminates and consumers observe closure.
pub(super) async fn live_query<T, F>(
    store: &Store,
    tables: &'static [Table],
    query: F,
) -> DomainResult<watch::Receiver<Vec<T>>>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(&Connection) -> DomainResult<Vec<T>> + Send + Sync + 'static,
{
    // Subscribe before the initial load so a write landing in between still
    // arrives as a change event
    let changes = store.subscribe_changes();
    let initial = run_query(store, &query).await?;
    let (tx, rx) = watch::channel(initial);
    tokio::spawn(refresh_loop(
        store.clone(),
        tables,
        query,
        Arc::new(tx),
        changes,
    ));
    Ok(rx)
}

/// Shared, lazily-started subscription over one list query.
///
/// The first subscriber triggers the initial load and starts the refresh
/// task. Once the last receiver is dropped the task stops, and the next
/// subscriber starts a fresh one.
pub(super) struct SharedLiveList<T> {
    slot: Mutex<Option<Arc<watch::Sender<Vec<T>>>>>,
}

impl<T> SharedLiveList<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(super) fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    pub(super) async fn subscribe<F>(
        &self,
        store: &Store,
        tables: &'static [Table],
        query: F,
    ) -> DomainResult<watch::Receiver<Vec<T>>>
    where
        F: Fn(&Connection) -> DomainResult<Vec<T>> + Send + Sync + 'static,
    {
        let mut slot = self.slot.lock().await;

        if let Some(tx) = slot.as_ref() {
            // is_closed means every receiver is gone and the refresh task has
            // stopped (or is about to); a live channel is shared as-is
            if !tx.is_closed() {
                return Ok(tx.subscribe());
            }
            log::debug!("shared live list deactivated, restarting");
        }

        let changes = store.subscribe_changes();
        let initial = run_query(store, &query).await?;
        let (tx, rx) = watch::channel(initial);
        let tx = Arc::new(tx);
        *slot = Some(Arc::clone(&tx));
        tokio::spawn(refresh_loop(store.clone(), tables, query, tx, changes));
        Ok(rx)
    }
}

async fn refresh_loop<T, F>(
    store: Store,
    tables: &'static [Table],
    query: F,
    tx: Arc<watch::Sender<Vec<T>>>,
    mut changes: broadcast::Receiver<Table>,
) where
    T: Clone + Send + Sync + 'static,
    F: Fn(&Connection) -> DomainResult<Vec<T>> + Send + Sync + 'static,
{
    loop {
        let relevant = tokio::select! {
            // Last subscriber went away
            _ = tx.closed() => break,
            changed = changes.recv() => match changed {
                Ok(table) => tables.contains(&table),
                // Missed events coalesce into a single refresh
                Err(RecvError::Lagged(_)) => true,
                Err(RecvError::Closed) => break,
            },
        };
        if !relevant {
            continue;
        }
        match run_query(&store, &query).await {
            Ok(snapshot) => {
                if tx.send(snapshot).is_err() {
                    break;
                }
            }
            Err(e) => {
                log::warn!("live query refresh failed, terminating stream: {}", e);
                break;
            }
        }
    }
}

async fn run_query<T, F>(store: &Store, query: &F) -> DomainResult<Vec<T>>
where
    F: Fn(&Connection) -> DomainResult<Vec<T>>,
{
    let guard = store.conn.lock().await;
    let conn = guard
        .as_ref()
        .ok_or_else(|| DomainError::Storage("Database not initialized".to_string()))?;
    query(conn)
}
