//! Background work for the controller.
//!
//! The controller never blocks on the database. It returns [`Task`] descriptors,
//! and the [`Scheduler`] runs them on the tokio runtime and posts the outcome
//! back to the event queue.

use super::details::SelectionTag;
use super::events::Event;
use super::scanner;
use crate::metadata::{EntityPath, KeyspaceMetadata, MetadataSource};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// Work requested by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Build tree entries, from `snapshot` when given or from a fresh fetch.
    Scan {
        generation: u64,
        snapshot: Option<KeyspaceMetadata>,
    },
    /// Load the rows behind one entity.
    FetchDetails {
        tag: SelectionTag,
        entity: EntityPath,
    },
}

pub struct Scheduler {
    runtime: Handle,
    source: Arc<dyn MetadataSource>,
    tx: Sender<Event>,
}

impl Scheduler {
    #[must_use]
    pub fn new(runtime: Handle, source: Arc<dyn MetadataSource>, tx: Sender<Event>) -> Self {
        Self {
            runtime,
            source,
            tx,
        }
    }

    pub fn submit_all(&self, tasks: impl IntoIterator<Item = Task>) {
        for task in tasks {
            self.submit(task);
        }
    }

    /// Spawn one task. Its result arrives later as an [`Event`].
    pub fn submit(&self, task: Task) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        debug!(?task, "submitting task");
        self.runtime.spawn(async move {
            let event = run(source.as_ref(), task).await;
            if tx.send(event).is_err() {
                debug!("event loop gone, dropping task result");
            }
        });
    }
}

/// Execute a task to completion.
pub async fn run(source: &dyn MetadataSource, task: Task) -> Event {
    match task {
        Task::Scan {
            generation,
            snapshot,
        } => {
            let result = match snapshot {
                Some(meta) => Ok(meta),
                None => source.fetch_keyspace_metadata().await,
            };
            if let Err(e) = &result {
                warn!(generation, error = %e, "scan failed");
            }
            Event::ScanFinished {
                generation,
                result: result.map(|meta| scanner::entries(&meta)),
            }
        }
        Task::FetchDetails { tag, entity } => {
            let result = source.fetch_rows(&entity).await;
            if let Err(e) = &result {
                warn!(%entity, error = %e, "details fetch failed");
            }
            Event::DetailsFetched { tag, result }
        }
    }
}
