// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broadcast hub: periodic fan-out of registry snapshots to dashboard observers.
//!
//! Every tick the hub serializes one [`Registry::snapshot`] and pushes it to
//! all connected observers concurrently. Each push is bounded by the push
//! timeout and reports its own result; a failed observer is dropped from the
//! live set and must reconnect. Missed ticks are not buffered.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::registry::Registry;

/// Future returned by [`Observer::push`].
pub type PushFuture<'a> = Pin<Box<dyn Future<Output = Result<(), PushError>> + Send + 'a>>;

/// A live subscriber to fleet snapshots.
///
/// Object-safe for use as `Arc<dyn Observer>`.
pub trait Observer: Send + Sync + 'static {
    /// Deliver one serialized snapshot.
    fn push(&self, frame: Arc<str>) -> PushFuture<'_>;

    /// Called once the hub has dropped this observer from the live set, by
    /// replacement, disconnect, detach or a failed push. The owner of the
    /// underlying connection should close it.
    fn on_removed(&self) {}
}

/// Why a push to one observer failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushError {
    /// The snapshot could not be serialized.
    Encode(String),
    /// The underlying connection returned an error.
    Transport(String),
    /// The connection is already closed.
    Closed,
    /// The push did not finish within the push timeout.
    Timeout(Duration),
}

impl fmt::Display for PushError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(e) => write!(f, "encode failed: {e}"),
            Self::Transport(e) => write!(f, "transport error: {e}"),
            Self::Closed => f.write_str("connection closed"),
            Self::Timeout(after) => write!(f, "timed out after {}ms", after.as_millis()),
        }
    }
}

impl std::error::Error for PushError {}

/// Identifies one particular connection registered under an observer id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverTicket {
    pub id: String,
    pub generation: u64,
}

/// Per-tick delivery outcome.
#[derive(Debug, Default)]
pub struct TickReport {
    pub delivered: usize,
    pub dropped: Vec<(String, PushError)>,
}

struct Slot {
    generation: u64,
    observer: Arc<dyn Observer>,
}

/// Owns the set of live observers and fans snapshots out to them.
pub struct BroadcastHub {
    observers: RwLock<HashMap<String, Slot>>,
    next_generation: AtomicU64,
    push_timeout: Duration,
}

impl BroadcastHub {
    pub fn new(push_timeout: Duration) -> Self {
        Self {
            observers: RwLock::new(HashMap::new()),
            next_generation: AtomicU64::new(0),
            push_timeout,
        }
    }

    /// Register `observer` under `id`. An existing observer with the same id
    /// is replaced (last connect wins).
    pub fn connect(&self, id: &str, observer: Arc<dyn Observer>) -> ObserverTicket {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let replaced = self.observers.write().insert(id.to_owned(), Slot { generation, observer });
        tracing::info!(observer = %id, replaced = replaced.is_some(), "observer connected");
        if let Some(old) = replaced {
            old.observer.on_removed();
        }
        ObserverTicket { id: id.to_owned(), generation }
    }

    /// Remove the observer registered under `id`, whichever connection it is.
    /// Unknown ids are ignored. Returns whether an observer was removed.
    pub fn disconnect(&self, id: &str) -> bool {
        let removed = self.observers.write().remove(id);
        match removed {
            Some(slot) => {
                tracing::info!(observer = %id, "observer disconnected");
                slot.observer.on_removed();
                true
            }
            None => false,
        }
    }

    /// Remove the connection identified by `ticket`, unless it has already
    /// been replaced by a newer connection under the same id.
    pub fn detach(&self, ticket: &ObserverTicket) -> bool {
        let removed = self.remove_if_current(&ticket.id, ticket.generation);
        if removed {
            tracing::info!(observer = %ticket.id, "observer disconnected");
        }
        removed
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }

    /// Ids of all live observers, sorted.
    pub fn observer_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.observers.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Serialize the current registry snapshot and push it to every observer.
    pub async fn tick(&self, registry: &Registry) -> TickReport {
        let frame = serde_json::to_string(&registry.snapshot())
            .map(Arc::<str>::from)
            .map_err(|e| PushError::Encode(e.to_string()));
        self.fan_out(frame).await
    }

    async fn fan_out(&self, frame: Result<Arc<str>, PushError>) -> TickReport {
        let targets: Vec<(String, u64, Arc<dyn Observer>)> = self
            .observers
            .read()
            .iter()
            .map(|(id, slot)| (id.clone(), slot.generation, Arc::clone(&slot.observer)))
            .collect();

        let timeout = self.push_timeout;
        let results = join_all(targets.into_iter().map(|(id, generation, observer)| {
            let frame = frame.clone();
            async move {
                let result = match frame {
                    Ok(frame) => tokio::time::timeout(timeout, observer.push(frame))
                        .await
                        .unwrap_or(Err(PushError::Timeout(timeout))),
                    Err(e) => Err(e),
                };
                (id, generation, result)
            }
        }))
        .await;

        let mut report = TickReport::default();
        for (id, generation, result) in results {
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    // A newer connection under the same id stays registered.
                    let removed = self.remove_if_current(&id, generation);
                    tracing::warn!(observer = %id, err = %e, removed, "push failed, dropping observer");
                    report.dropped.push((id, e));
                }
            }
        }
        report
    }

    fn remove_if_current(&self, id: &str, generation: u64) -> bool {
        let removed = {
            let mut observers = self.observers.write();
            match observers.get(id) {
                Some(slot) if slot.generation == generation => observers.remove(id),
                _ => None,
            }
        };
        match removed {
            Some(slot) => {
                slot.observer.on_removed();
                true
            }
            None => false,
        }
    }
}

/// Spawn the periodic broadcaster that drives [`BroadcastHub::tick`].
pub fn spawn_broadcaster(
    hub: Arc<BroadcastHub>,
    registry: Arc<Registry>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = timer.tick() => {}
            }

            let report = hub.tick(&registry).await;
            tracing::trace!(
                delivered = report.delivered,
                dropped = report.dropped.len(),
                "dashboard broadcast"
            );
        }
    })
}

/// Wait for the broadcaster to finish. A panicked or aborted task is logged
/// and reported as `false`; shutdown proceeds either way.
pub async fn join_broadcaster(handle: JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(err = %e, "broadcaster task failed");
            false
        }
    }
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
