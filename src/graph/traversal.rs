use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::{HighlightPalette, TraversalTiming};
use crate::errors::{GraphError, Result};
use crate::events::TraversalEvent;
use crate::graph::store::{lock, SharedStore};
use crate::types::*;

/// Parameters of a single traversal run.
#[derive(Debug, Clone, Copy)]
pub struct TraversalRequest {
    pub start: NodeId,
    pub mode: TraversalMode,
    /// Follow only outgoing edges. Applies to every edge alike; the edges'
    /// own `directed` flags are ignored.
    pub directed: bool,
    pub timing: TraversalTiming,
}

/// Outcome of a run once its loop has exited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraversalSummary {
    pub mode: TraversalMode,
    /// Nodes in the order they were marked visited.
    pub order: Vec<NodeId>,
    pub visited_count: usize,
    pub cancelled: bool,
}

/// A traversal in flight: its event stream and the task driving it.
///
/// The event channel closes once nothing more can be emitted for this run,
/// i.e. after `Finished` for a cancelled run and after the deferred
/// `ColorsReset` (or its cancellation) for a completed one.
pub struct TraversalRun {
    pub events: mpsc::UnboundedReceiver<TraversalEvent>,
    task: JoinHandle<TraversalSummary>,
}

impl TraversalRun {
    /// Waits for the next event, or `None` once the stream is closed.
    pub async fn next_event(&mut self) -> Option<TraversalEvent> {
        self.events.recv().await
    }

    /// Drains the event stream until it closes.
    pub async fn collect_events(&mut self) -> Vec<TraversalEvent> {
        let mut collected = Vec::new();
        while let Some(event) = self.events.recv().await {
            collected.push(event);
        }
        collected
    }

    /// Waits for the traversal loop to exit and returns its summary.
    pub async fn finish(self) -> Result<TraversalSummary> {
        self.task.await.map_err(|e| GraphError::Task {
            message: e.to_string(),
        })
    }
}

/// Runs animated BFS/DFS over a shared store, one run at a time.
///
/// Cloning yields another handle onto the same engine, so `stop` can be
/// called from a task other than the one that started the run.
#[derive(Clone)]
pub struct TraversalEngine {
    store: SharedStore,
    palette: Arc<HighlightPalette>,
    running: Arc<AtomicBool>,
    cancel: Arc<Mutex<Option<watch::Sender<bool>>>>,
    pending_reset: Arc<Mutex<Option<JoinHandle<()>>>>,
}

fn slot<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TraversalEngine {
    /// Creates an engine reading from `store` and painting with `palette`.
    pub fn new(store: SharedStore, palette: HighlightPalette) -> Self {
        Self {
            store,
            palette: Arc::new(palette),
            running: Arc::new(AtomicBool::new(false)),
            cancel: Arc::new(Mutex::new(None)),
            pending_reset: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns `true` while a run's loop has not exited.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Starts a run on the current tokio runtime.
    ///
    /// Fails with a validation error if the start node does not exist or a
    /// run is already active; in both cases nothing in the store changes.
    /// A color reset still pending from an earlier run is cancelled.
    pub fn traverse(&self, request: TraversalRequest) -> Result<TraversalRun> {
        if !lock(&self.store).contains_node(request.start) {
            return Err(GraphError::validation(format!(
                "start node {} does not exist",
                request.start
            )));
        }
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(GraphError::validation("traversal is already running"));
        }

        self.abort_pending_reset();
        lock(&self.store).reset_colors();

        let (cancel_tx, cancel_rx) = watch::channel(false);
        *slot(&self.cancel) = Some(cancel_tx);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let walker = Walker {
            store: self.store.clone(),
            palette: self.palette.clone(),
            running: self.running.clone(),
            pending_reset: self.pending_reset.clone(),
            events: events_tx,
            cancel: cancel_rx,
            request,
        };
        let task = tokio::spawn(walker.run());

        Ok(TraversalRun {
            events: events_rx,
            task,
        })
    }

    /// Cancels the active run, if any, and restores every node's color.
    ///
    /// Pending delays of the run are interrupted at once. Returns `true` if
    /// a running traversal was signalled.
    pub fn stop(&self) -> bool {
        let signalled = match slot(&self.cancel).take() {
            Some(tx) if self.is_running() => tx.send(true).is_ok(),
            _ => false,
        };
        self.abort_pending_reset();
        lock(&self.store).reset_colors();
        info!(signalled, "traversal stop requested");
        signalled
    }

    fn abort_pending_reset(&self) {
        if let Some(handle) = slot(&self.pending_reset).take() {
            handle.abort();
        }
    }
}

/// Pending set whose discipline distinguishes BFS from DFS.
///
/// The queue refuses ids it already holds; the stack takes every push and
/// leaves duplicates to be discarded when popped.
enum Frontier {
    Queue(VecDeque<NodeId>),
    Stack(Vec<NodeId>),
}

impl Frontier {
    fn new(mode: TraversalMode) -> Self {
        match mode {
            TraversalMode::Bfs => Frontier::Queue(VecDeque::new()),
            TraversalMode::Dfs => Frontier::Stack(Vec::new()),
        }
    }

    fn next(&mut self) -> Option<NodeId> {
        match self {
            Frontier::Queue(q) => q.pop_front(),
            Frontier::Stack(s) => s.pop(),
        }
    }

    /// Adds a candidate, returning whether it was actually added.
    fn offer(&mut self, id: NodeId) -> bool {
        match self {
            Frontier::Queue(q) => {
                if q.contains(&id) {
                    return false;
                }
                q.push_back(id);
                true
            }
            Frontier::Stack(s) => {
                s.push(id);
                true
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            Frontier::Queue(q) => q.len(),
            Frontier::Stack(s) => s.len(),
        }
    }
}

/// State owned by the spawned task of one run.
struct Walker {
    store: SharedStore,
    palette: Arc<HighlightPalette>,
    running: Arc<AtomicBool>,
    pending_reset: Arc<Mutex<Option<JoinHandle<()>>>>,
    events: mpsc::UnboundedSender<TraversalEvent>,
    cancel: watch::Receiver<bool>,
    request: TraversalRequest,
}

impl Walker {
    async fn run(mut self) -> TraversalSummary {
        let TraversalRequest {
            start,
            mode,
            directed,
            timing,
        } = self.request;
        info!(start, mode = mode.as_str(), directed, "traversal started");

        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut order: Vec<NodeId> = Vec::new();
        let mut frontier = Frontier::new(mode);
        frontier.offer(start);
        let mut cancelled = false;

        loop {
            if *self.cancel.borrow() {
                cancelled = true;
                break;
            }
            let Some(current) = frontier.next() else {
                break;
            };
            if !visited.insert(current) {
                continue;
            }
            order.push(current);

            self.paint(current, Highlight::InProgress);
            self.emit(TraversalEvent::Visiting {
                node_id: current,
                highlight_color: Highlight::InProgress,
            });
            if self.pause(timing.visit_delay).await {
                cancelled = true;
                break;
            }

            self.paint(current, Highlight::Done);
            self.emit(TraversalEvent::Visited {
                node_id: current,
                highlight_color: Highlight::Done,
            });

            let candidates = lock(&self.store).neighbors(current, directed);
            for target in candidates {
                if visited.contains(&target) || !frontier.offer(target) {
                    continue;
                }
                self.paint(target, Highlight::Frontier);
                self.emit(TraversalEvent::Discovered {
                    node_id: target,
                    highlight_color: Highlight::Frontier,
                });
            }

            self.emit(TraversalEvent::Progress {
                visited_count: visited.len(),
                frontier_size: frontier.len(),
            });
            if self.pause(timing.settle_delay).await {
                cancelled = true;
                break;
            }
        }

        let visited_count = visited.len();
        if cancelled {
            lock(&self.store).reset_colors();
            self.emit(TraversalEvent::ColorsReset);
            info!(visited_count, "traversal cancelled");
        } else {
            let handle = tokio::spawn(deferred_reset(
                self.store.clone(),
                self.events.clone(),
                timing.reset_delay,
            ));
            *slot(&self.pending_reset) = Some(handle);
            info!(visited_count, "traversal finished");
        }

        self.running.store(false, Ordering::Release);
        self.emit(TraversalEvent::Finished {
            visited_count,
            cancelled,
        });

        TraversalSummary {
            mode,
            order,
            visited_count,
            cancelled,
        }
    }

    /// Sleeps for `delay` unless cancelled first. Returns `true` on cancel.
    async fn pause(&mut self, delay: Duration) -> bool {
        if *self.cancel.borrow() {
            return true;
        }
        tokio::select! {
            _ = tokio::time::sleep(delay) => *self.cancel.borrow(),
            changed = self.cancel.changed() => changed.is_err() || *self.cancel.borrow(),
        }
    }

    fn paint(&self, node_id: NodeId, highlight: Highlight) {
        let color = self.palette.color_for(highlight, self.request.mode);
        if !lock(&self.store).set_node_color(node_id, color) {
            debug!(node_id, "node vanished during traversal");
        }
    }

    fn emit(&self, event: TraversalEvent) {
        if self.events.send(event).is_err() {
            debug!("traversal event receiver dropped");
        }
    }
}

/// Restores base colors once `delay` has passed after a completed run.
async fn deferred_reset(
    store: SharedStore,
    events: mpsc::UnboundedSender<TraversalEvent>,
    delay: Duration,
) {
    tokio::time::sleep(delay).await;
    lock(&store).reset_colors();
    if events.send(TraversalEvent::ColorsReset).is_err() {
        debug!("traversal event receiver dropped before color reset");
    }
}
