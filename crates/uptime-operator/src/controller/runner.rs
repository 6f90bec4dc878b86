//! Work queue driving the controllers
//!
//! Store notifications and timed requeues feed one queue per controller.
//! A key is queued at most once, never runs twice at the same time, and a
//! notification that arrives mid-pass makes the key run again afterwards.
//! Each pass reschedules its key; only the newest schedule fires.

use super::Controller;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use uptime_operator_core::ObjectKey;

#[derive(Debug, Default)]
struct KeyState {
    queued: bool,
    running: bool,
    dirty: bool,
    /// Generation of the timer allowed to fire
    timer: u64,
}

struct WorkQueue {
    kind: &'static str,
    keys: Mutex<HashMap<ObjectKey, KeyState>>,
    tx: mpsc::UnboundedSender<ObjectKey>,
    generations: AtomicU64,
}

impl WorkQueue {
    fn new(kind: &'static str) -> (Arc<Self>, mpsc::UnboundedReceiver<ObjectKey>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let queue = Arc::new(Self {
            kind,
            keys: Mutex::new(HashMap::new()),
            tx,
            generations: AtomicU64::new(0),
        });
        (queue, rx)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ObjectKey, KeyState>> {
        // A poisoned map only means a pass panicked; the bookkeeping is still usable.
        self.keys.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn enqueue(&self, key: ObjectKey) {
        let mut keys = self.lock();
        let state = keys.entry(key.clone()).or_default();
        if state.running {
            state.dirty = true;
            return;
        }
        if state.queued {
            return;
        }
        state.queued = true;
        drop(keys);
        if self.tx.send(key).is_err() {
            tracing::debug!(kind = self.kind, "work queue closed");
        }
    }

    /// Returns false if the key is already running.
    fn start(&self, key: &ObjectKey) -> bool {
        let mut keys = self.lock();
        let state = keys.entry(key.clone()).or_default();
        state.queued = false;
        if state.running {
            state.dirty = true;
            return false;
        }
        state.running = true;
        true
    }

    /// Mark the pass finished. Returns true if the key must run again now.
    fn finish(&self, key: &ObjectKey) -> bool {
        let mut keys = self.lock();
        let Some(state) = keys.get_mut(key) else {
            return false;
        };
        state.running = false;
        std::mem::take(&mut state.dirty)
    }

    fn forget(&self, key: &ObjectKey) {
        let mut keys = self.lock();
        if let Some(state) = keys.get(key)
            && !state.running
            && !state.queued
            && !state.dirty
        {
            keys.remove(key);
        }
    }

    /// Arm a timer for `key`, superseding any earlier one.
    fn schedule(self: &Arc<Self>, key: ObjectKey, delay: Duration) {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        self.lock().entry(key.clone()).or_default().timer = generation;

        let queue = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let current = queue.lock().get(&key).map(|s| s.timer);
            if current == Some(generation) {
                queue.enqueue(key);
            }
        });
    }
}

/// Runs a set of controllers until shutdown
pub struct ControllerRunner {
    controllers: Vec<Arc<dyn Controller>>,
    max_concurrent: usize,
    retry_delay: Duration,
}

impl ControllerRunner {
    pub fn new(max_concurrent: usize, retry_delay: Duration) -> Self {
        Self {
            controllers: Vec::new(),
            max_concurrent: max_concurrent.max(1),
            retry_delay,
        }
    }

    pub fn with_controller(mut self, controller: Arc<dyn Controller>) -> Self {
        self.controllers.push(controller);
        self
    }

    /// Drive every controller until `shutdown` resolves, then wait for
    /// in-flight passes to finish.
    pub async fn run<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();

        for controller in &self.controllers {
            let (queue, rx) = WorkQueue::new(controller.kind());
            tasks.spawn(watch_loop(Arc::clone(controller), Arc::clone(&queue)));
            tasks.spawn(dispatch_loop(
                Arc::clone(controller),
                queue,
                rx,
                Arc::clone(&semaphore),
                self.retry_delay,
            ));
        }

        tracing::info!(
            controllers = self.controllers.len(),
            max_concurrent = self.max_concurrent,
            "controllers started"
        );

        shutdown.await;
        tracing::info!("shutting down controllers");
        tasks.abort_all();

        let permits = u32::try_from(self.max_concurrent).unwrap_or(u32::MAX);
        if semaphore.acquire_many(permits).await.is_ok() {
            tracing::info!("all in-flight passes finished");
        }
    }
}

async fn watch_loop(controller: Arc<dyn Controller>, queue: Arc<WorkQueue>) {
    // Subscribe before listing so nothing created in between is missed.
    let mut events = controller.watch();
    enqueue_all(controller.as_ref(), &queue).await;

    loop {
        match events.recv().await {
            Ok(key) => queue.enqueue(key),
            Err(RecvError::Lagged(missed)) => {
                tracing::warn!(kind = controller.kind(), missed, "watch lagged, resyncing");
                enqueue_all(controller.as_ref(), &queue).await;
            }
            Err(RecvError::Closed) => break,
        }
    }
}

async fn enqueue_all(controller: &dyn Controller, queue: &WorkQueue) {
    match controller.list_keys().await {
        Ok(keys) => {
            for key in keys {
                queue.enqueue(key);
            }
        }
        Err(e) => tracing::error!(kind = controller.kind(), error = %e, "failed to list objects"),
    }
}

async fn dispatch_loop(
    controller: Arc<dyn Controller>,
    queue: Arc<WorkQueue>,
    mut rx: mpsc::UnboundedReceiver<ObjectKey>,
    semaphore: Arc<Semaphore>,
    retry_delay: Duration,
) {
    while let Some(key) = rx.recv().await {
        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
            break;
        };
        if !queue.start(&key) {
            continue;
        }

        let controller = Arc::clone(&controller);
        let queue = Arc::clone(&queue);
        tokio::spawn(async move {
            let _permit = permit;
            let action = controller.on_notify(&key).await;
            tracing::debug!(kind = controller.kind(), key = %key, %action, "pass finished");

            let again = queue.finish(&key);
            match action.delay(retry_delay) {
                Some(delay) => queue.schedule(key.clone(), delay),
                None if !again => queue.forget(&key),
                None => {}
            }
            if again {
                queue.enqueue(key);
            }
        });
    }
}
