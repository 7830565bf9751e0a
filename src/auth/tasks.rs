// Task queue owned by a state container

use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Decrements the in-flight count when its task finishes or is aborted
struct InFlight(Arc<watch::Sender<usize>>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.send_modify(|count| *count -= 1);
    }
}

/// Tracks the tasks a container spawned so they end with it
#[derive(Debug)]
pub struct TaskQueue {
    handles: Mutex<Vec<JoinHandle<()>>>,
    in_flight: Arc<watch::Sender<usize>>,
}

impl Default for TaskQueue {
    fn default() -> Self {
        let (in_flight, _) = watch::channel(0);
        Self {
            handles: Mutex::new(Vec::new()),
            in_flight: Arc::new(in_flight),
        }
    }
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn onto the current tokio runtime; returns immediately
    pub fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.in_flight.send_modify(|count| *count += 1);
        let guard = InFlight(Arc::clone(&self.in_flight));
        let handle = tokio::spawn(async move {
            let _guard = guard;
            fut.await;
        });

        let mut handles = self.handles.lock();
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Number of tasks that have not finished yet
    pub fn pending(&self) -> usize {
        *self.in_flight.borrow()
    }

    /// Wait until every queued task, including ones queued meanwhile, has finished
    ///
    /// Handles stay queued while waiting, so [`TaskQueue::shutdown`] can still abort them.
    pub async fn settle(&self) {
        let mut in_flight = self.in_flight.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = in_flight.wait_for(|count| *count == 0).await;
    }

    /// Abort every queued task without waiting
    pub fn shutdown(&self) {
        for handle in self.handles.lock().drain(..) {
            handle.abort();
        }
    }
}

impl Drop for TaskQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}
