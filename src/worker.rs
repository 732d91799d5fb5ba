use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{oneshot, watch, Semaphore};

/// A dedicated Tokio runtime on its own OS thread, used only to run
/// synchronous client calls. Its blocking threads are bounded and never
/// shared with request handling.
///
/// Jobs hold a slot from submission until they finish, even when the caller
/// stops waiting, so a stalled target fills the pool and further jobs are
/// refused instead of piling up.
pub struct BlockingPool {
    name: String,
    handle: Handle,
    slots: Arc<Semaphore>,
    capacity: usize,
    shutdown: watch::Sender<Option<Duration>>,
    closed: AtomicBool,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl BlockingPool {
    /// Start the pool. Threads are named after `name`; at most `threads`
    /// blocking jobs run at once and at most `queue` more wait for a thread.
    pub async fn start(name: &str, threads: usize, queue: usize) -> Result<Self, String> {
        let threads = threads.max(1);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(None::<Duration>);
        let (handle_tx, handle_rx) = oneshot::channel::<Result<Handle, String>>();
        let pool_name = name.to_string();

        let thread = std::thread::Builder::new()
            .name(format!("{name}-pool"))
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(1)
                    .max_blocking_threads(threads)
                    .thread_name(pool_name.clone())
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = handle_tx.send(Err(format!("Failed to build {pool_name} runtime: {e}")));
                        return;
                    }
                };

                let _ = handle_tx.send(Ok(runtime.handle().clone()));
                tracing::info!("{pool_name} pool started ({threads} threads, queue {queue})");

                // Returns once shutdown is signaled or the pool is dropped.
                let grace = runtime.block_on(async {
                    let _ = shutdown_rx.changed().await;
                    let grace = *shutdown_rx.borrow();
                    grace.unwrap_or(Duration::ZERO)
                });

                runtime.shutdown_timeout(grace);
                tracing::info!("{pool_name} pool stopped");
            })
            .map_err(|e| format!("Failed to spawn {name} pool thread: {e}"))?;

        let handle = handle_rx
            .await
            .map_err(|_| format!("{name} pool thread exited during startup"))??;

        let capacity = threads + queue;
        Ok(Self {
            name: name.to_string(),
            handle,
            slots: Arc::new(Semaphore::new(capacity)),
            capacity,
            shutdown: shutdown_tx,
            closed: AtomicBool::new(false),
            thread: Mutex::new(Some(thread)),
        })
    }

    /// Jobs currently running or waiting for a thread.
    pub fn pending(&self) -> usize {
        self.capacity.saturating_sub(self.slots.available_permits())
    }

    /// Run a blocking job on the pool and wait for it without blocking the
    /// caller's runtime. Fails immediately when the pool is full or shut down.
    pub async fn run<F, T>(&self, job: F) -> Result<T, String>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        if self.closed.load(Ordering::SeqCst) {
            return Err(format!("{} pool is shut down", self.name));
        }

        let slot = Arc::clone(&self.slots).try_acquire_owned().map_err(|_| {
            format!(
                "{} pool is full ({} jobs running or queued)",
                self.name, self.capacity
            )
        })?;

        self.handle
            .spawn_blocking(move || {
                let result = job();
                drop(slot);
                result
            })
            .await
            .map_err(|e| {
                if e.is_panic() {
                    format!("{} job panicked", self.name)
                } else {
                    format!("{} job cancelled: pool is shutting down", self.name)
                }
            })
    }

    /// Stop accepting jobs, give running ones up to `grace` to finish, then
    /// wait for the pool thread to exit.
    pub async fn shutdown(&self, grace: Duration) {
        self.closed.store(true, Ordering::SeqCst);
        let _ = self.shutdown.send(Some(grace));

        let thread = match self.thread.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };

        if let Some(thread) = thread {
            if tokio::task::spawn_blocking(move || thread.join()).await.is_err() {
                tracing::warn!("{} pool thread did not exit cleanly", self.name);
            }
        }
    }
}
