use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::store::Store;
use crate::submission::pipeline::Pipeline;
use crate::worker::BlockingPool;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Config,
    pub pipeline: Pipeline,
    pub blocking_pool: Option<Arc<BlockingPool>>,
}

impl AppState {
    /// Drain notifications, then stop the blocking pool. Both share one
    /// grace period.
    pub async fn shutdown(&self) {
        let grace = self.config.shutdown_grace;
        let started = Instant::now();

        self.pipeline.shutdown(grace).await;

        if let Some(pool) = &self.blocking_pool {
            pool.shutdown(grace.saturating_sub(started.elapsed())).await;
        }
    }
}
