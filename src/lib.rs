pub mod channels;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod models;
pub mod routes;
pub mod sheets;
pub mod state;
pub mod store;
pub mod submission;
pub mod worker;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::channels::email::EmailChannel;
use crate::channels::sheet::SheetChannel;
use crate::channels::NotificationChannel;
use crate::config::{Config, SheetsConfig};
use crate::email::SmtpMailer;
use crate::sheets::GoogleSheets;
use crate::state::{AppState, SharedState};
use crate::store::Store;
use crate::submission::pipeline::{Pipeline, PipelineOptions};
use crate::worker::BlockingPool;

/// Construct the notification channels and the pipeline. A channel whose
/// configuration is missing or unusable is left out with a warning.
pub async fn build_state(store: Arc<dyn Store>, config: Config) -> SharedState {
    let mut channels: Vec<Arc<dyn NotificationChannel>> = Vec::new();

    match &config.smtp {
        Some(smtp) => match SmtpMailer::new(smtp, config.notify_timeout) {
            Ok(mailer) => {
                tracing::info!("Email notifications enabled ({} recipients)", smtp.recipients.len());
                channels.push(Arc::new(EmailChannel::new(
                    Arc::new(mailer),
                    smtp.recipients.clone(),
                    config.site_name.clone(),
                )));
            }
            Err(e) => tracing::warn!("Email notifications disabled: {e}"),
        },
        None => tracing::warn!("Email notifications disabled: SMTP not configured"),
    }

    let mut blocking_pool = None;
    match &config.sheets {
        Some(sheets) => match start_sheets(sheets, config.notify_timeout).await {
            Ok((channel, pool)) => {
                tracing::info!("Spreadsheet log enabled (tab '{}')", sheets.tab);
                channels.push(Arc::new(channel));
                blocking_pool = Some(pool);
            }
            Err(e) => tracing::warn!("Spreadsheet log disabled: {e}"),
        },
        None => tracing::warn!("Spreadsheet log disabled: Sheets not configured"),
    }

    let pipeline = Pipeline::new(
        Arc::clone(&store),
        channels,
        PipelineOptions::from_config(&config),
    );

    Arc::new(AppState {
        store,
        config,
        pipeline,
        blocking_pool,
    })
}

async fn start_sheets(
    config: &SheetsConfig,
    timeout: Duration,
) -> Result<(SheetChannel, Arc<BlockingPool>), String> {
    let pool = Arc::new(BlockingPool::start("tabular-log", config.workers, config.queue).await?);

    // The blocking HTTP client must be built off the async runtime.
    let sheets_config = config.clone();
    let client = match pool
        .run(move || GoogleSheets::new(&sheets_config, timeout))
        .await
        .and_then(|built| built)
    {
        Ok(client) => client,
        Err(e) => {
            pool.shutdown(Duration::ZERO).await;
            return Err(e);
        }
    };

    Ok((SheetChannel::new(Arc::new(client), Arc::clone(&pool), timeout), pool))
}

pub fn build_app(state: SharedState) -> Router {
    let max_body_size = state.config.max_body_size;

    Router::new()
        .merge(routes::api_routes())
        .route("/health", axum::routing::get(health))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
