#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use intake::channels::{ChannelError, ChannelKind, NotificationChannel};
use intake::config::Config;
use intake::db::submissions::{ListParams, SortColumn, SortOrder};
use intake::email::{Mailer, OutgoingEmail};
use intake::models::{ContactSubmission, DeliveryAttempt, StatusCheck};
use intake::sheets::TabularLog;
use intake::state::{AppState, SharedState};
use intake::store::{Store, StoreError};
use intake::submission::fields::{self, ContactForm, ValidatedSubmission};
use intake::submission::pipeline::{Pipeline, PipelineOptions};

// ── Store ───────────────────────────────────────────────────────

/// In-memory store. `fail_writes` makes every write report the store as unavailable.
#[derive(Default)]
pub struct MemoryStore {
    submissions: Mutex<Vec<ContactSubmission>>,
    attempts: Mutex<Vec<DeliveryAttempt>>,
    status_checks: Mutex<Vec<StatusCheck>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn submissions(&self) -> Vec<ContactSubmission> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> Vec<DeliveryAttempt> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn attempts_for(&self, submission_id: Uuid) -> Vec<DeliveryAttempt> {
        self.attempts()
            .into_iter()
            .filter(|a| a.submission_id == submission_id)
            .collect()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("store offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_submission(&self, submission: &ContactSubmission) -> Result<ContactSubmission, StoreError> {
        self.check_writable()?;
        self.submissions.lock().unwrap().push(submission.clone());
        Ok(submission.clone())
    }

    async fn list_submissions(&self, params: &ListParams) -> Result<Vec<ContactSubmission>, StoreError> {
        let mut items = self.submissions();
        items.sort_by(|a, b| {
            let ord = match params.sort_by {
                SortColumn::CreatedAt => a.created_at.cmp(&b.created_at),
                SortColumn::Name => a.name.cmp(&b.name),
            }
            .then(a.id.cmp(&b.id));
            match params.sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
        items.truncate(params.limit.max(0) as usize);
        Ok(items)
    }

    async fn record_attempt(&self, attempt: &DeliveryAttempt) -> Result<(), StoreError> {
        self.check_writable()?;
        self.attempts.lock().unwrap().push(attempt.clone());
        Ok(())
    }

    async fn list_attempts(&self, submission_id: Uuid) -> Result<Vec<DeliveryAttempt>, StoreError> {
        Ok(self.attempts_for(submission_id))
    }

    async fn insert_status_check(&self, check: &StatusCheck) -> Result<(), StoreError> {
        self.check_writable()?;
        self.status_checks.lock().unwrap().push(check.clone());
        Ok(())
    }

    async fn list_status_checks(&self, limit: i64) -> Result<Vec<StatusCheck>, StoreError> {
        let mut checks = self.status_checks.lock().unwrap().clone();
        checks.truncate(limit.max(0) as usize);
        Ok(checks)
    }
}

// ── Channels ────────────────────────────────────────────────────

#[derive(Clone)]
pub enum Behavior {
    Succeed,
    Fail(String),
    Panic,
}

/// Scriptable channel. Each delivery sleeps for `delay`, then behaves as
/// scripted for that submission's name (or the default behavior).
pub struct FakeChannel {
    kind: ChannelKind,
    delay: Duration,
    default_behavior: Behavior,
    per_name: Mutex<Vec<(String, Behavior)>>,
    calls: AtomicUsize,
    delivered: Mutex<Vec<Uuid>>,
}

impl FakeChannel {
    pub fn new(kind: ChannelKind) -> Arc<Self> {
        Self::with(kind, Duration::ZERO, Behavior::Succeed)
    }

    pub fn with(kind: ChannelKind, delay: Duration, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            kind,
            delay,
            default_behavior: behavior,
            per_name: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delivered: Mutex::new(Vec::new()),
        })
    }

    /// Override the behavior for submissions with this name.
    pub fn script(&self, name: &str, behavior: Behavior) {
        self.per_name.lock().unwrap().push((name.to_string(), behavior));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn delivered(&self) -> Vec<Uuid> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationChannel for FakeChannel {
    fn kind(&self) -> ChannelKind {
        self.kind
    }

    async fn deliver(&self, submission: &ContactSubmission) -> Result<(), ChannelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let behavior = self
            .per_name
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| *name == submission.name)
            .map(|(_, b)| b.clone())
            .unwrap_or_else(|| self.default_behavior.clone());

        match behavior {
            Behavior::Succeed => {
                self.delivered.lock().unwrap().push(submission.id);
                Ok(())
            }
            Behavior::Fail(reason) => Err(ChannelError::from(reason)),
            Behavior::Panic => panic!("channel exploded"),
        }
    }
}

/// Records outgoing mail instead of sending it.
#[derive(Default)]
pub struct FakeMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail_with: Option<String>,
}

impl FakeMailer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Some(reason.to_string()),
        })
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), String> {
        if let Some(reason) = &self.fail_with {
            return Err(reason.clone());
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// Synchronous spreadsheet double. Records each row with the name of the
/// thread that appended it. A delay that would overrun the deadline behaves
/// like a request timeout: it waits until the deadline and appends nothing.
#[derive(Default)]
pub struct FakeSheet {
    rows: Mutex<Vec<(Vec<String>, Option<String>)>>,
    delay: Duration,
    fail_with: Option<String>,
}

impl FakeSheet {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Self::default()
        })
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            fail_with: Some(reason.to_string()),
            ..Self::default()
        })
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().unwrap().iter().map(|(r, _)| r.clone()).collect()
    }

    pub fn appended(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn threads(&self) -> Vec<Option<String>> {
        self.rows.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
    }
}

impl TabularLog for FakeSheet {
    fn append_row(&self, cells: &[String], deadline: std::time::Instant) -> Result<(), String> {
        let left = deadline.saturating_duration_since(std::time::Instant::now());
        if self.delay > left {
            std::thread::sleep(left);
            return Err("operation timed out".to_string());
        }
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if let Some(reason) = &self.fail_with {
            return Err(reason.clone());
        }
        let thread = std::thread::current().name().map(str::to_string);
        self.rows.lock().unwrap().push((cells.to_vec(), thread));
        Ok(())
    }
}

// ── Fixtures ────────────────────────────────────────────────────

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        log_level: "warn".to_string(),
        max_body_size: 65_536,
        site_name: "THE BAR.".to_string(),
        notify_timeout: Duration::from_secs(10),
        max_in_flight_notifications: 64,
        shutdown_grace: Duration::from_secs(5),
        smtp: None,
        sheets: None,
    }
}

pub fn jana_form() -> ContactForm {
    ContactForm {
        name: "Jana Novak".to_string(),
        email: "jana@example.com".to_string(),
        phone: "+420777000111".to_string(),
        service: "wedding".to_string(),
        message: "Need 80 cocktails".to_string(),
    }
}

pub fn form_named(name: &str) -> ContactForm {
    ContactForm {
        name: name.to_string(),
        ..jana_form()
    }
}

pub fn validated(form: ContactForm) -> ValidatedSubmission {
    fields::validate(form).expect("fixture form should validate")
}

pub fn jana_json() -> Value {
    json!({
        "name": "Jana Novak",
        "email": "jana@example.com",
        "phone": "+420777000111",
        "service": "wedding",
        "message": "Need 80 cocktails"
    })
}

pub fn pipeline_with(
    store: Arc<MemoryStore>,
    channels: Vec<Arc<dyn NotificationChannel>>,
    max_in_flight: usize,
) -> Pipeline {
    Pipeline::new(
        store,
        channels,
        PipelineOptions {
            timeout: Duration::from_secs(10),
            max_in_flight,
        },
    )
}

/// Poll until `count` attempts exist for the submission or the deadline passes.
pub async fn wait_for_attempts(
    store: &MemoryStore,
    submission_id: Uuid,
    count: usize,
) -> Vec<DeliveryAttempt> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let attempts = store.attempts_for(submission_id);
        if attempts.len() >= count || tokio::time::Instant::now() >= deadline {
            return attempts;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

pub fn attempt_for<'a>(attempts: &'a [DeliveryAttempt], channel: ChannelKind) -> &'a DeliveryAttempt {
    attempts
        .iter()
        .find(|a| a.channel == channel.as_str())
        .unwrap_or_else(|| panic!("no {channel} attempt in {attempts:?}"))
}

// ── HTTP ────────────────────────────────────────────────────────

/// A running test server backed by an in-memory store and fake channels.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<MemoryStore>,
    pub email: Arc<FakeChannel>,
    pub sheet: Arc<FakeChannel>,
    pub state: SharedState,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn submit_contact(&self, body: &Value) -> (Value, StatusCode) {
        self.post("/api/contact-form", body).await
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(
        FakeChannel::new(ChannelKind::Email),
        FakeChannel::new(ChannelKind::TabularLog),
    )
    .await
}

pub async fn spawn_app_with(email: Arc<FakeChannel>, sheet: Arc<FakeChannel>) -> TestApp {
    let store = MemoryStore::new();
    let config = test_config();

    let pipeline = Pipeline::new(
        store.clone(),
        vec![
            email.clone() as Arc<dyn NotificationChannel>,
            sheet.clone() as Arc<dyn NotificationChannel>,
        ],
        PipelineOptions::from_config(&config),
    );

    let state: SharedState = Arc::new(AppState {
        store: store.clone(),
        config,
        pipeline,
        blocking_pool: None,
    });

    let app = intake::build_app(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::new(),
        store,
        email,
        sheet,
        state,
    }
}
