use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub max_body_size: usize,
    pub site_name: String,
    pub notify_timeout: Duration,
    pub max_in_flight_notifications: usize,
    pub shutdown_grace: Duration,
    pub smtp: Option<SmtpConfig>,
    pub sheets: Option<SheetsConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
    pub tls: TlsMode,
    pub recipients: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TlsMode {
    StartTls,
    Tls,
    None,
}

impl TlsMode {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "starttls" => Ok(TlsMode::StartTls),
            "tls" => Ok(TlsMode::Tls),
            "none" => Ok(TlsMode::None),
            other => Err(format!("Invalid INTAKE_SMTP_TLS '{other}' (expected starttls, tls or none)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub credentials_path: PathBuf,
    pub spreadsheet_id: String,
    pub tab: String,
    pub workers: usize,
    pub queue: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;

        let host: IpAddr = env_or("INTAKE_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid INTAKE_HOST: {e}"))?;

        let port: u16 = env_or("INTAKE_PORT", "8001")
            .parse()
            .map_err(|e| format!("Invalid INTAKE_PORT: {e}"))?;

        let log_level = env_or("INTAKE_LOG_LEVEL", "info");

        let max_body_size: usize = env_or("INTAKE_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid INTAKE_MAX_BODY_SIZE: {e}"))?;

        let site_name = env_or("INTAKE_SITE_NAME", "THE BAR.");

        let notify_timeout = Duration::from_secs(
            env_or("INTAKE_NOTIFY_TIMEOUT_SECS", "10")
                .parse()
                .map_err(|e| format!("Invalid INTAKE_NOTIFY_TIMEOUT_SECS: {e}"))?,
        );

        let max_in_flight_notifications: usize = env_or("INTAKE_MAX_IN_FLIGHT_NOTIFICATIONS", "256")
            .parse()
            .map_err(|e| format!("Invalid INTAKE_MAX_IN_FLIGHT_NOTIFICATIONS: {e}"))?;
        if max_in_flight_notifications == 0 {
            return Err("INTAKE_MAX_IN_FLIGHT_NOTIFICATIONS must be at least 1".to_string());
        }

        let shutdown_grace = Duration::from_secs(
            env_or("INTAKE_SHUTDOWN_GRACE_SECS", "10")
                .parse()
                .map_err(|e| format!("Invalid INTAKE_SHUTDOWN_GRACE_SECS: {e}"))?,
        );

        let smtp = match (
            std::env::var("INTAKE_SMTP_HOST").ok(),
            std::env::var("INTAKE_SMTP_PORT").ok(),
            std::env::var("INTAKE_SMTP_USER").ok(),
            std::env::var("INTAKE_SMTP_PASS").ok(),
            std::env::var("INTAKE_SMTP_FROM").ok(),
            std::env::var("INTAKE_NOTIFY_RECIPIENTS").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from), Some(recipients)) => {
                let recipients = parse_list(&recipients);
                if recipients.is_empty() {
                    return Err("INTAKE_NOTIFY_RECIPIENTS must name at least one address".to_string());
                }
                Some(SmtpConfig {
                    host,
                    port: port
                        .parse()
                        .map_err(|e| format!("Invalid INTAKE_SMTP_PORT: {e}"))?,
                    user,
                    pass,
                    from,
                    tls: TlsMode::parse(&env_or("INTAKE_SMTP_TLS", "starttls"))?,
                    recipients,
                })
            }
            _ => None,
        };

        let sheets = match (
            std::env::var("INTAKE_SHEETS_CREDENTIALS_PATH").ok(),
            std::env::var("INTAKE_SHEETS_SPREADSHEET_ID").ok(),
        ) {
            (Some(credentials_path), Some(spreadsheet_id)) => Some(SheetsConfig {
                credentials_path: PathBuf::from(credentials_path),
                spreadsheet_id,
                tab: env_or("INTAKE_SHEETS_TAB", "Sheet1"),
                workers: env_or("INTAKE_SHEETS_WORKERS", "2")
                    .parse()
                    .map_err(|e| format!("Invalid INTAKE_SHEETS_WORKERS: {e}"))?,
                queue: env_or("INTAKE_SHEETS_QUEUE", "16")
                    .parse()
                    .map_err(|e| format!("Invalid INTAKE_SHEETS_QUEUE: {e}"))?,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            host,
            port,
            log_level,
            max_body_size,
            site_name,
            notify_timeout,
            max_in_flight_notifications,
            shutdown_grace,
            smtp,
            sheets,
        })
    }
}

/// Split a comma separated list, dropping blank entries.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
