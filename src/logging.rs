use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// 로그를 남긴 엔진 구성 요소
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Component {
    Classifier,
    Detector,
    Transformer,
    Coordinator,
    Discovery,
    Writer,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Component::Classifier => "classifier",
            Component::Detector => "detector",
            Component::Transformer => "transformer",
            Component::Coordinator => "coordinator",
            Component::Discovery => "discovery",
            Component::Writer => "writer",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub component: Component,
    pub message: String,
    pub path: Option<String>,
    pub payload: Option<serde_json::Value>,
}

impl LogRecord {
    pub fn new(level: LogLevel, component: Component, message: impl Into<String>) -> Self {
        Self {
            level,
            component,
            message: message.into(),
            path: None,
            payload: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// 엔진 구성 요소에 주입되는 로그 출력 대상
pub trait MigrationLogger: Send + Sync {
    fn log(&self, record: LogRecord);

    fn debug(&self, component: Component, message: &str) {
        self.log(LogRecord::new(LogLevel::Debug, component, message));
    }

    fn info(&self, component: Component, message: &str) {
        self.log(LogRecord::new(LogLevel::Info, component, message));
    }

    fn warn(&self, component: Component, message: &str) {
        self.log(LogRecord::new(LogLevel::Warn, component, message));
    }
}

pub type SharedLogger = Arc<dyn MigrationLogger>;

/// tracing 이벤트로 그대로 내보낸다
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl MigrationLogger for TracingLogger {
    fn log(&self, record: LogRecord) {
        let component = record.component.to_string();
        let path = record.path.as_deref().unwrap_or("");
        let payload = record
            .payload
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_default();

        match record.level {
            LogLevel::Debug => {
                tracing::debug!(component = %component, path, payload = %payload, "{}", record.message)
            }
            LogLevel::Info => {
                tracing::info!(component = %component, path, payload = %payload, "{}", record.message)
            }
            LogLevel::Warn => {
                tracing::warn!(component = %component, path, payload = %payload, "{}", record.message)
            }
            LogLevel::Error => {
                tracing::error!(component = %component, path, payload = %payload, "{}", record.message)
            }
        }
    }
}

/// 기록을 메모리에 쌓아두는 로거 (테스트, 경고 집계용)
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn count_at_least(&self, level: LogLevel) -> usize {
        self.records().iter().filter(|r| r.level >= level).count()
    }
}

impl MigrationLogger for MemoryLogger {
    fn log(&self, record: LogRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }
}

/// 메모리에 쌓으면서 tracing에도 흘려보낸다
#[derive(Debug, Default)]
pub struct TeeLogger {
    memory: MemoryLogger,
}

impl TeeLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn memory(&self) -> &MemoryLogger {
        &self.memory
    }
}

impl MigrationLogger for TeeLogger {
    fn log(&self, record: LogRecord) {
        TracingLogger.log(record.clone());
        self.memory.log(record);
    }
}

/// tracing-subscriber 초기화 (`RUST_LOG`이 있으면 우선)
pub fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "ng_migrator=debug" } else { "ng_migrator=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
