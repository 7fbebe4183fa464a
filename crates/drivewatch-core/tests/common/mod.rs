//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal test doubles that record how the engine and
//! notifier use their collaborators.

#![allow(dead_code)]

use drivewatch_core::error::{FetchError, SendError};
use drivewatch_core::traits::{ItemSet, ItemSnapshotSource, MessageSender, SendReceipt};
use drivewatch_core::{EngineSettings, MonitorEngine, MonitorEvent, Notifier};
use drivewatch_core::notifier::AlertRoute;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::fmt::MakeWriter;

/// Build an item set from string slices
pub fn items(names: &[&str]) -> ItemSet {
    names.iter().map(|s| s.to_string()).collect()
}

/// A snapshot source that replays scripted results
///
/// Once the script runs out, the last successful snapshot is repeated.
pub struct ScriptedSource {
    script: Arc<Mutex<VecDeque<Result<ItemSet, FetchError>>>>,
    last: Arc<Mutex<ItemSet>>,
    call_count: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<ItemSet, FetchError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            last: Arc::new(Mutex::new(ItemSet::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source that always reports the same items
    pub fn constant(names: &[&str]) -> Self {
        Self::new(vec![Ok(items(names))])
    }

    /// Get the number of times snapshot() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Create a new ScriptedSource that shares state with an existing one
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            script: Arc::clone(&other.script),
            last: Arc::clone(&other.last),
            call_count: Arc::clone(&other.call_count),
        }
    }
}

#[async_trait::async_trait]
impl ItemSnapshotSource for ScriptedSource {
    async fn snapshot(&self) -> Result<ItemSet, FetchError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(snapshot)) => {
                *self.last.lock().unwrap() = snapshot.clone();
                Ok(snapshot)
            }
            Some(Err(e)) => Err(e),
            None => Ok(self.last.lock().unwrap().clone()),
        }
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// A message sender that records every message it is given
pub struct RecordingSender {
    name: &'static str,
    sent: Arc<Mutex<Vec<String>>>,
    fail_with: Option<SendError>,
}

impl RecordingSender {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            sent: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    /// A sender that records the attempt and then fails
    pub fn failing(name: &'static str, error: SendError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::new(name)
        }
    }

    /// Messages passed to send(), in order
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    /// Get the number of times send() was called
    pub fn send_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Create a new RecordingSender that shares its log with an existing one
    pub fn sharing_log_with(other: &Self) -> Self {
        Self {
            name: other.name,
            sent: Arc::clone(&other.sent),
            fail_with: other.fail_with.clone(),
        }
    }
}

#[async_trait::async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, text: &str) -> Result<SendReceipt, SendError> {
        self.sent.lock().unwrap().push(text.to_string());
        match &self.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(SendReceipt::with_id(format!("{}-{}", self.name, self.send_count()))),
        }
    }

    fn sender_name(&self) -> &'static str {
        self.name
    }
}

/// Alert and status senders plus a notifier wired to them
pub struct Wiring {
    pub alerts: RecordingSender,
    pub status: RecordingSender,
}

impl Wiring {
    pub fn new() -> Self {
        Self {
            alerts: RecordingSender::new("twilio"),
            status: RecordingSender::new("telegram"),
        }
    }

    pub fn notifier(&self) -> Notifier {
        Notifier::new(
            AlertRoute::Sender(Box::new(RecordingSender::sharing_log_with(&self.alerts))),
            Box::new(RecordingSender::sharing_log_with(&self.status)),
        )
    }
}

/// Settings with a short poll interval for tests
pub fn fast_settings() -> EngineSettings {
    EngineSettings::new("https://drive.example/share", Duration::from_millis(10))
}

/// Build an engine around a scripted source and recording senders
pub fn engine_with(
    source: &ScriptedSource,
    wiring: &Wiring,
    settings: EngineSettings,
) -> (MonitorEngine, mpsc::Receiver<MonitorEvent>) {
    MonitorEngine::new(
        Box::new(ScriptedSource::sharing_state_with(source)),
        wiring.notifier(),
        settings,
    )
}

/// Drain every event currently buffered in the channel
pub fn drain_events(rx: &mut mpsc::Receiver<MonitorEvent>) -> Vec<MonitorEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// In-memory sink for formatted log records
///
/// Install with `capture()`; records are kept while the guard is alive and
/// the test stays on the current thread.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    pub fn capture() -> (Self, tracing::subscriber::DefaultGuard) {
        let logs = Self::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (logs, guard)
    }

    /// Formatted records at the given level, e.g. "ERROR"
    pub fn at_level(&self, level: &str) -> Vec<String> {
        let text = String::from_utf8_lossy(&self.buf.lock().unwrap()).to_string();
        let marker = format!(" {} ", level);
        text.lines()
            .filter(|line| line.contains(&marker))
            .map(str::to_string)
            .collect()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
