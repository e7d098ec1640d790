use super::{Platform, PlatformError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One side effect observed by [`RecordingPlatform`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    Debug(String),
    Info(String),
    Warning(String),
    Error(String),
    GroupStart(String),
    GroupEnd,
    Failed(String),
    Export { name: String, value: String },
    AddPath(PathBuf),
}

/// In-memory platform for tests
///
/// Inputs and state are served from maps; everything written is recorded in
/// order. Exports and path additions are recorded only and never touch the
/// process environment.
#[derive(Default)]
pub struct RecordingPlatform {
    inputs: HashMap<String, String>,
    state: HashMap<String, String>,
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, name: &str, value: &str) -> Self {
        self.inputs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_state(mut self, name: &str, value: &str) -> Self {
        self.state.insert(name.to_string(), value.to_string());
        self
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    fn record(&self, entry: LogEntry) {
        self.entries.lock().unwrap().push(entry);
    }

    pub fn warnings(&self) -> Vec<String> {
        self.collect(|e| match e {
            LogEntry::Warning(m) => Some(m.clone()),
            _ => None,
        })
    }

    pub fn errors(&self) -> Vec<String> {
        self.collect(|e| match e {
            LogEntry::Error(m) => Some(m.clone()),
            _ => None,
        })
    }

    pub fn infos(&self) -> Vec<String> {
        self.collect(|e| match e {
            LogEntry::Info(m) => Some(m.clone()),
            _ => None,
        })
    }

    pub fn failures(&self) -> Vec<String> {
        self.collect(|e| match e {
            LogEntry::Failed(m) => Some(m.clone()),
            _ => None,
        })
    }

    pub fn groups(&self) -> Vec<String> {
        self.collect(|e| match e {
            LogEntry::GroupStart(name) => Some(name.clone()),
            _ => None,
        })
    }

    pub fn exports(&self) -> Vec<(String, String)> {
        self.collect(|e| match e {
            LogEntry::Export { name, value } => Some((name.clone(), value.clone())),
            _ => None,
        })
    }

    /// Every group that was opened was closed, and never below zero depth
    pub fn groups_balanced(&self) -> bool {
        let mut depth: i64 = 0;
        for entry in self.entries() {
            match entry {
                LogEntry::GroupStart(_) => depth += 1,
                LogEntry::GroupEnd => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        depth == 0
    }

    fn collect<T>(&self, f: impl Fn(&LogEntry) -> Option<T>) -> Vec<T> {
        self.entries.lock().unwrap().iter().filter_map(f).collect()
    }
}

impl Platform for RecordingPlatform {
    fn get_input(&self, name: &str) -> Option<String> {
        self.inputs
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_state(&self, name: &str) -> Option<String> {
        self.state.get(name).cloned().filter(|v| !v.is_empty())
    }

    fn debug(&self, message: &str) {
        self.record(LogEntry::Debug(message.to_string()));
    }

    fn info(&self, message: &str) {
        self.record(LogEntry::Info(message.to_string()));
    }

    fn warning(&self, message: &str) {
        self.record(LogEntry::Warning(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.record(LogEntry::Error(message.to_string()));
    }

    fn start_group(&self, name: &str) {
        self.record(LogEntry::GroupStart(name.to_string()));
    }

    fn end_group(&self) {
        self.record(LogEntry::GroupEnd);
    }

    fn set_failed(&self, message: &str) {
        self.record(LogEntry::Failed(message.to_string()));
    }

    fn export_variable(&self, name: &str, value: &str) -> Result<(), PlatformError> {
        self.record(LogEntry::Export {
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn add_path(&self, dir: &Path) -> Result<(), PlatformError> {
        self.record(LogEntry::AddPath(dir.to_path_buf()));
        Ok(())
    }
}
