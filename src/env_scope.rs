//! Scoped overrides of process environment variables
//!
//! [`EnvOverride`] captures a variable, replaces it, and puts the captured
//! value back when dropped, on every exit path including unwinding. "Unset"
//! is captured as distinct from "set to empty", and values are kept as
//! `OsString` so restoration is byte-exact.
//!
//! The environment is process-wide. An override is only sound while no other
//! task touches the same variable, which holds for the single-threaded
//! cleanup workflow.

use std::env;
use std::ffi::{OsStr, OsString};
use tracing::trace;

/// The value one variable had at capture time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSnapshot {
    key: String,
    value: Option<OsString>,
}

impl EnvSnapshot {
    pub fn capture(key: &str) -> Self {
        Self {
            key: key.to_string(),
            value: env::var_os(key),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Captured value; `None` means the variable was unset
    pub fn value(&self) -> Option<&OsStr> {
        self.value.as_deref()
    }

    pub fn restore(&self) {
        match &self.value {
            Some(value) => env::set_var(&self.key, value),
            None => env::remove_var(&self.key),
        }
    }
}

/// RAII guard holding one variable at an overridden value
#[must_use = "the override is undone as soon as the guard is dropped"]
#[derive(Debug)]
pub struct EnvOverride {
    snapshot: EnvSnapshot,
}

impl EnvOverride {
    pub fn set(key: &str, value: impl AsRef<OsStr>) -> Self {
        let snapshot = EnvSnapshot::capture(key);
        env::set_var(key, value);
        trace!(key, "Environment override applied");
        Self { snapshot }
    }

    pub fn unset(key: &str) -> Self {
        let snapshot = EnvSnapshot::capture(key);
        env::remove_var(key);
        trace!(key, "Environment override applied (unset)");
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &EnvSnapshot {
        &self.snapshot
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        self.snapshot.restore();
        trace!(key = self.snapshot.key(), "Environment override restored");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEY: &str = "POSTFLIGHT_ENV_SCOPE_TEST";

    #[test]
    #[serial]
    fn test_restores_previous_value() {
        env::set_var(KEY, "original");
        {
            let guard = EnvOverride::set(KEY, "");
            assert_eq!(env::var(KEY).unwrap(), "");
            assert_eq!(guard.snapshot().value(), Some(OsStr::new("original")));
        }
        assert_eq!(env::var(KEY).unwrap(), "original");
        env::remove_var(KEY);
    }

    #[test]
    #[serial]
    fn test_restores_absence() {
        env::remove_var(KEY);
        {
            let _guard = EnvOverride::set(KEY, "temporary");
            assert_eq!(env::var(KEY).unwrap(), "temporary");
        }
        assert!(env::var_os(KEY).is_none());
    }

    #[test]
    #[serial]
    fn test_empty_is_not_confused_with_unset() {
        env::set_var(KEY, "");
        {
            let _guard = EnvOverride::unset(KEY);
            assert!(env::var_os(KEY).is_none());
        }
        assert_eq!(env::var_os(KEY), Some(OsString::new()));
        env::remove_var(KEY);
    }

    #[test]
    #[serial]
    fn test_restores_during_unwind() {
        env::set_var(KEY, "before-panic");
        let result = std::panic::catch_unwind(|| {
            let _guard = EnvOverride::set(KEY, "");
            panic!("dry run blew up");
        });
        assert!(result.is_err());
        assert_eq!(env::var(KEY).unwrap(), "before-panic");
        env::remove_var(KEY);
    }
}
