//! RAII guards for process-global state in tests.
//!
//! Config resolution reads `ROSTER_*` environment variables, so tests that
//! touch them must restore the previous value even if they panic. Tests using
//! these guards should still be marked `#[serial]`.

use std::env;
use std::ffi::{OsStr, OsString};

/// Restores an environment variable on drop.
///
/// ```ignore
/// #[test]
/// #[serial]
/// fn test_something() {
///     let _guard = unsafe { EnvGuard::set("ROSTER_API_URL", "http://localhost") };
///     // restored when _guard goes out of scope
/// }
/// ```
pub struct EnvGuard {
    key: String,
    original: Option<OsString>,
}

impl EnvGuard {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            original: env::var_os(key),
        }
    }

    /// Snapshot `key`, then set it to `value`.
    ///
    /// # Safety
    /// `std::env::set_var` is unsafe in Rust 2024 because of possible data
    /// races. Callers must be `#[serial]`.
    pub unsafe fn set(key: &str, value: impl AsRef<OsStr>) -> Self {
        let guard = Self::new(key);
        unsafe { env::set_var(key, value) };
        guard
    }

    /// Snapshot `key`, then remove it.
    ///
    /// # Safety
    /// Same as [`EnvGuard::set`].
    pub unsafe fn remove(key: &str) -> Self {
        let guard = Self::new(key);
        unsafe { env::remove_var(key) };
        guard
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // SAFETY: guarded tests run under #[serial].
        match &self.original {
            Some(val) => unsafe { env::set_var(&self.key, val) },
            None => unsafe { env::remove_var(&self.key) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_guard_restores_existing_var() {
        let key = "ROSTER_TEST_GUARD_EXISTING";
        unsafe { env::set_var(key, "original_value") };
        {
            let _guard = unsafe { EnvGuard::set(key, "modified_value") };
            assert_eq!(env::var(key).unwrap(), "modified_value");
        }
        assert_eq!(env::var(key).unwrap(), "original_value");
        unsafe { env::remove_var(key) };
    }

    #[test]
    #[serial]
    fn test_env_guard_restores_absent_var() {
        let key = "ROSTER_TEST_GUARD_ABSENT";
        unsafe { env::remove_var(key) };
        {
            let _guard = unsafe { EnvGuard::set(key, "temporary") };
            assert_eq!(env::var(key).unwrap(), "temporary");
        }
        assert!(env::var(key).is_err());
    }

    #[test]
    #[serial]
    fn test_env_guard_remove() {
        let key = "ROSTER_TEST_GUARD_REMOVE";
        unsafe { env::set_var(key, "should_be_restored") };
        {
            let _guard = unsafe { EnvGuard::remove(key) };
            assert!(env::var(key).is_err());
        }
        assert_eq!(env::var(key).unwrap(), "should_be_restored");
        unsafe { env::remove_var(key) };
    }
}
