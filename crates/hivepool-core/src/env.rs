//! Environment variable tuning helpers.
//!
//! Generic `env_get<T>` for parsing environment variables with defaults,
//! used to let a few internal constants (the load-balancer's shallow-queue
//! threshold, the idle-park timeout) be overridden for tuning or tests
//! without recompiling.
//!
//! ```ignore
//! use hivepool_core::env::env_get;
//!
//! let threshold: usize = env_get("HIVEPOOL_SHALLOW_THRESHOLD", 1);
//! ```

use std::str::FromStr;

/// Get environment variable `key` parsed as `T`, or `default` if unset or
/// unparsable.
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
