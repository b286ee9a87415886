//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for the dispatcher's runtime behavior.
//!
//! ## Environment Variables
//!
//! ### `RESTWIRE_STACK_SIZE`
//!
//! Stack size for handler coroutines. Accepts values in:
//! - Decimal: `65536` (64 KB)
//! - Hexadecimal: `0x10000` (64 KB)
//!
//! Default: `0x10000` (64 KB). Unparseable values fall back to the default.
//!
//! ### `RESTWIRE_PATH_CASE_INSENSITIVE`
//!
//! `true` makes literal path segments match regardless of case. Default: `false`.
//!
//! ### `RESTWIRE_PATH_TRAILING_SLASH`
//!
//! `true` lets a request path with one extra trailing `/` match. Default: `false`.
//!
//! Both path options are fixed when the dispatcher is created and apply to every
//! registered template.
//!
//! ## Usage
//!
//! ```rust
//! use restwire::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Stack size: {} bytes", config.stack_size);
//! ```

use crate::router::PathMatchOptions;
use std::env;

/// Default handler coroutine stack size (64 KB).
pub const DEFAULT_STACK_SIZE: usize = 0x10000;

pub const STACK_SIZE_VAR: &str = "RESTWIRE_STACK_SIZE";
pub const PATH_CASE_INSENSITIVE_VAR: &str = "RESTWIRE_PATH_CASE_INSENSITIVE";
pub const PATH_TRAILING_SLASH_VAR: &str = "RESTWIRE_PATH_TRAILING_SLASH";

/// Runtime configuration loaded from environment variables.
///
/// Load this at startup using [`RuntimeConfig::from_env()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for handler coroutines in bytes (default: 64 KB / 0x10000)
    pub stack_size: usize,
    /// Options applied to every compiled path template
    pub path_matching: PathMatchOptions,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            path_matching: PathMatchOptions::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(mut lookup: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let stack_size = lookup(STACK_SIZE_VAR)
            .and_then(|val| parse_stack_size(&val))
            .unwrap_or(DEFAULT_STACK_SIZE);
        RuntimeConfig {
            stack_size,
            path_matching: PathMatchOptions {
                case_insensitive: lookup(PATH_CASE_INSENSITIVE_VAR).is_some_and(|v| is_true(&v)),
                trailing_slash: lookup(PATH_TRAILING_SLASH_VAR).is_some_and(|v| is_true(&v)),
            },
        }
    }
}

fn parse_stack_size(val: &str) -> Option<usize> {
    let val = val.trim();
    if let Some(hex) = val.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}

fn is_true(val: &str) -> bool {
    matches!(val.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> RuntimeConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        RuntimeConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config(&[]), RuntimeConfig::default());
    }

    #[test]
    fn test_stack_size_hex_and_decimal() {
        assert_eq!(config(&[(STACK_SIZE_VAR, "0x8000")]).stack_size, 0x8000);
        assert_eq!(config(&[(STACK_SIZE_VAR, "32768")]).stack_size, 32768);
        assert_eq!(config(&[(STACK_SIZE_VAR, "lots")]).stack_size, DEFAULT_STACK_SIZE);
    }

    #[test]
    fn test_path_flags() {
        let cfg = config(&[
            (PATH_CASE_INSENSITIVE_VAR, "TRUE"),
            (PATH_TRAILING_SLASH_VAR, "no"),
        ]);
        assert!(cfg.path_matching.case_insensitive);
        assert!(!cfg.path_matching.trailing_slash);
    }
}
