//! Runtime configuration for the approximation loops.

use std::time::Duration;

/// Configuration for [`crate::approx`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproxConfig {
    /// Recompute per-root reachability across nodes with rayon. Default: true.
    pub parallel: bool,
    /// Wall-clock budget for one approximation call. Checked at the top of
    /// every round. Default: none.
    pub deadline: Option<Duration>,
}

impl Default for ApproxConfig {
    fn default() -> Self {
        ApproxConfig {
            parallel: true,
            deadline: None,
        }
    }
}

impl ApproxConfig {
    /// Reads configuration from environment variables:
    /// - `OVERTIME_PARALLEL`: `0`/`false` disables parallel recomputation
    /// - `OVERTIME_DEADLINE_MS`: round deadline in milliseconds
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("OVERTIME_PARALLEL").ok().as_deref(),
            std::env::var("OVERTIME_DEADLINE_MS").ok().as_deref(),
        )
    }

    fn from_vars(parallel: Option<&str>, deadline_ms: Option<&str>) -> Self {
        let mut config = ApproxConfig::default();
        if let Some(raw) = parallel {
            match raw.trim().to_ascii_lowercase().as_str() {
                "0" | "false" | "off" | "no" => config.parallel = false,
                "1" | "true" | "on" | "yes" => config.parallel = true,
                other => tracing::warn!(value = other, "ignoring OVERTIME_PARALLEL"),
            }
        }
        if let Some(raw) = deadline_ms {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config.deadline = Some(Duration::from_millis(ms)),
                Err(_) => tracing::warn!(value = raw, "ignoring OVERTIME_DEADLINE_MS"),
            }
        }
        config
    }

    /// Sequential recomputation, no deadline.
    pub fn sequential() -> Self {
        ApproxConfig {
            parallel: false,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ApproxConfig::default();
        assert!(config.parallel);
        assert_eq!(config.deadline, None);
        assert!(!ApproxConfig::sequential().parallel);
    }

    #[test]
    fn parses_variables() {
        let config = ApproxConfig::from_vars(Some("false"), Some("250"));
        assert!(!config.parallel);
        assert_eq!(config.deadline, Some(Duration::from_millis(250)));
    }

    #[test]
    fn bad_values_keep_defaults() {
        let config = ApproxConfig::from_vars(Some("maybe"), Some("soon"));
        assert_eq!(config, ApproxConfig::default());
    }
}
