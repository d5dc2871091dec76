use std::env;

use serde::{Deserialize, Serialize};

/// Default S3 output location for Athena query results.
const DEFAULT_OUTPUT_LOCATION: &str = "s3://bidboard-athena-results/";

/// 10 GB in bytes (10 * 1024^3).
const DEFAULT_MAX_SCAN_BYTES: u64 = 10_737_418_240;

/// Listing queries are interactive; anything slower than this is a broken query.
const DEFAULT_TIMEOUT_SECONDS: u32 = 60;

// ── Env helpers (mirrors core/config.rs, kept local so the row source stands alone) ──

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries `{PROFILE}_{KEY}` first, falls back to `{KEY}`.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_parse<T: std::str::FromStr>(profile: &str, key: &str, default: T) -> T {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.as_str(), "true" | "1"),
        None => default,
    }
}

// ── AthenaConfig ─────────────────────────────────────────────────

/// Connection settings for the Athena warehouse.
///
/// Reads from environment variables with optional profile prefix.
/// When `BIDBOARD_PROFILE=PROD`, checks `PROD_ATHENA_DATABASE` before `ATHENA_DATABASE`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthenaConfig {
    /// Set `ATHENA_ENABLED=false` to refuse to start without a warehouse.
    pub enabled: bool,
    /// AWS region for Athena queries.
    pub region: String,
    /// Athena database used as the default schema for unqualified tables.
    pub database: String,
    /// Athena workgroup.
    pub workgroup: String,
    /// S3 path for query results.
    pub output_location: String,
    /// Maximum bytes to scan per query (0 = unlimited).
    pub max_scan_bytes: u64,
    /// Query timeout in seconds.
    pub timeout_seconds: u32,
}

impl AthenaConfig {
    /// Build config from environment variables.
    ///
    /// Reads `BIDBOARD_PROFILE` to determine the profile prefix.
    /// `ATHENA_REGION` falls back to `AWS_REGION` before using the default.
    pub fn from_env() -> Self {
        let profile = env_opt("BIDBOARD_PROFILE")
            .map(|s| s.to_uppercase())
            .unwrap_or_default();
        Self::from_env_profiled(&profile)
    }

    /// Build config for a specific named profile.
    pub fn from_env_profiled(profile: &str) -> Self {
        let region = profiled_env_opt(profile, "ATHENA_REGION")
            .or_else(|| profiled_env_opt(profile, "AWS_REGION"))
            .unwrap_or_else(|| "ap-northeast-1".to_string());

        Self {
            enabled: profiled_env_bool(profile, "ATHENA_ENABLED", true),
            region,
            database: profiled_env_or(profile, "ATHENA_DATABASE", "default"),
            workgroup: profiled_env_or(profile, "ATHENA_WORKGROUP", "primary"),
            output_location: profiled_env_or(
                profile,
                "ATHENA_OUTPUT_LOCATION",
                DEFAULT_OUTPUT_LOCATION,
            ),
            max_scan_bytes: profiled_parse(profile, "ATHENA_MAX_SCAN_BYTES", DEFAULT_MAX_SCAN_BYTES),
            timeout_seconds: profiled_parse(profile, "ATHENA_TIMEOUT_SECONDS", DEFAULT_TIMEOUT_SECONDS),
        }
    }

    /// `true` once the output location points somewhere other than the placeholder.
    pub fn is_configured(&self) -> bool {
        self.enabled && self.output_location != DEFAULT_OUTPUT_LOCATION
    }

    /// Scan budget, or `None` when unlimited.
    pub fn scan_limit(&self) -> Option<u64> {
        (self.max_scan_bytes > 0).then_some(self.max_scan_bytes)
    }

    pub fn log_summary(&self) {
        tracing::info!(
            region = %self.region,
            database = %self.database,
            workgroup = %self.workgroup,
            output_location = %self.output_location,
            max_scan_gb = self.max_scan_bytes as f64 / (1024.0 * 1024.0 * 1024.0),
            timeout_seconds = self.timeout_seconds,
            "Athena config"
        );
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env-based tests must run serially to avoid interfering with each other.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_athena_env() {
        let keys = [
            "BIDBOARD_PROFILE",
            "ATHENA_ENABLED",
            "ATHENA_REGION",
            "ATHENA_DATABASE",
            "ATHENA_WORKGROUP",
            "ATHENA_OUTPUT_LOCATION",
            "ATHENA_MAX_SCAN_BYTES",
            "ATHENA_TIMEOUT_SECONDS",
            "AWS_REGION",
            "TEST_ATHENA_DATABASE",
            "TEST_ATHENA_REGION",
            "TEST_AWS_REGION",
        ];
        for k in keys {
            env::remove_var(k);
        }
    }

    fn sample() -> AthenaConfig {
        AthenaConfig {
            enabled: true,
            region: "ap-northeast-1".into(),
            database: "bids".into(),
            workgroup: "primary".into(),
            output_location: "s3://my-bucket/results/".into(),
            max_scan_bytes: DEFAULT_MAX_SCAN_BYTES,
            timeout_seconds: 60,
        }
    }

    #[test]
    fn defaults_when_no_env_vars() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_athena_env();

        let cfg = AthenaConfig::from_env_profiled("");

        assert!(cfg.enabled);
        assert_eq!(cfg.region, "ap-northeast-1");
        assert_eq!(cfg.database, "default");
        assert_eq!(cfg.workgroup, "primary");
        assert_eq!(cfg.output_location, DEFAULT_OUTPUT_LOCATION);
        assert_eq!(cfg.max_scan_bytes, DEFAULT_MAX_SCAN_BYTES);
        assert_eq!(cfg.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
    }

    #[test]
    fn disabled_with_false() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_athena_env();

        env::set_var("ATHENA_ENABLED", "false");
        let cfg = AthenaConfig::from_env_profiled("");
        assert!(!cfg.enabled);

        clear_athena_env();
    }

    #[test]
    fn athena_region_takes_precedence_over_aws_region() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_athena_env();

        env::set_var("AWS_REGION", "us-west-2");
        let cfg = AthenaConfig::from_env_profiled("");
        assert_eq!(cfg.region, "us-west-2");

        env::set_var("ATHENA_REGION", "eu-west-1");
        let cfg = AthenaConfig::from_env_profiled("");
        assert_eq!(cfg.region, "eu-west-1");

        clear_athena_env();
    }

    #[test]
    fn profiled_env_takes_precedence() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_athena_env();

        env::set_var("ATHENA_DATABASE", "base_db");
        env::set_var("TEST_ATHENA_DATABASE", "test_db");
        env::set_var("TEST_AWS_REGION", "ap-southeast-2");

        let cfg = AthenaConfig::from_env_profiled("TEST");
        assert_eq!(cfg.database, "test_db");
        assert_eq!(cfg.region, "ap-southeast-2");

        clear_athena_env();
    }

    #[test]
    fn invalid_numbers_fall_back_to_defaults() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_athena_env();

        env::set_var("ATHENA_MAX_SCAN_BYTES", "not_a_number");
        env::set_var("ATHENA_TIMEOUT_SECONDS", "-5");

        let cfg = AthenaConfig::from_env_profiled("");
        assert_eq!(cfg.max_scan_bytes, DEFAULT_MAX_SCAN_BYTES);
        assert_eq!(cfg.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);

        clear_athena_env();
    }

    #[test]
    fn is_configured_requires_real_output_location() {
        assert!(sample().is_configured());

        let placeholder = AthenaConfig { output_location: DEFAULT_OUTPUT_LOCATION.into(), ..sample() };
        assert!(!placeholder.is_configured());

        let disabled = AthenaConfig { enabled: false, ..sample() };
        assert!(!disabled.is_configured());
    }

    #[test]
    fn zero_scan_bytes_means_unlimited() {
        assert_eq!(sample().scan_limit(), Some(DEFAULT_MAX_SCAN_BYTES));
        let unlimited = AthenaConfig { max_scan_bytes: 0, ..sample() };
        assert_eq!(unlimited.scan_limit(), None);
    }
}
