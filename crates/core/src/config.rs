use std::env;

use serde::{Deserialize, Serialize};

use crate::error::BidboardError;

/// Origin allowed by CORS when `CORS_ORIGIN` is not set (local frontend dev server).
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
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

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub warehouse: WarehouseConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `BIDBOARD_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("BIDBOARD_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            warehouse: WarehouseConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Reject settings that would be unsafe to run with.
    pub fn validate(&self) -> Result<(), BidboardError> {
        if !is_valid_table_prefix(&self.warehouse.table_prefix) {
            return Err(BidboardError::Config(format!(
                "WAREHOUSE_TABLE_PREFIX contains unsupported characters: {:?}",
                self.warehouse.table_prefix
            )));
        }
        if self.server.cors_origin.trim() == "*" {
            return Err(BidboardError::Config(
                "CORS_ORIGIN must name a single origin when credentials are allowed".into(),
            ));
        }
        Ok(())
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:      host={}, port={}", self.server.host, self.server.port);
        tracing::info!("  cors:        origin={}", self.server.cors_origin);
        tracing::info!(
            "  warehouse:   table_prefix={}",
            if self.warehouse.table_prefix.is_empty() { "(none)" } else { &self.warehouse.table_prefix }
        );
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            // Hosting platforms (Cloud Run and friends) hand the port over in PORT.
            port: profiled_env_u16(p, "PORT", 8080),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", DEFAULT_CORS_ORIGIN),
        }
    }
}

// ── Warehouse ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Prepended verbatim to every table name in the query templates,
    /// e.g. `"bids."` for `bids.company_master`.
    pub table_prefix: String,
}

impl WarehouseConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            table_prefix: profiled_env_or(p, "WAREHOUSE_TABLE_PREFIX", ""),
        }
    }
}

/// The prefix is spliced into SQL text, so only identifier characters are allowed.
pub fn is_valid_table_prefix(prefix: &str) -> bool {
    prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '`'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env-based tests must run serially to avoid interfering with each other.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for k in [
            "BIDBOARD_PROFILE",
            "HOST",
            "PORT",
            "CORS_ORIGIN",
            "WAREHOUSE_TABLE_PREFIX",
            "PROD_PORT",
            "PROD_WAREHOUSE_TABLE_PREFIX",
        ] {
            env::remove_var(k);
        }
    }

    #[test]
    fn defaults_when_no_env_vars() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();

        let cfg = Config::for_profile("");
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.cors_origin, DEFAULT_CORS_ORIGIN);
        assert_eq!(cfg.warehouse.table_prefix, "");
        assert_eq!(cfg.profile_label(), "default");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn port_comes_from_env() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("PORT", "9090");

        let cfg = Config::for_profile("");
        assert_eq!(cfg.server.port, 9090);

        clear_env();
    }

    #[test]
    fn unparsable_port_falls_back_to_default() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("PORT", "not-a-port");

        let cfg = Config::for_profile("");
        assert_eq!(cfg.server.port, 8080);

        clear_env();
    }

    #[test]
    fn profile_prefixed_keys_win() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("WAREHOUSE_TABLE_PREFIX", "dev.");
        env::set_var("PROD_WAREHOUSE_TABLE_PREFIX", "prod.");
        env::set_var("PROD_PORT", "8443");

        let cfg = Config::for_profile("prod");
        assert_eq!(cfg.profile, "PROD");
        assert_eq!(cfg.warehouse.table_prefix, "prod.");
        assert_eq!(cfg.server.port, 8443);

        let dev = Config::for_profile("");
        assert_eq!(dev.warehouse.table_prefix, "dev.");

        clear_env();
    }

    #[test]
    fn table_prefix_validation() {
        assert!(is_valid_table_prefix(""));
        assert!(is_valid_table_prefix("bids."));
        assert!(is_valid_table_prefix("`my-project`.bids."));
        assert!(!is_valid_table_prefix("bids; drop table x;"));
        assert!(!is_valid_table_prefix("bids "));
    }

    #[test]
    fn wildcard_cors_origin_is_rejected() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("CORS_ORIGIN", "*");

        let cfg = Config::for_profile("");
        assert!(matches!(cfg.validate(), Err(BidboardError::Config(_))));

        clear_env();
    }
}
