//! Server configuration.
//!
//! Process-level settings (model path, bind address, engine URL) come from
//! the command line; everything else is read from environment variables at
//! startup, each with a default so the server runs without any set.

use clap::Parser;
use vela_core::LoadOptions;
use vela_core::prompt::{DEFAULT_ASSISTANT_LABEL, DEFAULT_USER_LABEL};

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "vela-server", version, about = "Chat-completion adapter for a single LLM")]
pub struct Cli {
    /// Model path, as known to the inference engine.
    #[arg(long, default_value = "./Qwen3-8B")]
    pub model: String,

    /// Address to listen on (`0.0.0.0` accepts external traffic).
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8000)]
    pub port: u16,

    /// Base URL of the inference engine.
    #[arg(long, default_value = "http://127.0.0.1:8001")]
    pub engine_url: String,
}

/// Runtime configuration for vela-server.
#[derive(Debug, Clone)]
pub struct Config {
    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Prompt label for user turns; also the generation stop sequence.
    pub user_label: String,

    /// Prompt label for assistant turns.
    pub assistant_label: String,

    /// Options applied when the model is loaded.
    pub load_options: LoadOptions,

    /// Comma-separated CORS allow-list; `None` allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// Serve the OpenAPI document at `/api-docs/openapi.json`.
    pub enable_docs: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = LoadOptions::default();
        Self {
            log_level: lookup("VELA_LOG").unwrap_or_else(|| "info".to_owned()),
            log_json: parse_bool(lookup("VELA_LOG_JSON"), false),
            user_label: lookup("VELA_USER_LABEL").unwrap_or_else(|| DEFAULT_USER_LABEL.to_owned()),
            assistant_label: lookup("VELA_ASSISTANT_LABEL")
                .unwrap_or_else(|| DEFAULT_ASSISTANT_LABEL.to_owned()),
            load_options: LoadOptions {
                max_model_len: parse_or(lookup("VELA_MAX_MODEL_LEN"), defaults.max_model_len),
                gpu_memory_utilization: parse_or(
                    lookup("VELA_GPU_MEMORY_UTILIZATION"),
                    defaults.gpu_memory_utilization,
                ),
                tensor_parallel_size: parse_or(
                    lookup("VELA_TENSOR_PARALLEL_SIZE"),
                    defaults.tensor_parallel_size,
                ),
                trust_remote_code: parse_bool(
                    lookup("VELA_TRUST_REMOTE_CODE"),
                    defaults.trust_remote_code,
                ),
            },
            cors_allowed_origins: lookup("VELA_CORS_ORIGINS").filter(|v| !v.trim().is_empty()),
            enable_docs: parse_bool(lookup("VELA_ENABLE_DOCS"), true),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn parse_bool(value: Option<String>, default: bool) -> bool {
    match value {
        Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
        Some(v) if v == "0" || v.eq_ignore_ascii_case("false") => false,
        _ => default,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = Config::default();
        assert_eq!(cfg.log_level, "info");
        assert!(!cfg.log_json);
        assert_eq!(cfg.user_label, "用户：");
        assert_eq!(cfg.assistant_label, "助手：");
        assert_eq!(cfg.load_options, LoadOptions::default());
        assert!(cfg.cors_allowed_origins.is_none());
        assert!(cfg.enable_docs);
    }

    #[test]
    fn environment_overrides() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("VELA_LOG_JSON", "TRUE"),
            ("VELA_USER_LABEL", "User: "),
            ("VELA_ASSISTANT_LABEL", "Assistant: "),
            ("VELA_MAX_MODEL_LEN", "4096"),
            ("VELA_TENSOR_PARALLEL_SIZE", "2"),
            ("VELA_ENABLE_DOCS", "0"),
            ("VELA_CORS_ORIGINS", "http://localhost:5173"),
        ]));
        assert!(cfg.log_json);
        assert_eq!(cfg.user_label, "User: ");
        assert_eq!(cfg.assistant_label, "Assistant: ");
        assert_eq!(cfg.load_options.max_model_len, 4096);
        assert_eq!(cfg.load_options.tensor_parallel_size, 2);
        assert!(!cfg.enable_docs);
        assert_eq!(cfg.cors_allowed_origins.as_deref(), Some("http://localhost:5173"));
    }

    #[test]
    fn unparsable_values_fall_back() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("VELA_MAX_MODEL_LEN", "lots"),
            ("VELA_GPU_MEMORY_UTILIZATION", "most"),
            ("VELA_LOG_JSON", "maybe"),
            ("VELA_CORS_ORIGINS", "  "),
        ]));
        assert_eq!(cfg.load_options.max_model_len, 8192);
        assert_eq!(cfg.load_options.gpu_memory_utilization, 0.9);
        assert!(!cfg.log_json);
        assert!(cfg.cors_allowed_origins.is_none());
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["vela-server"]).unwrap();
        assert_eq!(cli.model, "./Qwen3-8B");
        assert_eq!(cli.host, "0.0.0.0");
        assert_eq!(cli.port, 8000);
        assert_eq!(cli.engine_url, "http://127.0.0.1:8001");
    }

    #[test]
    fn cli_overrides() {
        let cli = Cli::try_parse_from([
            "vela-server",
            "--model",
            "/models/qwen",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
        ])
        .unwrap();
        assert_eq!(cli.model, "/models/qwen");
        assert_eq!(cli.host, "127.0.0.1");
        assert_eq!(cli.port, 9000);
    }
}
