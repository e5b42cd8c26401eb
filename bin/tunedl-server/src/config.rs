//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for tunedl-server.
///
/// Every field has a default so the server starts without any environment
/// variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:5000"`).
    pub bind_address: String,

    /// Directory finished audio files are written to (default: `"music"`).
    /// Created on the first submission if it does not exist.
    pub output_dir: String,

    /// Path or name of the `yt-dlp` executable.
    pub ytdlp_path: String,

    /// Optional ffmpeg binary or directory forwarded to yt-dlp.
    pub ffmpeg_path: Option<String>,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated list of allowed CORS origins; `None` allows any.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI and the OpenAPI document.
    pub enable_swagger: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("TUNEDL_BIND", "0.0.0.0:5000"),
            output_dir: env_or("TUNEDL_OUTPUT_DIR", "music"),
            ytdlp_path: env_or("TUNEDL_YTDLP_PATH", tunedl_core::extractor::ytdlp::DEFAULT_YTDLP_PATH),
            ffmpeg_path: env_opt("TUNEDL_FFMPEG_PATH"),
            log_level: env_or("TUNEDL_LOG", "info"),
            log_json: parse_bool("TUNEDL_LOG_JSON", false),
            cors_allowed_origins: env_opt("TUNEDL_CORS_ORIGINS"),
            enable_swagger: parse_bool("TUNEDL_ENABLE_SWAGGER", true),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}
