/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// SQLite database URL (default: `sqlite://predictions.db`).
    pub database_url: String,
    /// Directory holding original and annotated images (default: `uploads`).
    pub upload_dir: String,
    /// Base URL of the inference server (default: `http://localhost:8000`).
    pub detector_url: String,
    /// Per-call inference timeout in seconds (default: `20`).
    ///
    /// Must be shorter than `request_timeout_secs`.
    pub detector_timeout_secs: u64,
    /// Largest accepted upload body in bytes (default: 10 MiB).
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `8080`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `DATABASE_URL`          | `sqlite://predictions.db`  |
    /// | `UPLOAD_DIR`            | `uploads`                  |
    /// | `DETECTOR_URL`          | `http://localhost:8000`    |
    /// | `DETECTOR_TIMEOUT_SECS` | `20`                       |
    /// | `MAX_UPLOAD_BYTES`      | `10485760`                 |
    ///
    /// Panics on unparsable numbers or a failed [`validate`](Self::validate)
    /// so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");

        let port: u16 = env_or("PORT", "8080")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let detector_timeout_secs: u64 = env_or("DETECTOR_TIMEOUT_SECS", "20")
            .parse()
            .expect("DETECTOR_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = env_or("MAX_UPLOAD_BYTES", "10485760")
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let config = Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url: env_or("DATABASE_URL", "sqlite://predictions.db"),
            upload_dir: env_or("UPLOAD_DIR", "uploads"),
            detector_url: env_or("DETECTOR_URL", "http://localhost:8000"),
            detector_timeout_secs,
            max_upload_bytes,
        };
        if let Err(msg) = config.validate() {
            panic!("Invalid configuration: {msg}");
        }
        config
    }

    /// Check relations between settings that parse fine on their own.
    ///
    /// The detector timeout must be strictly shorter than the request timeout.
    pub fn validate(&self) -> Result<(), String> {
        if self.detector_timeout_secs >= self.request_timeout_secs {
            return Err(format!(
                "DETECTOR_TIMEOUT_SECS ({}) must be less than REQUEST_TIMEOUT_SECS ({})",
                self.detector_timeout_secs, self.request_timeout_secs
            ));
        }
        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}
