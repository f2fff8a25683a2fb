use std::path::PathBuf;

/// Server configuration
///
/// Every field can be overridden through an environment variable:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/cart-server | working directory (database, carts, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | LOG_LEVEL | info | tracing filter level |
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding the databases and logs
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Log level passed to the tracing subscriber
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/cart-server".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
        }
    }

    /// Override the work directory and port, keeping everything else
    /// from the environment. Used by tests.
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// Directory for the embedded SurrealDB files
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Path of the redb cart store file
    pub fn cart_store_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("carts.redb")
    }

    /// Directory for rolling log files
    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Create the work directory layout if it does not exist yet
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
