//! Typed environment configuration, loaded once at startup.

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub fernet_key: String,
    pub environment: String,
    pub timezone: String,
    pub upload_max_bytes: usize,
    pub upload_chunk_bytes: usize,
    pub upload_temp_dir: String,
    pub upsert_chunk_size: usize,
    pub pipeline_task_timeout_secs: u64,
    /// Recognized but unused: this implementation's task queue is in-process
    /// (see services::queue). Read and logged so an operator who sets these
    /// expecting a real broker isn't met with silence.
    pub redis_url: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL").or_else(|_| assemble_database_url())?;

        let fernet_key = std::env::var("FERNET_KEY")
            .map_err(|_| "FERNET_KEY is not set".to_string())?;

        Ok(Self {
            database_url,
            fernet_key,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            timezone: std::env::var("TIMEZONE").unwrap_or_else(|_| "Asia/Kolkata".to_string()),
            upload_max_bytes: env_usize("UPLOAD_MAX_BYTES", 200 * 1024 * 1024),
            upload_chunk_bytes: env_usize("UPLOAD_CHUNK_BYTES", 5 * 1024 * 1024),
            upload_temp_dir: std::env::var("UPLOAD_TEMP_DIR").unwrap_or_else(|_| "/tmp/statement-uploads".to_string()),
            upsert_chunk_size: env_usize("UPSERT_CHUNK_SIZE", 30),
            pipeline_task_timeout_secs: std::env::var("PIPELINE_TASK_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            redis_url: std::env::var("REDIS_URL").ok(),
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if !matches!(self.environment.as_str(), "development" | "staging" | "production") {
            return Err(format!("unrecognized ENVIRONMENT: {}", self.environment));
        }
        if self.upload_chunk_bytes == 0 || self.upload_chunk_bytes > self.upload_max_bytes {
            return Err("UPLOAD_CHUNK_BYTES must be nonzero and <= UPLOAD_MAX_BYTES".to_string());
        }
        Ok(())
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn assemble_database_url() -> Result<String, String> {
    let host = std::env::var("DATABASE_HOST").map_err(|_| "DATABASE_URL or DATABASE_HOST is required".to_string())?;
    let port = std::env::var("DATABASE_PORT").unwrap_or_else(|_| "5432".to_string());
    let name = std::env::var("DATABASE_NAME").map_err(|_| "DATABASE_NAME is required".to_string())?;
    let user = std::env::var("DATABASE_USER").map_err(|_| "DATABASE_USER is required".to_string())?;
    let password = std::env::var("DATABASE_PASSWORD").unwrap_or_default();
    Ok(format!("postgres://{user}:{password}@{host}:{port}/{name}"))
}
