use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rust_env: String,
    pub api_host: String,
    pub api_port: u16,
    pub mongodb_url: Option<String>,
    pub mongodb_database: Option<String>,
    pub jwt_secret: String,
    pub jwt_ttl_seconds: i64,
    pub auth_bootstrap_secret: Option<String>,
    pub gateway_base_url: String,
    pub gateway_api_key: Option<String>,
    pub gateway_webhook_secret: String,
    pub gateway_timeout_seconds: u64,
    pub fine_due_days: i64,
    pub fine_message_max_chars: usize,
    pub note_max_chars: usize,
    pub tag_max_chars: usize,
    pub max_tags: usize,
    pub cors_allowed_origins: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        load_dotenv_layers();
        Ok(Self {
            rust_env: read_var("RUST_ENV")?,
            api_host: read_var("API_HOST")?,
            api_port: read_var("API_PORT")?
                .parse::<u16>()
                .map_err(|e| format!("invalid API_PORT: {e}"))?,
            mongodb_url: env::var("MONGODB_URL").ok(),
            mongodb_database: env::var("MONGODB_DATABASE").ok(),
            jwt_secret: read_var("JWT_SECRET")?,
            jwt_ttl_seconds: read_optional_i64("JWT_TTL_SECONDS", 3600)?,
            auth_bootstrap_secret: env::var("AUTH_BOOTSTRAP_SECRET").ok(),
            gateway_base_url: read_optional_string("GATEWAY_BASE_URL", "http://127.0.0.1:8091"),
            gateway_api_key: env::var("GATEWAY_API_KEY").ok(),
            gateway_webhook_secret: read_var("GATEWAY_WEBHOOK_SECRET")?,
            gateway_timeout_seconds: read_optional_u64("GATEWAY_TIMEOUT_SECONDS", 5)?,
            fine_due_days: read_optional_i64("FINE_DUE_DAYS", 30)?,
            fine_message_max_chars: read_optional_usize("FINE_MESSAGE_MAX_CHARS", 500)?,
            note_max_chars: read_optional_usize("NOTE_MAX_CHARS", 1000)?,
            tag_max_chars: read_optional_usize("TAG_MAX_CHARS", 40)?,
            max_tags: read_optional_usize("MAX_TAGS", 10)?,
            cors_allowed_origins: read_optional_string(
                "CORS_ALLOWED_ORIGINS",
                "http://localhost:3000,http://127.0.0.1:3000",
            ),
        })
    }
}

fn read_var(key: &str) -> Result<String, String> {
    env::var(key).map_err(|_| format!("missing required env var: {key}"))
}

fn read_optional_i64(key: &str, default: i64) -> Result<i64, String> {
    match env::var(key) {
        Ok(v) => v.parse::<i64>().map_err(|e| format!("invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}

fn read_optional_u64(key: &str, default: u64) -> Result<u64, String> {
    match env::var(key) {
        Ok(v) => v.parse::<u64>().map_err(|e| format!("invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}

fn read_optional_usize(key: &str, default: usize) -> Result<usize, String> {
    match env::var(key) {
        Ok(v) => v
            .parse::<usize>()
            .map_err(|e| format!("invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}

fn read_optional_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn load_dotenv_layers() {
    for path in [".env", "../.env", "../../.env"] {
        let _ = dotenvy::from_path_override(path);
    }
}
