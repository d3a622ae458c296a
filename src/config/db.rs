use super::environment::AppConfig;

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub url: String,
    pub database: String,
}

impl MongoConfig {
    pub fn from_app(config: &AppConfig) -> Option<Self> {
        let url = config.mongodb_url.clone()?;
        let database = config
            .mongodb_database
            .clone()
            .unwrap_or_else(|| "traffic_fines".to_string());
        Some(Self { url, database })
    }
}
