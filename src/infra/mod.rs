use crate::config::db::MongoConfig;
use mongodb::Client as MongoClient;
use mongodb::Database;

#[derive(Debug, Clone)]
pub struct InfraClients {
    pub mongo_db: Database,
}

pub const FINES_COLLECTION: &str = "fines";
pub const VIOLATIONS_COLLECTION: &str = "traffic_violations";
pub const USERS_COLLECTION: &str = "users";

pub async fn init_infra(mongo: &MongoConfig) -> Result<InfraClients, String> {
    let mongo_client = MongoClient::with_uri_str(&mongo.url)
        .await
        .map_err(|e| format!("mongodb client init failed: {e}"))?;
    Ok(InfraClients {
        mongo_db: mongo_client.database(&mongo.database),
    })
}
