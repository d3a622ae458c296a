use super::schema::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub full_name: String,
    pub role: Role,
    pub license_number: Option<String>,
    pub active: bool,
    pub created_at: i64,
}
