use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Driver,
    PoliceOfficer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Driver => "driver",
            Self::PoliceOfficer => "police_officer",
            Self::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "driver" => Some(Self::Driver),
            "police_officer" => Some(Self::PoliceOfficer),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    #[serde(alias = "fullName")]
    pub full_name: String,
    pub role: Role,
    #[serde(alias = "licenseNumber")]
    pub license_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(alias = "fullName")]
    pub full_name: Option<String>,
    #[serde(alias = "licenseNumber")]
    pub license_number: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub user_id: String,
    pub full_name: String,
    pub role: Role,
    pub license_number: Option<String>,
    pub active: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub created: bool,
    pub user: Option<UserView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetUserResponse {
    pub found: bool,
    pub user: Option<UserView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListUsersResponse {
    pub found: bool,
    pub total: usize,
    pub users: Vec<UserView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserResponse {
    pub updated: bool,
    pub user: Option<UserView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintTokenRequest {
    #[serde(alias = "userId")]
    pub user_id: String,
    #[serde(alias = "bootstrapSecret")]
    pub bootstrap_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintTokenResponse {
    pub issued: bool,
    pub access_token: Option<String>,
    pub expires_at: Option<i64>,
    pub error_code: Option<String>,
    pub reason: String,
}
