use crate::app::AppState;
use crate::module::error::AppError;
use crate::module::user::crud as user_crud;
use crate::module::user::schema::Role;
use axum::http::HeaderMap;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

const JWT_ISSUER: &str = "traffic-fine-api";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

#[derive(Debug, Clone)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn is_staff(&self) -> bool {
        matches!(self.role, Role::PoliceOfficer | Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

pub fn issue_access_token(
    user_id: &str,
    role: Role,
    jwt_secret: &str,
    ttl_seconds: i64,
) -> Result<(String, i64), String> {
    if ttl_seconds <= 0 {
        return Err("JWT_TTL_SECONDS must be positive".to_string());
    }
    let iat = Utc::now().timestamp();
    let exp = iat
        .checked_add(ttl_seconds)
        .ok_or_else(|| "invalid jwt expiration".to_string())?;
    let claims = AccessClaims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        iat,
        exp,
        iss: JWT_ISSUER.to_string(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| format!("jwt issue failed: {e}"))?;
    Ok((token, exp))
}

pub fn verify_access_token(token: &str, jwt_secret: &str) -> Result<AccessClaims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[JWT_ISSUER]);
    let data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| format!("jwt verify failed: {e}"))?;
    Ok(data.claims)
}

pub fn resolve_actor(state: &AppState, headers: &HeaderMap) -> Result<Actor, AppError> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            AppError::unauthorized("MISSING_BEARER_TOKEN", "authorization bearer token required")
        })?;

    let claims = verify_access_token(token, &state.config.jwt_secret)
        .map_err(|e| AppError::unauthorized("INVALID_ACCESS_TOKEN", e))?;
    let role = Role::parse(&claims.role).ok_or_else(|| {
        AppError::unauthorized("INVALID_ACCESS_TOKEN", "token carries unknown role")
    })?;

    if let Some(user) = user_crud::find_user(&state.users, &claims.sub)? {
        if !user.active {
            return Err(AppError::unauthorized(
                "ACCOUNT_INACTIVE",
                "account is deactivated",
            ));
        }
    }

    Ok(Actor {
        id: claims.sub,
        role,
    })
}
