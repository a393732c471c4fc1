use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{
    env,
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

use crate::subscription::access::{Caller, CallerRole};
use crate::types::customer::GenericResponse;

use super::api_messages::{APIMessages, TokenMessages};

/// Issued by the external auth service; this API only validates.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

fn unauthorized(message: TokenMessages) -> (StatusCode, Json<GenericResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(GenericResponse {
            success: false,
            message: APIMessages::Token(message).to_string(),
            data: json!({}),
        }),
    )
}

pub fn validate_token(token: &str) -> Result<Claims, TokenMessages> {
    let validation = Validation::new(Algorithm::HS512);

    let signing_key = match env::var("API_TOKENS_SIGNING_KEY") {
        Ok(key) => key,
        Err(_) => return Err(TokenMessages::ErrorValidating),
    };

    let token_data = match decode::<Claims>(
        token,
        &DecodingKey::from_secret(signing_key.as_ref()),
        &validation,
    ) {
        Ok(t) => t,
        Err(_) => return Err(TokenMessages::ErrorValidating),
    };

    let now = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(now) => now,
        Err(_) => return Err(TokenMessages::ErrorValidating),
    };

    if now.as_secs() > token_data.claims.exp as u64 {
        return Err(TokenMessages::Expired);
    }

    Ok(token_data.claims)
}

/// Extracts the authenticated caller from the Authorization header.
pub fn get_caller_from_req(
    headers: &HeaderMap,
) -> Result<Caller, (StatusCode, Json<GenericResponse>)> {
    let token = match headers.get("Authorization") {
        Some(token) => token,
        None => return Err(unauthorized(TokenMessages::Missing)),
    };

    let token_string = match token.to_str() {
        Ok(token) => token,
        Err(_) => return Err(unauthorized(TokenMessages::ErrorParsingToken)),
    };

    let token_string = token_string.trim_start_matches("Bearer ").trim();

    let claims = match validate_token(token_string) {
        Ok(claims) => claims,
        Err(message) => return Err(unauthorized(message)),
    };

    let role = match CallerRole::from_str(&claims.role) {
        Ok(role) => role,
        Err(_) => return Err(unauthorized(TokenMessages::UnknownRole)),
    };

    Ok(Caller {
        user_id: claims.sub,
        role,
    })
}
