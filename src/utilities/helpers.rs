use crate::types::customer::GenericResponse;
use axum::{
    extract::rejection::JsonRejection,
    http::{StatusCode, Uri},
    Json,
};
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use serde_json::json;

use super::api_messages::{APIMessages, InputMessages};

pub fn payload_analyzer<T>(
    payload_result: Result<Json<T>, JsonRejection>,
) -> Result<Json<T>, (StatusCode, Json<GenericResponse>)> {
    let payload = match payload_result {
        Ok(payload) => payload,
        Err(err) => {
            let message = format!("invalid.payload: {}", err);
            let json = Json(GenericResponse {
                success: false,
                message,
                data: json!({}),
            });

            return Err((StatusCode::BAD_REQUEST, json));
        }
    };

    Ok(payload)
}

pub async fn fallback(uri: Uri) -> (StatusCode, Json<GenericResponse>) {
    let message = format!("invalid.endpoint.{}", uri.path());
    (
        StatusCode::NOT_FOUND,
        Json(GenericResponse {
            success: false,
            message,
            data: json!({}),
        }),
    )
}

pub fn random_string(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

pub fn bad_request(message: APIMessages) -> (StatusCode, Json<GenericResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(GenericResponse {
            success: false,
            message: message.to_string(),
            data: json!({}),
        }),
    )
}

// reason and specialInstructions share the same 500 character cap,
// counted in characters rather than bytes
pub fn valid_reason(reason: &str) -> Result<(), (StatusCode, Json<GenericResponse>)> {
    if reason.chars().count() > 500 {
        return Err(bad_request(APIMessages::Input(
            InputMessages::InvalidReasonLength,
        )));
    }

    Ok(())
}

pub fn valid_special_instructions(
    instructions: &str,
) -> Result<(), (StatusCode, Json<GenericResponse>)> {
    if instructions.chars().count() > 500 {
        return Err(bad_request(APIMessages::Input(
            InputMessages::InvalidSpecialInstructionsLength,
        )));
    }

    Ok(())
}

pub fn parse_iso_date(raw: &str) -> Result<DateTime<Utc>, (StatusCode, Json<GenericResponse>)> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(date) => Ok(date.with_timezone(&Utc)),
        Err(_) => Err(bad_request(APIMessages::Input(InputMessages::InvalidDate))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_string_has_requested_length() {
        assert_eq!(random_string(30).len(), 30);
        assert_eq!(random_string(0).len(), 0);
    }

    #[test]
    fn reason_cap_is_five_hundred() {
        assert!(valid_reason(&"x".repeat(500)).is_ok());
        assert!(valid_reason(&"x".repeat(501)).is_err());
    }

    #[test]
    fn length_caps_count_characters_not_bytes() {
        // two bytes per character in UTF-8, still 500 characters
        assert!(valid_reason(&"é".repeat(500)).is_ok());
        assert!(valid_reason(&"é".repeat(501)).is_err());
        assert!(valid_special_instructions(&"ñ".repeat(500)).is_ok());
    }

    #[test]
    fn iso_dates_parse_and_garbage_does_not() {
        assert!(parse_iso_date("2024-01-01T00:00:00Z").is_ok());
        assert!(parse_iso_date("2024-01-01T00:00:00+02:00").is_ok());
        assert!(parse_iso_date("next tuesday").is_err());
    }
}
