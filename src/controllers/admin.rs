use crate::server::AppState;
use crate::storage::mongo::{
    apply_counter_delta, find_subscription, recount_customer_active, recount_service_active,
    replace_subscription,
};
use crate::subscription::access::CallerRole;
use crate::types::customer::GenericResponse;
use crate::types::incoming_requests::RecountStatistics;
use crate::utilities::api_messages::{APIMessages, SubscriptionMessages};
use crate::utilities::helpers::{bad_request, payload_analyzer};
use crate::utilities::token::get_caller_from_req;

use axum::extract::Path;
use axum::http::HeaderMap;
use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use chrono::Utc;
use log::info;
use serde_json::json;
use std::sync::Arc;

fn require_admin(
    headers: &HeaderMap,
) -> Result<String, (StatusCode, Json<GenericResponse>)> {
    let caller = get_caller_from_req(headers)?;
    if caller.role != CallerRole::Admin {
        return Err((
            StatusCode::FORBIDDEN,
            Json(GenericResponse {
                success: false,
                message: APIMessages::Forbidden.to_string(),
                data: json!({}),
            }),
        ));
    }

    Ok(caller.user_id)
}

/// Manual active -> expired transition. There is no background sweep
/// watching nextBillingDate, so expiry only happens through this call.
pub async fn expire_subscription(
    Path(id): Path<String>,
    headers: HeaderMap,
    state: Arc<AppState>,
) -> (StatusCode, Json<GenericResponse>) {
    let admin_id = match require_admin(&headers) {
        Ok(admin_id) => admin_id,
        Err((status_code, json)) => return (status_code, json),
    };

    let mut subscription = match find_subscription(&state.mongo_db, &id).await {
        Ok(Some(subscription)) => subscription,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(GenericResponse {
                    success: false,
                    message: APIMessages::Subscription(SubscriptionMessages::NotFound).to_string(),
                    data: json!({}),
                }),
            )
        }
        Err((status_code, json)) => return (status_code, json),
    };

    let delta = match subscription.expire(Utc::now()) {
        Ok(delta) => delta,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(GenericResponse {
                    success: false,
                    message: err.to_string(),
                    data: json!({}),
                }),
            )
        }
    };

    match replace_subscription(&state.mongo_db, &subscription).await {
        Ok(_) => (),
        Err((status_code, json)) => return (status_code, json),
    }

    apply_counter_delta(&state.mongo_db, &subscription, delta).await;

    info!("subscription {} expired by admin {}", subscription.id, admin_id);
    (
        StatusCode::OK,
        Json(GenericResponse {
            success: true,
            message: APIMessages::Subscription(SubscriptionMessages::Expired).to_string(),
            data: json!(subscription),
        }),
    )
}

/// Repair operation for counter drift: recomputes activeSubscriptions
/// from the subscriptions collection for the given customer or service.
pub async fn recount_statistics(
    headers: HeaderMap,
    payload_result: Result<Json<RecountStatistics>, JsonRejection>,
    state: Arc<AppState>,
) -> (StatusCode, Json<GenericResponse>) {
    let admin_id = match require_admin(&headers) {
        Ok(admin_id) => admin_id,
        Err((status_code, json)) => return (status_code, json),
    };

    let payload = match payload_analyzer(payload_result) {
        Ok(payload) => payload,
        Err((status_code, json)) => return (status_code, json),
    };

    if payload.customer_id.is_none() && payload.service_id.is_none() {
        return bad_request(APIMessages::Subscription(
            SubscriptionMessages::RecountTargetMissing,
        ));
    }

    let mut recounted = json!({});

    if let Some(customer_id) = &payload.customer_id {
        match recount_customer_active(&state.mongo_db, customer_id).await {
            Ok(count) => recounted["customer_active_subscriptions"] = json!(count),
            Err((status_code, json)) => return (status_code, json),
        }
    }

    if let Some(service_id) = &payload.service_id {
        match recount_service_active(&state.mongo_db, service_id).await {
            Ok(count) => recounted["service_active_subscriptions"] = json!(count),
            Err((status_code, json)) => return (status_code, json),
        }
    }

    info!("statistics recounted by admin {}", admin_id);
    (
        StatusCode::OK,
        Json(GenericResponse {
            success: true,
            message: APIMessages::Subscription(SubscriptionMessages::CountersRecounted).to_string(),
            data: recounted,
        }),
    )
}
