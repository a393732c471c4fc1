use crate::email::actions::notify_subscription_cancelled;
use crate::server::AppState;
use crate::storage::mongo::{
    apply_counter_delta, count_subscriptions, find_customer_by_id, find_customer_by_user_id,
    find_provider_by_user_id, find_service, find_subscription, insert_subscription,
    list_subscriptions, register_new_subscription, replace_subscription,
};
use crate::subscription::access::{can_access, Caller, CallerRole};
use crate::subscription::billing;
use crate::subscription::lifecycle::LifecycleError;
use crate::types::customer::{Customer, GenericResponse};
use crate::types::incoming_requests::{
    ApplyDiscount, CancelSubscription, CreateSubscription, DaysWindowQuery, HistoryQuery,
    ListSubscriptionsQuery, PauseSubscription, RecordVisit, RescheduleService, UpdatePaymentMethod,
    UpdateSchedule, UpdateSubscription,
};
use crate::types::subscription::{
    Billing, CancelledBy, Plan, PlanInterval, PlanType, Schedule, Subscription,
    SubscriptionStatistics, SubscriptionStatus, VisitStatus,
};
use crate::utilities::api_messages::{
    APIMessages, CustomerMessages, InputMessages, ProviderMessages, ServiceMessages,
    SubscriptionMessages,
};
use crate::utilities::helpers::{
    bad_request, payload_analyzer, random_string, valid_reason, valid_special_instructions,
    parse_iso_date,
};
use crate::utilities::token::get_caller_from_req;

use axum::extract::{Path, Query};
use axum::http::HeaderMap;
use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use chrono::Utc;
use log::info;
use mongodb::bson::{doc, Document};
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;

fn success(message: SubscriptionMessages, data: Value) -> (StatusCode, Json<GenericResponse>) {
    (
        StatusCode::OK,
        Json(GenericResponse {
            success: true,
            message: APIMessages::Subscription(message).to_string(),
            data,
        }),
    )
}

fn not_found(message: APIMessages) -> (StatusCode, Json<GenericResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(GenericResponse {
            success: false,
            message: message.to_string(),
            data: json!({}),
        }),
    )
}

fn access_denied() -> (StatusCode, Json<GenericResponse>) {
    (
        StatusCode::FORBIDDEN,
        Json(GenericResponse {
            success: false,
            message: APIMessages::Subscription(SubscriptionMessages::AccessDenied).to_string(),
            data: json!({}),
        }),
    )
}

fn transition_rejected(err: LifecycleError) -> (StatusCode, Json<GenericResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(GenericResponse {
            success: false,
            message: err.to_string(),
            data: json!({}),
        }),
    )
}

/// Loads the subscription and enforces the ownership guard for the
/// caller. Returns the resolved customer profile when the caller is one,
/// since several flows need it afterwards.
async fn load_guarded_subscription(
    headers: &HeaderMap,
    id: &str,
    state: &Arc<AppState>,
) -> Result<(Caller, Option<Customer>, Subscription), (StatusCode, Json<GenericResponse>)> {
    let caller = get_caller_from_req(headers)?;

    let subscription = match find_subscription(&state.mongo_db, id).await? {
        Some(subscription) => subscription,
        None => {
            return Err(not_found(APIMessages::Subscription(
                SubscriptionMessages::NotFound,
            )))
        }
    };

    let mut customer = None;
    let mut customer_profile_id = None;
    let mut provider_profile_id = None;

    match caller.role {
        CallerRole::Customer => {
            let profile = match find_customer_by_user_id(&state.mongo_db, &caller.user_id).await? {
                Some(profile) => profile,
                None => {
                    return Err(not_found(APIMessages::Customer(
                        CustomerMessages::ProfileNotFound,
                    )))
                }
            };
            customer_profile_id = Some(profile.id.clone());
            customer = Some(profile);
        }
        CallerRole::Provider => {
            let profile = match find_provider_by_user_id(&state.mongo_db, &caller.user_id).await? {
                Some(profile) => profile,
                None => {
                    return Err(not_found(APIMessages::Provider(
                        ProviderMessages::ProfileNotFound,
                    )))
                }
            };
            provider_profile_id = Some(profile.id);
        }
        CallerRole::Admin => (),
    }

    if !can_access(
        caller.role,
        customer_profile_id.as_deref(),
        provider_profile_id.as_deref(),
        &subscription,
    ) {
        return Err(access_denied());
    }

    Ok((caller, customer, subscription))
}

/// Ownership term for collection queries: customers and providers only
/// ever see their own subscriptions, admin sees all.
async fn ownership_filter(
    caller: &Caller,
    state: &Arc<AppState>,
) -> Result<Document, (StatusCode, Json<GenericResponse>)> {
    let mut filter = doc! {};
    match caller.role {
        CallerRole::Customer => {
            let customer =
                match find_customer_by_user_id(&state.mongo_db, &caller.user_id).await? {
                    Some(customer) => customer,
                    None => {
                        return Err(not_found(APIMessages::Customer(
                            CustomerMessages::ProfileNotFound,
                        )))
                    }
                };
            filter.insert("customer_id", customer.id);
        }
        CallerRole::Provider => {
            let provider =
                match find_provider_by_user_id(&state.mongo_db, &caller.user_id).await? {
                    Some(provider) => provider,
                    None => {
                        return Err(not_found(APIMessages::Provider(
                            ProviderMessages::ProfileNotFound,
                        )))
                    }
                };
            filter.insert("provider_id", provider.id);
        }
        CallerRole::Admin => (),
    }

    Ok(filter)
}

pub async fn get_subscriptions(
    headers: HeaderMap,
    query: Query<ListSubscriptionsQuery>,
    state: Arc<AppState>,
) -> (StatusCode, Json<GenericResponse>) {
    let caller = match get_caller_from_req(&headers) {
        Ok(caller) => caller,
        Err((status_code, json)) => return (status_code, json),
    };

    let mut filter = match ownership_filter(&caller, &state).await {
        Ok(filter) => filter,
        Err((status_code, json)) => return (status_code, json),
    };

    if let Some(status) = &query.status {
        let valid = ["pending", "active", "paused", "cancelled", "expired"];
        if !valid.contains(&status.as_str()) {
            return bad_request(APIMessages::Input(InputMessages::InvalidStatusFilter));
        }
        filter.insert("status", status);
    }

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    let subscriptions =
        match list_subscriptions(&state.mongo_db, filter.clone(), page, limit).await {
            Ok(subscriptions) => subscriptions,
            Err((status_code, json)) => return (status_code, json),
        };

    let total = match count_subscriptions(&state.mongo_db, filter).await {
        Ok(total) => total,
        Err((status_code, json)) => return (status_code, json),
    };

    success(
        SubscriptionMessages::Found,
        json!({
            "subscriptions": subscriptions,
            "pagination": {
                "current_page": page,
                "total_pages": (total + limit - 1) / limit,
                "total_results": total,
            },
        }),
    )
}

pub async fn create_subscription(
    headers: HeaderMap,
    payload_result: Result<Json<CreateSubscription>, JsonRejection>,
    state: Arc<AppState>,
) -> (StatusCode, Json<GenericResponse>) {
    let caller = match get_caller_from_req(&headers) {
        Ok(caller) => caller,
        Err((status_code, json)) => return (status_code, json),
    };

    let payload = match payload_analyzer(payload_result) {
        Ok(payload) => payload,
        Err((status_code, json)) => return (status_code, json),
    };

    let customer = match find_customer_by_user_id(&state.mongo_db, &caller.user_id).await {
        Ok(Some(customer)) => customer,
        Ok(None) => return not_found(APIMessages::Customer(CustomerMessages::ProfileNotFound)),
        Err((status_code, json)) => return (status_code, json),
    };

    let service = match find_service(&state.mongo_db, &payload.service_id).await {
        Ok(Some(service)) if service.is_active => service,
        Ok(_) => return not_found(APIMessages::Service(ServiceMessages::NotFoundOrInactive)),
        Err((status_code, json)) => return (status_code, json),
    };

    if let Some(instructions) = &payload.special_instructions {
        match valid_special_instructions(instructions) {
            Ok(_) => (),
            Err((status_code, json)) => return (status_code, json),
        }
    }

    let start = match &payload.start_date {
        Some(raw) => match parse_iso_date(raw) {
            Ok(date) => date,
            Err((status_code, json)) => return (status_code, json),
        },
        None => Utc::now(),
    };

    let interval = PlanInterval::from_str(&payload.plan.interval).unwrap_or(PlanInterval::Monthly);
    let next_billing = billing::next_billing_date(&interval, start);

    let plan_type = payload
        .plan
        .plan_type
        .as_deref()
        .map(|raw| PlanType::from_str(raw).unwrap_or(PlanType::Basic))
        .unwrap_or(PlanType::Basic);

    let price = payload.plan.price.unwrap_or(service.base_price);
    if price < 0.0 {
        return bad_request(APIMessages::BadRequest);
    }

    let now = Utc::now();
    let subscription = Subscription {
        id: random_string(15),
        customer_id: customer.id.clone(),
        service_id: service.id.clone(),
        provider_id: service.provider_id.clone(),
        plan: Plan {
            plan_type,
            name: payload.plan.name.clone().unwrap_or(service.name.clone()),
            price,
            interval,
            visits_per_interval: payload.plan.visits_per_interval.unwrap_or(1).max(1),
        },
        status: SubscriptionStatus::Pending,
        start_date: start.to_rfc3339(),
        end_date: None,
        next_billing_date: next_billing.to_rfc3339(),
        next_service_date: Some(start.to_rfc3339()),
        auto_renew: true,
        billing: Billing {
            amount: price,
            currency: String::from("USD"),
            payment_method_id: payload.payment_method_id.clone(),
            last_payment_date: None,
            last_payment_amount: None,
            next_payment_amount: None,
        },
        schedule: payload.schedule.clone().unwrap_or_default(),
        service_history: vec![],
        statistics: SubscriptionStatistics::default(),
        pause_history: vec![],
        cancellation: None,
        discount: None,
        special_instructions: payload.special_instructions.clone(),
        created_at: now.to_rfc3339(),
        updated_at: now.to_rfc3339(),
    };

    match insert_subscription(&state.mongo_db, &subscription).await {
        Ok(_) => (),
        Err((status_code, json)) => return (status_code, json),
    }

    // the subscription document is the source of truth from here on;
    // counter registration failures are logged and left to the recount
    register_new_subscription(&state.mongo_db, &subscription).await;

    info!(
        "subscription {} created by user {}",
        subscription.id, caller.user_id
    );

    (
        StatusCode::CREATED,
        Json(GenericResponse {
            success: true,
            message: APIMessages::Subscription(SubscriptionMessages::Created).to_string(),
            data: json!(subscription),
        }),
    )
}

pub async fn get_subscription_details(
    Path(id): Path<String>,
    headers: HeaderMap,
    state: Arc<AppState>,
) -> (StatusCode, Json<GenericResponse>) {
    let (_, _, subscription) = match load_guarded_subscription(&headers, &id, &state).await {
        Ok(loaded) => loaded,
        Err((status_code, json)) => return (status_code, json),
    };

    success(SubscriptionMessages::Found, json!(subscription))
}

pub async fn update_subscription(
    Path(id): Path<String>,
    headers: HeaderMap,
    payload_result: Result<Json<UpdateSubscription>, JsonRejection>,
    state: Arc<AppState>,
) -> (StatusCode, Json<GenericResponse>) {
    let (_, _, mut subscription) = match load_guarded_subscription(&headers, &id, &state).await {
        Ok(loaded) => loaded,
        Err((status_code, json)) => return (status_code, json),
    };

    let payload = match payload_analyzer(payload_result) {
        Ok(payload) => payload,
        Err((status_code, json)) => return (status_code, json),
    };

    if let Some(plan) = &payload.plan {
        if let Some(raw) = &plan.plan_type {
            subscription.plan.plan_type = PlanType::from_str(raw).unwrap_or(PlanType::Basic);
        }
        if let Some(raw) = &plan.interval {
            subscription.plan.interval =
                PlanInterval::from_str(raw).unwrap_or(PlanInterval::Monthly);
        }
    }

    if let Some(schedule) = &payload.schedule {
        merge_schedule(&mut subscription.schedule, schedule);
    }

    if let Some(auto_renew) = payload.auto_renew {
        subscription.auto_renew = auto_renew;
    }

    if let Some(instructions) = &payload.special_instructions {
        match valid_special_instructions(instructions) {
            Ok(_) => (),
            Err((status_code, json)) => return (status_code, json),
        }
        subscription.special_instructions = Some(instructions.clone());
    }

    subscription.updated_at = Utc::now().to_rfc3339();

    match replace_subscription(&state.mongo_db, &subscription).await {
        Ok(_) => success(SubscriptionMessages::Updated, json!(subscription)),
        Err((status_code, json)) => (status_code, json),
    }
}

pub async fn pause_subscription(
    Path(id): Path<String>,
    headers: HeaderMap,
    payload_result: Result<Json<PauseSubscription>, JsonRejection>,
    state: Arc<AppState>,
) -> (StatusCode, Json<GenericResponse>) {
    let (caller, _, mut subscription) = match load_guarded_subscription(&headers, &id, &state).await
    {
        Ok(loaded) => loaded,
        Err((status_code, json)) => return (status_code, json),
    };

    let payload = match payload_analyzer(payload_result) {
        Ok(payload) => payload,
        Err((status_code, json)) => return (status_code, json),
    };

    match valid_reason(&payload.reason) {
        Ok(_) => (),
        Err((status_code, json)) => return (status_code, json),
    }

    let delta = match subscription.pause(payload.reason.clone(), Utc::now()) {
        Ok(delta) => delta,
        Err(err) => return transition_rejected(err),
    };

    match replace_subscription(&state.mongo_db, &subscription).await {
        Ok(_) => (),
        Err((status_code, json)) => return (status_code, json),
    }

    apply_counter_delta(&state.mongo_db, &subscription, delta).await;

    info!(
        "subscription {} paused by user {}",
        subscription.id, caller.user_id
    );
    success(SubscriptionMessages::Paused, json!(subscription))
}

pub async fn resume_subscription(
    Path(id): Path<String>,
    headers: HeaderMap,
    state: Arc<AppState>,
) -> (StatusCode, Json<GenericResponse>) {
    let (caller, _, mut subscription) = match load_guarded_subscription(&headers, &id, &state).await
    {
        Ok(loaded) => loaded,
        Err((status_code, json)) => return (status_code, json),
    };

    let delta = match subscription.resume(Utc::now()) {
        Ok(delta) => delta,
        Err(err) => return transition_rejected(err),
    };

    match replace_subscription(&state.mongo_db, &subscription).await {
        Ok(_) => (),
        Err((status_code, json)) => return (status_code, json),
    }

    apply_counter_delta(&state.mongo_db, &subscription, delta).await;

    info!(
        "subscription {} resumed by user {}",
        subscription.id, caller.user_id
    );
    success(SubscriptionMessages::Resumed, json!(subscription))
}

pub async fn cancel_subscription(
    Path(id): Path<String>,
    headers: HeaderMap,
    payload_result: Result<Json<CancelSubscription>, JsonRejection>,
    state: Arc<AppState>,
) -> (StatusCode, Json<GenericResponse>) {
    let (caller, customer, mut subscription) =
        match load_guarded_subscription(&headers, &id, &state).await {
            Ok(loaded) => loaded,
            Err((status_code, json)) => return (status_code, json),
        };

    let payload = match payload_analyzer(payload_result) {
        Ok(payload) => payload,
        Err((status_code, json)) => return (status_code, json),
    };

    match valid_reason(&payload.reason) {
        Ok(_) => (),
        Err((status_code, json)) => return (status_code, json),
    }

    let cancelled_by = match caller.role {
        CallerRole::Customer => CancelledBy::Customer,
        CallerRole::Provider => CancelledBy::Provider,
        CallerRole::Admin => CancelledBy::Admin,
    };

    let delta = match subscription.cancel(
        payload.reason.clone(),
        cancelled_by,
        payload.request_refund.unwrap_or(false),
        Utc::now(),
    ) {
        Ok(delta) => delta,
        Err(err) => return transition_rejected(err),
    };

    match replace_subscription(&state.mongo_db, &subscription).await {
        Ok(_) => (),
        Err((status_code, json)) => return (status_code, json),
    }

    apply_counter_delta(&state.mongo_db, &subscription, delta).await;

    // the notice goes to the owning customer even when staff cancels
    let recipient = match customer {
        Some(customer) => Some(customer),
        None => match find_customer_by_id(&state.mongo_db, &subscription.customer_id).await {
            Ok(found) => found,
            Err(_) => None,
        },
    };

    if let Some(recipient) = recipient {
        notify_subscription_cancelled(
            Arc::clone(&state),
            recipient,
            subscription.clone(),
            payload.reason.clone(),
        );
    }

    info!(
        "subscription {} cancelled by user {}",
        subscription.id, caller.user_id
    );
    success(SubscriptionMessages::Cancelled, json!(subscription))
}

pub async fn renew_subscription(
    Path(id): Path<String>,
    headers: HeaderMap,
    state: Arc<AppState>,
) -> (StatusCode, Json<GenericResponse>) {
    let (caller, _, mut subscription) = match load_guarded_subscription(&headers, &id, &state).await
    {
        Ok(loaded) => loaded,
        Err((status_code, json)) => return (status_code, json),
    };

    let delta = match subscription.renew(Utc::now()) {
        Ok(delta) => delta,
        Err(err) => return transition_rejected(err),
    };

    match replace_subscription(&state.mongo_db, &subscription).await {
        Ok(_) => (),
        Err((status_code, json)) => return (status_code, json),
    }

    apply_counter_delta(&state.mongo_db, &subscription, delta).await;

    info!(
        "subscription {} renewed by user {}",
        subscription.id, caller.user_id
    );
    success(SubscriptionMessages::Renewed, json!(subscription))
}

pub async fn activate_subscription(
    Path(id): Path<String>,
    headers: HeaderMap,
    state: Arc<AppState>,
) -> (StatusCode, Json<GenericResponse>) {
    let (caller, _, mut subscription) = match load_guarded_subscription(&headers, &id, &state).await
    {
        Ok(loaded) => loaded,
        Err((status_code, json)) => return (status_code, json),
    };

    match subscription.activate(Utc::now()) {
        Ok(_) => (),
        Err(err) => return transition_rejected(err),
    }

    match replace_subscription(&state.mongo_db, &subscription).await {
        Ok(_) => (),
        Err((status_code, json)) => return (status_code, json),
    }

    info!(
        "subscription {} activated by user {}",
        subscription.id, caller.user_id
    );
    success(SubscriptionMessages::Activated, json!(subscription))
}

pub async fn get_subscription_history(
    Path(id): Path<String>,
    headers: HeaderMap,
    query: Query<HistoryQuery>,
    state: Arc<AppState>,
) -> (StatusCode, Json<GenericResponse>) {
    let (_, _, subscription) = match load_guarded_subscription(&headers, &id, &state).await {
        Ok(loaded) => loaded,
        Err((status_code, json)) => return (status_code, json),
    };

    let page = query.page.unwrap_or(1).max(1) as usize;
    let limit = query.limit.unwrap_or(10).clamp(1, 100) as usize;
    let total = subscription.service_history.len();

    let history: Vec<_> = subscription
        .service_history
        .iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect();

    success(
        SubscriptionMessages::Found,
        json!({
            "history": history,
            "total": total,
            "pagination": {
                "current_page": page,
                "total_pages": (total + limit - 1) / limit,
            },
        }),
    )
}

pub async fn record_service_visit(
    Path(id): Path<String>,
    headers: HeaderMap,
    payload_result: Result<Json<RecordVisit>, JsonRejection>,
    state: Arc<AppState>,
) -> (StatusCode, Json<GenericResponse>) {
    let (caller, _, mut subscription) = match load_guarded_subscription(&headers, &id, &state).await
    {
        Ok(loaded) => loaded,
        Err((status_code, json)) => return (status_code, json),
    };

    let payload = match payload_analyzer(payload_result) {
        Ok(payload) => payload,
        Err((status_code, json)) => return (status_code, json),
    };

    let status = match VisitStatus::from_str(&payload.status) {
        Ok(status) => status,
        Err(_) => return bad_request(APIMessages::Input(InputMessages::InvalidVisitStatus)),
    };

    let notes = payload.notes.clone().unwrap_or_default();
    match subscription.record_visit(status, notes, payload.rating, Utc::now()) {
        Ok(_) => (),
        Err(err) => return transition_rejected(err),
    }

    match replace_subscription(&state.mongo_db, &subscription).await {
        Ok(_) => (),
        Err((status_code, json)) => return (status_code, json),
    }

    info!(
        "visit recorded on subscription {} by user {}",
        subscription.id, caller.user_id
    );
    success(SubscriptionMessages::VisitRecorded, json!(subscription))
}

pub async fn update_schedule(
    Path(id): Path<String>,
    headers: HeaderMap,
    payload_result: Result<Json<UpdateSchedule>, JsonRejection>,
    state: Arc<AppState>,
) -> (StatusCode, Json<GenericResponse>) {
    let (_, _, mut subscription) = match load_guarded_subscription(&headers, &id, &state).await {
        Ok(loaded) => loaded,
        Err((status_code, json)) => return (status_code, json),
    };

    let payload = match payload_analyzer(payload_result) {
        Ok(payload) => payload,
        Err((status_code, json)) => return (status_code, json),
    };

    merge_schedule(&mut subscription.schedule, &payload);
    subscription.updated_at = Utc::now().to_rfc3339();

    match replace_subscription(&state.mongo_db, &subscription).await {
        Ok(_) => success(SubscriptionMessages::ScheduleUpdated, json!(subscription)),
        Err((status_code, json)) => (status_code, json),
    }
}

pub async fn reschedule_service(
    Path(id): Path<String>,
    headers: HeaderMap,
    payload_result: Result<Json<RescheduleService>, JsonRejection>,
    state: Arc<AppState>,
) -> (StatusCode, Json<GenericResponse>) {
    let (caller, _, mut subscription) = match load_guarded_subscription(&headers, &id, &state).await
    {
        Ok(loaded) => loaded,
        Err((status_code, json)) => return (status_code, json),
    };

    let payload = match payload_analyzer(payload_result) {
        Ok(payload) => payload,
        Err((status_code, json)) => return (status_code, json),
    };

    let new_date = match parse_iso_date(&payload.new_date) {
        Ok(date) => date,
        Err((status_code, json)) => return (status_code, json),
    };

    subscription.next_service_date = Some(new_date.to_rfc3339());
    subscription.updated_at = Utc::now().to_rfc3339();

    match replace_subscription(&state.mongo_db, &subscription).await {
        Ok(_) => (),
        Err((status_code, json)) => return (status_code, json),
    }

    info!(
        "service rescheduled for subscription {} to {} by user {}",
        subscription.id, payload.new_date, caller.user_id
    );
    success(SubscriptionMessages::Rescheduled, json!(subscription))
}

pub async fn update_payment_method(
    Path(id): Path<String>,
    headers: HeaderMap,
    payload_result: Result<Json<UpdatePaymentMethod>, JsonRejection>,
    state: Arc<AppState>,
) -> (StatusCode, Json<GenericResponse>) {
    let (_, _, mut subscription) = match load_guarded_subscription(&headers, &id, &state).await {
        Ok(loaded) => loaded,
        Err((status_code, json)) => return (status_code, json),
    };

    let payload = match payload_analyzer(payload_result) {
        Ok(payload) => payload,
        Err((status_code, json)) => return (status_code, json),
    };

    subscription.billing.payment_method_id = Some(payload.payment_method_id.clone());
    subscription.updated_at = Utc::now().to_rfc3339();

    match replace_subscription(&state.mongo_db, &subscription).await {
        Ok(_) => success(
            SubscriptionMessages::PaymentMethodUpdated,
            json!(subscription),
        ),
        Err((status_code, json)) => (status_code, json),
    }
}

pub async fn apply_discount(
    Path(id): Path<String>,
    headers: HeaderMap,
    payload_result: Result<Json<ApplyDiscount>, JsonRejection>,
    state: Arc<AppState>,
) -> (StatusCode, Json<GenericResponse>) {
    let (_, _, mut subscription) = match load_guarded_subscription(&headers, &id, &state).await {
        Ok(loaded) => loaded,
        Err((status_code, json)) => return (status_code, json),
    };

    let payload = match payload_analyzer(payload_result) {
        Ok(payload) => payload,
        Err((status_code, json)) => return (status_code, json),
    };

    subscription.apply_discount(payload.code.clone(), Utc::now());

    match replace_subscription(&state.mongo_db, &subscription).await {
        Ok(_) => success(SubscriptionMessages::DiscountApplied, json!(subscription)),
        Err((status_code, json)) => (status_code, json),
    }
}

pub async fn remove_discount(
    Path(id): Path<String>,
    headers: HeaderMap,
    state: Arc<AppState>,
) -> (StatusCode, Json<GenericResponse>) {
    let (_, _, mut subscription) = match load_guarded_subscription(&headers, &id, &state).await {
        Ok(loaded) => loaded,
        Err((status_code, json)) => return (status_code, json),
    };

    subscription.remove_discount(Utc::now());

    match replace_subscription(&state.mongo_db, &subscription).await {
        Ok(_) => success(SubscriptionMessages::DiscountRemoved, json!(subscription)),
        Err((status_code, json)) => (status_code, json),
    }
}

pub async fn get_upcoming_services(
    headers: HeaderMap,
    query: Query<DaysWindowQuery>,
    state: Arc<AppState>,
) -> (StatusCode, Json<GenericResponse>) {
    let caller = match get_caller_from_req(&headers) {
        Ok(caller) => caller,
        Err((status_code, json)) => return (status_code, json),
    };

    let customer = match find_customer_by_user_id(&state.mongo_db, &caller.user_id).await {
        Ok(Some(customer)) => customer,
        Ok(None) => return not_found(APIMessages::Customer(CustomerMessages::ProfileNotFound)),
        Err((status_code, json)) => return (status_code, json),
    };

    let days = query.days.unwrap_or(7).clamp(1, 90);
    let now = Utc::now();
    let until = now + chrono::Duration::days(days);

    let filter = doc! {
        "customer_id": &customer.id,
        "status": "active",
        "next_service_date": {
            "$gte": now.to_rfc3339(),
            "$lte": until.to_rfc3339(),
        },
    };

    match list_subscriptions(&state.mongo_db, filter, 1, 100).await {
        Ok(subscriptions) => success(SubscriptionMessages::Found, json!(subscriptions)),
        Err((status_code, json)) => (status_code, json),
    }
}

fn expiring_filter(mut scope: Document, until: chrono::DateTime<Utc>) -> Document {
    scope.insert("status", "active");
    scope.insert("auto_renew", false);
    scope.insert("next_billing_date", doc! {"$lte": until.to_rfc3339()});
    scope
}

pub async fn get_expiring_subscriptions(
    headers: HeaderMap,
    query: Query<DaysWindowQuery>,
    state: Arc<AppState>,
) -> (StatusCode, Json<GenericResponse>) {
    let caller = match get_caller_from_req(&headers) {
        Ok(caller) => caller,
        Err((status_code, json)) => return (status_code, json),
    };

    // scoped to the caller's own subscriptions, same as the list route
    let scope = match ownership_filter(&caller, &state).await {
        Ok(scope) => scope,
        Err((status_code, json)) => return (status_code, json),
    };

    let days = query.days.unwrap_or(7).clamp(1, 90);
    let until = Utc::now() + chrono::Duration::days(days);

    match list_subscriptions(&state.mongo_db, expiring_filter(scope, until), 1, 100).await {
        Ok(subscriptions) => success(SubscriptionMessages::Found, json!(subscriptions)),
        Err((status_code, json)) => (status_code, json),
    }
}

fn merge_schedule(schedule: &mut Schedule, update: &UpdateSchedule) {
    if let Some(preferred_days) = &update.preferred_days {
        schedule.preferred_days = preferred_days.clone();
    }
    if let Some(preferred_time) = &update.preferred_time {
        schedule.preferred_time = Some(preferred_time.clone());
    }
    if let Some(flexible_scheduling) = update.flexible_scheduling {
        schedule.flexible_scheduling = flexible_scheduling;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // the expiring query must never lose the caller's ownership term,
    // otherwise one customer's token reads every customer's billing data
    #[test]
    fn expiring_filter_keeps_the_ownership_scope() {
        let until = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();

        let filter = expiring_filter(doc! {"customer_id": "cus_owner"}, until);
        assert_eq!(filter.get_str("customer_id").unwrap(), "cus_owner");
        assert_eq!(filter.get_str("status").unwrap(), "active");
        assert!(!filter.get_bool("auto_renew").unwrap());
        assert_eq!(
            filter
                .get_document("next_billing_date")
                .unwrap()
                .get_str("$lte")
                .unwrap(),
            until.to_rfc3339()
        );

        let filter = expiring_filter(doc! {"provider_id": "prv_owner"}, until);
        assert_eq!(filter.get_str("provider_id").unwrap(), "prv_owner");
    }
}
