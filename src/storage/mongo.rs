use axum::http::StatusCode;
use axum::Json;
use log::error;
use mongodb::{
    bson::{doc, Document},
    options::{ClientOptions, FindOptions, ServerApi, ServerApiVersion},
    Client, Collection, Database,
};
use serde_json::json;
use std::env;

use crate::subscription::lifecycle::CounterDelta;
use crate::types::customer::{Customer, GenericResponse};
use crate::types::service::{Service, ServiceProvider};
use crate::types::subscription::Subscription;
use crate::utilities::api_messages::{APIMessages, MongoMessages};

pub async fn init_connection() -> mongodb::error::Result<Client> {
    let uri = match env::var("MONGO_URI") {
        Ok(uri) => uri,
        Err(_) => String::from("mongo_uri not found"),
    };

    let mut client_options = ClientOptions::parse(&uri).await?;

    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client = Client::with_options(client_options)?;

    client
        .database("admin")
        .run_command(doc! {"ping": 1}, None)
        .await?;

    Ok(client)
}

pub fn subscriptions_collection(db: &Database) -> Collection<Subscription> {
    db.collection("subscriptions")
}

pub fn customers_collection(db: &Database) -> Collection<Customer> {
    db.collection("customers")
}

pub fn services_collection(db: &Database) -> Collection<Service> {
    db.collection("services")
}

pub fn providers_collection(db: &Database) -> Collection<ServiceProvider> {
    db.collection("providers")
}

fn mongo_error(message: MongoMessages) -> (StatusCode, Json<GenericResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(GenericResponse {
            success: false,
            message: APIMessages::Mongo(message).to_string(),
            data: json!({}),
        }),
    )
}

pub async fn find_subscription(
    db: &Database,
    id: &str,
) -> Result<Option<Subscription>, (StatusCode, Json<GenericResponse>)> {
    match subscriptions_collection(db)
        .find_one(doc! {"id": id}, None)
        .await
    {
        Ok(subscription) => Ok(subscription),
        Err(_) => Err(mongo_error(MongoMessages::ErrorFetching)),
    }
}

pub async fn insert_subscription(
    db: &Database,
    subscription: &Subscription,
) -> Result<(), (StatusCode, Json<GenericResponse>)> {
    match subscriptions_collection(db)
        .insert_one(subscription, None)
        .await
    {
        Ok(_) => Ok(()),
        Err(_) => Err(mongo_error(MongoMessages::ErrorInserting)),
    }
}

/// Writes the whole mutated entity back. Lifecycle operations mutate the
/// in-memory document, so a replace keeps the stored copy in step.
pub async fn replace_subscription(
    db: &Database,
    subscription: &Subscription,
) -> Result<(), (StatusCode, Json<GenericResponse>)> {
    match subscriptions_collection(db)
        .replace_one(doc! {"id": &subscription.id}, subscription, None)
        .await
    {
        Ok(_) => Ok(()),
        Err(_) => Err(mongo_error(MongoMessages::ErrorUpdating)),
    }
}

// page comes straight off the query string, keep the arithmetic saturating
fn pagination_skip(page: u64, limit: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(limit)
}

pub async fn list_subscriptions(
    db: &Database,
    filter: Document,
    page: u64,
    limit: u64,
) -> Result<Vec<Subscription>, (StatusCode, Json<GenericResponse>)> {
    let options = FindOptions::builder()
        .sort(doc! {"created_at": -1})
        .skip(pagination_skip(page, limit))
        .limit(limit as i64)
        .build();

    let mut cursor = match subscriptions_collection(db).find(filter, options).await {
        Ok(cursor) => cursor,
        Err(_) => return Err(mongo_error(MongoMessages::ErrorFetching)),
    };

    let mut results = vec![];
    loop {
        match cursor.advance().await {
            Ok(true) => match cursor.deserialize_current() {
                Ok(subscription) => results.push(subscription),
                Err(_) => return Err(mongo_error(MongoMessages::ErrorFetching)),
            },
            Ok(false) => break,
            Err(_) => return Err(mongo_error(MongoMessages::ErrorFetching)),
        }
    }

    Ok(results)
}

pub async fn count_subscriptions(
    db: &Database,
    filter: Document,
) -> Result<u64, (StatusCode, Json<GenericResponse>)> {
    match subscriptions_collection(db)
        .count_documents(filter, None)
        .await
    {
        Ok(count) => Ok(count),
        Err(_) => Err(mongo_error(MongoMessages::ErrorFetching)),
    }
}

pub async fn find_customer_by_user_id(
    db: &Database,
    user_id: &str,
) -> Result<Option<Customer>, (StatusCode, Json<GenericResponse>)> {
    match customers_collection(db)
        .find_one(doc! {"user_id": user_id}, None)
        .await
    {
        Ok(customer) => Ok(customer),
        Err(_) => Err(mongo_error(MongoMessages::ErrorFetching)),
    }
}

pub async fn find_customer_by_id(
    db: &Database,
    id: &str,
) -> Result<Option<Customer>, (StatusCode, Json<GenericResponse>)> {
    match customers_collection(db)
        .find_one(doc! {"id": id}, None)
        .await
    {
        Ok(customer) => Ok(customer),
        Err(_) => Err(mongo_error(MongoMessages::ErrorFetching)),
    }
}

pub async fn find_provider_by_user_id(
    db: &Database,
    user_id: &str,
) -> Result<Option<ServiceProvider>, (StatusCode, Json<GenericResponse>)> {
    match providers_collection(db)
        .find_one(doc! {"user_id": user_id}, None)
        .await
    {
        Ok(provider) => Ok(provider),
        Err(_) => Err(mongo_error(MongoMessages::ErrorFetching)),
    }
}

pub async fn find_service(
    db: &Database,
    id: &str,
) -> Result<Option<Service>, (StatusCode, Json<GenericResponse>)> {
    match services_collection(db)
        .find_one(doc! {"id": id}, None)
        .await
    {
        Ok(service) => Ok(service),
        Err(_) => Err(mongo_error(MongoMessages::ErrorFetching)),
    }
}

/// Registers a freshly created subscription on the customer and service
/// documents. Both writes land after the subscription insert already
/// succeeded, so failures are logged and left to the recount repair.
/// The customer's `subscriptions` list has no repair path; a failed
/// `$push` stays missing until the document is touched by hand.
pub async fn register_new_subscription(db: &Database, subscription: &Subscription) {
    let update = doc! {
        "$push": {"subscriptions": &subscription.id},
        "$inc": {"statistics.active_subscriptions": 1},
    };
    if let Err(e) = customers_collection(db)
        .update_one(doc! {"id": &subscription.customer_id}, update, None)
        .await
    {
        error!(
            "customer registration failed for subscription {}: {}",
            subscription.id, e
        );
    }

    let update = doc! {"$inc": {"statistics.active_subscriptions": 1}};
    if let Err(e) = services_collection(db)
        .update_one(doc! {"id": &subscription.service_id}, update, None)
        .await
    {
        error!(
            "service counter update failed for subscription {}: {}",
            subscription.id, e
        );
    }
}

/// Applies the counter side effects a lifecycle operation produced. Each
/// write is a single-document atomic `$inc`; a failure here lands after
/// the subscription write already succeeded, so it is logged and the
/// recount repair operation is the way back to consistency.
pub async fn apply_counter_delta(db: &Database, subscription: &Subscription, delta: CounterDelta) {
    if delta.is_none() {
        return;
    }

    if delta.customer_active != 0 {
        let update = doc! {"$inc": {"statistics.active_subscriptions": delta.customer_active}};
        if let Err(e) = customers_collection(db)
            .update_one(doc! {"id": &subscription.customer_id}, update, None)
            .await
        {
            error!(
                "customer counter update failed for subscription {}: {}",
                subscription.id, e
            );
        }
    }

    if delta.service_active != 0 {
        let update = doc! {"$inc": {"statistics.active_subscriptions": delta.service_active}};
        if let Err(e) = services_collection(db)
            .update_one(doc! {"id": &subscription.service_id}, update, None)
            .await
        {
            error!(
                "service counter update failed for subscription {}: {}",
                subscription.id, e
            );
        }
    }
}

/// Recomputes a customer's activeSubscriptions from the subscriptions
/// collection, the source of truth the counter denormalizes.
pub async fn recount_customer_active(
    db: &Database,
    customer_id: &str,
) -> Result<u64, (StatusCode, Json<GenericResponse>)> {
    let count = count_subscriptions(db, doc! {"customer_id": customer_id, "status": "active"}).await?;

    let update = doc! {"$set": {"statistics.active_subscriptions": count as i64}};
    match customers_collection(db)
        .update_one(doc! {"id": customer_id}, update, None)
        .await
    {
        Ok(_) => Ok(count),
        Err(_) => Err(mongo_error(MongoMessages::ErrorUpdating)),
    }
}

pub async fn recount_service_active(
    db: &Database,
    service_id: &str,
) -> Result<u64, (StatusCode, Json<GenericResponse>)> {
    let count = count_subscriptions(db, doc! {"service_id": service_id, "status": "active"}).await?;

    let update = doc! {"$set": {"statistics.active_subscriptions": count as i64}};
    match services_collection(db)
        .update_one(doc! {"id": service_id}, update, None)
        .await
    {
        Ok(_) => Ok(count),
        Err(_) => Err(mongo_error(MongoMessages::ErrorUpdating)),
    }
}
