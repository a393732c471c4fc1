use crate::controllers::admin::{expire_subscription, recount_statistics};
use crate::controllers::subscription::{
    activate_subscription, apply_discount, cancel_subscription, create_subscription,
    get_expiring_subscriptions, get_subscription_details, get_subscription_history,
    get_subscriptions, get_upcoming_services, pause_subscription, record_service_visit,
    remove_discount, renew_subscription, reschedule_service, resume_subscription,
    update_payment_method, update_schedule, update_subscription,
};
use crate::utilities::helpers::fallback;
use axum::error_handling::HandleErrorLayer;
use axum::http::{Method, StatusCode};
use axum::routing::{delete, get, post, put};
use axum::{BoxError, Router};
use log::{error, info};
use mongodb::{Client as MongoClient, Database};
use std::{env, sync::Arc, time::Duration};
use tower::{buffer::BufferLayer, limit::RateLimitLayer, ServiceBuilder};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};

pub struct AppState {
    pub mongo_db: Database,
    pub brevo_api_key: String,
    pub brevo_cancellation_template_id: u32,
}

pub async fn init(mongodb_client: MongoClient) {
    let mongo_db_name = match env::var("MONGO_DB_NAME") {
        Ok(db) => db,
        Err(_) => panic!("MONGO_DB_NAME not found"),
    };

    let mongo_db = mongodb_client.database(&mongo_db_name);

    let brevo_api_key = match env::var("BREVO_API_KEY") {
        Ok(key) => key,
        Err(_) => panic!("BREVO_API_KEY not found"),
    };

    let brevo_cancellation_template_id = match env::var("BREVO_CANCELLATION_TEMPLATE_ID") {
        Ok(id) => match id.parse::<u32>() {
            Ok(id) => id,
            Err(_) => panic!("BREVO_CANCELLATION_TEMPLATE_ID must be a number"),
        },
        Err(_) => panic!("BREVO_CANCELLATION_TEMPLATE_ID not found"),
    };

    let app_state = Arc::new(AppState {
        mongo_db,
        brevo_api_key,
        brevo_cancellation_template_id,
    });

    let subscriptions = Router::new()
        .route(
            "/",
            get({
                let app_state = Arc::clone(&app_state);
                move |headers, query| get_subscriptions(headers, query, app_state)
            })
            .post({
                let app_state = Arc::clone(&app_state);
                move |headers, payload| create_subscription(headers, payload, app_state)
            }),
        )
        .route(
            "/upcoming",
            get({
                let app_state = Arc::clone(&app_state);
                move |headers, query| get_upcoming_services(headers, query, app_state)
            }),
        )
        .route(
            "/expiring",
            get({
                let app_state = Arc::clone(&app_state);
                move |headers, query| get_expiring_subscriptions(headers, query, app_state)
            }),
        )
        .route(
            "/:id",
            get({
                let app_state = Arc::clone(&app_state);
                move |path, headers| get_subscription_details(path, headers, app_state)
            })
            .put({
                let app_state = Arc::clone(&app_state);
                move |path, headers, payload| update_subscription(path, headers, payload, app_state)
            }),
        )
        .route(
            "/:id/pause",
            post({
                let app_state = Arc::clone(&app_state);
                move |path, headers, payload| pause_subscription(path, headers, payload, app_state)
            }),
        )
        .route(
            "/:id/resume",
            post({
                let app_state = Arc::clone(&app_state);
                move |path, headers| resume_subscription(path, headers, app_state)
            }),
        )
        .route(
            "/:id/cancel",
            post({
                let app_state = Arc::clone(&app_state);
                move |path, headers, payload| cancel_subscription(path, headers, payload, app_state)
            }),
        )
        .route(
            "/:id/renew",
            post({
                let app_state = Arc::clone(&app_state);
                move |path, headers| renew_subscription(path, headers, app_state)
            }),
        )
        .route(
            "/:id/activate",
            post({
                let app_state = Arc::clone(&app_state);
                move |path, headers| activate_subscription(path, headers, app_state)
            }),
        )
        .route(
            "/:id/history",
            get({
                let app_state = Arc::clone(&app_state);
                move |path, headers, query| {
                    get_subscription_history(path, headers, query, app_state)
                }
            }),
        )
        .route(
            "/:id/record-visit",
            post({
                let app_state = Arc::clone(&app_state);
                move |path, headers, payload| {
                    record_service_visit(path, headers, payload, app_state)
                }
            }),
        )
        .route(
            "/:id/schedule",
            put({
                let app_state = Arc::clone(&app_state);
                move |path, headers, payload| update_schedule(path, headers, payload, app_state)
            }),
        )
        .route(
            "/:id/reschedule",
            post({
                let app_state = Arc::clone(&app_state);
                move |path, headers, payload| reschedule_service(path, headers, payload, app_state)
            }),
        )
        .route(
            "/:id/payment-method",
            put({
                let app_state = Arc::clone(&app_state);
                move |path, headers, payload| {
                    update_payment_method(path, headers, payload, app_state)
                }
            }),
        )
        .route(
            "/:id/apply-discount",
            post({
                let app_state = Arc::clone(&app_state);
                move |path, headers, payload| apply_discount(path, headers, payload, app_state)
            }),
        )
        .route(
            "/:id/discount",
            delete({
                let app_state = Arc::clone(&app_state);
                move |path, headers| remove_discount(path, headers, app_state)
            }),
        )
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|err: BoxError| async move {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Unhandled error: {}", err),
                    )
                }))
                .layer(BufferLayer::new(1024))
                .layer(RateLimitLayer::new(60, Duration::from_secs(60))),
        );

    let admin = Router::new()
        .route(
            "/subscriptions/:id/expire",
            post({
                let app_state = Arc::clone(&app_state);
                move |path, headers| expire_subscription(path, headers, app_state)
            }),
        )
        .route(
            "/recount",
            post({
                let app_state = Arc::clone(&app_state);
                move |headers, payload| recount_statistics(headers, payload, app_state)
            }),
        );

    let api = Router::new()
        .nest("/subscription", subscriptions)
        .nest("/admin", admin);

    let cors = CorsLayer::new()
        .allow_credentials(false)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(Any);

    let app = Router::new()
        .nest("/api", api)
        .layer(cors)
        .layer(CompressionLayer::new())
        .fallback(fallback);

    let host = env::var("HOST").unwrap_or_else(|_| String::from("0.0.0.0"));
    let port = env::var("PORT").unwrap_or_else(|_| String::from("3000"));
    let address = format!("{}:{}", host, port);

    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => panic!("Error binding {}: {}", address, e),
    };

    info!("Server running on {}", address);
    match axum::serve(listener, app).await {
        Ok(_) => (),
        Err(e) => error!("Error starting server: {}", e),
    };
}
