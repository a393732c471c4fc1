mod server;

mod controllers;
mod email;
mod storage;
mod subscription;
mod types;
mod utilities;

use std::env;
use storage::mongo;

fn init_logger() {
    let result = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                chrono::Utc::now().to_rfc3339(),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Info)
        .chain(std::io::stdout())
        .apply();

    match result {
        Ok(_) => (),
        Err(e) => panic!("Error initializing logger: {}", e),
    };
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_logger();

    env::var("HOST").expect("HOST must be set");
    let port = env::var("PORT").expect("PORT must be set");
    match port.parse::<u16>() {
        Ok(_) => (),
        Err(_) => panic!("PORT must be a number"),
    };

    env::var("MONGO_URI").expect("MONGO_URI must be set");
    env::var("MONGO_DB_NAME").expect("MONGO_DB_NAME must be set");

    env::var("API_TOKENS_SIGNING_KEY").expect("API_TOKENS_SIGNING_KEY must be set");
    env::var("BREVO_API_KEY").expect("BREVO_API_KEY must be set");
    env::var("BREVO_CANCELLATION_TEMPLATE_ID")
        .expect("BREVO_CANCELLATION_TEMPLATE_ID must be set");

    let mongo_client = match mongo::init_connection().await {
        Ok(client) => client,
        Err(e) => panic!("Error connecting to MongoDB: {}", e),
    };

    match mongo_client
        .database("admin")
        .run_command(mongodb::bson::doc! {"ping": 1}, None)
        .await
    {
        Ok(_) => log::info!("Connected to MongoDB"),
        Err(e) => panic!("Error connecting to MongoDB: {}", e),
    };

    server::init(mongo_client).await;
}
