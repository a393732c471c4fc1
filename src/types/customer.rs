use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize)]
pub struct GenericResponse {
    pub success: bool,
    pub message: String,
    pub data: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerStatistics {
    pub total_bookings: u64,
    pub active_subscriptions: i64,
    pub completed_services: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub user_id: String,
    pub full_name: String,
    pub email: String,

    pub subscriptions: Vec<String>,
    pub statistics: CustomerStatistics,

    pub created_at: String,
    pub updated_at: String,
}
