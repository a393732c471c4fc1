use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceStatistics {
    pub total_bookings: u64,
    pub completed_bookings: u64,
    pub active_subscriptions: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub provider_id: String,
    pub name: String,
    pub category: String,
    pub base_price: f64,
    pub is_active: bool,

    pub statistics: ServiceStatistics,

    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceProvider {
    pub id: String,
    pub user_id: String,
    pub business_name: String,

    pub created_at: String,
    pub updated_at: String,
}
