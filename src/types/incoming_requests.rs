use serde::{Deserialize, Serialize};

use crate::types::subscription::{PreferredDay, Schedule};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubscriptionPlan {
    #[serde(rename = "type")]
    pub plan_type: Option<String>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub interval: String,
    pub visits_per_interval: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubscription {
    pub service_id: String,
    pub plan: CreateSubscriptionPlan,
    pub start_date: Option<String>,
    pub schedule: Option<Schedule>,
    pub payment_method_id: Option<String>,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSubscription {
    pub plan: Option<UpdateSubscriptionPlan>,
    pub schedule: Option<UpdateSchedule>,
    pub auto_renew: Option<bool>,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSubscriptionPlan {
    #[serde(rename = "type")]
    pub plan_type: Option<String>,
    pub interval: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PauseSubscription {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelSubscription {
    pub reason: String,
    pub request_refund: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordVisit {
    pub status: String,
    pub notes: Option<String>,
    pub rating: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSchedule {
    pub preferred_days: Option<Vec<PreferredDay>>,
    pub preferred_time: Option<String>,
    pub flexible_scheduling: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleService {
    pub new_date: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePaymentMethod {
    pub payment_method_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyDiscount {
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecountStatistics {
    pub customer_id: Option<String>,
    pub service_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListSubscriptionsQuery {
    pub status: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct DaysWindowQuery {
    pub days: Option<i64>,
}
