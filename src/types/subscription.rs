use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Basic,
    Premium,
    Enterprise,
    Custom,
}

impl ToString for PlanType {
    fn to_string(&self) -> String {
        match self {
            PlanType::Basic => String::from("basic"),
            PlanType::Premium => String::from("premium"),
            PlanType::Enterprise => String::from("enterprise"),
            PlanType::Custom => String::from("custom"),
        }
    }
}

impl FromStr for PlanType {
    type Err = ();

    fn from_str(s: &str) -> Result<PlanType, Self::Err> {
        match s {
            "basic" => Ok(PlanType::Basic),
            "premium" => Ok(PlanType::Premium),
            "enterprise" => Ok(PlanType::Enterprise),
            "custom" => Ok(PlanType::Custom),
            _ => Ok(PlanType::Basic),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlanInterval {
    Weekly,
    #[serde(rename = "bi-weekly")]
    BiWeekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl ToString for PlanInterval {
    fn to_string(&self) -> String {
        match self {
            PlanInterval::Weekly => String::from("weekly"),
            PlanInterval::BiWeekly => String::from("bi-weekly"),
            PlanInterval::Monthly => String::from("monthly"),
            PlanInterval::Quarterly => String::from("quarterly"),
            PlanInterval::Yearly => String::from("yearly"),
        }
    }
}

// Unknown interval names fall back to monthly, so billing keeps charging
// every 30 days for anything it does not recognize.
impl FromStr for PlanInterval {
    type Err = ();

    fn from_str(s: &str) -> Result<PlanInterval, Self::Err> {
        match s {
            "weekly" => Ok(PlanInterval::Weekly),
            "bi-weekly" => Ok(PlanInterval::BiWeekly),
            "monthly" => Ok(PlanInterval::Monthly),
            "quarterly" => Ok(PlanInterval::Quarterly),
            "yearly" => Ok(PlanInterval::Yearly),
            _ => Ok(PlanInterval::Monthly),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    #[serde(rename = "type")]
    pub plan_type: PlanType,
    pub name: String,
    pub price: f64,
    pub interval: PlanInterval,
    pub visits_per_interval: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Pending,
    Active,
    Paused,
    Cancelled,
    Expired,
}

impl ToString for SubscriptionStatus {
    fn to_string(&self) -> String {
        match self {
            SubscriptionStatus::Pending => String::from("pending"),
            SubscriptionStatus::Active => String::from("active"),
            SubscriptionStatus::Paused => String::from("paused"),
            SubscriptionStatus::Cancelled => String::from("cancelled"),
            SubscriptionStatus::Expired => String::from("expired"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Billing {
    pub amount: f64,
    pub currency: String,
    pub payment_method_id: Option<String>,
    pub last_payment_date: Option<String>,
    pub last_payment_amount: Option<f64>,
    pub next_payment_amount: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PreferredDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    pub preferred_days: Vec<PreferredDay>,
    pub preferred_time: Option<String>,
    pub flexible_scheduling: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VisitStatus {
    Scheduled,
    Completed,
    Cancelled,
    #[serde(rename = "no-show")]
    NoShow,
}

impl FromStr for VisitStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<VisitStatus, Self::Err> {
        match s {
            "scheduled" => Ok(VisitStatus::Scheduled),
            "completed" => Ok(VisitStatus::Completed),
            "cancelled" => Ok(VisitStatus::Cancelled),
            "no-show" => Ok(VisitStatus::NoShow),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitRecord {
    pub date: String,
    pub status: VisitStatus,
    pub notes: String,
    pub completed_at: Option<String>,
    pub rating: Option<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscriptionStatistics {
    pub total_visits: u64,
    pub completed_visits: u64,
    pub cancelled_visits: u64,
    pub total_spent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PauseRecord {
    pub paused_at: String,
    pub resumed_at: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CancelledBy {
    Customer,
    Provider,
    Admin,
}

impl FromStr for CancelledBy {
    type Err = ();

    fn from_str(s: &str) -> Result<CancelledBy, Self::Err> {
        match s {
            "customer" => Ok(CancelledBy::Customer),
            "provider" => Ok(CancelledBy::Provider),
            "admin" => Ok(CancelledBy::Admin),
            _ => Ok(CancelledBy::Customer),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RefundStatus {
    Pending,
    Processed,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cancellation {
    pub cancelled_at: String,
    pub reason: String,
    pub cancelled_by: CancelledBy,
    pub refund_amount: Option<f64>,
    pub refund_status: Option<RefundStatus>,
}

// Stored verbatim, nothing multiplies it into billing.amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discount {
    pub code: String,
    pub percentage: Option<u8>,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub customer_id: String,
    pub service_id: String,
    pub provider_id: String,

    pub plan: Plan,
    pub status: SubscriptionStatus,

    pub start_date: String,
    pub end_date: Option<String>,
    pub next_billing_date: String,
    pub next_service_date: Option<String>,

    pub auto_renew: bool,
    pub billing: Billing,
    pub schedule: Schedule,

    pub service_history: Vec<VisitRecord>,
    pub statistics: SubscriptionStatistics,
    pub pause_history: Vec<PauseRecord>,
    pub cancellation: Option<Cancellation>,
    pub discount: Option<Discount>,

    pub special_instructions: Option<String>,

    pub created_at: String,
    pub updated_at: String,
}
