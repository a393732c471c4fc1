use chrono::{DateTime, Duration, Utc};

use crate::types::subscription::PlanInterval;

/// Fixed day count for each billing interval. "monthly" is always exactly
/// 30 days, not "same day next month".
pub fn interval_days(interval: &PlanInterval) -> i64 {
    match interval {
        PlanInterval::Weekly => 7,
        PlanInterval::BiWeekly => 14,
        PlanInterval::Monthly => 30,
        PlanInterval::Quarterly => 90,
        PlanInterval::Yearly => 365,
    }
}

pub fn next_billing_date(interval: &PlanInterval, reference: DateTime<Utc>) -> DateTime<Utc> {
    reference + Duration::days(interval_days(interval))
}
