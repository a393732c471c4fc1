use std::str::FromStr;

use crate::types::subscription::Subscription;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerRole {
    Customer,
    Provider,
    Admin,
}

impl FromStr for CallerRole {
    type Err = ();

    fn from_str(s: &str) -> Result<CallerRole, Self::Err> {
        match s {
            "customer" => Ok(CallerRole::Customer),
            "provider" => Ok(CallerRole::Provider),
            "admin" => Ok(CallerRole::Admin),
            _ => Err(()),
        }
    }
}

/// Authenticated caller as supplied by the request layer, plus the
/// resolved profile ids looked up from the user id.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: String,
    pub role: CallerRole,
}

/// The only authorization boundary over subscription data. Admin always
/// passes; a customer or provider passes only when their own profile id
/// matches the subscription's reference. Evaluated on every read and
/// write by non-admin callers.
pub fn can_access(
    role: CallerRole,
    customer_profile_id: Option<&str>,
    provider_profile_id: Option<&str>,
    subscription: &Subscription,
) -> bool {
    match role {
        CallerRole::Admin => true,
        CallerRole::Customer => match customer_profile_id {
            Some(id) => id == subscription.customer_id,
            None => false,
        },
        CallerRole::Provider => match provider_profile_id {
            Some(id) => id == subscription.provider_id,
            None => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::subscription::{
        Billing, Plan, PlanInterval, PlanType, Schedule, Subscription, SubscriptionStatistics,
        SubscriptionStatus,
    };

    fn subscription() -> Subscription {
        Subscription {
            id: String::from("sub_1"),
            customer_id: String::from("cus_owner"),
            service_id: String::from("svc_1"),
            provider_id: String::from("prv_owner"),
            plan: Plan {
                plan_type: PlanType::Basic,
                name: String::from("Lawn Care"),
                price: 45.0,
                interval: PlanInterval::Weekly,
                visits_per_interval: 1,
            },
            status: SubscriptionStatus::Active,
            start_date: String::from("2024-01-01T00:00:00+00:00"),
            end_date: None,
            next_billing_date: String::from("2024-01-08T00:00:00+00:00"),
            next_service_date: None,
            auto_renew: true,
            billing: Billing {
                amount: 45.0,
                currency: String::from("USD"),
                payment_method_id: None,
                last_payment_date: None,
                last_payment_amount: None,
                next_payment_amount: None,
            },
            schedule: Schedule::default(),
            service_history: vec![],
            statistics: SubscriptionStatistics::default(),
            pause_history: vec![],
            cancellation: None,
            discount: None,
            special_instructions: None,
            created_at: String::from("2024-01-01T00:00:00+00:00"),
            updated_at: String::from("2024-01-01T00:00:00+00:00"),
        }
    }

    #[test]
    fn admin_is_always_granted() {
        let sub = subscription();
        assert!(can_access(CallerRole::Admin, None, None, &sub));
    }

    #[test]
    fn owning_customer_is_granted() {
        let sub = subscription();
        assert!(can_access(CallerRole::Customer, Some("cus_owner"), None, &sub));
    }

    #[test]
    fn foreign_customer_is_denied_regardless_of_claims() {
        let sub = subscription();
        assert!(!can_access(CallerRole::Customer, Some("cus_other"), None, &sub));
        // a customer claim with the provider's id does not help either
        assert!(!can_access(
            CallerRole::Customer,
            Some("prv_owner"),
            Some("prv_owner"),
            &sub
        ));
    }

    #[test]
    fn owning_provider_is_granted_foreign_denied() {
        let sub = subscription();
        assert!(can_access(CallerRole::Provider, None, Some("prv_owner"), &sub));
        assert!(!can_access(CallerRole::Provider, None, Some("prv_other"), &sub));
    }

    #[test]
    fn missing_profile_is_denied() {
        let sub = subscription();
        assert!(!can_access(CallerRole::Customer, None, None, &sub));
        assert!(!can_access(CallerRole::Provider, None, None, &sub));
    }

    #[test]
    fn role_parsing() {
        assert_eq!(CallerRole::from_str("admin"), Ok(CallerRole::Admin));
        assert_eq!(CallerRole::from_str("customer"), Ok(CallerRole::Customer));
        assert_eq!(CallerRole::from_str("provider"), Ok(CallerRole::Provider));
        assert!(CallerRole::from_str("superuser").is_err());
    }
}
