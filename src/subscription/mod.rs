pub mod access;
pub mod billing;
pub mod lifecycle;

#[cfg(test)]
mod flow_tests {
    use crate::subscription::billing;
    use crate::types::subscription::{
        Billing, CancelledBy, Plan, PlanInterval, PlanType, RefundStatus, Schedule, Subscription,
        SubscriptionStatistics, SubscriptionStatus, VisitStatus,
    };
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn new_subscription(start: DateTime<Utc>, interval: PlanInterval) -> Subscription {
        let next_billing = billing::next_billing_date(&interval, start);
        Subscription {
            id: String::from("sub_flow00001"),
            customer_id: String::from("cus_flow00001"),
            service_id: String::from("svc_flow00001"),
            provider_id: String::from("prv_flow00001"),
            plan: Plan {
                plan_type: PlanType::Premium,
                name: String::from("Deep Cleaning"),
                price: 120.0,
                interval,
                visits_per_interval: 2,
            },
            status: SubscriptionStatus::Pending,
            start_date: start.to_rfc3339(),
            end_date: None,
            next_billing_date: next_billing.to_rfc3339(),
            next_service_date: Some(start.to_rfc3339()),
            auto_renew: true,
            billing: Billing {
                amount: 120.0,
                currency: String::from("USD"),
                payment_method_id: Some(String::from("pm_flow")),
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
            created_at: start.to_rfc3339(),
            updated_at: start.to_rfc3339(),
        }
    }

    // creation on 2024-01-01 with a monthly plan bills again on
    // 2024-01-31, the fixed 30-day offset
    #[test]
    fn monthly_subscription_created_on_jan_first_bills_on_jan_thirty_first() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let sub = new_subscription(start, PlanInterval::Monthly);

        let expected = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        assert_eq!(sub.next_billing_date, expected.to_rfc3339());
    }

    #[test]
    fn full_lifecycle_pending_to_cancelled() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut sub = new_subscription(start, PlanInterval::Weekly);
        let mut customer_active: i32 = 1; // creation registered it
        let mut service_active: i32 = 1;

        let day = |n: i64| start + Duration::days(n);

        sub.activate(day(1)).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);

        sub.record_visit(VisitStatus::Completed, String::from("first clean"), Some(5), day(3))
            .unwrap();
        sub.record_visit(VisitStatus::NoShow, String::new(), None, day(10))
            .unwrap();

        let delta = sub.pause(String::from("holiday"), day(12)).unwrap();
        customer_active += delta.customer_active;
        service_active += delta.service_active;
        assert_eq!(customer_active, 0);
        assert_eq!(service_active, 1);

        let delta = sub.resume(day(20)).unwrap();
        customer_active += delta.customer_active;
        assert_eq!(customer_active, 1);
        assert_eq!(sub.open_pause_entries(), 0);

        let delta = sub
            .cancel(String::from("moving away"), CancelledBy::Customer, true, day(25))
            .unwrap();
        customer_active += delta.customer_active;
        service_active += delta.service_active;

        assert_eq!(sub.status, SubscriptionStatus::Cancelled);
        assert_eq!(customer_active, 0);
        assert_eq!(service_active, 0);

        let cancellation = sub.cancellation.as_ref().unwrap();
        assert_eq!(cancellation.refund_amount, Some(120.0));
        assert_eq!(cancellation.refund_status, Some(RefundStatus::Pending));

        assert_eq!(sub.statistics.total_visits, 2);
        assert_eq!(sub.statistics.completed_visits, 1);
        assert_eq!(
            sub.statistics.total_visits,
            sub.service_history.len() as u64
        );
    }

    #[test]
    fn expire_then_renew_restores_active_and_counters() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut sub = new_subscription(start, PlanInterval::Quarterly);
        sub.activate(start).unwrap();

        let mut customer_active: i32 = 1;
        let expire_at = start + Duration::days(95);
        let delta = sub.expire(expire_at).unwrap();
        customer_active += delta.customer_active;
        assert_eq!(customer_active, 0);

        let renew_at = start + Duration::days(100);
        let delta = sub.renew(renew_at).unwrap();
        customer_active += delta.customer_active;
        assert_eq!(customer_active, 1);
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(
            sub.next_billing_date,
            (renew_at + Duration::days(90)).to_rfc3339()
        );
    }

    #[test]
    fn subscription_survives_a_bson_round_trip() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut sub = new_subscription(start, PlanInterval::BiWeekly);
        sub.activate(start).unwrap();
        sub.record_visit(VisitStatus::Scheduled, String::from("booked"), None, start)
            .unwrap();
        sub.apply_discount(String::from("SPRING"), start);

        let document = mongodb::bson::to_document(&sub).unwrap();
        assert_eq!(document.get_str("status").unwrap(), "active");
        assert_eq!(
            document
                .get_document("plan")
                .unwrap()
                .get_str("interval")
                .unwrap(),
            "bi-weekly"
        );

        let back: Subscription = mongodb::bson::from_document(document).unwrap();
        assert_eq!(back.status, SubscriptionStatus::Active);
        assert_eq!(back.plan.interval, PlanInterval::BiWeekly);
        assert_eq!(back.discount.as_ref().unwrap().percentage, Some(10));
    }
}
