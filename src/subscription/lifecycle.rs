use chrono::{DateTime, Utc};

use crate::subscription::billing;
use crate::types::subscription::{
    Cancellation, CancelledBy, Discount, PauseRecord, RefundStatus, Subscription,
    SubscriptionStatus, VisitRecord, VisitStatus,
};

/// Denormalized-counter side effects a lifecycle operation produces. The
/// state machine never writes Customer or Service documents itself; it
/// hands the deltas back and the caller applies them with `$inc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterDelta {
    pub customer_active: i32,
    pub service_active: i32,
}

impl CounterDelta {
    pub fn none() -> CounterDelta {
        CounterDelta {
            customer_active: 0,
            service_active: 0,
        }
    }

    pub fn is_none(&self) -> bool {
        self.customer_active == 0 && self.service_active == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    IllegalTransition {
        from: SubscriptionStatus,
        operation: &'static str,
    },
    InvalidRating(u8),
}

impl ToString for LifecycleError {
    fn to_string(&self) -> String {
        match self {
            LifecycleError::IllegalTransition { from, operation } => {
                format!(
                    "subscription.cannot_{}_from_{}",
                    operation,
                    from.to_string()
                )
            }
            LifecycleError::InvalidRating(_) => {
                String::from("subscription.rating_must_be_between_1_and_5")
            }
        }
    }
}

impl Subscription {
    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.to_rfc3339();
    }

    /// pending -> active, once the creation flow completes.
    pub fn activate(&mut self, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        if self.status != SubscriptionStatus::Pending {
            return Err(LifecycleError::IllegalTransition {
                from: self.status,
                operation: "activate",
            });
        }

        self.status = SubscriptionStatus::Active;
        self.touch(now);
        Ok(())
    }

    /// active -> paused. Opens a pause history entry; the returned delta
    /// takes the subscription out of the customer's active count.
    pub fn pause(
        &mut self,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<CounterDelta, LifecycleError> {
        if self.status != SubscriptionStatus::Active {
            return Err(LifecycleError::IllegalTransition {
                from: self.status,
                operation: "pause",
            });
        }

        self.pause_history.push(PauseRecord {
            paused_at: now.to_rfc3339(),
            resumed_at: None,
            reason,
        });
        self.status = SubscriptionStatus::Paused;
        self.touch(now);

        Ok(CounterDelta {
            customer_active: -1,
            service_active: 0,
        })
    }

    /// paused -> active. Closes the open pause history entry.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<CounterDelta, LifecycleError> {
        if self.status != SubscriptionStatus::Paused {
            return Err(LifecycleError::IllegalTransition {
                from: self.status,
                operation: "resume",
            });
        }

        if let Some(last) = self.pause_history.last_mut() {
            if last.resumed_at.is_none() {
                last.resumed_at = Some(now.to_rfc3339());
            }
        }
        self.status = SubscriptionStatus::Active;
        self.touch(now);

        Ok(CounterDelta {
            customer_active: 1,
            service_active: 0,
        })
    }

    /// Legal from pending, active and paused. Cancelling an already
    /// cancelled subscription is a no-op success; cancelling an expired
    /// one is rejected.
    pub fn cancel(
        &mut self,
        reason: String,
        cancelled_by: CancelledBy,
        request_refund: bool,
        now: DateTime<Utc>,
    ) -> Result<CounterDelta, LifecycleError> {
        match self.status {
            SubscriptionStatus::Cancelled => return Ok(CounterDelta::none()),
            SubscriptionStatus::Expired => {
                return Err(LifecycleError::IllegalTransition {
                    from: self.status,
                    operation: "cancel",
                })
            }
            _ => (),
        }

        let was_active = self.status == SubscriptionStatus::Active;

        let (refund_amount, refund_status) = if request_refund {
            (Some(self.billing.amount), Some(RefundStatus::Pending))
        } else {
            (None, None)
        };

        self.cancellation = Some(Cancellation {
            cancelled_at: now.to_rfc3339(),
            reason,
            cancelled_by,
            refund_amount,
            refund_status,
        });
        self.status = SubscriptionStatus::Cancelled;
        self.touch(now);

        Ok(CounterDelta {
            customer_active: if was_active { -1 } else { 0 },
            service_active: -1,
        })
    }

    /// expired -> active, with the next billing date recomputed from now.
    pub fn renew(&mut self, now: DateTime<Utc>) -> Result<CounterDelta, LifecycleError> {
        if self.status != SubscriptionStatus::Expired {
            return Err(LifecycleError::IllegalTransition {
                from: self.status,
                operation: "renew",
            });
        }

        self.status = SubscriptionStatus::Active;
        self.next_billing_date = billing::next_billing_date(&self.plan.interval, now).to_rfc3339();
        self.touch(now);

        Ok(CounterDelta {
            customer_active: 1,
            service_active: 1,
        })
    }

    /// active -> expired. No background sweep exists, this is only
    /// reachable through the explicit admin operation.
    pub fn expire(&mut self, now: DateTime<Utc>) -> Result<CounterDelta, LifecycleError> {
        if self.status != SubscriptionStatus::Active {
            return Err(LifecycleError::IllegalTransition {
                from: self.status,
                operation: "expire",
            });
        }

        self.status = SubscriptionStatus::Expired;
        self.touch(now);

        Ok(CounterDelta {
            customer_active: -1,
            service_active: -1,
        })
    }

    /// Appends one visit to the service history and bumps the aggregate
    /// counters. The optional rating is taken here, in the same call, so
    /// there is no window between recording and rating.
    pub fn record_visit(
        &mut self,
        status: VisitStatus,
        notes: String,
        rating: Option<u8>,
        now: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        if let Some(r) = rating {
            if !(1..=5).contains(&r) {
                return Err(LifecycleError::InvalidRating(r));
            }
        }

        let completed_at = if status == VisitStatus::Completed {
            Some(now.to_rfc3339())
        } else {
            None
        };

        self.service_history.push(VisitRecord {
            date: now.to_rfc3339(),
            status,
            notes,
            completed_at,
            rating,
        });

        self.statistics.total_visits += 1;
        match status {
            VisitStatus::Completed => self.statistics.completed_visits += 1,
            VisitStatus::Cancelled => self.statistics.cancelled_visits += 1,
            VisitStatus::Scheduled | VisitStatus::NoShow => (),
        }

        self.touch(now);
        Ok(())
    }

    /// Overwrites any previous discount. Codes are not checked against a
    /// catalog, every code is worth 10%.
    pub fn apply_discount(&mut self, code: String, now: DateTime<Utc>) {
        self.discount = Some(Discount {
            code,
            percentage: Some(10),
            amount: None,
        });
        self.touch(now);
    }

    pub fn remove_discount(&mut self, now: DateTime<Utc>) {
        self.discount = None;
        self.touch(now);
    }

    pub fn open_pause_entries(&self) -> usize {
        self.pause_history
            .iter()
            .filter(|entry| entry.resumed_at.is_none())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::customer::GenericResponse;
    use crate::types::subscription::{
        Billing, Plan, PlanInterval, PlanType, Schedule, SubscriptionStatistics,
    };
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap()
    }

    fn subscription(status: SubscriptionStatus) -> Subscription {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Subscription {
            id: String::from("sub_test0001"),
            customer_id: String::from("cus_test0001"),
            service_id: String::from("svc_test0001"),
            provider_id: String::from("prv_test0001"),
            plan: Plan {
                plan_type: PlanType::Basic,
                name: String::from("Weekly Cleaning"),
                price: 80.0,
                interval: PlanInterval::Monthly,
                visits_per_interval: 4,
            },
            status,
            start_date: created.to_rfc3339(),
            end_date: None,
            next_billing_date: (created + chrono::Duration::days(30)).to_rfc3339(),
            next_service_date: Some(created.to_rfc3339()),
            auto_renew: true,
            billing: Billing {
                amount: 80.0,
                currency: String::from("USD"),
                payment_method_id: Some(String::from("pm_test")),
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
            created_at: created.to_rfc3339(),
            updated_at: created.to_rfc3339(),
        }
    }

    #[test]
    fn pause_then_resume_returns_to_active_and_closes_the_entry() {
        let mut sub = subscription(SubscriptionStatus::Active);

        let delta = sub.pause(String::from("vacation"), now()).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Paused);
        assert_eq!(delta.customer_active, -1);
        assert_eq!(sub.open_pause_entries(), 1);

        let delta = sub.resume(now()).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(delta.customer_active, 1);
        assert_eq!(sub.open_pause_entries(), 0);
        assert!(sub.pause_history.last().unwrap().resumed_at.is_some());
    }

    #[test]
    fn open_pause_entry_exists_iff_paused() {
        let mut sub = subscription(SubscriptionStatus::Active);
        assert_eq!(sub.open_pause_entries(), 0);

        sub.pause(String::from("travel"), now()).unwrap();
        assert_eq!(sub.open_pause_entries(), 1);

        sub.resume(now()).unwrap();
        sub.pause(String::from("travel again"), now()).unwrap();
        assert_eq!(sub.pause_history.len(), 2);
        assert_eq!(sub.open_pause_entries(), 1);
    }

    #[test]
    fn resume_on_non_paused_is_rejected_and_changes_nothing() {
        for status in [
            SubscriptionStatus::Pending,
            SubscriptionStatus::Active,
            SubscriptionStatus::Cancelled,
            SubscriptionStatus::Expired,
        ] {
            let mut sub = subscription(status);
            let before = serde_json::to_value(&sub).unwrap();

            let err = sub.resume(now()).unwrap_err();
            assert!(matches!(err, LifecycleError::IllegalTransition { .. }));
            assert_eq!(serde_json::to_value(&sub).unwrap(), before);
        }
    }

    #[test]
    fn pause_is_only_legal_from_active() {
        for status in [
            SubscriptionStatus::Pending,
            SubscriptionStatus::Paused,
            SubscriptionStatus::Cancelled,
            SubscriptionStatus::Expired,
        ] {
            let mut sub = subscription(status);
            assert!(sub.pause(String::from("x"), now()).is_err());
            assert!(sub.pause_history.is_empty());
        }
    }

    #[test]
    fn completed_visit_bumps_total_and_completed_only() {
        let mut sub = subscription(SubscriptionStatus::Active);
        sub.record_visit(VisitStatus::Completed, String::from("all good"), None, now())
            .unwrap();

        assert_eq!(sub.statistics.total_visits, 1);
        assert_eq!(sub.statistics.completed_visits, 1);
        assert_eq!(sub.statistics.cancelled_visits, 0);
        assert!(sub.service_history[0].completed_at.is_some());
    }

    #[test]
    fn visit_counters_stay_consistent_over_mixed_statuses() {
        let mut sub = subscription(SubscriptionStatus::Active);
        let statuses = [
            VisitStatus::Completed,
            VisitStatus::Cancelled,
            VisitStatus::NoShow,
            VisitStatus::Scheduled,
            VisitStatus::Completed,
            VisitStatus::NoShow,
            VisitStatus::Cancelled,
        ];

        for status in statuses {
            sub.record_visit(status, String::new(), None, now()).unwrap();
        }

        assert_eq!(sub.statistics.total_visits, statuses.len() as u64);
        assert_eq!(
            sub.statistics.total_visits,
            sub.service_history.len() as u64
        );
        assert_eq!(sub.statistics.completed_visits, 2);
        assert_eq!(sub.statistics.cancelled_visits, 2);
        assert!(
            sub.statistics.completed_visits + sub.statistics.cancelled_visits
                <= sub.statistics.total_visits
        );
    }

    #[test]
    fn non_completed_visits_have_no_completed_at() {
        let mut sub = subscription(SubscriptionStatus::Active);
        sub.record_visit(VisitStatus::NoShow, String::from("nobody home"), None, now())
            .unwrap();
        assert!(sub.service_history[0].completed_at.is_none());
    }

    #[test]
    fn rating_is_recorded_with_the_visit() {
        let mut sub = subscription(SubscriptionStatus::Active);
        sub.record_visit(VisitStatus::Completed, String::new(), Some(5), now())
            .unwrap();
        assert_eq!(sub.service_history[0].rating, Some(5));
    }

    #[test]
    fn out_of_range_rating_is_rejected() {
        let mut sub = subscription(SubscriptionStatus::Active);
        for bad in [0u8, 6, 200] {
            let err = sub
                .record_visit(VisitStatus::Completed, String::new(), Some(bad), now())
                .unwrap_err();
            assert_eq!(err, LifecycleError::InvalidRating(bad));
        }
        assert!(sub.service_history.is_empty());
        assert_eq!(sub.statistics.total_visits, 0);
    }

    #[test]
    fn cancel_active_with_refund_populates_the_refund_fields() {
        let mut sub = subscription(SubscriptionStatus::Active);
        let delta = sub
            .cancel(
                String::from("customer_request"),
                CancelledBy::Customer,
                true,
                now(),
            )
            .unwrap();

        assert_eq!(sub.status, SubscriptionStatus::Cancelled);
        assert_eq!(delta.customer_active, -1);
        assert_eq!(delta.service_active, -1);

        let cancellation = sub.cancellation.as_ref().unwrap();
        assert_eq!(cancellation.refund_amount, Some(80.0));
        assert_eq!(cancellation.refund_status, Some(RefundStatus::Pending));
        assert_eq!(cancellation.cancelled_by, CancelledBy::Customer);
    }

    #[test]
    fn cancel_from_pending_or_paused_spares_the_customer_counter() {
        for status in [SubscriptionStatus::Pending, SubscriptionStatus::Paused] {
            let mut sub = subscription(status);
            let delta = sub
                .cancel(String::from("no longer needed"), CancelledBy::Admin, false, now())
                .unwrap();
            assert_eq!(delta.customer_active, 0);
            assert_eq!(delta.service_active, -1);
            assert!(sub.cancellation.as_ref().unwrap().refund_amount.is_none());
        }
    }

    #[test]
    fn cancelling_twice_is_a_noop_success() {
        let mut sub = subscription(SubscriptionStatus::Active);
        sub.cancel(String::from("first"), CancelledBy::Customer, false, now())
            .unwrap();
        let first = sub.cancellation.clone().unwrap();

        let delta = sub
            .cancel(String::from("second"), CancelledBy::Admin, true, now())
            .unwrap();
        assert!(delta.is_none());
        assert_eq!(sub.cancellation.as_ref().unwrap().reason, first.reason);
    }

    #[test]
    fn cancel_from_expired_is_rejected() {
        let mut sub = subscription(SubscriptionStatus::Expired);
        let err = sub
            .cancel(String::from("late"), CancelledBy::Customer, false, now())
            .unwrap_err();
        assert!(matches!(err, LifecycleError::IllegalTransition { .. }));
        assert!(sub.cancellation.is_none());
    }

    #[test]
    fn renew_is_only_legal_from_expired_and_recomputes_billing() {
        let mut sub = subscription(SubscriptionStatus::Expired);
        let at = now();
        sub.renew(at).unwrap();

        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(
            sub.next_billing_date,
            (at + chrono::Duration::days(30)).to_rfc3339()
        );

        let mut active = subscription(SubscriptionStatus::Active);
        assert!(active.renew(at).is_err());
    }

    #[test]
    fn activate_moves_pending_to_active_once() {
        let mut sub = subscription(SubscriptionStatus::Pending);
        sub.activate(now()).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert!(sub.activate(now()).is_err());
    }

    #[test]
    fn expire_only_from_active() {
        let mut sub = subscription(SubscriptionStatus::Active);
        let delta = sub.expire(now()).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Expired);
        assert_eq!(delta.customer_active, -1);

        let mut paused = subscription(SubscriptionStatus::Paused);
        assert!(paused.expire(now()).is_err());
    }

    #[test]
    fn discount_round_trip_leaves_billing_untouched() {
        let mut sub = subscription(SubscriptionStatus::Active);
        let amount_before = sub.billing.amount;

        sub.apply_discount(String::from("WELCOME10"), now());
        let discount = sub.discount.as_ref().unwrap();
        assert_eq!(discount.code, "WELCOME10");
        assert_eq!(discount.percentage, Some(10));
        assert_eq!(sub.billing.amount, amount_before);

        sub.remove_discount(now());
        assert!(sub.discount.is_none());
        assert_eq!(sub.billing.amount, amount_before);
    }

    #[test]
    fn illegal_transition_messages_are_namespaced() {
        let err = LifecycleError::IllegalTransition {
            from: SubscriptionStatus::Pending,
            operation: "pause",
        };
        assert_eq!(err.to_string(), "subscription.cannot_pause_from_pending");
    }

    // GenericResponse is the envelope every handler serializes errors
    // into; keep the shape pinned here since the frontend depends on it.
    #[test]
    fn response_envelope_shape() {
        let response = GenericResponse {
            success: false,
            message: String::from("subscription.cannot_resume_from_active"),
            data: serde_json::json!({}),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], false);
        assert!(value["message"].is_string());
    }
}
