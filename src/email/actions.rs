use log::error;
use std::sync::Arc;

use crate::email::brevo_api::{send_transactional_email, SubscriptionParams};
use crate::server::AppState;
use crate::types::customer::Customer;
use crate::types::subscription::Subscription;

/// Fire-and-forget cancellation notice. A send failure is logged and
/// never rolls back the state transition that triggered it.
pub fn notify_subscription_cancelled(
    state: Arc<AppState>,
    customer: Customer,
    subscription: Subscription,
    reason: String,
) {
    tokio::spawn(async move {
        let params = SubscriptionParams {
            service_name: subscription.plan.name.clone(),
            subscription_id: subscription.id.clone(),
            reason,
        };

        match send_transactional_email(
            &state.brevo_api_key,
            state.brevo_cancellation_template_id,
            "Your subscription has been cancelled",
            &customer.email,
            &customer.full_name,
            params,
        )
        .await
        {
            Ok(_) => (),
            Err(e) => error!(
                "error sending cancellation email for subscription {}: {}",
                subscription.id, e
            ),
        }
    });
}
