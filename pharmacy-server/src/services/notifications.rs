//! Order Notification Service
//!
//! SMS dispatch is best-effort and always happens after the state change has
//! committed. The default implementation only writes to the log; a real
//! gateway plugs in behind the [`Notifier`] trait.

use async_trait::async_trait;

use crate::db::models::OrderStatus;

/// Outbound SMS seam
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Send a message to a phone number. Errors are for the caller to log;
    /// notification failure never fails the triggering operation.
    async fn send_sms(&self, to: &str, message: &str) -> Result<(), NotifyError>;
}

/// Notification dispatch error
#[derive(Debug, thiserror::Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

/// Customer-facing copy for an order status change
pub fn order_status_message(order_id: &str, status: OrderStatus) -> String {
    match status {
        OrderStatus::Verified => {
            format!("Your order {order_id} has been verified and is being processed.")
        }
        OrderStatus::Processing => format!("Your order {order_id} is being prepared."),
        OrderStatus::Assigned => {
            format!("Your order {order_id} has been assigned to a delivery agent.")
        }
        OrderStatus::PickedUp => {
            format!("Your order {order_id} has been picked up and is on the way!")
        }
        OrderStatus::Delivered => {
            format!("Your order {order_id} has been delivered. Thank you!")
        }
        OrderStatus::Rejected => {
            format!("Your order {order_id} could not be processed. Please contact support.")
        }
        other => format!("Your order {order_id} status: {other}"),
    }
}

/// Default notifier: records the message in the log instead of sending it
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_sms(&self, to: &str, message: &str) -> Result<(), NotifyError> {
        tracing::info!(target: "notifications", to, message, "SMS (log only)");
        Ok(())
    }
}

/// Fire-and-forget dispatch of a status-change SMS
///
/// Spawned so a slow or failing gateway never delays the HTTP response.
pub fn dispatch_status_update(
    notifier: std::sync::Arc<dyn Notifier>,
    phone: Option<String>,
    order_id: String,
    status: OrderStatus,
) {
    let Some(phone) = phone else {
        tracing::debug!(order_id, "No phone on file, skipping status SMS");
        return;
    };
    tokio::spawn(async move {
        let message = order_status_message(&order_id, status);
        if let Err(e) = notifier.send_sms(&phone, &message).await {
            tracing::warn!(order_id, error = %e, "Failed to send status SMS");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_templates() {
        assert_eq!(
            order_status_message("ORD-1-ABC", OrderStatus::Delivered),
            "Your order ORD-1-ABC has been delivered. Thank you!"
        );
        assert_eq!(
            order_status_message("ORD-1-ABC", OrderStatus::Pending),
            "Your order ORD-1-ABC status: pending"
        );
    }
}
