//! Order notifications: SMTP when configured, log lines otherwise.

use door_portal_core::{Notifier, NotifyError, Order, OrderStatus};

use super::email::{EmailError, EmailService, order_number};

/// The portal's [`Notifier`].
#[derive(Clone)]
pub enum PortalNotifier {
    /// Send emails through SMTP.
    Email(EmailService),
    /// SMTP is not configured; record notifications in the log.
    Log,
}

impl From<EmailError> for NotifyError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::Template(e) => Self::Render(e.to_string()),
            other => Self::Delivery(other.to_string()),
        }
    }
}

impl Notifier for PortalNotifier {
    async fn notify_order_created(&self, order: &Order) -> Result<(), NotifyError> {
        match self {
            Self::Email(email) => Ok(email.send_order_created(order).await?),
            Self::Log => {
                tracing::info!(
                    order_id = %order.id,
                    order_number = %order_number(order),
                    customer = %order.customer.email,
                    total = %order.summary.rounded().total,
                    "Order confirmation (email disabled)"
                );
                Ok(())
            }
        }
    }

    async fn notify_status_changed(
        &self,
        order: &Order,
        previous: OrderStatus,
    ) -> Result<(), NotifyError> {
        match self {
            Self::Email(email) => Ok(email.send_status_changed(order, previous).await?),
            Self::Log => {
                tracing::info!(
                    order_id = %order.id,
                    from = %previous,
                    to = %order.status,
                    customer = %order.customer.email,
                    "Status notification (email disabled)"
                );
                Ok(())
            }
        }
    }
}
