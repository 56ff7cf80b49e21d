//! Email service for order notifications.
//!
//! Uses SMTP via lettre for delivery with Askama HTML and plain text templates.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use door_portal_core::{Money, Order, OrderLine, OrderStatus};

use crate::config::EmailConfig;

/// One order line, preformatted for the templates.
struct LineView {
    qty: i32,
    size: String,
    door_style: String,
    finish: String,
    options: String,
    price: String,
}

impl From<&OrderLine> for LineView {
    fn from(line: &OrderLine) -> Self {
        let item = &line.item;
        let mut options = Vec::new();
        if item.glass {
            options.push(match &item.glass_type {
                Some(glass_type) => format!("Glass: {glass_type}"),
                None => "Glass".to_owned(),
            });
        }
        if item.center_rail {
            options.push("Center rail".to_owned());
        }
        if item.bore {
            options.push("Bored".to_owned());
        }
        if let Some(hinge) = &item.hinge {
            options.push(format!("Hinge: {hinge}"));
        }
        if let Some(notes) = &item.notes {
            options.push(format!("Notes: {notes}"));
        }

        Self {
            qty: item.qty,
            size: format!("{} x {}", item.width.normalize(), item.height.normalize()),
            door_style: item.door_style.clone(),
            finish: item.finish.to_string(),
            options: options.join(", "),
            price: Money::usd(line.price).display(),
        }
    }
}

/// HTML template for the order confirmation.
#[derive(Template)]
#[template(path = "email/order_created.html")]
struct OrderCreatedHtml<'a> {
    order: &'a OrderView,
    lines: &'a [LineView],
}

/// Plain text template for the order confirmation.
#[derive(Template)]
#[template(path = "email/order_created.txt")]
struct OrderCreatedText<'a> {
    order: &'a OrderView,
    lines: &'a [LineView],
}

/// HTML template for a status change.
#[derive(Template)]
#[template(path = "email/status_changed.html")]
struct StatusChangedHtml<'a> {
    order: &'a OrderView,
    previous: &'a str,
}

/// Plain text template for a status change.
#[derive(Template)]
#[template(path = "email/status_changed.txt")]
struct StatusChangedText<'a> {
    order: &'a OrderView,
    previous: &'a str,
}

/// Order fields shared by every template.
struct OrderView {
    order_number: String,
    order_date: String,
    status: &'static str,
    customer_name: String,
    address: String,
    city_line: String,
    payment_method: String,
    unit: &'static str,
    door_count: i64,
    subtotal: String,
    shipping: String,
    discount: String,
    has_discount: bool,
    total: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let summary = order.summary.rounded();
        let customer = &order.customer;
        Self {
            order_number: order_number(order),
            order_date: order.order_date.format("%B %-d, %Y").to_string(),
            status: order.status.label(),
            customer_name: customer.name.clone(),
            address: customer.address.clone(),
            city_line: format!("{}, {} {}", customer.city, customer.state, customer.zip_code),
            payment_method: order.payment_method.clone(),
            unit: match order.unit {
                door_portal_core::MeasurementUnit::Inches => "in",
                door_portal_core::MeasurementUnit::Millimeters => "mm",
            },
            door_count: order.door_count(),
            subtotal: Money::usd(summary.subtotal).display(),
            shipping: Money::usd(summary.shipping).display(),
            discount: Money::usd(summary.discount).display(),
            has_discount: !summary.discount.is_zero(),
            total: Money::usd(summary.total).display(),
        }
    }
}

/// Short, human-friendly order reference.
#[must_use]
pub fn order_number(order: &Order) -> String {
    order
        .id
        .to_string()
        .chars()
        .take(8)
        .collect::<String>()
        .to_uppercase()
}

/// A rendered email, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Render the confirmation sent when an order is submitted.
///
/// # Errors
///
/// Returns `askama::Error` if a template fails to render.
pub fn render_order_created(order: &Order) -> Result<RenderedEmail, askama::Error> {
    let view = OrderView::from(order);
    let lines: Vec<LineView> = order.items.iter().map(LineView::from).collect();

    Ok(RenderedEmail {
        subject: format!("Order {} received", view.order_number),
        text: OrderCreatedText {
            order: &view,
            lines: &lines,
        }
        .render()?,
        html: OrderCreatedHtml {
            order: &view,
            lines: &lines,
        }
        .render()?,
    })
}

/// Render the notice sent when an order changes status.
///
/// # Errors
///
/// Returns `askama::Error` if a template fails to render.
pub fn render_status_changed(
    order: &Order,
    previous: OrderStatus,
) -> Result<RenderedEmail, askama::Error> {
    let view = OrderView::from(order);
    let previous = previous.label();

    Ok(RenderedEmail {
        subject: format!("Order {} is now {}", view.order_number, view.status),
        text: StatusChangedText {
            order: &view,
            previous,
        }
        .render()?,
        html: StatusChangedHtml {
            order: &view,
            previous,
        }
        .render()?,
    })
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    notify_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            notify_address: config.notify_address.clone(),
        })
    }

    /// Send the order confirmation to the customer, copying staff.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_order_created(&self, order: &Order) -> Result<(), EmailError> {
        let email = render_order_created(order)?;
        let staff = parse_mailbox(&self.notify_address)?;
        self.send_multipart_email(order.customer.email.as_str(), Some(staff), &email)
            .await
    }

    /// Tell the customer their order changed status.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_status_changed(
        &self,
        order: &Order,
        previous: OrderStatus,
    ) -> Result<(), EmailError> {
        let email = render_status_changed(order, previous)?;
        self.send_multipart_email(order.customer.email.as_str(), None, &email)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        bcc: Option<Mailbox>,
        email: &RenderedEmail,
    ) -> Result<(), EmailError> {
        let mut builder = Message::builder()
            .from(parse_mailbox(&self.from_address)?)
            .to(parse_mailbox(to)?)
            .subject(&email.subject);
        if let Some(bcc) = bcc {
            builder = builder.bcc(bcc);
        }

        let message = builder.multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(email.text.clone()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(email.html.clone()),
                ),
        )?;

        self.mailer.send(message).await?;

        tracing::info!(to = %to, subject = %email.subject, "Email sent successfully");
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, EmailError> {
    address
        .parse()
        .map_err(|_| EmailError::InvalidAddress(address.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use door_portal_core::item::fixtures::{door, glass_door};
    use door_portal_core::order::fixtures::customer;
    use door_portal_core::{MeasurementUnit, OrderId, OrderSummary};
    use rust_decimal::Decimal;

    use super::*;

    fn order() -> Order {
        let mut glass = glass_door(24, 18, 1, "Clear");
        glass.hinge = Some("Left".into());
        Order {
            id: OrderId::generate(),
            owner_id: None,
            customer: customer(),
            items: vec![
                OrderLine {
                    item: door(24, 12, 1),
                    area: Decimal::new(2, 0),
                    price: Decimal::new(2400, 2),
                },
                OrderLine {
                    item: glass,
                    area: Decimal::new(3, 0),
                    price: Decimal::new(10_050, 2),
                },
            ],
            unit: MeasurementUnit::Inches,
            shipping_notes: None,
            payment_method: "Net 30".into(),
            promo_code: Some("SPRING10".into()),
            order_date: Utc.with_ymd_and_hms(2026, 3, 4, 15, 0, 0).unwrap(),
            status: OrderStatus::Processing,
            summary: OrderSummary {
                subtotal: Decimal::new(12_450, 2),
                shipping: Decimal::new(1599, 2),
                discount: Decimal::new(1245, 2),
                total: Decimal::new(12_804, 2),
            },
        }
    }

    #[test]
    fn test_order_number_is_short_uppercase_prefix() {
        let order = order();
        let number = order_number(&order);
        assert_eq!(number.len(), 8);
        assert_eq!(number, number.to_uppercase());
        assert!(order.id.to_string().to_uppercase().starts_with(&number));
    }

    #[test]
    fn test_render_order_created() {
        let order = order();
        let email = render_order_created(&order).unwrap();

        assert!(email.subject.contains(&order_number(&order)));
        assert!(email.text.contains("Dana Builder"));
        assert!(email.text.contains("March 4, 2026"));
        assert!(email.text.contains("$124.50"));
        assert!(email.text.contains("Discount: -$12.45"));
        assert!(email.text.contains("$128.04"));
        assert!(email.text.contains("Hinge: Left"));
        assert!(email.html.contains("<strong>Processing</strong>"));
    }

    #[test]
    fn test_render_order_created_without_discount_hides_line() {
        let mut order = order();
        order.summary.discount = Decimal::ZERO;
        let email = render_order_created(&order).unwrap();
        assert!(!email.text.contains("Discount"));
        assert!(!email.html.contains("Discount"));
    }

    #[test]
    fn test_render_status_changed() {
        let mut order = order();
        order.status = OrderStatus::Shipped;
        let email = render_status_changed(&order, OrderStatus::Processing).unwrap();

        assert!(email.subject.ends_with("is now Shipped"));
        assert!(email.text.contains("from Processing to Shipped"));
        assert!(email.text.contains(&format!("{} doors", order.door_count())));
    }

    #[test]
    fn test_html_escapes_customer_input() {
        let mut order = order();
        order.customer.name = "<script>alert(1)</script>".into();
        let email = render_order_created(&order).unwrap();
        assert!(!email.html.contains("<script>"));
    }
}
