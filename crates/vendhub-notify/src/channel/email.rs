//! Email delivery channel.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use vendhub_core::AppResult;
use vendhub_core::config::EmailConfig;
use vendhub_core::traits::email::{EmailSender, OutgoingEmail};
use vendhub_entity::notification::Notification;
use vendhub_entity::user::User;

use super::{ChannelKind, DeliveryChannel};

/// Formats notifications into emails and hands them to an [`EmailSender`].
#[derive(Debug, Clone)]
pub struct EmailChannel {
    sender: Arc<dyn EmailSender>,
    config: EmailConfig,
}

impl EmailChannel {
    /// Create a channel over the given sender.
    pub fn new(sender: Arc<dyn EmailSender>, config: EmailConfig) -> Self {
        Self { sender, config }
    }

    fn format_subject(&self, notification: &Notification) -> String {
        format!("{} {}", self.config.subject_prefix, notification.title)
    }

    fn format_body(&self, notification: &Notification, recipient: &User) -> String {
        let mut body = format!("Hello {},\n\n{}\n", recipient.name, notification.message);
        body.push_str(&format!(
            "\nType: {}\nPriority: {}\nSent: {}\n",
            notification.kind,
            notification.priority,
            notification.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        ));
        body.push_str("\n-- VendHub notifications\n");
        body
    }
}

#[async_trait]
impl DeliveryChannel for EmailChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    async fn deliver(&self, notification: &Notification, recipient: &User) -> AppResult<()> {
        let email = OutgoingEmail {
            to: recipient.email.clone(),
            subject: self.format_subject(notification),
            body: self.format_body(notification, recipient),
        };
        self.sender.send(&email).await?;
        debug!(
            notification_id = %notification.id,
            user_id = %recipient.id,
            to = %recipient.email,
            "Notification email sent"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vendhub_entity::notification::NotificationKind;
    use vendhub_entity::user::UserRole;

    use crate::test_support::RecordingEmailSender;

    fn channel(sender: Arc<RecordingEmailSender>) -> EmailChannel {
        EmailChannel::new(sender, EmailConfig::default())
    }

    #[tokio::test]
    async fn test_email_is_formatted_with_prefix() {
        let sender = Arc::new(RecordingEmailSender::new());
        let channel = channel(sender.clone());
        let user = User::new("buyer@shop.test", "Buyer", UserRole::Customer);
        let notification = Notification::new(
            user.id,
            NotificationKind::NewOrder,
            "New order received",
            "Order #42 was placed.",
            serde_json::json!({"order": 42}),
        );

        channel.deliver(&notification, &user).await.unwrap();

        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "buyer@shop.test");
        assert_eq!(sent[0].subject, "[VendHub] New order received");
        assert!(sent[0].body.contains("Order #42 was placed."));
        assert!(sent[0].body.contains("Type: new_order"));
    }

    #[tokio::test]
    async fn test_disabled_config_disables_channel() {
        let sender = Arc::new(RecordingEmailSender::new());
        let channel = EmailChannel::new(
            sender,
            EmailConfig {
                enabled: false,
                ..Default::default()
            },
        );
        assert!(!channel.is_enabled());
    }
}
