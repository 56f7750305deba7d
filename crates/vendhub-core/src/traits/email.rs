//! Email sender trait for pluggable mail transports.

use async_trait::async_trait;

use crate::result::AppResult;

/// An outgoing email message, already formatted for the recipient.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Trait for mail transports (SMTP, provider API, or a logging stub in
/// development).
///
/// Implementations must not panic on delivery failure; they return an
/// error which the email channel adapter converts into a per-channel
/// delivery outcome.
#[async_trait]
pub trait EmailSender: Send + Sync + std::fmt::Debug + 'static {
    /// Send one email. Returns `Ok(())` once the transport has accepted
    /// the message.
    async fn send(&self, email: &OutgoingEmail) -> AppResult<()>;
}
