//! Email channel configuration.

use serde::{Deserialize, Serialize};

/// Email channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Whether the channel is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// SMTP server host.
    #[serde(default = "default_host")]
    pub smtp_host: String,
    /// SMTP server port.
    #[serde(default = "default_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub smtp_username: Option<String>,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: Option<String>,
    /// Use TLS.
    #[serde(default = "default_true")]
    pub use_tls: bool,
    /// Sender email address.
    #[serde(default = "default_from")]
    pub from_address: String,
    /// Subject prefix for all outgoing notification emails.
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            smtp_host: default_host(),
            smtp_port: default_port(),
            smtp_username: None,
            smtp_password: None,
            use_tls: true,
            from_address: default_from(),
            subject_prefix: default_subject_prefix(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    587
}

fn default_from() -> String {
    "noreply@vendhub.local".to_string()
}

fn default_subject_prefix() -> String {
    "[VendHub]".to_string()
}
