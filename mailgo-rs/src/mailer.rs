use crate::config::MailerConfig;
use crate::error::{MailError, Result};
use crate::mime::{Attachment, ComposedMessage, MessageBuilder};
use crate::smtp::{deliver_authenticated, deliver_unauthenticated};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, info, warn};

/// Composes and sends messages for one configured sender
///
/// The configuration is read-only, so a `Mailer` can be shared between
/// tasks; every send opens its own connection.
#[derive(Debug, Clone)]
pub struct Mailer {
    config: MailerConfig,
}

impl Mailer {
    pub fn new(config: MailerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MailerConfig {
        &self.config
    }

    /// Build the MIME message without sending it
    ///
    /// Fails with [`MailError::NoRecipients`] when `recipients` is empty.
    pub fn compose(
        &self,
        recipients: &[String],
        subject: &str,
        plain: &str,
        html: &str,
        attachments: &[Attachment],
    ) -> Result<ComposedMessage> {
        self.compose_with_rng(&mut OsRng, recipients, subject, plain, html, attachments)
    }

    pub(crate) fn compose_with_rng<R: RngCore + ?Sized>(
        &self,
        rng: &mut R,
        recipients: &[String],
        subject: &str,
        plain: &str,
        html: &str,
        attachments: &[Attachment],
    ) -> Result<ComposedMessage> {
        if recipients.is_empty() {
            return Err(MailError::NoRecipients);
        }
        let builder = MessageBuilder::with_rng(&self.config, rng)?;
        Ok(builder.compose(recipients, subject, plain, html, attachments))
    }

    /// Compose and deliver a message
    ///
    /// With credentials configured, all recipients go through one
    /// authenticated transaction; otherwise each recipient gets its own
    /// transaction. Returns every error encountered; empty means success.
    pub async fn send_mail(
        &self,
        recipients: &[String],
        subject: &str,
        plain: &str,
        html: &str,
        attachments: &[Attachment],
    ) -> Vec<MailError> {
        self.send_mail_with_rng(&mut OsRng, recipients, subject, plain, html, attachments)
            .await
    }

    pub(crate) async fn send_mail_with_rng<R: RngCore + ?Sized>(
        &self,
        rng: &mut R,
        recipients: &[String],
        subject: &str,
        plain: &str,
        html: &str,
        attachments: &[Attachment],
    ) -> Vec<MailError> {
        let message =
            match self.compose_with_rng(rng, recipients, subject, plain, html, attachments) {
                Ok(message) => message,
                Err(e) => return vec![e],
            };
        self.send_composed(&message).await
    }

    /// Deliver an already composed message
    ///
    /// No connection is opened when the message has no recipients.
    pub async fn send_composed(&self, message: &ComposedMessage) -> Vec<MailError> {
        if message.recipients.is_empty() {
            warn!("Refusing to send a message without recipients");
            return vec![MailError::NoRecipients];
        }

        let server_addr = self.config.server_addr();
        debug!(
            "Delivering {} byte message to {} recipient(s)",
            message.len(),
            message.recipients.len()
        );

        match self.config.credentials() {
            Some(credentials) => {
                info!("Sending authenticated mail via {}", server_addr);
                deliver_authenticated(&server_addr, self.config.from(), credentials, message).await
            }
            None => {
                info!("Sending mail via {}", server_addr);
                deliver_unauthenticated(&server_addr, self.config.from(), message).await
            }
        }
    }
}
