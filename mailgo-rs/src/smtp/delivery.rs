//! Delivery of a composed message to its recipients
//!
//! Two independent paths, chosen by whether credentials are configured:
//!
//! - [`deliver_authenticated`]: one AUTH PLAIN session, one transaction for
//!   all recipients. Any failure aborts the send.
//! - [`deliver_unauthenticated`]: one connection, one transaction per
//!   recipient so nobody sees the other addresses. Failures are collected
//!   per recipient.

use crate::config::Credentials;
use crate::error::{MailError, Result};
use crate::mime::ComposedMessage;
use crate::smtp::client::SmtpClient;
use tracing::{error, info, warn};

/// Send `message` to all its recipients in a single authenticated session
///
/// Returns at most one error, wrapped as [`MailError::Session`].
pub async fn deliver_authenticated(
    server_addr: &str,
    from: &str,
    credentials: &Credentials,
    message: &ComposedMessage,
) -> Vec<MailError> {
    match authenticated_session(server_addr, from, credentials, message).await {
        Ok(()) => {
            info!(
                "Mail sent to {} recipient(s) via {}",
                message.recipients.len(),
                server_addr
            );
            Vec::new()
        }
        Err(e) => {
            error!("Authenticated delivery via {} failed: {}", server_addr, e);
            vec![MailError::session(e)]
        }
    }
}

async fn authenticated_session(
    server_addr: &str,
    from: &str,
    credentials: &Credentials,
    message: &ComposedMessage,
) -> Result<()> {
    let mut client = SmtpClient::connect(server_addr).await?;
    client.auth_plain(credentials).await?;
    client.mail_from(from).await?;
    for recipient in &message.recipients {
        client.rcpt_to(recipient).await?;
    }
    client.data(message.as_bytes()).await?;
    client.quit().await
}

/// Send `message` to each recipient in its own transaction over one connection
///
/// A recipient failure is recorded and the next recipient is attempted on
/// the same connection. Connect and `QUIT` failures are connection-level
/// errors. An empty result means every recipient was accepted.
pub async fn deliver_unauthenticated(
    server_addr: &str,
    from: &str,
    message: &ComposedMessage,
) -> Vec<MailError> {
    let mut errors = Vec::new();

    let mut client = match SmtpClient::connect(server_addr).await {
        Ok(client) => client,
        Err(e) => {
            error!("Cannot connect to {}: {}", server_addr, e);
            errors.push(MailError::connection(server_addr, e));
            return errors;
        }
    };

    for recipient in &message.recipients {
        match transaction(&mut client, from, recipient, message).await {
            Ok(()) => info!("Mail sent to {} via {}", recipient, server_addr),
            Err(e) => {
                warn!("Delivery to {} failed: {}", recipient, e);
                errors.push(MailError::recipient(recipient, e));

                if let Err(e) = client.reset().await {
                    warn!("RSET after failed transaction failed: {}", e);
                }
            }
        }
    }

    if let Err(e) = client.quit().await {
        error!("QUIT to {} failed: {}", server_addr, e);
        errors.push(MailError::connection(server_addr, e));
    }

    errors
}

async fn transaction(
    client: &mut SmtpClient,
    from: &str,
    recipient: &str,
    message: &ComposedMessage,
) -> Result<()> {
    client.mail_from(from).await?;
    client.rcpt_to(recipient).await?;
    client.data(message.as_bytes()).await
}
