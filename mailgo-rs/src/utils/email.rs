use crate::error::{MailError, Result};

/// Basic sender address validation
///
/// An empty address is reported as [`MailError::MissingFrom`].
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(MailError::MissingFrom);
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| MailError::InvalidEmail(format!("{}: must contain @", email)))?;

    if local.is_empty() || domain.is_empty() {
        return Err(MailError::InvalidEmail(format!(
            "{}: address parts cannot be empty",
            email
        )));
    }

    if domain.contains('@') {
        return Err(MailError::InvalidEmail(format!(
            "{}: more than one @",
            email
        )));
    }

    Ok(())
}

/// Domain part of an address (everything after the first `@`)
pub fn domain_of(email: &str) -> Option<&str> {
    email.split_once('@').map(|(_, domain)| domain)
}
