use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("from address missing")]
    MissingFrom,

    #[error("no recipients given")]
    NoRecipients,

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Boundary generation failed: {0}")]
    Boundary(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SMTP server replied {code}: {message}")]
    Reply { code: u16, message: String },

    #[error("SMTP protocol error: {0}")]
    SmtpProtocol(String),

    /// Could not open, greet or cleanly close the SMTP connection
    #[error("Connection to {addr} failed: {source}")]
    Connection {
        addr: String,
        #[source]
        source: Box<MailError>,
    },

    /// Transaction for a single recipient failed on the unauthenticated path
    #[error("Delivery to {recipient} failed: {source}")]
    Recipient {
        recipient: String,
        #[source]
        source: Box<MailError>,
    },

    /// Any failure during the authenticated session
    #[error("Authenticated session failed: {0}")]
    Session(#[source] Box<MailError>),
}

impl MailError {
    pub(crate) fn connection(addr: &str, source: MailError) -> Self {
        MailError::Connection {
            addr: addr.to_string(),
            source: Box::new(source),
        }
    }

    pub(crate) fn recipient(recipient: &str, source: MailError) -> Self {
        MailError::Recipient {
            recipient: recipient.to_string(),
            source: Box::new(source),
        }
    }

    pub(crate) fn session(source: MailError) -> Self {
        MailError::Session(Box::new(source))
    }

    /// Recipient address this error is tagged with, if any
    pub fn failed_recipient(&self) -> Option<&str> {
        match self {
            MailError::Recipient { recipient, .. } => Some(recipient),
            _ => None,
        }
    }

    /// SMTP reply code behind this error, looking through tagged wrappers
    pub fn reply_code(&self) -> Option<u16> {
        match self {
            MailError::Reply { code, .. } => Some(*code),
            MailError::Connection { source, .. }
            | MailError::Recipient { source, .. }
            | MailError::Session(source) => source.reply_code(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MailError>;
