//! Mailer configuration
//!
//! [`MailerConfig`] is built through [`MailerConfigBuilder`] and validated
//! once at construction. It can also be loaded from a TOML file:
//!
//! ```toml
//! host = "smtp.example.com"
//! port = 587
//! display_name = "Example"
//! from = "robot@example.com"
//! username = "robot"
//! password = "secret"
//! ```

use crate::error::{MailError, Result};
use crate::utils::{domain_of, validate_email};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const DEFAULT_PORT: u16 = 25;
pub const DEFAULT_DISPLAY_NAME: &str = "MailGo";

/// Username and password for SASL PLAIN
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validated, immutable mailer settings
#[derive(Debug, Clone)]
pub struct MailerConfig {
    host: String,
    port: u16,
    display_name: String,
    from: String,
    return_path: Option<String>,
    credentials: Option<Credentials>,
}

impl MailerConfig {
    pub fn builder() -> MailerConfigBuilder {
        MailerConfigBuilder::default()
    }

    /// Load settings from a TOML file and validate them
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MailError::Config(e.to_string()))?;

        let settings: MailerSettings =
            toml::from_str(&content).map_err(|e| MailError::Config(e.to_string()))?;

        settings.into_builder().build()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port` as passed to the TCP connect
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    /// Sender domain, without the `@`
    pub fn domain(&self) -> &str {
        domain_of(&self.from).unwrap_or_default()
    }

    pub fn return_path(&self) -> Option<&str> {
        self.return_path.as_deref()
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }
}

/// Named-field builder for [`MailerConfig`]
#[derive(Debug, Clone, Default)]
pub struct MailerConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    display_name: Option<String>,
    from: Option<String>,
    return_path: Option<String>,
    credentials: Option<Credentials>,
}

impl MailerConfigBuilder {
    /// SMTP server host; defaults to the sender's domain
    pub fn host<T: Into<String>>(mut self, host: T) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn display_name<T: Into<String>>(mut self, name: T) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn from<T: Into<String>>(mut self, address: T) -> Self {
        self.from = Some(address.into());
        self
    }

    pub fn return_path<T: Into<String>>(mut self, return_path: T) -> Self {
        self.return_path = Some(return_path.into());
        self
    }

    /// Enables authenticated delivery
    pub fn credentials<U, P>(mut self, username: U, password: P) -> Self
    where
        U: Into<String>,
        P: Into<String>,
    {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    pub fn build(self) -> Result<MailerConfig> {
        let from = self.from.unwrap_or_default();
        validate_email(&from)?;

        let host = match self.host.filter(|h| !h.is_empty()) {
            Some(host) => host,
            None => domain_of(&from).unwrap_or_default().to_string(),
        };

        Ok(MailerConfig {
            host,
            port: self.port.unwrap_or(DEFAULT_PORT),
            display_name: self
                .display_name
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
            from,
            return_path: self.return_path.filter(|r| !r.is_empty()),
            credentials: self.credentials,
        })
    }
}

/// On-disk form of the mailer settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MailerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub display_name: Option<String>,
    pub from: Option<String>,
    pub return_path: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl MailerSettings {
    /// Credentials are only set when both username and password are present
    pub fn into_builder(self) -> MailerConfigBuilder {
        let mut builder = MailerConfig::builder();

        if let Some(host) = self.host {
            builder = builder.host(host);
        }
        if let Some(port) = self.port {
            builder = builder.port(port);
        }
        if let Some(name) = self.display_name {
            builder = builder.display_name(name);
        }
        if let Some(from) = self.from {
            builder = builder.from(from);
        }
        if let Some(return_path) = self.return_path {
            builder = builder.return_path(return_path);
        }
        match (self.username, self.password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                builder.credentials(username, password)
            }
            _ => builder,
        }
    }
}
