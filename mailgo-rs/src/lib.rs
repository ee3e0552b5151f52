//! mailgo-rs: MIME message composition and SMTP delivery
//!
//! Builds multipart/alternative messages (plain text, HTML, attachments)
//! and sends them over SMTP, with SASL PLAIN authentication or without it.
//!
//! # Example
//!
//! ```no_run
//! use mailgo_rs::{Attachment, Mailer, MailerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MailerConfig::builder()
//!         .from("robot@example.com")
//!         .host("smtp.example.com")
//!         .display_name("Robot")
//!         .build()?;
//!     let mailer = Mailer::new(config);
//!
//!     let errors = mailer
//!         .send_mail(
//!             &["alice@example.org".to_string()],
//!             "Monthly report",
//!             "See attachment.",
//!             "<p>See attachment.</p>",
//!             &[Attachment::new("report.csv", b"a,b\n1,2\n".to_vec())],
//!         )
//!         .await;
//!
//!     for error in &errors {
//!         eprintln!("{}", error);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Mailer configuration
//! - [`error`]: Error types and handling
//! - [`mime`]: Message composition and encodings
//! - [`smtp`]: SMTP client and delivery paths
//! - [`utils`]: Address validation, boundary generation

pub mod config;
pub mod error;
pub mod mailer;
pub mod mime;
pub mod smtp;
pub mod utils;

// Re-export commonly used types
pub use config::{Credentials, MailerConfig};
pub use error::{MailError, Result};
pub use mailer::Mailer;
pub use mime::{Attachment, ComposedMessage};
