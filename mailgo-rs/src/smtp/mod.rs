//! SMTP delivery (RFC 5321)
//!
//! - [`client`]: one SMTP session over a TCP connection
//! - [`reply`]: reply parsing
//! - [`delivery`]: authenticated and per-recipient delivery paths

pub mod client;
pub mod delivery;
pub mod reply;

pub use client::SmtpClient;
pub use delivery::{deliver_authenticated, deliver_unauthenticated};
pub use reply::SmtpReply;
