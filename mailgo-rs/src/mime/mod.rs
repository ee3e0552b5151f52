/// MIME message composition
///
/// This module turns a subject, text/HTML bodies and attachments into a
/// multipart/alternative message ready for the SMTP `DATA` phase.

pub mod builder;
pub mod encoding;
pub mod types;

pub use builder::MessageBuilder;
pub use types::{Attachment, ComposedMessage};
