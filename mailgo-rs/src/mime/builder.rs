//! multipart/alternative message assembly
//!
//! Layout of a composed message:
//!
//! ```text
//! From / To / Reply-To / Subject / MIME-Version / Message-ID / Date / Content-Type [/ Return-Path]
//!
//! --<boundary>          text/plain part (if any)
//! --<boundary>          text/html part (if any)
//! --<boundary>          one part per attachment
//! --<boundary>--
//! ```

use crate::config::MailerConfig;
use crate::error::Result;
use crate::mime::encoding::{encode_base64_lines, q_encode};
use crate::mime::types::{Attachment, ComposedMessage};
use crate::utils::generate_boundary_from;
use bytes::{BufMut, BytesMut};
use chrono::{Local, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

const RFC2822_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Accumulates one MIME message into an append-only buffer
pub struct MessageBuilder<'a> {
    config: &'a MailerConfig,
    boundary: String,
    buf: BytesMut,
}

impl<'a> MessageBuilder<'a> {
    /// Start a message with a fresh random boundary
    ///
    /// Fails if the random source is unavailable.
    pub fn new(config: &'a MailerConfig) -> Result<Self> {
        Self::with_rng(config, &mut OsRng)
    }

    /// Start a message with a boundary drawn from `rng`
    pub fn with_rng<R: RngCore + ?Sized>(config: &'a MailerConfig, rng: &mut R) -> Result<Self> {
        Ok(Self::with_boundary(config, generate_boundary_from(rng)?))
    }

    /// Start a message with a caller-chosen boundary
    pub fn with_boundary<T: Into<String>>(config: &'a MailerConfig, boundary: T) -> Self {
        Self {
            config,
            boundary: boundary.into(),
            buf: BytesMut::with_capacity(4096),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Serialize the whole message
    ///
    /// Empty `plain` or `html` bodies are left out.
    pub fn compose(
        mut self,
        recipients: &[String],
        subject: &str,
        plain: &str,
        html: &str,
        attachments: &[Attachment],
    ) -> ComposedMessage {
        self.write_headers(recipients, subject);

        if !plain.is_empty() {
            self.write_inline_part("text/plain", plain.as_bytes());
        }
        if !html.is_empty() {
            self.write_inline_part("text/html", html.as_bytes());
        }
        for attachment in attachments {
            self.write_attachment(attachment);
        }

        self.put_line(&format!("--{}--", self.boundary));

        ComposedMessage {
            boundary: self.boundary,
            recipients: recipients.to_vec(),
            body: self.buf.freeze(),
        }
    }

    fn write_headers(&mut self, recipients: &[String], subject: &str) {
        let name = q_encode(self.config.display_name());
        let domain = format!("@{}", self.config.domain());

        self.put_line(&format!("From: {}", mailbox(&name, self.config.from())));
        self.put_line(&format!("To: {}", recipients.join(", ")));
        self.put_line(&format!(
            "Reply-To: {}",
            mailbox(&name, &format!("no-reply{}", domain))
        ));
        self.put_line(&format!("Subject: {}", q_encode(subject)));
        self.put_line("MIME-Version: 1.0");
        self.put_line(&format!("Message-ID: <{}{}>", message_digest(subject), domain));
        self.put_line(&format!("Date: {}", Local::now().format(RFC2822_FORMAT)));
        self.put_line(&format!(
            "Content-Type: multipart/alternative; boundary=\"{}\"",
            self.boundary
        ));
        if let Some(return_path) = self.config.return_path() {
            self.put_line(&format!("Return-Path: {}", q_encode(return_path)));
        }
        self.put_line("");
    }

    fn write_inline_part(&mut self, mime_type: &str, content: &[u8]) {
        self.put_line(&format!("--{}", self.boundary));
        self.put_line(&format!("Content-Type: {}; charset=\"utf-8\"", mime_type));
        self.put_line("Content-Transfer-Encoding: BASE64");
        self.put_line("Content-Disposition: inline");
        self.put_line("");
        self.put_body(content);
    }

    fn write_attachment(&mut self, attachment: &Attachment) {
        self.put_line(&format!("--{}", self.boundary));
        self.put_line(&format!(
            "Content-Type: application/octet-stream; name=\"{}\"",
            attachment.filename
        ));
        self.put_line("Content-Transfer-Encoding: base64");
        self.put_line(&format!(
            "Content-Disposition: attachment; filename=\"{}\"",
            attachment.filename
        ));
        self.put_line("");
        self.put_body(&attachment.content);
    }

    fn put_body(&mut self, content: &[u8]) {
        let lines = encode_base64_lines(content);
        if !lines.is_empty() {
            self.put_line(&lines);
        }
    }

    fn put_line(&mut self, line: &str) {
        self.buf.put_slice(line.as_bytes());
        self.buf.put_slice(b"\r\n");
    }
}

fn mailbox(encoded_name: &str, address: &str) -> String {
    if encoded_name.is_empty() {
        format!("<{}>", address)
    } else {
        format!("{} <{}>", encoded_name, address)
    }
}

/// Hex SHA-256 of `<unix nanos>-<subject>`
fn message_digest(subject: &str) -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(format!("{}-{}", nanos, subject).as_bytes());

    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
