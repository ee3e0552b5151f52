//! SMTP client session (RFC 5321)
//!
//! One [`SmtpClient`] wraps one TCP connection. Commands are issued in the
//! order the caller drives them; every reply is checked against the code the
//! step expects.
//!
//! ```text
//! connect ─► 220 ─► EHLO/HELO ─► [AUTH PLAIN] ─► MAIL ─► RCPT… ─► DATA ─► body ─► QUIT
//! ```
//!
//! The socket is closed when the client is dropped, so every early return
//! releases the connection.

use crate::config::Credentials;
use crate::error::{MailError, Result};
use crate::smtp::reply::SmtpReply;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{debug, info};

/// Open SMTP session with a remote server
///
/// # Examples
/// ```no_run
/// use mailgo_rs::smtp::SmtpClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut client = SmtpClient::connect("mail.example.com:25").await?;
/// client.mail_from("sender@example.com").await?;
/// client.rcpt_to("recipient@other.com").await?;
/// client.data(b"Subject: Test\r\n\r\nHello!\r\n").await?;
/// client.quit().await?;
/// # Ok(())
/// # }
/// ```
pub struct SmtpClient {
    server_addr: String,
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    extensions: Vec<String>,
}

impl SmtpClient {
    /// Connect, read the greeting and introduce ourselves
    ///
    /// `EHLO` is tried first; servers that reject it get `HELO`.
    pub async fn connect(server_addr: &str) -> Result<Self> {
        info!("Connecting to SMTP server {}", server_addr);

        let stream = TcpStream::connect(server_addr).await?;
        let (reader, writer) = stream.into_split();

        let mut client = Self {
            server_addr: server_addr.to_string(),
            reader: BufReader::new(reader),
            writer,
            extensions: Vec::new(),
        };

        let greeting = client.read_reply().await?.expect_code(220)?;
        debug!("Received greeting: {}", greeting.message());

        client.hello().await?;
        Ok(client)
    }

    pub fn server_addr(&self) -> &str {
        &self.server_addr
    }

    /// Extension keywords advertised in the EHLO reply
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Whether the server advertised `AUTH` with the given mechanism
    pub fn supports_auth(&self, mechanism: &str) -> bool {
        let mechanism = mechanism.to_ascii_uppercase();
        self.extensions.iter().any(|ext| {
            ext.strip_prefix("AUTH")
                .filter(|rest| rest.starts_with(' ') || rest.starts_with('='))
                .map(|rest| rest.split([' ', '=']).any(|m| m == mechanism))
                .unwrap_or(false)
        })
    }

    async fn hello(&mut self) -> Result<()> {
        let hostname = local_hostname();

        let reply = self.command(&format!("EHLO {}", hostname)).await?;
        if reply.is_positive() {
            self.extensions = reply.extensions();
            return Ok(());
        }

        debug!("EHLO rejected with {}, falling back to HELO", reply.code);
        self.command(&format!("HELO {}", hostname)).await?.expect_code(250)?;
        self.extensions.clear();
        Ok(())
    }

    /// SASL PLAIN authentication with an initial response
    pub async fn auth_plain(&mut self, credentials: &Credentials) -> Result<()> {
        if !self.supports_auth("PLAIN") {
            return Err(MailError::SmtpProtocol(
                "Server does not support AUTH PLAIN".to_string(),
            ));
        }

        let token = plain_token(credentials);
        debug!("> AUTH PLAIN <credentials>");
        self.send_line(&format!("AUTH PLAIN {}", token)).await?;
        self.read_reply().await?.expect_code(235)?;

        info!("Authenticated as {}", credentials.username);
        Ok(())
    }

    pub async fn mail_from(&mut self, from: &str) -> Result<()> {
        self.command(&format!("MAIL FROM:<{}>", from))
            .await?
            .expect_code(250)?;
        Ok(())
    }

    /// Accepts both 250 and 251 (user not local, will forward)
    pub async fn rcpt_to(&mut self, to: &str) -> Result<()> {
        let reply = self.command(&format!("RCPT TO:<{}>", to)).await?;
        if reply.code == 251 {
            return Ok(());
        }
        reply.expect_code(250)?;
        Ok(())
    }

    /// `DATA`, the dot-stuffed body and the terminating `.`
    pub async fn data(&mut self, body: &[u8]) -> Result<()> {
        self.command("DATA").await?.expect_code(354)?;

        let stuffed = dot_stuff(body);
        self.writer.write_all(&stuffed).await?;
        if !stuffed.ends_with(b"\r\n") {
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer.write_all(b".\r\n").await?;
        self.writer.flush().await?;
        debug!("> <{} bytes of message data>", stuffed.len());

        self.read_reply().await?.expect_code(250)?;
        Ok(())
    }

    /// Abort the current transaction
    pub async fn reset(&mut self) -> Result<()> {
        self.command("RSET").await?.expect_code(250)?;
        Ok(())
    }

    /// Say goodbye and close the connection
    pub async fn quit(mut self) -> Result<()> {
        self.command("QUIT").await?.expect_code(221)?;
        let _ = self.writer.shutdown().await;
        Ok(())
    }

    async fn command(&mut self, line: &str) -> Result<SmtpReply> {
        debug!("> {}", line);
        self.send_line(line).await?;
        self.read_reply().await
    }

    async fn send_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(format!("{}\r\n", line).as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Read a reply, following `NNN-` continuation lines to the last one
    async fn read_reply(&mut self) -> Result<SmtpReply> {
        let mut lines = Vec::new();

        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line).await? == 0 {
                return Err(MailError::SmtpProtocol(
                    "Connection closed by server".to_string(),
                ));
            }
            debug!("< {}", line.trim_end());

            let (code, last, text) = SmtpReply::parse_line(&line)?;
            lines.push(text.to_string());

            if last {
                return Ok(SmtpReply { code, lines });
            }
        }
    }
}

/// `base64("\0username\0password")` with an empty authorization identity
pub fn plain_token(credentials: &Credentials) -> String {
    let raw = format!("\0{}\0{}", credentials.username, credentials.password);
    BASE64.encode(raw.as_bytes())
}

/// Double every `.` that starts a line
pub fn dot_stuff(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 16);
    let mut at_line_start = true;

    for &b in body {
        if at_line_start && b == b'.' {
            out.push(b'.');
        }
        out.push(b);
        at_line_start = b == b'\n';
    }

    out
}

/// Name used in EHLO/HELO
fn local_hostname() -> String {
    let name = gethostname::gethostname().to_string_lossy().to_string();
    if name.is_empty() {
        "localhost".to_string()
    } else {
        name
    }
}
