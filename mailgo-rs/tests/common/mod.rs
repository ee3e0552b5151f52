//! In-process SMTP server for delivery tests
//!
//! Accepts any number of connections, records every command and every
//! completed transaction, and can be told to reject chosen recipients or to
//! require AUTH PLAIN.

#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone, Default)]
pub struct MockOptions {
    /// Recipients answered with 550 at RCPT TO
    pub reject_rcpt: Vec<String>,
    /// Advertise AUTH PLAIN and require these credentials before MAIL FROM
    pub credentials: Option<(String, String)>,
    /// Answer EHLO with 502 so the client has to fall back to HELO
    pub reject_ehlo: bool,
    /// Answer QUIT with 554 instead of 221
    pub fail_quit: bool,
}

/// One accepted transaction
#[derive(Debug, Clone)]
pub struct Delivery {
    pub mail_from: String,
    pub rcpt_to: Vec<String>,
    /// Message data with dot-stuffing removed, without the final `.` line
    pub data: Vec<u8>,
}

#[derive(Default)]
struct Recorded {
    connections: usize,
    commands: Vec<String>,
    deliveries: Vec<Delivery>,
}

pub struct MockSmtpServer {
    addr: SocketAddr,
    recorded: Arc<Mutex<Recorded>>,
}

impl MockSmtpServer {
    pub async fn start(options: MockOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let options = Arc::new(options);

        let shared = Arc::clone(&recorded);
        tokio::spawn(async move {
            loop {
                if let Ok((socket, _)) = listener.accept().await {
                    shared.lock().unwrap().connections += 1;
                    let shared = Arc::clone(&shared);
                    let options = Arc::clone(&options);
                    tokio::spawn(async move {
                        let _ = handle(socket, options, shared).await;
                    });
                }
            }
        });

        Self { addr, recorded }
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn connections(&self) -> usize {
        self.recorded.lock().unwrap().connections
    }

    pub fn commands(&self) -> Vec<String> {
        self.recorded.lock().unwrap().commands.clone()
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.recorded.lock().unwrap().deliveries.clone()
    }
}

/// Port that nothing listens on
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

async fn handle(
    socket: TcpStream,
    options: Arc<MockOptions>,
    recorded: Arc<Mutex<Recorded>>,
) -> std::io::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);

    writer.write_all(b"220 mock.localhost ESMTP ready\r\n").await?;

    let mut authenticated = false;
    let mut mail_from: Option<String> = None;
    let mut rcpt_to: Vec<String> = Vec::new();

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }
        let line = line.trim_end().to_string();
        recorded.lock().unwrap().commands.push(line.clone());
        let upper = line.to_ascii_uppercase();

        if upper.starts_with("EHLO") {
            if options.reject_ehlo {
                writer.write_all(b"502 Command not implemented\r\n").await?;
                continue;
            }
            let mut reply = String::from("250-mock.localhost greets you\r\n250-SIZE 10485760\r\n");
            if options.credentials.is_some() {
                reply.push_str("250-AUTH PLAIN LOGIN\r\n");
            }
            reply.push_str("250 8BITMIME\r\n");
            writer.write_all(reply.as_bytes()).await?;
        } else if upper.starts_with("HELO") {
            writer.write_all(b"250 mock.localhost\r\n").await?;
        } else if upper.starts_with("AUTH PLAIN ") {
            let token = &line["AUTH PLAIN ".len()..];
            let decoded = BASE64.decode(token.trim()).unwrap_or_default();
            let accepted = match &options.credentials {
                Some((user, pass)) => decoded == format!("\0{}\0{}", user, pass).into_bytes(),
                None => false,
            };
            if accepted {
                authenticated = true;
                writer.write_all(b"235 2.7.0 Authentication successful\r\n").await?;
            } else {
                writer.write_all(b"535 5.7.8 Authentication credentials invalid\r\n").await?;
            }
        } else if upper.starts_with("MAIL FROM:") {
            if options.credentials.is_some() && !authenticated {
                writer.write_all(b"530 5.7.0 Authentication required\r\n").await?;
            } else if mail_from.is_some() {
                writer.write_all(b"503 5.5.1 Sender already given\r\n").await?;
            } else {
                mail_from = Some(address(&line));
                writer.write_all(b"250 2.1.0 OK\r\n").await?;
            }
        } else if upper.starts_with("RCPT TO:") {
            let rcpt = address(&line);
            if mail_from.is_none() {
                writer.write_all(b"503 5.5.1 Need MAIL first\r\n").await?;
            } else if options.reject_rcpt.contains(&rcpt) {
                writer.write_all(b"550 5.1.1 No such user\r\n").await?;
            } else {
                rcpt_to.push(rcpt);
                writer.write_all(b"250 2.1.5 OK\r\n").await?;
            }
        } else if upper == "DATA" {
            if rcpt_to.is_empty() {
                writer.write_all(b"503 5.5.1 Need RCPT first\r\n").await?;
                continue;
            }
            writer
                .write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n")
                .await?;

            let mut data = Vec::new();
            loop {
                let mut raw = Vec::new();
                if reader.read_until(b'\n', &mut raw).await? == 0 {
                    return Ok(());
                }
                if raw == b".\r\n" {
                    break;
                }
                if raw.starts_with(b"..") {
                    raw.remove(0);
                }
                data.extend_from_slice(&raw);
            }

            recorded.lock().unwrap().deliveries.push(Delivery {
                mail_from: mail_from.take().unwrap_or_default(),
                rcpt_to: std::mem::take(&mut rcpt_to),
                data,
            });
            writer.write_all(b"250 2.0.0 OK queued\r\n").await?;
        } else if upper == "RSET" {
            mail_from = None;
            rcpt_to.clear();
            writer.write_all(b"250 2.0.0 OK\r\n").await?;
        } else if upper == "QUIT" {
            if options.fail_quit {
                writer.write_all(b"554 5.0.0 Not today\r\n").await?;
            } else {
                writer.write_all(b"221 2.0.0 Bye\r\n").await?;
            }
            return Ok(());
        } else {
            writer.write_all(b"500 5.5.2 Command not recognized\r\n").await?;
        }
    }
}

/// Address between `<` and `>`
fn address(line: &str) -> String {
    let start = line.find('<').map(|i| i + 1).unwrap_or(0);
    let end = line.rfind('>').unwrap_or(line.len());
    line[start..end].to_string()
}
