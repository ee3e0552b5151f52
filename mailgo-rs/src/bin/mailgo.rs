//! Send one message from the command line
//!
//! # Usage
//!
//! ```bash
//! # Unauthenticated, one transaction per recipient
//! mailgo --host mail.example.com --from robot@example.com \
//!     --to alice@example.org --to bob@example.net \
//!     --subject "Report" --text "See attachment" --attachment report.pdf
//!
//! # Authenticated with settings from a file
//! mailgo --config mailgo.toml --to alice@example.org --html "<p>Hi</p>"
//! ```

use anyhow::Context;
use clap::Parser;
use mailgo_rs::config::{MailerConfig, MailerSettings};
use mailgo_rs::{Attachment, Mailer};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mailgo")]
#[command(version, about = "Compose a MIME message and send it over SMTP", long_about = None)]
struct Cli {
    /// TOML file with mailer settings; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Mail server host (defaults to the sender's domain)
    #[arg(long)]
    host: Option<String>,

    /// Mail server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Sender address
    #[arg(short, long)]
    from: Option<String>,

    /// Sender display name
    #[arg(short, long)]
    name: Option<String>,

    /// Return-Path header value
    #[arg(long)]
    return_path: Option<String>,

    /// Username for AUTH PLAIN
    #[arg(short, long, requires = "password")]
    username: Option<String>,

    /// Password for AUTH PLAIN
    #[arg(long, requires = "username")]
    password: Option<String>,

    /// Recipient address (repeatable)
    #[arg(short, long, required = true)]
    to: Vec<String>,

    /// Subject line
    #[arg(short, long, default_value = "Test mail")]
    subject: String,

    /// Plain text body (pass an empty string to leave it out)
    #[arg(long, default_value = "Test")]
    text: String,

    /// HTML body (pass an empty string to leave it out)
    #[arg(long, default_value = "<p>Test</p>")]
    html: String,

    /// File to attach (repeatable)
    #[arg(short, long = "attachment")]
    attachments: Vec<PathBuf>,
}

impl Cli {
    fn mailer_config(&self) -> anyhow::Result<MailerConfig> {
        let mut settings = match &self.config {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("cannot read {}", path.display()))?;
                toml::from_str::<MailerSettings>(&content)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => MailerSettings::default(),
        };

        settings.host = self.host.clone().or(settings.host);
        settings.port = self.port.or(settings.port);
        settings.from = self.from.clone().or(settings.from);
        settings.display_name = self.name.clone().or(settings.display_name);
        settings.return_path = self.return_path.clone().or(settings.return_path);
        settings.username = self.username.clone().or(settings.username);
        settings.password = self.password.clone().or(settings.password);

        Ok(settings.into_builder().build()?)
    }
}

fn read_attachment(path: &Path) -> anyhow::Result<Attachment> {
    let content =
        std::fs::read(path).with_context(|| format!("cannot read attachment {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    debug!("Attachment {} ({} bytes)", filename, content.len());
    Ok(Attachment::new(filename, content))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = cli
        .mailer_config()
        .context("cannot initialize mailer")?;
    let mailer = Mailer::new(config);

    let attachments = cli
        .attachments
        .iter()
        .map(|path| read_attachment(path))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let errors = mailer
        .send_mail(&cli.to, &cli.subject, &cli.text, &cli.html, &attachments)
        .await;

    if !errors.is_empty() {
        for error in &errors {
            eprintln!("fatal: {}", error);
        }
        std::process::exit(1);
    }

    info!("Mail sent to {} recipient(s)", cli.to.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_defaults() {
        let cli = Cli::parse_from(["mailgo", "--to", "alice@example.org"]);
        assert_eq!(cli.subject, "Test mail");
        assert_eq!(cli.text, "Test");
        assert_eq!(cli.html, "<p>Test</p>");
    }

    #[test]
    fn test_empty_body_flags_override_defaults() {
        let cli = Cli::parse_from(["mailgo", "--to", "a@example.org", "--text", "", "--html", ""]);
        assert!(cli.text.is_empty());
        assert!(cli.html.is_empty());
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mailgo.toml");
        std::fs::write(&path, "from = \"robot@example.com\"\nport = 2525\n").unwrap();

        let cli = Cli::parse_from([
            "mailgo",
            "--config",
            path.to_str().unwrap(),
            "--port",
            "587",
            "--to",
            "a@example.org",
        ]);
        let config = cli.mailer_config().unwrap();

        assert_eq!(config.port(), 587);
        assert_eq!(config.host(), "example.com");
    }
}
