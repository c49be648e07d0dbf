use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use lettre::{
    message::Mailbox,
    transport::smtp::authentication::Credentials,
    AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{debug, info};

use crate::config::SmtpConfig;

/// Result of a delivered reset mail. `preview_url` is only populated by
/// development transports; callers may surface it but must not branch on it.
#[derive(Debug, Clone)]
pub struct SentMail {
    pub preview_url: Option<String>,
}

/// Outbound mail collaborator. The auth core only ever hands it a recipient
/// and a ready-made reset link.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(&self, to: &str, reset_url: &str) -> anyhow::Result<SentMail>;
}

fn reset_message(from: &Mailbox, to: &str, reset_url: &str) -> anyhow::Result<Message> {
    let message = Message::builder()
        .from(from.clone())
        .to(to.parse().context("invalid recipient address")?)
        .subject("Reset your password")
        .body(format!(
            "Hello,\n\n\
             We received a request to reset your password. If you did not ask \
             for this, you can ignore this email.\n\n\
             To choose a new password, open the link below:\n\
             {reset_url}\n\n\
             The link expires in 24 hours.\n"
        ))?;
    Ok(message)
}

/// Production transport: authenticated STARTTLS SMTP with a bounded timeout.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(smtp: &SmtpConfig, from: &str) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
            .context("invalid SMTP host")?
            .port(smtp.port)
            .credentials(Credentials::new(
                smtp.username.clone(),
                smtp.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(10)))
            .build();
        Ok(Self {
            transport,
            from: from.parse().context("invalid MAIL_FROM address")?,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_password_reset(&self, to: &str, reset_url: &str) -> anyhow::Result<SentMail> {
        let message = reset_message(&self.from, to, reset_url)?;
        self.transport
            .send(message)
            .await
            .context("smtp delivery failed")?;
        info!("password reset email sent");
        Ok(SentMail { preview_url: None })
    }
}

/// Development transport: writes `.eml` files to a spool directory and returns
/// a `file://` preview path in place of a hosted preview page.
pub struct FileMailer {
    transport: AsyncFileTransport<Tokio1Executor>,
    dir: PathBuf,
    from: Mailbox,
}

impl FileMailer {
    pub fn new(dir: PathBuf, from: &str) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&dir).context("create mail spool directory")?;
        Ok(Self {
            transport: AsyncFileTransport::new(&dir),
            dir,
            from: from.parse().context("invalid MAIL_FROM address")?,
        })
    }
}

#[async_trait]
impl Mailer for FileMailer {
    async fn send_password_reset(&self, to: &str, reset_url: &str) -> anyhow::Result<SentMail> {
        let message = reset_message(&self.from, to, reset_url)?;
        let id = self
            .transport
            .send(message)
            .await
            .context("could not write mail to spool")?;
        let path = self.dir.join(format!("{id}.eml"));
        debug!(path = %path.display(), "password reset email spooled");
        Ok(SentMail {
            preview_url: Some(format!("file://{}", path.display())),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Records every (recipient, reset_url) pair instead of delivering.
    #[derive(Default)]
    pub struct MockMailer {
        pub sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Mailer for MockMailer {
        async fn send_password_reset(&self, to: &str, reset_url: &str) -> anyhow::Result<SentMail> {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), reset_url.to_string()));
            Ok(SentMail { preview_url: None })
        }
    }

    /// Fails every send, for exercising notifier error paths.
    pub struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send_password_reset(
            &self,
            _to: &str,
            _reset_url: &str,
        ) -> anyhow::Result<SentMail> {
            anyhow::bail!("smtp connection refused")
        }
    }
}
