//! Best-effort email notifications.
//!
//! Sending never fails the caller: every public operation returns a
//! [`SendOutcome`] which may be logged and otherwise ignored.

pub mod smtp;

pub use smtp::SmtpTransport;

use crate::config::MailConfig;
use crate::core::BalerResult;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

const DIVIDER: &str =
    "--------------------------------------------------------------------------------------";

/// Hands a finished message to a mail server
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, from: &str, to: &str, message: &str) -> BalerResult<()>;
}

/// A bare address or a named user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    Address(String),
    User { name: String, email: String },
}

impl Recipient {
    pub fn user(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self::User {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Address the message is delivered to
    pub fn email(&self) -> &str {
        match self {
            Self::Address(address) => address,
            Self::User { email, .. } => email,
        }
    }
}

impl From<&str> for Recipient {
    fn from(address: &str) -> Self {
        Self::Address(address.to_string())
    }
}

/// One message, fanned out to every recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: Vec<Recipient>,
    pub subject: String,
    pub body: String,
    pub mime_version: String,
    pub content_type: String,
    /// Sender override; the mailer's own sender otherwise
    pub from: Option<Recipient>,
}

impl Email {
    pub fn new(to: Vec<Recipient>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to,
            subject: subject.into(),
            body: body.into(),
            mime_version: "1.0".to_string(),
            content_type: "text/plain; charset=utf-8".to_string(),
            from: None,
        }
    }

    /// Send this message as `from` instead of the mailer's sender
    pub fn from(mut self, from: Recipient) -> Self {
        self.from = Some(from);
        self
    }

    /// Send as HTML; tags are expected in the body
    pub fn html(mut self) -> Self {
        self.content_type = "text/html".to_string();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    Failed(String),
}

impl SendOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

/// Release categories; the first four are announced externally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseType {
    Production,
    Major,
    Minor,
    Bugfix,
    Development,
}

impl ReleaseType {
    pub fn is_external(&self) -> bool {
        !matches!(self, Self::Development)
    }
}

/// Who hears about what
#[derive(Debug, Clone, Default)]
pub struct MailingLists {
    pub users: Vec<Recipient>,
    pub admins: Vec<Recipient>,
    pub subscribers_prod: Vec<Recipient>,
    pub subscribers_dev: Vec<Recipient>,
}

#[derive(Debug, Clone)]
pub struct ReleaseNotice {
    pub app_name: String,
    /// Subject prefix, rendered as `[namespace]`
    pub namespace: String,
    pub version: String,
    pub selectors: String,
    pub release_note: String,
    pub release_type: ReleaseType,
    pub subject_suffix: Option<String>,
    pub instructions: Option<String>,
}

impl ReleaseNotice {
    fn subject(&self) -> String {
        let kind = if self.release_type.is_external() {
            "New Official Release"
        } else {
            "New Development Tag"
        };
        match &self.subject_suffix {
            Some(suffix) => format!("[{}] {}: {}", self.namespace, kind, suffix),
            None => format!("[{}] {}", self.namespace, kind),
        }
    }

    fn body(&self) -> String {
        let header = if self.release_type.is_external() {
            format!("A new version of {} is available:", self.app_name)
        } else {
            format!("A new development version of {} is available:", self.app_name)
        };

        let mut body = format!(
            "Hi,\n\n{}\n\n    {}    {}\n\nRelease note:\n\n{}\n\n{}\n\n{}\n",
            header, self.version, self.selectors, DIVIDER, self.release_note, DIVIDER
        );
        if let Some(instructions) = &self.instructions {
            body.push_str(&format!("\n{}\n\n{}\n", instructions, DIVIDER));
        }
        body.push_str(&format!(
            "\nYou are receiving this because you are a member of the {} Mailing List,\n\
             or a member of the development team.\n",
            self.app_name
        ));
        body
    }

    fn recipients(&self, lists: &MailingLists) -> Vec<Recipient> {
        let groups: [&[Recipient]; 3] = if self.release_type.is_external() {
            [&lists.users, &lists.subscribers_prod, &lists.subscribers_dev]
        } else {
            [&lists.admins, &lists.subscribers_dev, &[]]
        };
        groups.iter().flat_map(|g| g.iter().cloned()).collect()
    }
}

/// Outcome of a regression run
#[derive(Debug, Clone)]
pub struct RegressionStats {
    pub summary_text: String,
    pub clean_run: bool,
}

/// Composes notifications and delivers them over a [`MailTransport`]
pub struct Mailer {
    transport: Arc<dyn MailTransport>,
    from: String,
    from_alias: String,
}

impl fmt::Debug for Mailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailer")
            .field("from", &self.from)
            .field("from_alias", &self.from_alias)
            .finish()
    }
}

impl Mailer {
    pub fn new(
        transport: Arc<dyn MailTransport>,
        from: impl Into<String>,
        from_alias: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            from: from.into(),
            from_alias: from_alias.into(),
        }
    }

    /// SMTP mailer from site config
    ///
    /// Without a configured sender the current user at the mail server is used.
    pub fn from_config(config: &MailConfig) -> Self {
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "baler".to_string());
        let from = config
            .from
            .clone()
            .unwrap_or_else(|| format!("{}@{}", user, config.server));
        let from_alias = config.from_alias.clone().unwrap_or(user);

        Self::new(
            Arc::new(SmtpTransport::new(config.server.clone(), config.port)),
            from,
            from_alias,
        )
    }

    /// Deliver `email` once per distinct recipient address
    ///
    /// A failed recipient is logged and the rest are still attempted.
    pub async fn send_email(&self, email: &Email) -> SendOutcome {
        let mut seen = BTreeSet::new();
        let addresses: Vec<&str> = email
            .to
            .iter()
            .map(Recipient::email)
            .filter(|address| seen.insert(*address))
            .collect();

        if addresses.is_empty() {
            return SendOutcome::Failed("no recipients".to_string());
        }

        let (from, from_alias) = match &email.from {
            Some(Recipient::User { name, email: address }) => (address.as_str(), name.as_str()),
            Some(Recipient::Address(address)) => (address.as_str(), address.as_str()),
            None => (self.from.as_str(), self.from_alias.as_str()),
        };
        if has_line_break(from) {
            return SendOutcome::Failed(format!(
                "invalid sender address '{}'",
                from.escape_debug()
            ));
        }

        let mut failures = Vec::new();
        for address in addresses {
            if has_line_break(address) {
                tracing::warn!(
                    "Email not able to be sent to address '{}'",
                    address.escape_debug()
                );
                failures.push(format!("{}: invalid address", address.escape_debug()));
                continue;
            }

            let message = self.compose(email, from, from_alias, address);
            if let Err(e) = self.transport.deliver(from, address, &message).await {
                tracing::warn!(error = %e, "Email not able to be sent to address '{}'", address);
                failures.push(format!("{}: {}", address, e));
            }
        }

        if failures.is_empty() {
            SendOutcome::Sent
        } else {
            SendOutcome::Failed(failures.join("; "))
        }
    }

    /// Announce a release to the lists its type reaches
    pub async fn send_release_notice(
        &self,
        notice: &ReleaseNotice,
        lists: &MailingLists,
    ) -> SendOutcome {
        let email = Email::new(notice.recipients(lists), notice.subject(), notice.body());
        self.send_email(&email).await
    }

    pub async fn send_regression_complete_notice(
        &self,
        namespace: &str,
        stats: &RegressionStats,
        to: Vec<Recipient>,
    ) -> SendOutcome {
        let verdict = if stats.clean_run { "PASSED" } else { "FAILED" };
        let subject = format!("[{}] Regression - {}", namespace, verdict);
        let body = format!("Hi,\n\nThe regression results are:\n\n{}\n", stats.summary_text);
        self.send_email(&Email::new(to, subject, body)).await
    }

    fn compose(&self, email: &Email, from: &str, from_alias: &str, address: &str) -> String {
        format!(
            concat!(
                "From: {} <{}>\nTo: {}\nSubject: {}\nDate: {}\n",
                "MIME-Version: {}\nContent-type: {}\n\n{}\n"
            ),
            header_value(from_alias),
            from,
            address,
            header_value(&email.subject),
            chrono::Local::now().to_rfc2822(),
            header_value(&email.mime_version),
            header_value(&email.content_type),
            email.body
        )
    }
}

fn has_line_break(value: &str) -> bool {
    value.contains(['\r', '\n'])
}

/// Header text on a single line
fn header_value(value: &str) -> String {
    value
        .split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
