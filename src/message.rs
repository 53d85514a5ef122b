//! Composing a [`MailConfig`] into a message a [`Transport`](crate::Transport) can send.
//!
//! Composition never touches the network and never validates addresses, that is
//! left to the transport which knows what its server accepts.

use core::fmt;

use crate::MailConfig;

mod attachment;
pub use attachment::Attachment;

/// Charset used for the subject and body of every composed message.
pub const CHARSET: &str = "utf-8";

/// Importance of a message, as shown by most mail clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    /// Value of the `X-Priority` header.
    #[must_use]
    pub const fn x_priority(self) -> &'static str {
        match self {
            Priority::High => "1 (Highest)",
            Priority::Normal => "3 (Normal)",
            Priority::Low => "5 (Lowest)",
        }
    }

    /// Value of the `Importance` header.
    #[must_use]
    pub const fn importance(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.importance())
    }
}

/// A mailbox: an address with a name to display next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    name: String,
    address: String,
}

impl Mailbox {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }
}

/// A message ready to be handed to a transport.
///
/// Built from a [`MailConfig`] with a fixed policy: the sender's display name is
/// its own address, the body is HTML, everything is UTF-8 and the priority is high.
#[derive(Debug, Clone)]
pub struct ComposedMessage {
    from: Mailbox,
    to: Vec<String>,
    cc: Vec<String>,
    bcc: Vec<String>,
    subject: String,
    body: String,
    priority: Priority,
    attachments: Vec<Attachment>,
}

impl ComposedMessage {
    /// Compose the message described by `config`.
    ///
    /// Returns `None` if there are no recipients, in which case there is nothing to send.
    #[must_use]
    pub fn compose(config: &MailConfig) -> Option<Self> {
        if config.recipients().trim().is_empty() {
            return None;
        }
        let sender = config.sender().to_owned();
        Some(Self {
            from: Mailbox {
                name: sender.clone(),
                address: sender,
            },
            to: split_recipients(config.recipients())
                .map(str::to_owned)
                .collect(),
            cc: config.cc().to_vec(),
            bcc: config.bcc().to_vec(),
            subject: config.subject().to_owned(),
            body: config.body().to_owned(),
            priority: Priority::High,
            attachments: config.attachments().iter().flatten().cloned().collect(),
        })
    }

    // ── Envelope ──────────────────────────────────────────────────────────────

    #[must_use]
    pub fn from(&self) -> &Mailbox {
        &self.from
    }

    #[must_use]
    pub fn to(&self) -> &[String] {
        &self.to
    }

    #[must_use]
    pub fn cc(&self) -> &[String] {
        &self.cc
    }

    #[must_use]
    pub fn bcc(&self) -> &[String] {
        &self.bcc
    }

    /// Every address the message is delivered to: to, cc then bcc.
    pub fn recipients(&self) -> impl Iterator<Item = &str> {
        self.to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .map(String::as_str)
    }

    // ── Content ───────────────────────────────────────────────────────────────

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    #[must_use]
    pub const fn is_html(&self) -> bool {
        true
    }

    #[must_use]
    pub const fn charset(&self) -> &'static str {
        CHARSET
    }

    #[must_use]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }
}

/// Split a comma separated recipient list, trimming whitespace around each entry.
/// Entries are not validated, an empty entry stays empty.
fn split_recipients(recipients: &str) -> impl Iterator<Item = &str> {
    recipients.split(',').map(str::trim)
}
