//! Everything a [`Mailer`](crate::Mailer) needs to know to compose and send one mail.

use secrecy::SecretString;

use crate::message::Attachment;

/// Port used when none is configured.
pub const DEFAULT_PORT: u16 = 25;

/// Sender, server and content of a single mail.
///
/// Required fields (sender, credential, server) are set in the constructor.
/// Everything else uses builder methods like `with_recipients()`, `with_subject()`, etc.
///
/// Recipients are given the way users tend to type them: `"a@x.com,b@x.com"`.
/// An empty recipient string means there is nothing to send.
#[derive(Debug, Clone)]
pub struct MailConfig {
    sender: String,
    password: SecretString,
    host: String,
    port: u16,
    tls: bool,
    subject: String,
    body: String,
    recipients: String,
    cc: Vec<String>,
    bcc: Vec<String>,
    attachments: Vec<Option<Attachment>>,
}

impl MailConfig {
    /// Create a new configuration.
    ///
    /// - `sender`: the sending address, also used as login and display name
    /// - `password`: the credential for `sender` on the SMTP server
    /// - `host`: the SMTP server to submit to
    #[must_use]
    pub fn new(
        sender: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            password: SecretString::new(password.into()),
            host: host.into(),
            port: DEFAULT_PORT,
            tls: true,
            subject: String::new(),
            body: String::new(),
            recipients: String::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            attachments: Vec::new(),
        }
    }

    // ── Sender ────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn sender(&self) -> &str {
        &self.sender
    }

    #[must_use]
    pub fn password(&self) -> &SecretString {
        &self.password
    }

    // ── Server ────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Set the server port, 25 unless changed.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Require STARTTLS before authenticating. Enabled unless changed.
    #[must_use]
    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    #[must_use]
    pub fn tls(&self) -> bool {
        self.tls
    }

    // ── Content ───────────────────────────────────────────────────────────────

    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Set the body. It is always sent as HTML.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    // ── Recipients ────────────────────────────────────────────────────────────

    /// Set the primary recipients, separated by commas: `"a@x.com,b@y.com"`
    ///
    /// An empty string, or one made only of whitespace, means there is nothing
    /// to send and the mailer skips the send silently.
    #[must_use]
    pub fn with_recipients(mut self, recipients: impl Into<String>) -> Self {
        self.recipients = recipients.into();
        self
    }

    #[must_use]
    pub fn recipients(&self) -> &str {
        &self.recipients
    }

    /// Add a single Cc address.
    #[must_use]
    pub fn with_cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address.into());
        self
    }

    #[must_use]
    pub fn cc(&self) -> &[String] {
        &self.cc
    }

    /// Add a single Bcc address.
    #[must_use]
    pub fn with_bcc(mut self, address: impl Into<String>) -> Self {
        self.bcc.push(address.into());
        self
    }

    #[must_use]
    pub fn bcc(&self) -> &[String] {
        &self.bcc
    }

    // ── Attachments ───────────────────────────────────────────────────────────

    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(Some(attachment));
        self
    }

    /// Append a list of attachments. `None` entries are kept in the
    /// configuration but never make it into a composed message.
    #[must_use]
    pub fn with_attachments(mut self, attachments: impl IntoIterator<Item = Option<Attachment>>) -> Self {
        self.attachments.extend(attachments);
        self
    }

    #[must_use]
    pub fn attachments(&self) -> &[Option<Attachment>] {
        &self.attachments
    }

    /// drops the attachment data held by the configuration
    pub(crate) fn clear_attachments(&mut self) {
        self.attachments.clear();
    }
}
