use core::fmt;

use lettre::{
    Address, Message, SmtpTransport,
    address::AddressError,
    message::{
        Attachment as AttachmentPart, Mailbox, MultiPart, SinglePart,
        header::{ContentType, ContentTypeErr, Header, HeaderName, HeaderValue},
    },
    transport::smtp::authentication::Credentials,
};
#[cfg(feature = "tokio")]
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use secrecy::{ExposeSecret, SecretString};

use crate::{ComposedMessage, MailConfig, Mailer, Priority, Transport};

/// errors from turning a composed message into a lettre message and submitting it
#[derive(Debug, thiserror::Error)]
pub enum SmtpRelayError {
    #[error("Invalid address {address:?}: {source}")]
    Address {
        address: String,
        source: AddressError,
    },
    #[error("Invalid content type {content_type:?} for attachment {filename:?}: {source}")]
    ContentType {
        filename: String,
        content_type: String,
        source: ContentTypeErr,
    },
    #[error(transparent)]
    Message(#[from] lettre::error::Error),
    #[error(transparent)]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Submits messages to a relay server with lettre.
///
/// With TLS enabled the server must offer STARTTLS, the connection is upgraded before
/// authenticating. Without it everything, credentials included, goes over plain text.
/// The lettre transports are built on first use and dropped on [`close`](Transport::close).
pub struct SmtpRelay {
    host: String,
    port: u16,
    tls: bool,
    username: String,
    password: SecretString,
    blocking: Option<SmtpTransport>,
    #[cfg(feature = "tokio")]
    nonblocking: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpRelay {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        tls: bool,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        SmtpRelay {
            host: host.into(),
            port,
            tls,
            username: username.into(),
            password,
            blocking: None,
            #[cfg(feature = "tokio")]
            nonblocking: None,
        }
    }

    /// A relay for the server in `config`, logging in as the sender.
    pub fn from_config(config: &MailConfig) -> Self {
        Self::new(
            config.host(),
            config.port(),
            config.tls(),
            config.sender(),
            config.password().clone(),
        )
    }

    fn credentials(&self) -> Credentials {
        Credentials::new(
            self.username.clone(),
            self.password.expose_secret().clone(),
        )
    }

    fn blocking(&mut self) -> Result<&SmtpTransport, SmtpRelayError> {
        let transport = match self.blocking.take() {
            Some(transport) => transport,
            None => {
                let builder = if self.tls {
                    SmtpTransport::starttls_relay(&self.host)?
                } else {
                    SmtpTransport::builder_dangerous(&self.host)
                };
                builder
                    .port(self.port)
                    .credentials(self.credentials())
                    .build()
            }
        };
        Ok(self.blocking.insert(transport))
    }

    #[cfg(feature = "tokio")]
    fn nonblocking(&mut self) -> Result<&AsyncSmtpTransport<Tokio1Executor>, SmtpRelayError> {
        let transport = match self.nonblocking.take() {
            Some(transport) => transport,
            None => {
                let builder = if self.tls {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)?
                } else {
                    AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.host)
                };
                builder
                    .port(self.port)
                    .credentials(self.credentials())
                    .build()
            }
        };
        Ok(self.nonblocking.insert(transport))
    }
}

impl fmt::Debug for SmtpRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpRelay")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Transport for SmtpRelay {
    type Error = SmtpRelayError;

    fn send(&mut self, message: &ComposedMessage) -> Result<(), Self::Error> {
        let email = to_lettre(message)?;
        #[cfg(feature = "log-04")]
        log::debug!("submitting to {}:{} (tls: {})", self.host, self.port, self.tls);
        let response = lettre::Transport::send(self.blocking()?, &email)?;
        #[cfg(feature = "log-04")]
        log::debug!("s>{}", response.code());
        #[cfg(not(feature = "log-04"))]
        let _ = response;
        Ok(())
    }

    #[cfg(feature = "tokio")]
    async fn send_async(&mut self, message: &ComposedMessage) -> Result<(), Self::Error> {
        let email = to_lettre(message)?;
        #[cfg(feature = "log-04")]
        log::debug!("submitting to {}:{} (tls: {})", self.host, self.port, self.tls);
        let response = self.nonblocking()?.send(email).await?;
        #[cfg(feature = "log-04")]
        log::debug!("s>{}", response.code());
        #[cfg(not(feature = "log-04"))]
        let _ = response;
        Ok(())
    }

    // without an async executor the blocking transport is all we have
    #[cfg(not(feature = "tokio"))]
    async fn send_async(&mut self, message: &ComposedMessage) -> Result<(), Self::Error> {
        self.send(message)
    }

    fn close(&mut self) {
        #[cfg(feature = "log-04")]
        log::debug!("closing relay to {}:{}", self.host, self.port);
        self.blocking = None;
        #[cfg(feature = "tokio")]
        {
            self.nonblocking = None;
        }
    }
}

impl Mailer<SmtpRelay> {
    /// A mailer sending through the SMTP server named in `config`.
    pub fn smtp(config: MailConfig) -> Self {
        let relay = SmtpRelay::from_config(&config);
        Mailer::new(config, relay)
    }
}

/// `X-Priority`, understood by most clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct XPriority(Priority);

/// `Importance`, the RFC 2156 flavour used by Outlook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Importance(Priority);

fn parse_priority(s: &str) -> Result<Priority, Box<dyn std::error::Error + Send + Sync>> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "2" | "high" | "urgent" => Ok(Priority::High),
        "3" | "normal" => Ok(Priority::Normal),
        "4" | "5" | "low" | "non-urgent" => Ok(Priority::Low),
        other => Err(format!("unknown priority {other:?}").into()),
    }
}

impl Header for XPriority {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Priority")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        // "1 (Highest)" -> "1"
        let level = s.split_whitespace().next().unwrap_or_default();
        parse_priority(level).map(XPriority)
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.x_priority().to_owned())
    }
}

impl Header for Importance {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("Importance")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        parse_priority(s).map(Importance)
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.importance().to_owned())
    }
}

fn mailbox(name: Option<&str>, address: &str) -> Result<Mailbox, SmtpRelayError> {
    let parsed = address.parse::<Address>().map_err(|source| SmtpRelayError::Address {
        address: address.to_owned(),
        source,
    })?;
    Ok(Mailbox::new(name.map(str::to_owned), parsed))
}

/// Convert a composed message into a lettre message.
///
/// This is where addresses and attachment content types are validated. The body is
/// always a `multipart/mixed` with the HTML part first and one part per attachment.
pub fn to_lettre(message: &ComposedMessage) -> Result<Message, SmtpRelayError> {
    let from = message.from();
    let mut builder = Message::builder()
        .from(mailbox(Some(from.name()), from.address())?)
        .subject(message.subject())
        .header(XPriority(message.priority()))
        .header(Importance(message.priority()));
    for to in message.to() {
        builder = builder.to(mailbox(None, to)?);
    }
    for cc in message.cc() {
        builder = builder.cc(mailbox(None, cc)?);
    }
    for bcc in message.bcc() {
        builder = builder.bcc(mailbox(None, bcc)?);
    }

    let mut body = MultiPart::mixed().singlepart(SinglePart::html(message.body().to_owned()));
    for attachment in message.attachments() {
        let content_type =
            ContentType::parse(attachment.content_type()).map_err(|source| {
                SmtpRelayError::ContentType {
                    filename: attachment.filename().to_owned(),
                    content_type: attachment.content_type().to_owned(),
                    source,
                }
            })?;
        body = body.singlepart(
            AttachmentPart::new(attachment.filename().to_owned())
                .body(attachment.content().to_vec(), content_type),
        );
    }
    Ok(builder.multipart(body)?)
}
