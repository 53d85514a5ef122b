mod error;
pub use error::*;

mod config;
pub use config::MailConfig;

pub mod message;
pub use message::{Attachment, ComposedMessage, Priority};

pub mod mailer;
pub use mailer::{Mailer, SendOutcome};

pub mod integrations {
    #[cfg(feature = "lettre")]
    pub mod lettre;
    #[cfg(feature = "lettre")]
    pub use self::lettre::{SmtpRelay, SmtpRelayError};
    #[cfg(feature = "tokio")]
    pub mod tokio;
    #[cfg(feature = "tokio")]
    pub use self::tokio::SendHandle;
}

/// Something that can hand a [`ComposedMessage`] to a mail server.
///
/// A transport is owned by exactly one [`Mailer`] and is closed by it once the
/// send attempt is over, so implementations may keep connections or other
/// handles around between `send*` and `close`.
pub trait Transport {
    type Error: core::error::Error + Send + Sync + 'static;

    /// Sends the message, blocking the calling thread until the server has
    /// accepted or rejected it.
    fn send(&mut self, message: &ComposedMessage) -> Result<(), Self::Error>;

    fn send_async(
        &mut self,
        message: &ComposedMessage,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Releases whatever the transport holds on to. Called at most once.
    fn close(&mut self) {}
}
