//! Sending one [`MailConfig`] through one [`Transport`].

use core::fmt;

use crate::{ComposedMessage, Error, MailConfig, Transport};

/// Text handed to the completion callback of a cancelled async send.
pub const CANCELLED: &str = "operation cancelled";

/// How an asynchronous send ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    Cancelled,
    Failed(String),
}

impl SendOutcome {
    /// Render the outcome for the completion callback of the send identified by `token`.
    ///
    /// - delivered: the token itself
    /// - cancelled: [`CANCELLED`]
    /// - failed: `"<token> failed: <detail>"`
    #[must_use]
    pub fn describe(&self, token: &str) -> String {
        match self {
            SendOutcome::Delivered => token.to_owned(),
            SendOutcome::Cancelled => CANCELLED.to_owned(),
            SendOutcome::Failed(detail) => format!("{token} failed: {detail}"),
        }
    }

    #[must_use]
    pub fn is_delivered(&self) -> bool {
        matches!(self, SendOutcome::Delivered)
    }
}

impl fmt::Display for SendOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendOutcome::Delivered => write!(f, "delivered"),
            SendOutcome::Cancelled => write!(f, "{CANCELLED}"),
            SendOutcome::Failed(detail) => write!(f, "failed: {detail}"),
        }
    }
}

/// Composes and sends a single mail.
///
/// Both send operations take the mailer by value: one mailer sends at most one
/// message, use a new mailer for the next one. Whatever the mailer holds (the
/// composed message, attachment data and the transport) is released exactly once,
/// when the send is over or when the mailer is dropped, whichever comes first.
///
/// A configuration without recipients is not an error: sending it does nothing.
pub struct Mailer<T: Transport> {
    config: MailConfig,
    transport: Option<T>,
    // composed on first use, taken on release
    message: Option<ComposedMessage>,
    released: bool,
}

impl<T: Transport> Mailer<T> {
    pub fn new(config: MailConfig, transport: T) -> Self {
        Mailer {
            config,
            transport: Some(transport),
            message: None,
            released: false,
        }
    }

    pub fn config(&self) -> &MailConfig {
        &self.config
    }

    /// The message this mailer sends, composed on first call.
    ///
    /// `None` if there are no recipients, or once the mailer has been released.
    pub fn message(&mut self) -> Option<&ComposedMessage> {
        if self.released {
            return None;
        }
        if self.message.is_none() {
            self.message = ComposedMessage::compose(&self.config);
            #[cfg(feature = "log-04")]
            match &self.message {
                Some(message) => log::debug!(
                    "composed \"{}\" for {} recipient(s), {} attachment(s), {} priority",
                    message.subject(),
                    message.recipients().count(),
                    message.attachments().len(),
                    message.priority()
                ),
                None => log::debug!("no recipients, nothing to compose"),
            }
        }
        self.message.as_ref()
    }

    /// Send the message, blocking until the transport is done with it.
    ///
    /// Returns `Ok(())` without contacting the transport if there is nothing to send.
    pub fn send(mut self) -> Result<(), Error<T::Error>> {
        if self.message().is_none() {
            return Ok(());
        }
        let (Some(message), Some(transport)) = (self.message.as_ref(), self.transport.as_mut())
        else {
            return Ok(());
        };
        #[cfg(feature = "log-04")]
        log::debug!("sending \"{}\"", message.subject());
        let result = transport.send(message).map_err(Error::TransportError);
        #[cfg(feature = "log-04")]
        if let Err(e) = &result {
            log::warn!("sending \"{}\" failed: {e}", message.subject());
        }
        self.release();
        result
    }

    /// The async counterpart of [`send`](Self::send), run by the spawned send task.
    /// The caller has already checked there is something to send.
    #[cfg_attr(not(feature = "tokio"), allow(dead_code))]
    pub(crate) async fn deliver(mut self) -> Result<(), Error<T::Error>> {
        // make sure the message exists before borrowing it alongside the transport
        let _ = self.message();
        let (Some(message), Some(transport)) = (self.message.as_ref(), self.transport.as_mut())
        else {
            return Ok(());
        };
        #[cfg(feature = "log-04")]
        log::debug!("sending \"{}\" asynchronously", message.subject());
        let result = transport
            .send_async(message)
            .await
            .map_err(Error::TransportError);
        #[cfg(feature = "log-04")]
        if let Err(e) = &result {
            log::warn!("sending \"{}\" failed: {e}", message.subject());
        }
        self.release();
        result
    }

    /// Release the composed message, the attachments and the transport.
    ///
    /// Only the first call does anything. Called automatically at the end of a send
    /// and on drop, so calling it by hand is only useful to give up on a mailer early.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.message = None;
        self.config.clear_attachments();
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
        #[cfg(feature = "log-04")]
        log::debug!("released mailer for {}", self.config.sender());
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl<T: Transport> Drop for Mailer<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: Transport> fmt::Debug for Mailer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailer")
            .field("config", &self.config)
            .field("message", &self.message)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}
