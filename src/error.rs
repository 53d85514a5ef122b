/// any error that can surface from a [`Mailer`](crate::Mailer) send
/// can be categorized into two categories:
/// - errors reported by the transport (connection refused, rejected recipient, ...)
/// - errors in how the send was invoked, like asking for an async send
///   without a runtime to run it on
///
/// An empty recipient list is not an error, the send is simply skipped.
#[derive(Debug, thiserror::Error)]
pub enum Error<T: core::error::Error> {
    #[error("Transport Error: {0}")]
    TransportError(T),
    #[error("No async runtime available to run the send on")]
    NoRuntime,
}

impl<T: core::error::Error> Error<T> {
    /// The transport error, if this is one.
    pub fn transport(&self) -> Option<&T> {
        match self {
            Error::TransportError(e) => Some(e),
            Error::NoRuntime => None,
        }
    }
}
