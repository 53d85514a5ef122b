use tokio::{
    runtime::Handle,
    task::{AbortHandle, JoinError, JoinHandle},
};

use crate::{Error, Mailer, SendOutcome, Transport};

impl<T> Mailer<T>
where
    T: Transport + Send + 'static,
{
    /// Send the message on the current Tokio runtime without waiting for it.
    ///
    /// `on_complete` is called exactly once when the send is over, with `token` if the
    /// message was delivered, [`CANCELLED`](crate::mailer::CANCELLED) if the send was
    /// cancelled through the returned handle, or `token` and the failure otherwise.
    /// It runs on a runtime worker, after the mailer has been released.
    ///
    /// Returns `Ok(None)` if there is nothing to send; the callback is never called then.
    pub fn send_async<F>(
        mut self,
        token: impl Into<String>,
        on_complete: F,
    ) -> Result<Option<SendHandle>, Error<T::Error>>
    where
        F: FnOnce(String) + Send + 'static,
    {
        if self.message().is_none() {
            return Ok(None);
        }
        let Ok(runtime) = Handle::try_current() else {
            return Err(Error::NoRuntime);
        };
        let token = token.into();

        let send = runtime.spawn(self.deliver());
        let abort = send.abort_handle();
        let completion = runtime.spawn(async move {
            let outcome = outcome_of(send.await);
            #[cfg(feature = "log-04")]
            log::debug!("send {token} finished: {outcome}");
            on_complete(outcome.describe(&token));
            outcome
        });
        Ok(Some(SendHandle { abort, completion }))
    }
}

fn outcome_of<E: core::fmt::Display>(joined: Result<Result<(), E>, JoinError>) -> SendOutcome {
    match joined {
        Ok(Ok(())) => SendOutcome::Delivered,
        Ok(Err(e)) => SendOutcome::Failed(e.to_string()),
        Err(e) if e.is_cancelled() => SendOutcome::Cancelled,
        Err(e) => SendOutcome::Failed(e.to_string()),
    }
}

/// A send running in the background.
///
/// Dropping the handle does not stop the send, the completion callback still runs.
#[derive(Debug)]
pub struct SendHandle {
    abort: AbortHandle,
    completion: JoinHandle<SendOutcome>,
}

impl SendHandle {
    /// Cancel the send if it is still in flight. The completion callback then
    /// reports the send as cancelled. No effect once the transport is done.
    pub fn cancel(&self) {
        #[cfg(feature = "log-04")]
        log::debug!("cancelling send");
        self.abort.abort();
    }

    /// Whether the send is over and the completion callback has run.
    pub fn is_finished(&self) -> bool {
        self.completion.is_finished()
    }

    /// Wait for the send to finish.
    pub async fn outcome(self) -> SendOutcome {
        match self.completion.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => SendOutcome::Cancelled,
            // the completion callback panicked
            Err(e) => SendOutcome::Failed(e.to_string()),
        }
    }
}
