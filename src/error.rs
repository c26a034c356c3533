/// Errors that may be encountered while building
/// customer records or summarizing trials.
///
/// The [`InvalidArgument`] variant indicates that a
/// caller handed the model an input outside its
/// domain: a random draw outside `[0, 1)`, a trial
/// with fewer than two customers, a run with no
/// trials, or a malformed [`SimConfig`]. These are
/// contract violations on the client side and are
/// never retried.
///
/// The [`InvalidState`] variant indicates that an
/// operation was requested before its preconditions
/// held, e.g. asking for the average interarrival
/// time of a log holding fewer than two customers,
/// or drawing from a [`ReplayDraws`] that has run
/// out of recorded values.
///
/// [`InvalidArgument`]: Error::InvalidArgument
/// [`InvalidState`]: Error::InvalidState
/// [`SimConfig`]: crate::SimConfig
/// [`ReplayDraws`]: crate::ReplayDraws
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An input fell outside the domain accepted
    /// by the operation that received it.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// An operation was invoked before the state
    /// it depends on was available.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl Error {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub(crate) fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }
}

/// [`std::result::Result`]`<T, `[`tandem_queue::Error`]`>`
///
/// A type alias that simplifies the signatures of
/// various functions in tandem-queue. The success
/// type defaults to `()`.
///
/// [`tandem_queue::Error`]: Error
pub type Result<T = ()> = std::result::Result<T, Error>;
