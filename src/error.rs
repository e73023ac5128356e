use crate::State;

/// Reasons a control request on a [`TimeMachine`] can fail.
///
/// None of these are fatal: the time machine is left exactly as it was, and reissuing a rejected request is always
/// safe.
///
/// The [`InvalidTransition`] variant is the common one, returned whenever the requested command has no transition out
/// of the machine's current [`State`], e.g. pausing a machine that was never started or resuming one that is not
/// paused.
///
/// The [`Disconnected`] variant means the driver loop exited while the request was in flight, which happens when a
/// concurrent [`stop()`] won the race or when an action panicked on the driver thread.
///
/// The [`Reentrant`] variant is returned when an action executing on the driver thread issues a control request. The
/// driver cannot acknowledge a request while it is busy running the action that sent it, so the request is refused
/// rather than deadlocking.
///
/// [`TimeMachine`]: crate::TimeMachine
/// [`stop()`]: crate::TimeMachine::stop
/// [`InvalidTransition`]: Error::InvalidTransition
/// [`Disconnected`]: Error::Disconnected
/// [`Reentrant`]: Error::Reentrant
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The command is not valid from the machine's current state.
    #[error("cannot {command} a time machine that is {state}")]
    InvalidTransition {
        /// Name of the rejected command.
        command: &'static str,
        /// State of the machine when the command was rejected.
        state: State,
    },
    /// The driver loop is no longer receiving requests.
    #[error("time machine driver loop has exited")]
    Disconnected,
    /// A control request was issued from inside an executing action.
    #[error("cannot {command} a time machine from inside one of its own actions")]
    Reentrant {
        /// Name of the rejected command.
        command: &'static str,
    },
}

/// [`std::result::Result`]`<(), `[`sima::Error`]`>`
///
/// A type alias that simplifies the signatures of the control methods on [`TimeMachine`].
///
/// [`sima::Error`]: Error
/// [`TimeMachine`]: crate::TimeMachine
pub type Result = std::result::Result<(), Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_names_command_and_state() {
        let error = Error::InvalidTransition {
            command: "pause",
            state: State::Idle,
        };
        assert_eq!("cannot pause a time machine that is idle", error.to_string());
    }

    #[test]
    fn reentrant_names_command() {
        let error = Error::Reentrant { command: "stop" };
        assert_eq!(
            "cannot stop a time machine from inside one of its own actions",
            error.to_string()
        );
    }
}
