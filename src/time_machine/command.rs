use crossbeam_channel::Sender;

/// Control request understood by the driver loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Command {
    Start,
    Pause,
    Resume,
    Stop,
    /// Already clamped to at least [`MIN_SPEED`](crate::MIN_SPEED).
    SetSpeed(f64),
}

impl Command {
    /// Verb used in log messages and in [`Error`](crate::Error) descriptions.
    pub(crate) fn name(self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::Stop => "stop",
            Command::SetSpeed(_) => "set the speed of",
        }
    }
}

/// A command paired with the slot its outcome is written to.
///
/// The reply channel has capacity one, so the driver never blocks acknowledging a caller that has gone away.
#[derive(Debug)]
pub(crate) struct Request {
    pub command: Command,
    pub reply: Sender<crate::Result>,
}
