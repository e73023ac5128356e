use super::command::Command;
use crate::Error;
use std::fmt::Formatter;

/// Lifecycle state of a [`TimeMachine`].
///
/// A machine is created [`Idle`], alternates between [`Running`] and [`Paused`] any number of times once started, and
/// enters [`Stopped`] exactly once. [`Stopped`] is terminal.
///
/// [`TimeMachine`]: crate::TimeMachine
/// [`Idle`]: State::Idle
/// [`Running`]: State::Running
/// [`Paused`]: State::Paused
/// [`Stopped`]: State::Stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum State {
    /// Created but not yet started. Events may be scheduled and driven with [`step()`].
    ///
    /// [`step()`]: crate::TimeMachine::step
    Idle = 0,
    /// Started, but due events are held back until the machine resumes.
    Paused = 1,
    /// The driver loop executes events as real time catches up with them.
    Running = 2,
    /// The driver loop has exited for good.
    Stopped = 3,
}

impl State {
    pub(super) fn from_repr(repr: u8) -> Self {
        match repr {
            0 => State::Idle,
            1 => State::Paused,
            2 => State::Running,
            _ => State::Stopped,
        }
    }

    /// The state reached by applying `command` to `self`, or the reason the command is rejected.
    pub(super) fn transition(self, command: Command) -> Result<State, Error> {
        match (self, command) {
            (State::Idle, Command::Start) => Ok(State::Running),
            (State::Running, Command::Pause) => Ok(State::Paused),
            (State::Paused, Command::Resume) => Ok(State::Running),
            (State::Running | State::Paused, Command::Stop) => Ok(State::Stopped),
            (State::Idle | State::Running | State::Paused, Command::SetSpeed(_)) => Ok(self),
            (state, command) => Err(Error::InvalidTransition {
                command: command.name(),
                state,
            }),
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let name = match self {
            State::Idle => "idle",
            State::Paused => "paused",
            State::Running => "running",
            State::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [State; 4] = [State::Idle, State::Paused, State::Running, State::Stopped];

    #[test]
    fn repr_round_trips() {
        for state in ALL_STATES {
            assert_eq!(state, State::from_repr(state as u8));
        }
    }

    #[test]
    fn allowed_transitions() {
        assert_eq!(Ok(State::Running), State::Idle.transition(Command::Start));
        assert_eq!(Ok(State::Paused), State::Running.transition(Command::Pause));
        assert_eq!(Ok(State::Running), State::Paused.transition(Command::Resume));
        assert_eq!(Ok(State::Stopped), State::Running.transition(Command::Stop));
        assert_eq!(Ok(State::Stopped), State::Paused.transition(Command::Stop));
    }

    #[test]
    fn set_speed_keeps_state_until_stopped() {
        for state in [State::Idle, State::Paused, State::Running] {
            assert_eq!(Ok(state), state.transition(Command::SetSpeed(2.0)));
        }
        assert_eq!(
            Err(Error::InvalidTransition {
                command: "set the speed of",
                state: State::Stopped,
            }),
            State::Stopped.transition(Command::SetSpeed(2.0))
        );
    }

    #[test]
    fn every_other_pair_is_rejected() {
        let rejected = [
            (State::Idle, Command::Pause),
            (State::Idle, Command::Resume),
            (State::Idle, Command::Stop),
            (State::Running, Command::Start),
            (State::Running, Command::Resume),
            (State::Paused, Command::Start),
            (State::Paused, Command::Pause),
            (State::Stopped, Command::Start),
            (State::Stopped, Command::Pause),
            (State::Stopped, Command::Resume),
            (State::Stopped, Command::Stop),
        ];
        for (state, command) in rejected {
            assert_eq!(
                Err(Error::InvalidTransition {
                    command: command.name(),
                    state,
                }),
                state.transition(command),
                "{state} should reject {}",
                command.name()
            );
        }
    }
}
