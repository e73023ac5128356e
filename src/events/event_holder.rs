use super::Event;
use crate::SimTime;
use std::cmp::Ordering;

/// Helper struct for the event queue. Pairs an [`Event`] with the record of its insertion sequence.
///
/// The implementation of [`Ord`] cares first about the event's time, comparing insertion sequences only to break ties.
pub(super) struct EventHolder<Time>
where
    Time: SimTime,
{
    pub event: Event<Time>,
    pub insertion_sequence: usize,
}

impl<Time> PartialEq<Self> for EventHolder<Time>
where
    Time: SimTime,
{
    fn eq(&self, other: &Self) -> bool {
        self.insertion_sequence == other.insertion_sequence && self.event.time() == other.event.time()
    }
}

impl<Time> Eq for EventHolder<Time> where Time: SimTime {}

impl<Time> PartialOrd<Self> for EventHolder<Time>
where
    Time: SimTime,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Time> Ord for EventHolder<Time>
where
    Time: SimTime,
{
    fn cmp(&self, other: &Self) -> Ordering {
        self.event
            .time()
            .cmp(other.event.time())
            .then_with(|| self.insertion_sequence.cmp(&other.insertion_sequence))
    }
}
