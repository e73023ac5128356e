mod event_holder;

use crate::SimTime;
use event_holder::EventHolder;

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt::{Debug, Formatter};

/// A zero-argument procedure executed when its [`Event`] comes due.
///
/// Actions are boxed so that closures of any type may share one queue. The [`Send`] bound allows an action to be
/// created on any thread and executed on the driver thread of a [`TimeMachine`].
///
/// [`TimeMachine`]: crate::TimeMachine
pub type Action = Box<dyn FnOnce() + Send + 'static>;

/// A scheduled `(time, action)` pair awaiting execution.
///
/// An [`Event`] is immutable once created. Ownership moves into an [`EventQueue`] when it is added, and the action is
/// consumed by [`execute()`].
///
/// [`execute()`]: Event::execute
pub struct Event<Time> {
    time: Time,
    action: Action,
}

impl<Time> Event<Time> {
    /// Wrap the provided closure into an event that comes due at `time`.
    pub fn new<F>(time: Time, action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::from_boxed(time, Box::new(action))
    }

    /// Construct an event from an already boxed [`Action`].
    pub fn from_boxed(time: Time, action: Action) -> Self {
        Self { time, action }
    }

    /// Get a shared reference to the time at which this event comes due.
    pub fn time(&self) -> &Time {
        &self.time
    }

    /// Run the action, consuming the event.
    pub fn execute(self) {
        (self.action)();
    }

    /// Split the event into its time and its action.
    pub fn into_parts(self) -> (Time, Action) {
        (self.time, self.action)
    }
}

impl<Time> Debug for Event<Time>
where
    Time: Debug,
{
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_struct("Event").field("time", &self.time).finish_non_exhaustive()
    }
}

/// Priority queue of scheduled events.
///
/// Events come out of the queue in ascending order of time, with ties broken by the order in which they were added.
/// This tiebreaker is in addition to any built-in to the implementation of [`SimTime`] as a way to stabilize the
/// observed order of execution when the queue is driven from a single thread.
///
/// The queue is a plain binary min-heap with no internal synchronization. Inside a [`TimeMachine`] it is owned by
/// exactly one side at a time: the caller driving [`step()`] before [`start()`], the driver thread afterwards. Other
/// producers reach it only through the time machine's submission channel.
///
/// [`TimeMachine`]: crate::TimeMachine
/// [`step()`]: crate::TimeMachine::step
/// [`start()`]: crate::TimeMachine::start
pub struct EventQueue<Time>
where
    Time: SimTime,
{
    events: BinaryHeap<Reverse<EventHolder<Time>>>,
    events_added: usize,
}

impl<Time> EventQueue<Time>
where
    Time: SimTime,
{
    /// Construct a new, empty [`EventQueue`].
    pub fn new() -> Self {
        Self {
            events: BinaryHeap::new(),
            events_added: 0,
        }
    }

    /// Insert an event. Runs in O(log n) and never fails.
    pub fn add(&mut self, event: Event<Time>) {
        let insertion_sequence = self.increment_event_count();
        self.events.push(Reverse(EventHolder {
            event,
            insertion_sequence,
        }));
    }

    /// Remove and return the event with the smallest time, or `None` if the queue is empty.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<Event<Time>> {
        self.events.pop().map(|Reverse(holder)| holder.event)
    }

    /// Get the smallest scheduled time without removing its event, or `None` if the queue is empty.
    pub fn peek_time(&self) -> Option<&Time> {
        self.events.peek().map(|Reverse(holder)| holder.event.time())
    }

    /// Number of events waiting in the queue.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the queue holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn increment_event_count(&mut self) -> usize {
        let count = self.events_added;
        self.events_added = self.events_added.wrapping_add(1);
        count
    }
}

impl<Time> Default for EventQueue<Time>
where
    Time: SimTime,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Time> Debug for EventQueue<Time>
where
    Time: SimTime,
{
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("len", &self.events.len())
            .field("next_time", &self.peek_time())
            .field("events_added", &self.events_added)
            .finish()
    }
}

impl<Time> std::fmt::Display for EventQueue<Time>
where
    Time: SimTime,
{
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        write!(
            formatter,
            "EventQueue with {} scheduled events, next at {:?}",
            self.events.len(),
            self.peek_time()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording_event(time: u32, value: i32, log: &Arc<Mutex<Vec<i32>>>) -> Event<u32> {
        let log = Arc::clone(log);
        Event::new(time, move || log.lock().unwrap().push(value))
    }

    fn drain(queue: &mut EventQueue<u32>) {
        while let Some(event) = queue.next() {
            event.execute();
        }
    }

    #[test]
    fn execution_time_ascends() {
        let log = Arc::new(Mutex::new(Vec::with_capacity(3)));
        let mut queue = EventQueue::new();
        queue.add(recording_event(1, 1, &log));
        queue.add(recording_event(3, 2, &log));
        queue.add(recording_event(2, 3, &log));

        drain(&mut queue);

        assert_eq!(vec![1, 3, 2], *log.lock().unwrap(), "events did not execute in expected order");
    }

    #[test]
    fn insertion_sequence_breaks_ties_in_execution_time() {
        const NUM_EVENTS: i32 = 10;
        let log = Arc::new(Mutex::new(Vec::with_capacity(NUM_EVENTS as usize)));
        let mut queue = EventQueue::new();

        for copy_id in 0..NUM_EVENTS {
            queue.add(recording_event(1, copy_id, &log));
        }
        drain(&mut queue);

        let expected: Vec<_> = (0..NUM_EVENTS).collect();
        assert_eq!(expected, *log.lock().unwrap(), "events executed out of insertion sequence");
    }

    #[test]
    fn empty_queue_yields_nothing() {
        let mut queue: EventQueue<u32> = EventQueue::new();
        assert!(queue.is_empty());
        assert_eq!(None, queue.peek_time());
        assert!(queue.next().is_none(), "empty queue produced an event");
    }

    #[test]
    fn peek_time_does_not_remove() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut queue = EventQueue::new();
        queue.add(recording_event(7, 0, &log));
        queue.add(recording_event(4, 1, &log));

        assert_eq!(Some(&4), queue.peek_time());
        assert_eq!(Some(&4), queue.peek_time());
        assert_eq!(2, queue.len());

        let first = queue.next().expect("queue should hold two events");
        assert_eq!(4, *first.time());
        assert_eq!(Some(&7), queue.peek_time());
    }

    #[test]
    fn display_reports_length_and_next_time() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut queue = EventQueue::new();
        queue.add(recording_event(5, 0, &log));
        assert_eq!("EventQueue with 1 scheduled events, next at Some(5)", queue.to_string());
    }
}
