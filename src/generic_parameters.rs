use std::fmt::Debug;

/// The generic type used to order events in an [`EventQueue`].
///
/// This trait is a superset of [`Ord`] and [`Debug`] with no additional requirements or functionality. Events pop off
/// the queue in ascending order of their time, i.e. if `A.cmp(&B) == std::cmp::Ordering::Less` then event A executes
/// before event B. Ties that your [`Ord`] implementation does not break are resolved by the order in which events were
/// added to the queue.
///
/// Implementations are provided for the integral builtin types and for the [`OrderedFloat`] and [`NotNan`] wrappers
/// from the [`ordered-float`] crate. The builtin floating-point types do not implement [`Ord`] and so cannot be used
/// directly. A [`TimeMachine`] keys its queue with [`OrderedFloat<f64>`] milliseconds.
///
/// [`EventQueue`]: crate::EventQueue
/// [`TimeMachine`]: crate::TimeMachine
/// [`ordered-float`]: https://docs.rs/ordered-float/4
/// [`OrderedFloat`]: ordered_float::OrderedFloat
/// [`OrderedFloat<f64>`]: ordered_float::OrderedFloat
/// [`NotNan`]: ordered_float::NotNan
pub trait SimTime: Ord + Debug {}

impl SimTime for u8 {}
impl SimTime for u16 {}
impl SimTime for u32 {}
impl SimTime for u64 {}
impl SimTime for u128 {}
impl SimTime for usize {}
impl SimTime for i8 {}
impl SimTime for i16 {}
impl SimTime for i32 {}
impl SimTime for i64 {}
impl SimTime for i128 {}
impl SimTime for isize {}

impl<Float> SimTime for ordered_float::OrderedFloat<Float> where Float: ordered_float::FloatCore + Debug {}

impl<Float> SimTime for ordered_float::NotNan<Float> where Float: ordered_float::FloatCore + Debug {}
