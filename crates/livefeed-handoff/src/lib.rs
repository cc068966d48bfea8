//! Single-slot, latest-wins hand-off between two threads.
//!
//! A producer (decoder, renderer stage) pushes items as fast as it makes
//! them; a consumer pops whatever is newest. The buffer never holds more than
//! one item: pushing over an unconsumed item drops the old one instead of
//! queueing or blocking, trading completeness for latency.

pub mod buffer;

pub use buffer::{HandoffBuffer, HandoffStats};
