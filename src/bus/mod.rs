//! Arbitration of the storage bus shared with the printer controller.

pub mod arbiter;
pub mod lines;

pub use arbiter::{BusArbiter, BusEvent, BusGuard, BusSignal};
pub use lines::{BusLines, PassiveLines};
