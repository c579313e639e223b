//! Focus timer: wire protocol, wall-clock worker, and the mounted manager.

pub mod manager;
pub mod protocol;
pub mod worker;

pub use manager::{TimerManager, TimerPhase};
