//! Durable key/value storage contracts and adapters.

pub mod durable;
