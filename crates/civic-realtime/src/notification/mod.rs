//! Notification delivery: in-memory pending tier and the dispatcher.

pub mod dispatcher;
pub mod queue;
