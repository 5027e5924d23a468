//! Chat transports.

pub mod telegram;
