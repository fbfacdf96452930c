//! Control socket

pub mod server;
