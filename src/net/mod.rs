//! Control-plane networking
//!
//! Best-effort, unordered datagrams; last write wins per field.

pub mod listener;
pub mod protocol;

pub use listener::{ListenerHandle, spawn, spawn_on};
pub use protocol::{decode, parse};
