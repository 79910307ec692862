//! Selph Core - Types, record shapes, and error handling

pub mod clock;
pub mod error;
pub mod protocol;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use protocol::*;
pub use types::*;
