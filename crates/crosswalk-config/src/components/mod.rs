//! Configuration components
//!
//! One small struct per concern, each with sensible defaults.

pub mod channel;
pub mod destination;
pub mod logging;
pub mod routing;
pub mod storage;

pub use channel::*;
pub use destination::*;
pub use logging::*;
pub use routing::*;
pub use storage::*;
