//! `mfshell-bus` – in-process publish/subscribe
//!
//! # Modules
//!
//! - [`bus`] – [`EventBus`]: synchronous, kind-filtered fan-out to
//!   registered handlers, plus an asynchronous broadcast tap built on
//!   Tokio for consumers that prefer to `await` events.

pub mod bus;

pub use bus::{DEFAULT_CAPACITY, EventBus, Handler, HandlerId, MAX_CAPACITY};
