//! Session events.
//!
//! Every [`SessionManager`](crate::SessionManager) transition fires an
//! event. If no listeners are registered, events are dropped.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use pantry::register_event_listeners;
//! use pantry::events::listeners::LoggingListener;
//!
//! fn main() {
//!     register_event_listeners(|registry| {
//!         registry.listen(LoggingListener::new());
//!     });
//! }
//! ```

mod event;
mod listener;
mod registry;

pub mod listeners;

pub use event::SessionEvent;
pub use listener::Listener;
pub use registry::{EventRegistry, dispatch, register_event_listeners};
