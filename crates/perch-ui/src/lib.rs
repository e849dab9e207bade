//! Demonstration components built on `perch-core`.
//!
//! ```rust
//! use perch_core::{Event, Runtime};
//! use perch_ui::{Counter, CounterProps};
//! use web_time::Duration;
//!
//! let mut rt = Runtime::new();
//! let id = rt.mount::<Counter>(CounterProps::default());
//! rt.dispatch(id, "toggle", Event::Click).unwrap();
//! rt.advance(Duration::from_secs(3));
//! assert_eq!(rt.component::<Counter>(id).unwrap().value(), 3);
//! ```
//!
//! Each component keeps its derived presentation in free functions
//! ([`count_tone`], [`button_classes`], [`clear_label`], ...) so they can be
//! checked without mounting anything.

pub mod button;
pub mod counter;
pub mod todo;
pub mod widgets;

pub use button::*;
pub use counter::*;
pub use todo::*;
pub use widgets::*;
