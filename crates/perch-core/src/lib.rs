//! # State, Effects, and Timers
//!
//! Perch components are plain structs mounted into a [`Runtime`]. There are
//! four pieces:
//!
//! - [`StateCell<T>`]: owned, versioned state.
//! - [`RenderCx::effect`]: side effects with declared dependencies and cleanup.
//! - [`Timers`]: the only place delayed and recurring work can live.
//! - [`View`]: the ordered presentation descriptor a render pass produces.
//!
//! ## State cells
//!
//! ```rust
//! use perch_core::*;
//!
//! let count = state(0);
//! count.set(1);
//! count.update(|v| v + 1);
//! assert_eq!(count.get(), 2);
//! assert_eq!(count.version(), 2);
//! ```
//!
//! Cells created through [`Cx::cell`] belong to a mounted instance: writing
//! one marks the instance dirty, and the runtime re-renders it once the
//! current tick finishes.
//!
//! ## Effects and cleanup
//!
//! ```rust
//! use perch_core::*;
//! use web_time::Duration;
//!
//! struct Ticker {
//!     ticks: StateCell<u32>,
//!     running: StateCell<bool>,
//! }
//!
//! impl Component for Ticker {
//!     type Props = ();
//!
//!     fn mount(_: (), cx: &mut Cx<'_>) -> Self {
//!         Ticker { ticks: cx.cell(0), running: cx.cell(true) }
//!     }
//!
//!     fn render(&self, cx: &mut RenderCx<'_>) -> View {
//!         let running = self.running.get();
//!         let ticks = self.ticks.clone();
//!         let timers = cx.timers().clone();
//!         cx.effect(deps![running], move || {
//!             if !running {
//!                 return None;
//!             }
//!             let handle = timers.set_interval(Duration::from_secs(1), move || ticks.update(|t| t + 1));
//!             on_cleanup(move || {
//!                 handle.cancel();
//!             })
//!         });
//!         View::new().child(Node::new("ticks", Role::Text).text(self.ticks.get().to_string()))
//!     }
//! }
//!
//! let mut rt = Runtime::new();
//! let id = rt.mount::<Ticker>(());
//! rt.advance(Duration::from_secs(3));
//! assert_eq!(rt.view(id).unwrap().node("ticks").unwrap().text, "3");
//! rt.unmount(id).unwrap();
//! assert_eq!(rt.timers().pending(), 0);
//! ```
//!
//! - An effect runs after the first render and again whenever one of its
//!   dependencies differs from the previous render. Primitives compare by
//!   value, `Rc`s and cells by identity.
//! - The previous cleanup always runs before the next run, and the last
//!   cleanup runs when the instance unmounts.
//! - `deps![]` runs once at mount and cleans up once at unmount.

pub mod effects;
pub mod error;
pub mod prelude;
pub mod runtime;
pub mod scope;
pub mod state;
pub mod styles;
pub mod tests;
pub mod timer;
pub mod view;

pub use effects::*;
pub use prelude::*;
pub use runtime::*;
pub use state::*;
pub use styles::{StyleTable, class_name, with_style_table};
pub use timer::*;
pub use view::*;
