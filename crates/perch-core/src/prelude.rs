pub use crate::deps;
pub use crate::effects::{Cleanup, Deps, EffectStats, on_cleanup};
pub use crate::error::*;
pub use crate::runtime::{Component, Cx, InstanceId, RenderCx, Runtime};
pub use crate::scope::Scope;
pub use crate::state::{StateCell, state};
pub use crate::styles::{StyleTable, class_name};
pub use crate::timer::{TimerHandle, Timers};
pub use crate::view::{Event, Key, Node, NodeFlags, Role, View};
