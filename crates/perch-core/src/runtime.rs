use std::any::Any;
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};
use web_time::{Duration, Instant};

use crate::effects::{Cleanup, Deps, EffectScheduler, EffectStats};
use crate::scope::Scope;
use crate::state::{Owner, StateCell};
use crate::styles::{StyleTable, with_style_table};
use crate::timer::Timers;
use crate::{DispatchError, Event, SchedulingError, View};

new_key_type! {
    pub struct InstanceId;
}

/// Upper bound on re-render passes per flush. Effects that write state on
/// every run would otherwise loop forever.
pub const MAX_FLUSH_PASSES: usize = 64;

/// A mountable unit of state, derived presentation and effects.
///
/// `mount` allocates the instance's cells once. `render` is called after
/// every tick that wrote one of them; it must be a pure function of those
/// cells apart from the effects it declares, and it must declare the same
/// effects in the same order every time.
pub trait Component: 'static {
    type Props;

    fn mount(props: Self::Props, cx: &mut Cx<'_>) -> Self
    where
        Self: Sized;

    fn render(&self, cx: &mut RenderCx<'_>) -> View;
}

/// Mount-time context: owns the instance's cells and teardown list.
pub struct Cx<'a> {
    owner: &'a Rc<Owner>,
    timers: &'a Timers,
    scope: &'a Scope,
}

impl Cx<'_> {
    pub fn cell<T>(&mut self, init: T) -> StateCell<T> {
        StateCell::with_owner(init, Some(self.owner.clone()))
    }

    pub fn timers(&self) -> &Timers {
        self.timers
    }

    pub fn on_unmount(&self, f: impl FnOnce() + 'static) {
        self.scope.add_disposer(f);
    }
}

/// Render-time context: effect declaration.
pub struct RenderCx<'a> {
    effects: &'a mut EffectScheduler,
    timers: &'a Timers,
}

impl RenderCx<'_> {
    /// Declare an effect. `run` is called after this pass when `deps` differ
    /// from the previous pass (or on the first pass); its returned cleanup
    /// runs before the next `run` or at unmount.
    pub fn effect(&mut self, deps: Deps, run: impl FnOnce() -> Option<Cleanup> + 'static) {
        self.effects.register(deps, run);
    }

    pub fn timers(&self) -> &Timers {
        self.timers
    }
}

trait Render: Any {
    fn render(&self, cx: &mut RenderCx<'_>) -> View;
    fn as_any(&self) -> &dyn Any;
    fn name(&self) -> &'static str;
}

impl<C: Component> Render for C {
    fn render(&self, cx: &mut RenderCx<'_>) -> View {
        Component::render(self, cx)
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn name(&self) -> &'static str {
        std::any::type_name::<C>()
    }
}

struct Instance {
    component: Box<dyn Render>,
    owner: Rc<Owner>,
    scope: Scope,
    effects: EffectScheduler,
    view: View,
}

impl Instance {
    fn render(&mut self, timers: &Timers, styles: &Rc<StyleTable>) {
        let Instance {
            component,
            effects,
            view,
            ..
        } = self;

        effects.begin_pass();
        let next = with_style_table(styles.clone(), || {
            let mut cx = RenderCx {
                effects: &mut *effects,
                timers,
            };
            component.render(&mut cx)
        });
        *view = next;
        effects.commit();
    }

    fn teardown(mut self) {
        self.effects.teardown();
        self.owner.unmount();
        self.scope.dispose();
    }
}

/// Host for mounted components, their timers and the style table.
///
/// Every entry point that can write state (`mount`, `update`, `dispatch`,
/// each timer firing inside `advance`) is one tick: it runs to completion
/// and then `flush`es, so a view never reflects half of a tick's writes.
pub struct Runtime {
    timers: Timers,
    styles: Rc<StyleTable>,
    instances: SlotMap<InstanceId, Instance>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    pub fn new() -> Self {
        Self::with_styles(StyleTable::default())
    }

    pub fn with_styles(styles: StyleTable) -> Self {
        Self {
            timers: Timers::new(),
            styles: Rc::new(styles),
            instances: SlotMap::with_key(),
        }
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    pub fn mount<C: Component>(&mut self, props: C::Props) -> InstanceId {
        let owner = Rc::new(Owner::new());
        let scope = Scope::new();
        let component = {
            let mut cx = Cx {
                owner: &owner,
                timers: &self.timers,
                scope: &scope,
            };
            C::mount(props, &mut cx)
        };

        owner.mark_dirty();
        let id = self.instances.insert(Instance {
            component: Box::new(component),
            owner,
            scope,
            effects: EffectScheduler::new(),
            view: View::new(),
        });
        log::debug!("mounted {} as {id:?}", std::any::type_name::<C>());

        self.flush();
        id
    }

    pub fn unmount(&mut self, id: InstanceId) -> Result<(), SchedulingError> {
        let instance = self
            .instances
            .remove(id)
            .ok_or(SchedulingError::UnknownInstance(id))?;
        log::debug!("unmounting {} ({id:?})", instance.component.name());
        instance.teardown();
        self.flush();
        Ok(())
    }

    pub fn is_mounted(&self, id: InstanceId) -> bool {
        self.instances.contains_key(id)
    }

    pub fn mounted(&self) -> usize {
        self.instances.len()
    }

    /// The view committed at the end of the last tick.
    pub fn view(&self, id: InstanceId) -> Option<&View> {
        self.instances.get(id).map(|i| &i.view)
    }

    pub fn component<C: Component>(&self, id: InstanceId) -> Option<&C> {
        self.instances
            .get(id)
            .and_then(|i| i.component.as_any().downcast_ref::<C>())
    }

    /// Run `f` against a mounted component as one tick.
    pub fn update<C: Component, R>(&mut self, id: InstanceId, f: impl FnOnce(&C) -> R) -> Option<R> {
        let out = f(self.component::<C>(id)?);
        self.flush();
        Some(out)
    }

    /// Deliver `event` to the node `key` of the instance's current view, as one tick.
    pub fn dispatch(&mut self, id: InstanceId, key: &str, event: Event) -> Result<(), DispatchError> {
        let call = {
            let instance = self
                .instances
                .get(id)
                .ok_or(DispatchError::UnknownInstance(id))?;
            let node = instance
                .view
                .node(key)
                .ok_or_else(|| DispatchError::UnknownNode(key.to_owned()))?;
            log::trace!("dispatch {} -> {key} ({id:?})", event.name());
            node.bind(event)?
        };
        call();
        self.flush();
        Ok(())
    }

    /// Re-render every dirty instance and commit its effects, until nothing
    /// is dirty.
    pub fn flush(&mut self) {
        for _ in 0..MAX_FLUSH_PASSES {
            let dirty: Vec<InstanceId> = self
                .instances
                .iter()
                .filter(|(_, i)| i.owner.take_dirty())
                .map(|(id, _)| id)
                .collect();
            if dirty.is_empty() {
                return;
            }
            for id in dirty {
                if let Some(instance) = self.instances.get_mut(id) {
                    instance.render(&self.timers, &self.styles);
                }
            }
        }
        log::warn!("flush: still dirty after {MAX_FLUSH_PASSES} passes; an effect keeps writing state");
    }

    /// Move the virtual clock forward, firing due timers one tick at a time.
    /// Returns how many callbacks ran.
    pub fn advance(&mut self, by: Duration) -> usize {
        let until = self.timers.now() + by;
        let mut fired = 0;
        while self.timers.fire_next(until) {
            fired += 1;
            self.flush();
        }
        self.timers.settle(until);
        fired
    }

    /// Like [`advance`](Self::advance), but paced by the wall clock.
    pub fn run_for(&mut self, by: Duration) {
        let start = Instant::now();
        let base = self.timers.now();
        loop {
            let elapsed = start.elapsed().min(by);
            self.advance((base + elapsed).saturating_sub(self.timers.now()));
            if elapsed >= by {
                return;
            }
            let wake = self
                .timers
                .next_deadline()
                .map_or(base + by, |d| d.min(base + by));
            std::thread::sleep(wake.saturating_sub(self.timers.now()));
        }
    }

    pub fn effect_stats(&self, id: InstanceId) -> Option<EffectStats> {
        self.instances.get(id).map(|i| i.effects.stats())
    }

    pub fn active_effects(&self, id: InstanceId) -> Option<usize> {
        self.instances.get(id).map(|i| i.effects.active())
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        let ids: Vec<InstanceId> = self.instances.keys().collect();
        for id in ids {
            if let Some(instance) = self.instances.remove(id) {
                instance.teardown();
            }
        }
    }
}
