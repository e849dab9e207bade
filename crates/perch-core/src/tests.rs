#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use crate::effects::*;
    use crate::runtime::*;
    use crate::scope::*;
    use crate::state::*;
    use crate::styles::*;
    use crate::timer::*;
    use crate::view::*;
    use crate::{DispatchError, SchedulingError, deps};
    use web_time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_state_basic() {
        let cell = state(42);
        assert_eq!(cell.get(), 42);
        assert_eq!(cell.version(), 0);

        cell.set(100);
        assert_eq!(cell.get(), 100);

        cell.update(|v| v + 1);
        assert_eq!(cell.get(), 101);
        assert_eq!(cell.version(), 2);
    }

    #[test]
    fn test_state_version_bumps_on_equal_write() {
        let cell = state(true);
        cell.set(true);
        cell.set(true);
        assert_eq!(cell.version(), 2);
    }

    #[test]
    fn test_state_subscription() {
        let cell = state(0);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_clone = seen.clone();
        cell.subscribe(move |v| seen_clone.borrow_mut().push(*v));

        cell.set(42);
        cell.update(|v| v * 2);
        assert_eq!(*seen.borrow(), vec![42, 84]);
    }

    #[test]
    fn test_subscriber_write_is_rejected() {
        let cell = state(0);
        let results = Rc::new(RefCell::new(Vec::new()));

        let (inner, r) = (cell.clone(), results.clone());
        cell.subscribe(move |v| {
            if *v < 3 {
                r.borrow_mut().push(inner.try_set(v + 1));
            }
        });

        cell.set(1);
        assert_eq!(cell.get(), 1);
        assert_eq!(cell.version(), 1);
        assert_eq!(
            *results.borrow(),
            vec![Err(SchedulingError::ReentrantWrite { version: 1 })]
        );

        // The cell is writable again once the first write has finished.
        cell.set(5);
        assert_eq!(cell.get(), 5);
    }

    #[test]
    fn test_update_closure_cannot_write_its_cell() {
        let cell = state(1);
        let inner = cell.clone();
        cell.update(move |v| {
            assert_eq!(
                inner.try_set(100),
                Err(SchedulingError::ReentrantWrite { version: 0 })
            );
            v + 1
        });
        assert_eq!(cell.get(), 2);
    }

    #[test]
    fn test_unsubscribe() {
        let cell = state(0);
        let calls = Rc::new(Cell::new(0));

        let c = calls.clone();
        let first = cell.subscribe(move |_| c.set(c.get() + 1));
        let c = calls.clone();
        let _second = cell.subscribe(move |_| c.set(c.get() + 10));

        cell.set(1);
        assert_eq!(calls.get(), 11);

        assert!(cell.unsubscribe(first));
        assert!(!cell.unsubscribe(first));
        cell.set(2);
        assert_eq!(calls.get(), 21);
    }

    #[test]
    fn test_cleanup_runs_once() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let cleanup = Cleanup::new(move || c.set(c.get() + 1));

        assert!(!cleanup.has_run());
        assert_eq!(cleanup.try_run(), Ok(()));
        assert!(cleanup.has_run());
        assert_eq!(cleanup.try_run(), Err(SchedulingError::CleanupRepeated));

        // Logged, not re-invoked.
        cleanup.clone().run();
        assert_eq!(count.get(), 1);
    }

    fn spy_effect(log: &Rc<RefCell<Vec<String>>>, tag: &str) -> impl FnOnce() -> Option<Cleanup> + 'static {
        let log = log.clone();
        let tag = tag.to_owned();
        move || {
            log.borrow_mut().push(format!("run {tag}"));
            on_cleanup(move || log.borrow_mut().push(format!("clean {tag}")))
        }
    }

    #[test]
    fn test_effect_reruns_only_on_change() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut fx = EffectScheduler::new();

        for (pass, running) in [false, false, true, true, false].into_iter().enumerate() {
            fx.begin_pass();
            fx.register(deps![running], spy_effect(&log, &pass.to_string()));
            fx.commit();
        }
        fx.teardown();

        assert_eq!(
            *log.borrow(),
            vec!["run 0", "clean 0", "run 2", "clean 2", "run 4", "clean 4"]
        );
        assert_eq!(fx.stats(), EffectStats { runs: 3, cleanups: 3 });
    }

    #[test]
    fn test_effect_empty_deps_runs_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut fx = EffectScheduler::new();

        for pass in 0..4 {
            fx.begin_pass();
            fx.register(deps![], spy_effect(&log, &pass.to_string()));
            fx.commit();
        }
        assert_eq!(*log.borrow(), vec!["run 0"]);
        assert_eq!(fx.active(), 1);

        fx.teardown();
        assert_eq!(*log.borrow(), vec!["run 0", "clean 0"]);
        assert_eq!(fx.active(), 0);
    }

    #[test]
    fn test_effect_without_cleanup_counts_cleanup_phase() {
        let mut fx = EffectScheduler::new();
        for n in 0..3 {
            fx.begin_pass();
            fx.register(deps![n], || None);
            fx.commit();
        }
        let stats = fx.stats();
        assert_eq!(stats.runs, 3);
        assert_eq!(stats.cleanups, stats.runs - fx.active());

        fx.teardown();
        assert_eq!(fx.stats().cleanups, 3);
    }

    #[test]
    fn test_effect_dependency_length_change_is_treated_as_change() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut fx = EffectScheduler::new();

        fx.begin_pass();
        fx.register(deps![1], spy_effect(&log, "a"));
        fx.commit();

        fx.begin_pass();
        fx.register(deps![1, 2], spy_effect(&log, "b"));
        fx.commit();

        assert_eq!(*log.borrow(), vec!["run a", "clean a", "run b"]);
    }

    #[test]
    fn test_dep_keys_compare_by_value_and_identity() {
        assert_eq!(deps![3, "x", true], deps![3i64, String::from("x"), true]);

        let a = Rc::new(vec![1]);
        let b = Rc::new(vec![1]);
        assert_eq!(deps![a.clone()], deps![a]);
        assert_ne!(deps![Rc::new(1)], deps![b]);

        let cell = state(0);
        let before = deps![cell.clone()];
        cell.set(5);
        assert_eq!(before, deps![cell]);
    }

    #[test]
    fn test_timers_fire_in_deadline_order() {
        let timers = Timers::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for (delay, tag) in [(30, "c"), (10, "a"), (20, "b"), (10, "a2")] {
            let order = order.clone();
            let _ = timers.set_timeout(ms(delay), move || order.borrow_mut().push(tag));
        }

        while timers.fire_next(ms(100)) {}
        assert_eq!(*order.borrow(), vec!["a", "a2", "b", "c"]);
        assert_eq!(timers.now(), ms(30));
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_interval_fires_once_per_period() {
        let timers = Timers::new();
        let ticks = Rc::new(Cell::new(0));
        let t = ticks.clone();
        let handle = timers.set_interval(ms(1000), move || t.set(t.get() + 1));

        while timers.fire_next(ms(3500)) {}
        assert_eq!(ticks.get(), 3);
        assert!(handle.is_pending());

        assert!(handle.cancel());
        while timers.fire_next(ms(10_000)) {}
        assert_eq!(ticks.get(), 3);
        assert_eq!(timers.stats().cancelled, 1);
    }

    #[test]
    fn test_timer_cancelled_by_earlier_callback_never_fires() {
        let timers = Timers::new();
        let fired = Rc::new(Cell::new(false));

        let f = fired.clone();
        let victim = timers.set_timeout(ms(10), move || f.set(true));
        let slot = Rc::new(RefCell::new(Some(victim)));
        let s = slot.clone();
        // Due first; cancels the victim before it is reached.
        let _ = timers.set_timeout(ms(5), move || {
            if let Some(h) = s.borrow_mut().take() {
                h.cancel();
            }
        });

        while timers.fire_next(ms(10)) {}
        assert!(!fired.get());
        assert_eq!(timers.stats().fired, 1);
    }

    #[test]
    fn test_cancel_after_fire_is_noop() {
        let timers = Timers::new();
        let handle = timers.set_timeout(ms(1), || {});
        assert!(timers.fire_next(ms(1)));
        assert!(!handle.is_pending());
        assert!(!handle.cancel());
        assert_eq!(timers.stats().cancelled, 0);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let timers = Timers::new();
        let _h = timers.set_interval(Duration::ZERO, || {});
        assert_eq!(timers.next_deadline(), Some(MIN_PERIOD));
    }

    #[test]
    fn test_scope_explicit_dispose() {
        let order = Rc::new(RefCell::new(Vec::new()));

        let scope = Scope::new();
        for tag in ["first", "second"] {
            let order = order.clone();
            scope.add_disposer(move || order.borrow_mut().push(tag));
        }

        assert!(order.borrow().is_empty());
        scope.dispose();
        assert_eq!(*order.borrow(), vec!["second", "first"]);

        scope.dispose();
        assert_eq!(order.borrow().len(), 2);
    }

    #[test]
    fn test_scope_drop_runs_disposers() {
        let cleaned = Rc::new(Cell::new(false));
        {
            let scope = Scope::new();
            let c = cleaned.clone();
            scope.add_disposer(move || c.set(true));
        }
        assert!(cleaned.get());
    }

    #[test]
    fn test_style_table_lookup() {
        let table = StyleTable::from_json(r#"{"primary": "btn_primary_x1", "high": "count_high_q"}"#)
            .expect("valid json");
        assert_eq!(table.len(), 2);

        assert_eq!(class_name("primary"), "primary");
        with_style_table(Rc::new(table), || {
            assert_eq!(class_name("primary"), "btn_primary_x1");
            assert_eq!(class_name("normal"), "normal");
        });
        assert_eq!(class_name("high"), "high");
    }

    #[test]
    fn test_view_render_text() {
        let view = View::new().group(
            Node::new("root", Role::Container).class("panel"),
            View::new()
                .child(Node::new("title", Role::Heading).text("Hello"))
                .child(
                    Node::new("done", Role::Checkbox)
                        .flag(NodeFlags::CHECKED, true)
                        .flag(NodeFlags::DISABLED, true),
                ),
        );
        assert_eq!(
            view.render_text(),
            "<root> .panel\n  <title> Hello\n  <done> [checked] [disabled]\n"
        );
    }

    // A component whose render records what it saw.
    struct Pair {
        a: StateCell<i32>,
        b: StateCell<i32>,
        seen: Rc<RefCell<Vec<(i32, i32)>>>,
    }

    impl Component for Pair {
        type Props = Rc<RefCell<Vec<(i32, i32)>>>;

        fn mount(seen: Self::Props, cx: &mut Cx<'_>) -> Self {
            Pair {
                a: cx.cell(0),
                b: cx.cell(0),
                seen,
            }
        }

        fn render(&self, _cx: &mut RenderCx<'_>) -> View {
            let (a, b) = (self.a.get(), self.b.get());
            self.seen.borrow_mut().push((a, b));
            let (ca, cb) = (self.a.clone(), self.b.clone());
            View::new().child(
                Node::new("both", Role::Button)
                    .text(format!("{a}/{b}"))
                    .on_click(move || {
                        ca.update(|v| v + 1);
                        cb.update(|v| v + 1);
                    }),
            )
        }
    }

    #[test]
    fn test_tick_commits_all_writes_at_once() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut rt = Runtime::new();
        let id = rt.mount::<Pair>(seen.clone());

        rt.dispatch(id, "both", Event::Click).unwrap();
        rt.update(id, |p: &Pair| {
            p.a.set(10);
            p.b.set(20);
        })
        .unwrap();

        assert_eq!(*seen.borrow(), vec![(0, 0), (1, 1), (10, 20)]);
        assert_eq!(rt.view(id).unwrap().node("both").unwrap().text, "10/20");
    }

    #[test]
    fn test_dispatch_errors() {
        let mut rt = Runtime::new();
        let id = rt.mount::<Pair>(Rc::default());

        assert_eq!(
            rt.dispatch(id, "missing", Event::Click),
            Err(DispatchError::UnknownNode("missing".into()))
        );
        assert_eq!(
            rt.dispatch(id, "both", Event::Input("x".into())),
            Err(DispatchError::Unhandled {
                key: "both".into(),
                event: "input:change",
            })
        );

        rt.unmount(id).unwrap();
        assert_eq!(
            rt.dispatch(id, "both", Event::Click),
            Err(DispatchError::UnknownInstance(id))
        );
        assert_eq!(rt.unmount(id), Err(SchedulingError::UnknownInstance(id)));
    }

    #[test]
    fn test_write_after_unmount_is_rejected() {
        let mut rt = Runtime::new();
        let id = rt.mount::<Pair>(Rc::default());
        let a = rt.component::<Pair>(id).unwrap().a.clone();

        rt.unmount(id).unwrap();
        assert_eq!(
            a.try_set(5),
            Err(SchedulingError::WriteAfterTeardown { version: 0 })
        );
        // Logged and dropped.
        a.set(5);
        assert_eq!(a.get(), 0);
    }

    struct Blinker {
        on: StateCell<bool>,
        unmounted: Rc<Cell<bool>>,
    }

    impl Component for Blinker {
        type Props = Rc<Cell<bool>>;

        fn mount(unmounted: Self::Props, cx: &mut Cx<'_>) -> Self {
            let flag = unmounted.clone();
            cx.on_unmount(move || flag.set(true));
            Blinker {
                on: cx.cell(false),
                unmounted,
            }
        }

        fn render(&self, cx: &mut RenderCx<'_>) -> View {
            let on = self.on.get();
            let cell = self.on.clone();
            let timers = cx.timers().clone();
            cx.effect(deps![on], move || {
                let handle = timers.set_interval(ms(100), move || cell.update(|v| !v));
                on_cleanup(move || {
                    handle.cancel();
                })
            });
            View::new().child(Node::new("lamp", Role::Text).text(if on { "on" } else { "off" }))
        }
    }

    #[test]
    fn test_unmount_leaves_no_timers() {
        let unmounted = Rc::new(Cell::new(false));
        let mut rt = Runtime::new();
        let id = rt.mount::<Blinker>(unmounted.clone());

        rt.advance(ms(350));
        assert_eq!(rt.view(id).unwrap().node("lamp").unwrap().text, "on");
        let stats = rt.effect_stats(id).unwrap();
        assert_eq!(stats.runs, 4);
        assert_eq!(stats.cleanups, stats.runs - 1);
        assert_eq!(rt.timers().pending(), 1);
        assert!(!rt.component::<Blinker>(id).unwrap().unmounted.get());

        rt.unmount(id).unwrap();
        assert!(unmounted.get());
        assert!(rt.component::<Blinker>(id).is_none());
        assert_eq!(rt.timers().pending(), 0);
        let t = rt.timers().stats();
        assert_eq!(t.scheduled, t.cancelled);
    }

    #[test]
    fn test_runtime_drop_tears_down() {
        let unmounted = Rc::new(Cell::new(false));
        let timers = {
            let mut rt = Runtime::new();
            rt.mount::<Blinker>(unmounted.clone());
            rt.timers().clone()
        };
        assert!(unmounted.get());
        assert_eq!(timers.pending(), 0);
    }
}
