//! Counter with manual +/- and an auto-increment timer.

use perch_core::{Component, Cx, Node, RenderCx, Role, StateCell, View, class_name, deps, on_cleanup};
use web_time::Duration;

use crate::button::{Button, ButtonConfig, ButtonProps, Variant};
use crate::widgets::{Container, Heading, Text};

pub const PERIOD: Duration = Duration::from_secs(1);

/// Style bucket of the displayed value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountTone {
    High,
    Negative,
    Normal,
}

impl CountTone {
    pub fn key(self) -> &'static str {
        match self {
            CountTone::High => "high",
            CountTone::Negative => "negative",
            CountTone::Normal => "normal",
        }
    }
}

/// Above 10 is high, below 0 negative; 10 itself is normal.
pub fn count_tone(value: i64) -> CountTone {
    if value > 10 {
        CountTone::High
    } else if value < 0 {
        CountTone::Negative
    } else {
        CountTone::Normal
    }
}

pub fn toggle_label(running: bool) -> &'static str {
    if running {
        "⏸️ Stop Auto-increment"
    } else {
        "▶️ Start Auto-increment"
    }
}

pub fn status_line(running: bool) -> &'static str {
    if running {
        "⏱️ Auto-incrementing every second..."
    } else {
        "⏹️ Auto-increment stopped"
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CounterProps {
    pub initial: i64,
    pub period: Duration,
}

impl Default for CounterProps {
    fn default() -> Self {
        Self {
            initial: 0,
            period: PERIOD,
        }
    }
}

#[derive(Clone)]
struct CounterState {
    value: StateCell<i64>,
    running: StateCell<bool>,
}

impl CounterState {
    fn step(&self, delta: i64) -> bool {
        if self.running.get() {
            log::debug!("counter: manual step dropped while auto-increment runs");
            return false;
        }
        self.value.update(|v| v.saturating_add(delta));
        true
    }

    fn reset(&self) {
        self.value.set(0);
        self.running.set(false);
    }

    fn toggle_running(&self) {
        self.running.update(|r| !r);
    }
}

pub struct Counter {
    state: CounterState,
    period: Duration,
    decrement: Button,
    increment: Button,
    toggle: Button,
    reset: Button,
}

impl Counter {
    pub fn value(&self) -> i64 {
        self.state.value.get()
    }

    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }

    pub fn tone(&self) -> CountTone {
        count_tone(self.value())
    }

    /// Returns `false` (and changes nothing) while auto-increment runs.
    pub fn increment(&self) -> bool {
        self.state.step(1)
    }

    pub fn decrement(&self) -> bool {
        self.state.step(-1)
    }

    pub fn reset(&self) {
        self.state.reset()
    }

    pub fn toggle_running(&self) {
        self.state.toggle_running()
    }
}

impl Component for Counter {
    type Props = CounterProps;

    fn mount(props: CounterProps, cx: &mut Cx<'_>) -> Self {
        let state = CounterState {
            value: cx.cell(props.initial),
            running: cx.cell(false),
        };

        let s = state.clone();
        let decrement = Button::new(
            cx,
            ButtonProps::default()
                .variant(Variant::Secondary)
                .on_activate(move || {
                    s.step(-1);
                }),
        );
        let s = state.clone();
        let increment = Button::new(
            cx,
            ButtonProps::default().on_activate(move || {
                s.step(1);
            }),
        );
        let s = state.clone();
        let toggle = Button::new(cx, ButtonProps::default().on_activate(move || s.toggle_running()));
        let s = state.clone();
        let reset = Button::new(
            cx,
            ButtonProps::new("🔄 Reset")
                .variant(Variant::Secondary)
                .on_activate(move || s.reset()),
        );

        Counter {
            state,
            period: props.period,
            decrement,
            increment,
            toggle,
            reset,
        }
    }

    fn render(&self, cx: &mut RenderCx<'_>) -> View {
        let value = self.state.value.get();
        let running = self.state.running.get();

        let ticks = self.state.value.clone();
        let timers = cx.timers().clone();
        let period = self.period;
        cx.effect(deps![running], move || {
            if !running {
                return None;
            }
            let interval = timers.set_interval(period, move || ticks.update(|v| v.saturating_add(1)));
            on_cleanup(move || {
                interval.cancel();
            })
        });

        let manual = |variant| ButtonConfig::new(variant).disabled(running);
        let toggle_variant = if running { Variant::Danger } else { Variant::Primary };

        View::new().group(
            Container("counter", "counter"),
            View::new()
                .child(Heading("title", "React Counter Demo"))
                .child(
                    Node::new("display", Role::Text)
                        .class(class_name("display"))
                        .class(class_name(count_tone(value).key()))
                        .text(value.to_string()),
                )
                .group(
                    Container("controls", "controls"),
                    View::new()
                        .child(self.decrement.view_with(
                            cx,
                            "decrement",
                            "- Decrease",
                            manual(Variant::Secondary),
                        ))
                        .child(self.increment.view_with(
                            cx,
                            "increment",
                            "+ Increase",
                            manual(Variant::Primary),
                        )),
                )
                .group(
                    Container("auto-controls", "autoControls"),
                    View::new()
                        .child(self.toggle.view_with(
                            cx,
                            "toggle",
                            toggle_label(running),
                            ButtonConfig::new(toggle_variant),
                        ))
                        .child(self.reset.view(cx, "reset")),
                )
                .child(
                    Text("status", status_line(running))
                        .class(class_name("status"))
                        .class(class_name(if running { "running" } else { "stopped" })),
                ),
        )
    }
}
