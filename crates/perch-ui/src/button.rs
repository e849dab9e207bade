//! Clickable control with a transient "clicked" flash.
//!
//! States are `idle` and `active`. An accepted activation enters `active`,
//! calls `on_activate`, and the button's effect arms a single reset timer
//! that returns it to `idle` after [`FLASH`]. Activating again while
//! `active` calls `on_activate` again but does not arm a second timer,
//! since the `active` dependency did not change.

use std::rc::Rc;

use perch_core::{
    Callback, ClassSet, Component, Cx, Node, NodeFlags, RenderCx, Role, StateCell, View,
    class_name, deps, on_cleanup,
};
use serde::{Deserialize, Serialize};
use web_time::Duration;

pub const FLASH: Duration = Duration::from_millis(200);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Primary,
    Secondary,
    Danger,
}

impl Variant {
    pub fn key(self) -> &'static str {
        match self {
            Variant::Primary => "primary",
            Variant::Secondary => "secondary",
            Variant::Danger => "danger",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonConfig {
    pub variant: Variant,
    pub disabled: bool,
}

impl ButtonConfig {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            disabled: false,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// `button`, the variant, then `clicked` / `disabled` when they apply.
pub fn button_classes(config: ButtonConfig, active: bool) -> ClassSet {
    let mut classes = ClassSet::new();
    classes.push(class_name("button"));
    classes.push(class_name(config.variant.key()));
    if active {
        classes.push(class_name("clicked"));
    }
    if config.disabled {
        classes.push(class_name("disabled"));
    }
    classes
}

#[derive(Clone)]
pub struct ButtonProps {
    pub label: String,
    pub config: ButtonConfig,
    pub on_activate: Option<Callback>,
    pub flash: Duration,
}

impl Default for ButtonProps {
    fn default() -> Self {
        Self {
            label: String::new(),
            config: ButtonConfig::default(),
            on_activate: None,
            flash: FLASH,
        }
    }
}

impl ButtonProps {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.config.variant = variant;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.config.disabled = disabled;
        self
    }

    pub fn on_activate(mut self, f: impl Fn() + 'static) -> Self {
        self.on_activate = Some(Rc::new(f));
        self
    }
}

pub struct Button {
    active: StateCell<bool>,
    props: ButtonProps,
}

impl Button {
    pub fn new(cx: &mut Cx<'_>, props: ButtonProps) -> Self {
        Self {
            active: cx.cell(false),
            props,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Activate with the configuration the button was created with.
    pub fn activate(&self) -> bool {
        press(
            &self.active,
            self.props.config.disabled,
            self.props.on_activate.as_ref(),
        )
    }

    pub fn view(&self, cx: &mut RenderCx<'_>, key: impl Into<String>) -> Node {
        self.view_with(cx, key, &self.props.label, self.props.config)
    }

    /// Render with a label and configuration decided by the caller's own
    /// state, e.g. a button disabled while a timer runs.
    pub fn view_with(
        &self,
        cx: &mut RenderCx<'_>,
        key: impl Into<String>,
        label: &str,
        config: ButtonConfig,
    ) -> Node {
        let active = self.active.get();

        let cell = self.active.clone();
        let timers = cx.timers().clone();
        let flash = self.props.flash;
        cx.effect(deps![active], move || {
            if !active {
                return None;
            }
            let reset = timers.set_timeout(flash, move || cell.set(false));
            on_cleanup(move || {
                reset.cancel();
            })
        });

        let cell = self.active.clone();
        let on_activate = self.props.on_activate.clone();
        let disabled = config.disabled;
        Node::new(key, Role::Button)
            .classes(button_classes(config, active))
            .text(label)
            .flag(NodeFlags::DISABLED, disabled)
            .on_click(move || {
                press(&cell, disabled, on_activate.as_ref());
            })
    }
}

fn press(active: &StateCell<bool>, disabled: bool, on_activate: Option<&Callback>) -> bool {
    if disabled {
        log::debug!("button: activation ignored while disabled");
        return false;
    }
    active.set(true);
    if let Some(f) = on_activate {
        f();
    }
    true
}

impl Component for Button {
    type Props = ButtonProps;

    fn mount(props: ButtonProps, cx: &mut Cx<'_>) -> Self {
        Button::new(cx, props)
    }

    fn render(&self, cx: &mut RenderCx<'_>) -> View {
        View::new().child(self.view(cx, "button"))
    }
}
