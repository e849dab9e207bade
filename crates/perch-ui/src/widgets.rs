#![allow(non_snake_case)]
//! Stateless node constructors shared by the components.

use perch_core::{Key, Node, NodeFlags, Role, class_name};

pub fn Container(key: impl Into<String>, class: &str) -> Node {
    Node::new(key, Role::Container).class(class_name(class))
}

pub fn Heading(key: impl Into<String>, text: impl Into<String>) -> Node {
    Node::new(key, Role::Heading).class(class_name("title")).text(text)
}

pub fn Text(key: impl Into<String>, text: impl Into<String>) -> Node {
    Node::new(key, Role::Text).text(text)
}

/// Single-line input. `on_submit` fires on Enter.
pub fn TextField(
    key: impl Into<String>,
    value: impl Into<String>,
    on_change: impl Fn(String) + 'static,
    on_submit: impl Fn() + 'static,
) -> Node {
    Node::new(key, Role::TextField)
        .class(class_name("input"))
        .text(value)
        .on_input(on_change)
        .on_key(move |key| {
            if *key == Key::Enter {
                on_submit()
            }
        })
}

pub fn Checkbox(key: impl Into<String>, checked: bool, on_toggle: impl Fn() + 'static) -> Node {
    Node::new(key, Role::Checkbox)
        .class(class_name("checkbox"))
        .flag(NodeFlags::CHECKED, checked)
        .on_toggle(on_toggle)
}
