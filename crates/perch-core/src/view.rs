use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::DispatchError;

pub type Callback = Rc<dyn Fn()>;
pub type KeyCallback = Rc<dyn Fn(&Key)>;
pub type TextCallback = Rc<dyn Fn(String)>;

/// Resolved class names of a node, in order.
pub type ClassSet = SmallVec<[String; 4]>;

/// What kind of thing a node is, similar to ARIA roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Container,
    Heading,
    Text,
    Button,
    TextField,
    Checkbox,
    ListItem,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct NodeFlags: u8 {
        const DISABLED = 1;
        const CHECKED = 1 << 1;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Char(char),
}

/// A discrete input event addressed to one node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Click,
    KeyPress(Key),
    Input(String),
    Toggle,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Click => "click",
            Event::KeyPress(_) => "keypress",
            Event::Input(_) => "input:change",
            Event::Toggle => "toggle",
        }
    }
}

#[derive(Clone, Default)]
pub struct Handlers {
    pub on_click: Option<Callback>,
    pub on_key: Option<KeyCallback>,
    pub on_input: Option<TextCallback>,
    pub on_toggle: Option<Callback>,
}

/// One entry of the presentation descriptor.
#[derive(Clone)]
pub struct Node {
    pub key: String,
    pub role: Role,
    pub classes: ClassSet,
    pub text: String,
    pub flags: NodeFlags,
    /// Nesting depth below the view root.
    pub depth: u8,
    pub handlers: Handlers,
}

impl Node {
    pub fn new(key: impl Into<String>, role: Role) -> Self {
        Self {
            key: key.into(),
            role,
            classes: ClassSet::new(),
            text: String::new(),
            flags: NodeFlags::empty(),
            depth: 0,
            handlers: Handlers::default(),
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn classes(mut self, classes: impl IntoIterator<Item = String>) -> Self {
        self.classes.extend(classes);
        self
    }

    pub fn flag(mut self, flag: NodeFlags, on: bool) -> Self {
        self.flags.set(flag, on);
        self
    }

    pub fn on_click(mut self, f: impl Fn() + 'static) -> Self {
        self.handlers.on_click = Some(Rc::new(f));
        self
    }

    pub fn on_key(mut self, f: impl Fn(&Key) + 'static) -> Self {
        self.handlers.on_key = Some(Rc::new(f));
        self
    }

    pub fn on_input(mut self, f: impl Fn(String) + 'static) -> Self {
        self.handlers.on_input = Some(Rc::new(f));
        self
    }

    pub fn on_toggle(mut self, f: impl Fn() + 'static) -> Self {
        self.handlers.on_toggle = Some(Rc::new(f));
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn is_disabled(&self) -> bool {
        self.flags.contains(NodeFlags::DISABLED)
    }

    pub fn is_checked(&self) -> bool {
        self.flags.contains(NodeFlags::CHECKED)
    }

    /// Resolve the handler for `event` into a call that owns its inputs, so
    /// the caller can release any borrow of the view before invoking it.
    pub fn bind(&self, event: Event) -> Result<Box<dyn FnOnce()>, DispatchError> {
        let h = &self.handlers;
        let bound: Option<Box<dyn FnOnce()>> = match event {
            Event::Click => h.on_click.clone().map(|f| Box::new(move || f()) as Box<dyn FnOnce()>),
            Event::Toggle => h.on_toggle.clone().map(|f| Box::new(move || f()) as Box<dyn FnOnce()>),
            Event::KeyPress(ref key) => h.on_key.clone().map(|f| {
                let key = key.clone();
                Box::new(move || f(&key)) as Box<dyn FnOnce()>
            }),
            Event::Input(ref text) => h.on_input.clone().map(|f| {
                let text = text.clone();
                Box::new(move || f(text)) as Box<dyn FnOnce()>
            }),
        };
        bound.ok_or_else(|| DispatchError::Unhandled {
            key: self.key.clone(),
            event: event.name(),
        })
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = &self.handlers;
        let handlers: Vec<&str> = [
            h.on_click.as_ref().map(|_| "click"),
            h.on_key.as_ref().map(|_| "keypress"),
            h.on_input.as_ref().map(|_| "input:change"),
            h.on_toggle.as_ref().map(|_| "toggle"),
        ]
        .into_iter()
        .flatten()
        .collect();
        f.debug_struct("Node")
            .field("key", &self.key)
            .field("role", &self.role)
            .field("classes", &self.classes)
            .field("text", &self.text)
            .field("flags", &self.flags)
            .field("depth", &self.depth)
            .field("handlers", &handlers)
            .finish()
    }
}

/// Ordered presentation descriptor produced by one render pass.
#[derive(Clone, Debug, Default)]
pub struct View {
    pub nodes: Vec<Node>,
}

impl View {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    /// Append `nodes` one level below the most recent container.
    pub fn nested(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        let depth = self.nodes.last().map_or(0, |n| n.depth + 1);
        self.nodes.extend(nodes.into_iter().map(|mut n| {
            n.depth += depth;
            n
        }));
        self
    }

    /// Wrap this view in `container`, pushing every node one level down.
    pub fn wrap(self, container: Node) -> Self {
        View::new().child(container).nested(self.nodes)
    }

    /// Append `container` followed by `body` nested inside it.
    pub fn group(self, container: Node, body: View) -> Self {
        self.children(body.wrap(container).nodes)
    }

    pub fn node(&self, key: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.key == key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Plain-text rendering, one node per line. Used for logging and tests.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for n in &self.nodes {
            for _ in 0..n.depth {
                out.push_str("  ");
            }
            out.push('<');
            out.push_str(&n.key);
            out.push('>');
            if !n.classes.is_empty() {
                out.push_str(" .");
                out.push_str(&n.classes.join("."));
            }
            if !n.text.is_empty() {
                out.push(' ');
                out.push_str(&n.text);
            }
            if n.is_checked() {
                out.push_str(" [checked]");
            }
            if n.is_disabled() {
                out.push_str(" [disabled]");
            }
            out.push('\n');
        }
        out
    }
}
