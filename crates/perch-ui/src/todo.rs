//! Todo list: add, toggle, remove and clear-completed over an ordered
//! collection, with counts derived on every render.

use std::cell::Cell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use perch_core::{ClassSet, Component, Cx, Node, RenderCx, Role, StateCell, View, class_name};
use serde::{Deserialize, Serialize};

use crate::button::{Button, ButtonConfig, ButtonProps, Variant, button_classes};
use crate::widgets::{Checkbox, Container, Heading, Text, TextField};

pub const EMPTY_MESSAGE: &str = "🎉 No todos! Add one above to get started.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(pub u64);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoRecord {
    pub id: TodoId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl TodoRecord {
    pub fn new(id: u64, text: impl Into<String>, completed: bool) -> Self {
        Self {
            id: TodoId(id),
            text: text.into(),
            completed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TodoError {
    #[error("Please enter a todo item!")]
    EmptyText,
    #[error("No more todo ids are available.")]
    IdsExhausted,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TodoStats {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
}

impl TodoStats {
    pub fn of(items: &[TodoRecord]) -> Self {
        let total = items.len();
        let completed = items.iter().filter(|t| t.completed).count();
        Self {
            total,
            completed,
            remaining: total - completed,
        }
    }
}

pub fn todo_classes(completed: bool) -> ClassSet {
    let mut classes = ClassSet::new();
    classes.push(class_name("todoItem"));
    if completed {
        classes.push(class_name("completed"));
    }
    classes
}

/// `None` when there is nothing to clear; the control is hidden then.
pub fn clear_label(completed: usize) -> Option<String> {
    (completed > 0).then(|| format!("🧹 Clear Completed ({completed})"))
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoListProps {
    pub seed: Vec<TodoRecord>,
}

impl Default for TodoListProps {
    fn default() -> Self {
        Self {
            seed: vec![
                TodoRecord::new(1, "Learn React basics", false),
                TodoRecord::new(2, "Practice with hooks", true),
                TodoRecord::new(3, "Build your first app", false),
            ],
        }
    }
}

#[derive(Clone)]
struct TodoState {
    items: StateCell<Vec<TodoRecord>>,
    input: StateCell<String>,
    notice: StateCell<Option<TodoError>>,
    // `None` once every id has been issued.
    next_id: Rc<Cell<Option<u64>>>,
}

impl TodoState {
    fn contains(&self, id: TodoId) -> bool {
        self.items.with(|items| items.iter().any(|t| t.id == id))
    }

    fn clear_notice(&self) {
        if self.notice.with(Option::is_some) {
            self.notice.set(None);
        }
    }

    fn add(&self, text: &str) -> Result<TodoId, TodoError> {
        let text = text.trim();
        if text.is_empty() {
            log::debug!("todo: rejected empty entry");
            self.notice.set(Some(TodoError::EmptyText));
            return Err(TodoError::EmptyText);
        }

        let Some(next) = self.next_id.get() else {
            log::warn!("todo: id space exhausted, entry dropped");
            self.notice.set(Some(TodoError::IdsExhausted));
            return Err(TodoError::IdsExhausted);
        };
        let id = TodoId(next);
        self.next_id.set(next.checked_add(1));
        let record = TodoRecord {
            id,
            text: text.to_owned(),
            completed: false,
        };
        self.items.update(|items| {
            let mut next = items.clone();
            next.push(record);
            next
        });
        self.input.set(String::new());
        self.clear_notice();
        Ok(id)
    }

    fn set_input(&self, text: String) {
        self.input.set(text);
        self.clear_notice();
    }

    fn submit(&self) -> Result<TodoId, TodoError> {
        let text = self.input.get();
        self.add(&text)
    }

    fn toggle(&self, id: TodoId) -> bool {
        if !self.contains(id) {
            log::debug!("todo: toggle of unknown id {id}");
            return false;
        }
        self.items.update(|items| {
            items
                .iter()
                .map(|t| {
                    if t.id == id {
                        TodoRecord {
                            completed: !t.completed,
                            ..t.clone()
                        }
                    } else {
                        t.clone()
                    }
                })
                .collect()
        });
        true
    }

    fn remove(&self, id: TodoId) -> bool {
        if !self.contains(id) {
            log::debug!("todo: remove of unknown id {id}");
            return false;
        }
        self.items
            .update(|items| items.iter().filter(|t| t.id != id).cloned().collect());
        true
    }

    fn clear_completed(&self) -> usize {
        let completed = self.items.with(|items| TodoStats::of(items).completed);
        if completed == 0 {
            return 0;
        }
        self.items
            .update(|items| items.iter().filter(|t| !t.completed).cloned().collect());
        completed
    }
}

/// Seed records with trimmed, non-empty text and unique ids. The first
/// record wins a duplicate id.
fn validate_seed(seed: Vec<TodoRecord>) -> Vec<TodoRecord> {
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(seed.len());
    for mut record in seed {
        let text = record.text.trim();
        if text.is_empty() {
            log::warn!("todo: seed record {} has no text, dropped", record.id);
            continue;
        }
        if !seen.insert(record.id) {
            log::warn!("todo: seed record {} repeats an id, dropped", record.id);
            continue;
        }
        if text.len() != record.text.len() {
            log::warn!("todo: seed record {} text trimmed", record.id);
            record.text = text.to_owned();
        }
        items.push(record);
    }
    items
}

pub struct TodoList {
    state: TodoState,
    add: Button,
    clear: Button,
}

impl TodoList {
    pub fn items(&self) -> Vec<TodoRecord> {
        self.state.items.get()
    }

    pub fn input(&self) -> String {
        self.state.input.get()
    }

    pub fn notice(&self) -> Option<TodoError> {
        self.state.notice.get()
    }

    pub fn stats(&self) -> TodoStats {
        self.state.items.with(|items| TodoStats::of(items))
    }

    /// Append a trimmed entry. Whitespace-only text is rejected without
    /// touching the collection and raises the notice instead.
    pub fn add(&self, text: &str) -> Result<TodoId, TodoError> {
        self.state.add(text)
    }

    pub fn set_input(&self, text: impl Into<String>) {
        self.state.set_input(text.into())
    }

    pub fn submit(&self) -> Result<TodoId, TodoError> {
        self.state.submit()
    }

    pub fn toggle(&self, id: TodoId) -> bool {
        self.state.toggle(id)
    }

    pub fn remove(&self, id: TodoId) -> bool {
        self.state.remove(id)
    }

    /// Returns how many records were removed. Nothing is written when none
    /// are completed.
    pub fn clear_completed(&self) -> usize {
        self.state.clear_completed()
    }

    fn item_view(&self, todo: &TodoRecord) -> View {
        let id = todo.id;
        let s = self.state.clone();
        let toggle = Checkbox(format!("toggle-{id}"), todo.completed, move || {
            s.toggle(id);
        });
        let s = self.state.clone();
        let delete = Node::new(format!("delete-{id}"), Role::Button)
            .classes(button_classes(ButtonConfig::new(Variant::Danger), false))
            .class(class_name("deleteButton"))
            .text("🗑️")
            .on_click(move || {
                s.remove(id);
            });

        View::new().group(
            Node::new(format!("todo-{id}"), Role::ListItem).classes(todo_classes(todo.completed)),
            View::new()
                .child(toggle)
                .child(Text(format!("text-{id}"), todo.text.as_str()).class(class_name("todoText")))
                .child(delete),
        )
    }
}

impl Component for TodoList {
    type Props = TodoListProps;

    fn mount(props: TodoListProps, cx: &mut Cx<'_>) -> Self {
        let seed = validate_seed(props.seed);
        let next = match seed.iter().map(|t| t.id.0).max() {
            Some(max) => max.checked_add(1),
            None => Some(1),
        };
        let state = TodoState {
            items: cx.cell(seed),
            input: cx.cell(String::new()),
            notice: cx.cell(None),
            next_id: Rc::new(Cell::new(next)),
        };

        let s = state.clone();
        let add = Button::new(
            cx,
            ButtonProps::new("➕ Add Todo").on_activate(move || {
                if let Err(e) = s.submit() {
                    log::debug!("todo: add button: {e}");
                }
            }),
        );
        let s = state.clone();
        let clear = Button::new(
            cx,
            ButtonProps::default()
                .variant(Variant::Secondary)
                .on_activate(move || {
                    s.clear_completed();
                }),
        );

        TodoList { state, add, clear }
    }

    fn render(&self, cx: &mut RenderCx<'_>) -> View {
        let items = self.state.items.get();
        let stats = TodoStats::of(&items);

        let on_change = self.state.clone();
        let on_submit = self.state.clone();
        let input = TextField(
            "input",
            self.state.input.get(),
            move |text| on_change.set_input(text),
            move || {
                if let Err(e) = on_submit.submit() {
                    log::debug!("todo: enter: {e}");
                }
            },
        );

        let mut body = View::new().child(Heading("title", "📝 Todo List")).group(
            Container("add-section", "addSection"),
            View::new().child(input).child(self.add.view(cx, "add")),
        );

        if let Some(err) = self.state.notice.get() {
            body = body.child(Text("notice", err.to_string()).class(class_name("notice")));
        }

        let stat = |key: &str, label: &str, n: usize| {
            Text(key, format!("{label}: {n}")).class(class_name("statItem"))
        };
        body = body.group(
            Container("stats", "stats"),
            View::new()
                .child(stat("total", "Total", stats.total))
                .child(stat("completed", "Completed", stats.completed))
                .child(stat("remaining", "Remaining", stats.remaining)),
        );

        let list = if items.is_empty() {
            View::new().child(Text("empty", EMPTY_MESSAGE).class(class_name("emptyMessage")))
        } else {
            items
                .iter()
                .fold(View::new(), |list, todo| list.children(self.item_view(todo).nodes))
        };
        body = body.group(Container("list", "list"), list);

        // Always declared so the effect count stays the same across renders.
        let label = clear_label(stats.completed).unwrap_or_default();
        let clear = self
            .clear
            .view_with(cx, "clear", &label, ButtonConfig::new(Variant::Secondary));
        if stats.completed > 0 {
            body = body.group(Container("clear-section", "clearSection"), View::new().child(clear));
        }

        View::new().group(Container("todos", "todoList"), body)
    }
}
