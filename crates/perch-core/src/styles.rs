//! # Style lookup
//!
//! Components never compute styling themselves. They ask for a class by
//! symbolic key (`"primary"`, `"high"`, `"completed"`) and the active
//! [`StyleTable`] answers with the concrete class name, the way a CSS
//! module maps `styles.primary` to a hashed class:
//!
//! ```rust
//! use std::rc::Rc;
//! use perch_core::styles::{StyleTable, class_name, with_style_table};
//!
//! let table = StyleTable::new().insert("primary", "Button_primary__3kd");
//! with_style_table(Rc::new(table), || {
//!     assert_eq!(class_name("primary"), "Button_primary__3kd");
//!     assert_eq!(class_name("unknown"), "unknown");
//! });
//! ```
//!
//! Outside any table, and for keys a table does not know, the key itself is
//! the class name. The runtime installs its table around every render pass.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

thread_local! {
    static STYLE_STACK: RefCell<Vec<Rc<StyleTable>>> = const { RefCell::new(Vec::new()) };
}

/// Symbolic key → class name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleTable {
    classes: HashMap<String, String>,
}

impl StyleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, key: impl Into<String>, class: impl Into<String>) -> Self {
        self.classes.insert(key.into(), class.into());
        self
    }

    /// Parse a flat JSON object, e.g. the class map emitted by a CSS module build.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn resolve(&self, key: &str) -> String {
        self.classes
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_owned())
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

pub fn with_style_table<R>(table: Rc<StyleTable>, f: impl FnOnce() -> R) -> R {
    STYLE_STACK.with(|st| st.borrow_mut().push(table));
    let out = f();
    STYLE_STACK.with(|st| {
        st.borrow_mut().pop();
    });
    out
}

/// Class name for `key` under the innermost active table.
pub fn class_name(key: &str) -> String {
    STYLE_STACK.with(|st| match st.borrow().last() {
        Some(table) => table.resolve(key),
        None => key.to_owned(),
    })
}
