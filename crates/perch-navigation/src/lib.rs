#![allow(non_snake_case)]
//! Path routing for Perch pages.
//!
//! A [`Router`] maps paths to page components, keeps one page mounted at a
//! time and wraps it in the layout shell. Paths with no route redirect to
//! the configured fallback (`/` by default). Leaving a page unmounts it, so
//! its effects clean up and its timers are cancelled.

use std::rc::Rc;

use perch_core::{
    Component, DispatchError, Event, InstanceId, Node, Role, Runtime, SchedulingError, View,
};
use perch_ui::{Container, Counter, CounterProps, Heading, Text, TodoList, TodoListProps};
use serde::{Deserialize, Serialize};

pub const WELCOME: &str = "Welcome to The Black Hawks Frontend";

#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("no route for `{0}` and no fallback route")]
    NoRoute(String),
    #[error("no page is mounted")]
    NoPage,
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Where unknown paths land.
    pub fallback: String,
    pub layout_class: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            fallback: "/".into(),
            layout_class: "mainContainer".into(),
        }
    }
}

pub type PageFactory = Rc<dyn Fn(&mut Runtime) -> InstanceId>;

/// Factory that mounts `C` with a fresh copy of `props` on every visit.
pub fn page<C>(props: C::Props) -> PageFactory
where
    C: Component,
    C::Props: Clone + 'static,
{
    Rc::new(move |rt: &mut Runtime| rt.mount::<C>(props.clone()))
}

struct Shown {
    path: String,
    page: InstanceId,
}

pub struct Router {
    config: RouterConfig,
    routes: Vec<(String, PageFactory)>,
    history: Vec<String>,
    shown: Option<Shown>,
}

impl Router {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            routes: Vec::new(),
            history: Vec::new(),
            shown: None,
        }
    }

    pub fn route(mut self, path: impl Into<String>, factory: PageFactory) -> Self {
        self.routes.push((path.into(), factory));
        self
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|(p, _)| p.as_str())
    }

    fn lookup(&self, path: &str) -> Option<&PageFactory> {
        self.routes.iter().find(|(p, _)| p == path).map(|(_, f)| f)
    }

    /// The path that would be shown for `path`, after redirects.
    pub fn resolve<'a>(&'a self, path: &'a str) -> Result<&'a str, NavError> {
        if self.lookup(path).is_some() {
            return Ok(path);
        }
        let fallback = self.config.fallback.as_str();
        if self.lookup(fallback).is_some() {
            log::debug!("router: no route for {path}, redirecting to {fallback}");
            Ok(fallback)
        } else {
            Err(NavError::NoRoute(path.to_owned()))
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.shown.as_ref().map(|s| s.path.as_str())
    }

    pub fn page(&self) -> Option<InstanceId> {
        self.shown.as_ref().map(|s| s.page)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Show `path` (or its redirect) and push it on the history.
    /// Navigating to the page already shown does nothing.
    pub fn navigate(&mut self, rt: &mut Runtime, path: &str) -> Result<String, NavError> {
        let target = self.resolve(path)?.to_owned();
        if self.current() == Some(target.as_str()) {
            return Ok(target);
        }
        self.show(rt, &target)?;
        self.history.push(target.clone());
        Ok(target)
    }

    /// Return to the previous entry. The root entry is never popped.
    pub fn back(&mut self, rt: &mut Runtime) -> Result<bool, NavError> {
        if self.history.len() <= 1 {
            return Ok(false);
        }
        self.history.pop();
        let Some(target) = self.history.last().cloned() else {
            return Ok(false);
        };
        self.show(rt, &target)?;
        Ok(true)
    }

    fn show(&mut self, rt: &mut Runtime, target: &str) -> Result<(), NavError> {
        let factory = self
            .lookup(target)
            .cloned()
            .ok_or_else(|| NavError::NoRoute(target.to_owned()))?;
        self.close(rt)?;
        let page = factory(rt);
        log::debug!("router: showing {target} as {page:?}");
        self.shown = Some(Shown {
            path: target.to_owned(),
            page,
        });
        Ok(())
    }

    /// Unmount the current page, if any.
    pub fn close(&mut self, rt: &mut Runtime) -> Result<(), NavError> {
        if let Some(prev) = self.shown.take() {
            rt.unmount(prev.page)?;
        }
        Ok(())
    }

    /// Forward `event` to the node `key` of the current page.
    pub fn dispatch(&self, rt: &mut Runtime, key: &str, event: Event) -> Result<(), NavError> {
        let page = self.page().ok_or(NavError::NoPage)?;
        rt.dispatch(page, key, event)?;
        Ok(())
    }

    /// The current page's view inside the layout shell.
    pub fn frame(&self, rt: &Runtime) -> View {
        let content = self
            .page()
            .and_then(|id| rt.view(id))
            .cloned()
            .unwrap_or_default();
        content.wrap(Layout(rt.styles().resolve(&self.config.layout_class)))
    }
}

pub fn Layout(class: String) -> Node {
    Node::new("layout", Role::Container).class(class)
}

pub struct HomePage;

impl Component for HomePage {
    type Props = ();

    fn mount(_: (), _: &mut perch_core::Cx<'_>) -> Self {
        HomePage
    }

    fn render(&self, _: &mut perch_core::RenderCx<'_>) -> View {
        View::new().group(
            Container("home", "testClass"),
            View::new()
                .child(Node::new("heading", Role::Heading).text(WELCOME))
                .child(Text("intro", "This is the main content of the home page.")),
        )
    }
}

pub struct DashboardPage;

impl Component for DashboardPage {
    type Props = ();

    fn mount(_: (), _: &mut perch_core::Cx<'_>) -> Self {
        DashboardPage
    }

    fn render(&self, _: &mut perch_core::RenderCx<'_>) -> View {
        View::new().child(Heading("dashboard", "Dashboard Page"))
    }
}

/// Home, dashboard and the two interactive demos.
pub fn default_router() -> Router {
    Router::new(RouterConfig::default())
        .route("/", page::<HomePage>(()))
        .route("/dashboard", page::<DashboardPage>(()))
        .route("/counter", page::<Counter>(CounterProps::default()))
        .route("/todos", page::<TodoList>(TodoListProps::default()))
}

#[cfg(test)]
mod tests {
    use perch_core::StyleTable;
    use web_time::Duration;

    use super::*;

    fn start(path: &str) -> (Runtime, Router) {
        let mut rt = Runtime::new();
        let mut router = default_router();
        router.navigate(&mut rt, path).unwrap();
        (rt, router)
    }

    #[test]
    fn test_unknown_path_redirects_home() {
        let (rt, router) = start("/no/such/page");
        assert_eq!(router.current(), Some("/"));
        let frame = router.frame(&rt);
        assert_eq!(frame.node("heading").unwrap().text, WELCOME);
    }

    #[test]
    fn test_dashboard_frame() {
        let (rt, router) = start("/dashboard");
        insta::assert_snapshot!(router.frame(&rt).render_text(), @r"
        <layout> .mainContainer
          <dashboard> .title Dashboard Page
        ");
    }

    #[test]
    fn test_layout_class_comes_from_style_table() {
        let mut rt = Runtime::with_styles(StyleTable::new().insert("mainContainer", "layout_main__x1"));
        let mut router = default_router();
        router.navigate(&mut rt, "/").unwrap();
        assert!(router.frame(&rt).node("layout").unwrap().has_class("layout_main__x1"));
    }

    #[test]
    fn test_leaving_page_cleans_up() {
        let (mut rt, mut router) = start("/counter");
        router.dispatch(&mut rt, "toggle", Event::Click).unwrap();
        rt.advance(Duration::from_secs(2));
        let counter = router.page().unwrap();
        assert!(rt.timers().pending() > 0);

        router.navigate(&mut rt, "/todos").unwrap();
        assert!(!rt.is_mounted(counter));
        assert_eq!(rt.mounted(), 1);
        assert_eq!(rt.timers().pending(), 0);
    }

    #[test]
    fn test_back_remounts_previous_page() {
        let (mut rt, mut router) = start("/");
        router.navigate(&mut rt, "/counter").unwrap();
        router.dispatch(&mut rt, "increment", Event::Click).unwrap();
        router.navigate(&mut rt, "/dashboard").unwrap();
        assert_eq!(router.history_len(), 3);

        assert!(router.back(&mut rt).unwrap());
        assert_eq!(router.current(), Some("/counter"));
        let counter = router.page().unwrap();
        // State is not kept across visits.
        assert_eq!(rt.component::<Counter>(counter).unwrap().value(), 0);

        assert!(router.back(&mut rt).unwrap());
        assert!(!router.back(&mut rt).unwrap());
        assert_eq!(router.current(), Some("/"));
    }

    #[test]
    fn test_same_path_keeps_page() {
        let (mut rt, mut router) = start("/todos");
        let page = router.page();
        router.navigate(&mut rt, "/todos").unwrap();
        router.navigate(&mut rt, "/missing").unwrap();
        router.navigate(&mut rt, "/todos").unwrap();
        assert_ne!(router.page(), page);
        assert_eq!(router.history_len(), 3);

        let page = router.page();
        router.navigate(&mut rt, "/todos").unwrap();
        assert_eq!(router.page(), page);
    }

    #[test]
    fn test_no_fallback_route() {
        let mut rt = Runtime::new();
        let mut router =
            Router::new(RouterConfig::default()).route("/dashboard", page::<DashboardPage>(()));
        let err = router.navigate(&mut rt, "/elsewhere").unwrap_err();
        assert!(matches!(err, NavError::NoRoute(p) if p == "/elsewhere"));
        assert_eq!(rt.mounted(), 0);
    }

    #[test]
    fn test_dispatch_without_page() {
        let mut rt = Runtime::new();
        let router = default_router();
        let err = router.dispatch(&mut rt, "toggle", Event::Click).unwrap_err();
        assert!(matches!(err, NavError::NoPage));
    }

    #[test]
    fn test_dispatch_unknown_node() {
        let (mut rt, router) = start("/");
        let err = router.dispatch(&mut rt, "nope", Event::Click).unwrap_err();
        assert!(matches!(
            err,
            NavError::Dispatch(DispatchError::UnknownNode(ref k)) if k == "nope"
        ));
    }
}
