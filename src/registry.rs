//! Command registry: name → handler bindings with help metadata.
//!
//! Handlers come in three shapes, fixed at registration time into the
//! tagged [`Handler`] variant: a plain function pointer, a boxed closure,
//! or an object implementing [`Command`] (the `execute` convention).  The
//! dispatcher clones the variant out of the registry and invokes it with
//! the application context; no shape probing happens at dispatch time.
//!
//! The registry is populated before dispatch and treated as read-only once
//! a handler runs.  Display order for help is alphabetical, which the
//! `BTreeMap` key order provides directly.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::app::App;
use crate::error::{ConfigError, RunError};

/// Minimum width of the command-name column in overview help.
pub const MIN_KEY_WIDTH: usize = 12;

// ── Handler shapes ────────────────────────────────────────────────────────────

/// Outcome of a handler invocation: an exit status, or a classified
/// failure.  A handler with nothing to report returns `Ok(0)`.
pub type HandlerResult = Result<i32, RunError>;

/// Plain-function handler shape.
pub type HandlerFn = fn(&mut App) -> HandlerResult;

/// A command implemented as an object with an `execute` method.
pub trait Command {
    fn execute(&self, app: &mut App) -> HandlerResult;

    /// Name and metadata used when the object registers itself via
    /// [`App::add_object`].  Objects that never self-register keep the
    /// default.
    fn help_config(&self) -> Option<(String, CommandMeta)> {
        None
    }
}

/// A command handler, shape-resolved at registration time.
pub enum Handler {
    Func(HandlerFn),
    Closure(Rc<dyn Fn(&mut App) -> HandlerResult>),
    Object(Rc<dyn Command>),
}

impl Handler {
    pub fn closure(f: impl Fn(&mut App) -> HandlerResult + 'static) -> Self {
        Handler::Closure(Rc::new(f))
    }

    pub fn object(command: impl Command + 'static) -> Self {
        Handler::Object(Rc::new(command))
    }

    /// Invokes the handler with the application context, blocking until it
    /// returns.
    pub fn invoke(&self, app: &mut App) -> HandlerResult {
        match self {
            Handler::Func(f) => f(app),
            Handler::Closure(f) => f(app),
            Handler::Object(command) => command.execute(app),
        }
    }
}

impl Clone for Handler {
    fn clone(&self) -> Self {
        match self {
            Handler::Func(f) => Handler::Func(*f),
            Handler::Closure(f) => Handler::Closure(Rc::clone(f)),
            Handler::Object(command) => Handler::Object(Rc::clone(command)),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Func(_) => f.write_str("Handler::Func"),
            Handler::Closure(_) => f.write_str("Handler::Closure"),
            Handler::Object(_) => f.write_str("Handler::Object"),
        }
    }
}

// ── Metadata ──────────────────────────────────────────────────────────────────

/// Help metadata attached to a command binding.
///
/// A bare string registers as description-only metadata; partial
/// construction merges over the all-empty default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandMeta {
    pub desc: String,
    pub usage: String,
    pub help: String,
}

impl From<&str> for CommandMeta {
    fn from(desc: &str) -> Self {
        CommandMeta {
            desc: desc.trim().to_owned(),
            ..CommandMeta::default()
        }
    }
}

impl From<String> for CommandMeta {
    fn from(desc: String) -> Self {
        CommandMeta::from(desc.as_str())
    }
}

// ── Bindings and bulk specs ───────────────────────────────────────────────────

/// A registered command: its name, shape-resolved handler, and optional
/// help metadata.
#[derive(Debug, Clone)]
pub struct CommandBinding {
    pub name: String,
    pub handler: Handler,
    pub meta: Option<CommandMeta>,
}

/// One entry of a bulk registration.  A spec-carried `name` overrides the
/// map key it was filed under; a spec without a handler is rejected.
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    pub name: Option<String>,
    pub handler: Option<Handler>,
    pub meta: Option<CommandMeta>,
}

impl CommandSpec {
    pub fn new(handler: Handler) -> Self {
        CommandSpec {
            name: None,
            handler: Some(handler),
            meta: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_meta(mut self, meta: impl Into<CommandMeta>) -> Self {
        self.meta = Some(meta.into());
        self
    }
}

impl From<Handler> for CommandSpec {
    fn from(handler: Handler) -> Self {
        CommandSpec::new(handler)
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// Name → binding store with the shared help-column width.
#[derive(Debug)]
pub struct Registry {
    commands: BTreeMap<String, CommandBinding>,
    key_width: usize,
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            commands: BTreeMap::new(),
            key_width: MIN_KEY_WIDTH,
        }
    }

    /// Binds `name` to `handler`.  Re-registering an existing name
    /// overwrites the prior binding.
    pub fn register(
        &mut self,
        name: &str,
        handler: Handler,
        meta: Option<CommandMeta>,
    ) -> Result<(), ConfigError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if name.len() > self.key_width {
            self.key_width = name.len();
        }
        self.commands.insert(
            name.to_owned(),
            CommandBinding {
                name: name.to_owned(),
                handler,
                meta,
            },
        );
        Ok(())
    }

    /// Registers a batch of commands.  Stops at the first invalid entry.
    pub fn register_bulk(
        &mut self,
        entries: impl IntoIterator<Item = (String, CommandSpec)>,
    ) -> Result<(), ConfigError> {
        for (key, spec) in entries {
            let name = spec.name.unwrap_or(key);
            let handler = spec
                .handler
                .ok_or_else(|| ConfigError::InvalidHandler(name.clone()))?;
            self.register(&name, handler, spec.meta)?;
        }
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&CommandBinding> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// All bindings, ascending by name.
    pub fn list(&self) -> impl Iterator<Item = &CommandBinding> {
        self.commands.values()
    }

    /// Width of the command-name column in overview help: the longest name
    /// ever registered, floored at [`MIN_KEY_WIDTH`].
    pub fn key_width(&self) -> usize {
        self.key_width
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut App) -> HandlerResult {
        Ok(0)
    }

    #[test]
    fn register_and_lookup() {
        let mut reg = Registry::new();
        reg.register("sync", Handler::Func(noop), Some("Synchronise".into()))
            .unwrap();
        let binding = reg.lookup("sync").unwrap();
        assert_eq!(binding.name, "sync");
        assert_eq!(binding.meta.as_ref().unwrap().desc, "Synchronise");
    }

    #[test]
    fn empty_name_rejected() {
        let mut reg = Registry::new();
        let err = reg.register("  ", Handler::Func(noop), None).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyName));
    }

    #[test]
    fn name_is_trimmed() {
        let mut reg = Registry::new();
        reg.register(" sync ", Handler::Func(noop), None).unwrap();
        assert!(reg.contains("sync"));
    }

    #[test]
    fn reregistration_overwrites() {
        let mut reg = Registry::new();
        reg.register("sync", Handler::Func(noop), Some("first".into()))
            .unwrap();
        reg.register("sync", Handler::Func(noop), Some("second".into()))
            .unwrap();
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.lookup("sync").unwrap().meta.as_ref().unwrap().desc, "second");
    }

    #[test]
    fn bare_string_meta_equals_full_record() {
        let bare: CommandMeta = "X".into();
        let full = CommandMeta {
            desc: "X".into(),
            usage: String::new(),
            help: String::new(),
        };
        assert_eq!(bare, full);
    }

    #[test]
    fn key_width_floor_and_growth() {
        let mut reg = Registry::new();
        reg.register("ls", Handler::Func(noop), None).unwrap();
        assert_eq!(reg.key_width(), MIN_KEY_WIDTH);
        reg.register("synchronise-everything", Handler::Func(noop), None)
            .unwrap();
        assert_eq!(reg.key_width(), "synchronise-everything".len());
    }

    #[test]
    fn list_is_sorted_by_name() {
        let mut reg = Registry::new();
        for name in ["zeta", "alpha", "mid"] {
            reg.register(name, Handler::Func(noop), None).unwrap();
        }
        let names: Vec<&str> = reg.list().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn bulk_registration_with_name_override() {
        let mut reg = Registry::new();
        reg.register_bulk([
            ("filed-under".to_owned(), CommandSpec::new(Handler::Func(noop)).named("real-name")),
            ("plain".to_owned(), CommandSpec::new(Handler::Func(noop))),
        ])
        .unwrap();
        assert!(reg.contains("real-name"));
        assert!(!reg.contains("filed-under"));
        assert!(reg.contains("plain"));
    }

    #[test]
    fn bulk_entry_without_handler_fails() {
        let mut reg = Registry::new();
        let err = reg
            .register_bulk([("ghost".to_owned(), CommandSpec::default())])
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid handler for command `ghost`");
    }

    #[test]
    fn handler_clone_shares_object() {
        struct Probe;
        impl Command for Probe {
            fn execute(&self, _: &mut App) -> HandlerResult {
                Ok(9)
            }
        }
        let handler = Handler::object(Probe);
        let clone = handler.clone();
        assert!(matches!(clone, Handler::Object(_)));
    }
}
