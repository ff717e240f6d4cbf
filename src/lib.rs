//! clite — a lite command-line application dispatch engine.
//!
//! Turns raw process arguments into a resolved command invocation, keeps a
//! registry of named command handlers with help metadata, and renders
//! human-readable help text.  The crate answers exactly one question: given
//! an argument list and a set of registered handlers, which handler runs,
//! with what parsed arguments, and with what exit status.
//!
//! | Submodule    | Responsibility |
//! |--------------|----------------|
//! | [`util`]     | Small string helpers: path basename, first-letter capitalisation, integer-prefix casts. |
//! | [`style`]    | Styled output: inline color tags, line styles, the [`Console`] sink, and the shared verbosity level. |
//! | [`error`]    | Typed error kinds — [`ConfigError`] at registration, [`RunError`] at execution — and diagnostic formatting. |
//! | [`flags`]    | Raw token classification into positional arguments and named options. |
//! | [`registry`] | Command bindings: handler shapes, help metadata, bulk registration. |
//! | [`help`]     | Overview and per-command help rendering with placeholder substitution. |
//! | [`app`]      | The [`App`] context object and the dispatch loop mapping outcomes to exit codes. |
//!
//! Typical call sequence: build an [`App`] from argv, register commands,
//! then `run` — the dispatcher resolves the command name, invokes its
//! handler, and returns the exit status.
//!
//! ```no_run
//! use clite::{App, AppParams, Handler};
//!
//! let mut app = App::new(AppParams::default());
//! app.add("greet", Handler::Func(|app| {
//!     println!("hello {}", app.get_str_arg(0, "world"));
//!     Ok(0)
//! }), Some("Say hello".into())).unwrap();
//! app.run(true);
//! ```

pub mod util;
pub mod style;
pub mod error;
pub mod flags;
pub mod registry;
pub mod help;
pub mod app;

pub use app::{App, AppHandle, AppParams};
pub use error::{ConfigError, RunError};
pub use flags::{parse_argv, OptValue, ParseOptions, ParsedArgv};
pub use registry::{
    Command, CommandBinding, CommandMeta, CommandSpec, Handler, HandlerResult, Registry,
};
pub use style::{Console, Style};

/// Crate version string, surfaced in overview help when the application
/// params carry no explicit version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
