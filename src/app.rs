//! The application context and dispatch loop.
//!
//! [`App`] is built once from the process argument list: the first element
//! becomes the script path, the remainder is classified by the flag parser
//! with option merging enabled.  Commands are registered before dispatch;
//! `run` then resolves the first positional token as the command name and
//! maps the outcome to an exit status:
//!
//! - no command at all → overview help, status 0
//! - unknown command → overview help with an inline error banner, status 0
//! - `-h` / `--help` present → per-command help, status 0
//! - otherwise → the handler runs with `&mut App` and its result becomes
//!   the status; failures are intercepted and reported here rather than
//!   crossing the dispatch boundary
//!
//! Construction publishes a write-once identity snapshot ([`AppHandle`])
//! through a process-wide accessor: the first `App` constructed wins,
//! later constructions leave it untouched.

use std::process;
use std::rc::Rc;
use std::sync::OnceLock;

use indexmap::IndexMap;

use crate::error::{diagnostic_block, ConfigError, RunError};
use crate::flags::{parse_argv, OptValue, ParseOptions, ParsedArgv};
use crate::help;
use crate::registry::{Command, CommandMeta, CommandSpec, Handler, Registry};
use crate::style::{Console, Style};
use crate::util::{base_name, int_prefix};
use crate::verboseln;

// ── Application identity ──────────────────────────────────────────────────────

/// Display identity of the application, shown in overview help.
#[derive(Debug, Clone)]
pub struct AppParams {
    pub name: String,
    pub desc: String,
    pub version: String,
}

impl Default for AppParams {
    fn default() -> Self {
        AppParams {
            name: "My application".to_owned(),
            desc: "My command line application".to_owned(),
            version: crate::VERSION.to_owned(),
        }
    }
}

/// Read-only snapshot of the first-constructed application, reachable
/// process-wide without threading the `App` value around.
#[derive(Debug, Clone)]
pub struct AppHandle {
    pub script: String,
    pub workdir: String,
    pub name: String,
    pub version: String,
}

static GLOBAL: OnceLock<AppHandle> = OnceLock::new();

// ── App ───────────────────────────────────────────────────────────────────────

/// The dispatch engine: parsed invocation, command registry, and output
/// sink, passed as the context object to every handler.
pub struct App {
    params: AppParams,
    pwd: String,
    script: String,
    command: String,
    args: Vec<String>,
    opts: IndexMap<String, OptValue>,
    registry: Registry,
    console: Console,
}

impl App {
    /// Builds the app from `std::env::args()`.
    pub fn new(params: AppParams) -> Self {
        App::from_argv(params, std::env::args().collect())
    }

    /// Builds the app from an explicit argument vector whose first element
    /// is the script path.  Callable from tests without touching the
    /// process environment.
    pub fn from_argv(params: AppParams, mut argv: Vec<String>) -> Self {
        let pwd = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        let script = if argv.is_empty() {
            String::new()
        } else {
            argv.remove(0)
        };

        let ParsedArgv { args, opts } =
            parse_argv(&argv, &ParseOptions { merge_opts: true });

        let app = App {
            params,
            pwd,
            script,
            command: String::new(),
            args,
            opts,
            registry: Registry::new(),
            console: Console::stdout(),
        };

        // First construction wins; later ones are ignored.
        let _ = GLOBAL.set(AppHandle {
            script: app.script.clone(),
            workdir: app.pwd.clone(),
            name: app.params.name.clone(),
            version: app.params.version.clone(),
        });

        app
    }

    /// The process-wide identity snapshot, once any `App` has been
    /// constructed.
    pub fn global() -> Option<&'static AppHandle> {
        GLOBAL.get()
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Binds `name` to `handler` with optional help metadata.
    pub fn add(
        &mut self,
        name: &str,
        handler: Handler,
        meta: Option<CommandMeta>,
    ) -> Result<(), ConfigError> {
        self.registry.register(name, handler, meta)
    }

    /// Registers a batch of commands (see [`Registry::register_bulk`]).
    pub fn add_commands(
        &mut self,
        entries: impl IntoIterator<Item = (String, CommandSpec)>,
    ) -> Result<(), ConfigError> {
        self.registry.register_bulk(entries)
    }

    /// Registers an object under the name its own
    /// [`help_config`](Command::help_config) declares.
    pub fn add_object(&mut self, object: Rc<dyn Command>) -> Result<(), ConfigError> {
        match object.help_config() {
            Some((name, meta)) => self.registry.register(&name, Handler::Object(object), Some(meta)),
            None => Err(ConfigError::EmptyName),
        }
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    /// Resolves and dispatches the command, returning the exit status.
    /// With `exit` set the process terminates with that status instead.
    pub fn run(&mut self, exit: bool) -> i32 {
        self.find_command();
        let status = self.handle();
        if exit {
            self.stop(status);
        }
        status
    }

    /// Terminates the process.  Explicit and final: nothing after this
    /// call runs.
    pub fn stop(&self, code: i32) -> ! {
        process::exit(code)
    }

    /// Extracts the command name: the first positional token, trimmed and
    /// removed from the positional sequence.
    fn find_command(&mut self) {
        if self.args.is_empty() {
            return;
        }
        self.command = self.args.remove(0).trim().to_owned();
    }

    fn handle(&mut self) -> i32 {
        if self.command.is_empty() {
            let text = help::render_overview(
                &self.params.desc,
                &self.params.version,
                &self.script,
                &self.registry,
                None,
            );
            self.console.println(&text);
            return 0;
        }

        let handler = match self.registry.lookup(&self.command) {
            Some(binding) => binding.handler.clone(),
            None => {
                let err = format!("The command '{}' is not exists!", self.command);
                let text = help::render_overview(
                    &self.params.desc,
                    &self.params.version,
                    &self.script,
                    &self.registry,
                    Some(&err),
                );
                self.console.println(&text);
                return 0;
            }
        };

        if self.opts.contains_key("h") || self.opts.contains_key("help") {
            let text = help::render_command(&self.script, &self.pwd, &self.command, &self.registry);
            self.console.println(&text);
            return 0;
        }

        verboseln!(3, "{}: running command '{}'", self.script_name(), self.command);
        match handler.invoke(self) {
            Ok(status) => status,
            Err(err) => self.report_failure(err),
        }
    }

    /// Maps an intercepted handler failure to output plus an exit status.
    fn report_failure(&self, err: RunError) -> i32 {
        match err {
            RunError::Usage(message) => {
                self.console
                    .styled_println(&format!("ERROR: {message}"), Style::Error);
                0
            }
            failure @ RunError::Failure { .. } => {
                let code = failure.exit_code();
                self.console.println(&diagnostic_block(&self.command, &failure));
                code
            }
        }
    }

    // ── Positional accessors ──────────────────────────────────────────────

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn get_arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    pub fn get_str_arg(&self, index: usize, default: &str) -> String {
        match self.args.get(index) {
            Some(value) => value.clone(),
            None => default.to_owned(),
        }
    }

    pub fn get_int_arg(&self, index: usize, default: i32) -> i32 {
        match self.args.get(index) {
            Some(value) => int_prefix(value),
            None => default,
        }
    }

    // ── Named-option accessors ────────────────────────────────────────────

    pub fn opts(&self) -> &IndexMap<String, OptValue> {
        &self.opts
    }

    pub fn get_opt(&self, name: &str) -> Option<&OptValue> {
        self.opts.get(name)
    }

    pub fn get_str_opt(&self, name: &str, default: &str) -> String {
        match self.opts.get(name) {
            Some(value) => value.coerce_string(),
            None => default.to_owned(),
        }
    }

    pub fn get_int_opt(&self, name: &str, default: i32) -> i32 {
        match self.opts.get(name) {
            Some(value) => value.coerce_int(),
            None => default,
        }
    }

    pub fn get_bool_opt(&self, name: &str, default: bool) -> bool {
        match self.opts.get(name) {
            Some(value) => value.coerce_bool(),
            None => default,
        }
    }

    // ── Identity and plumbing accessors ───────────────────────────────────

    pub fn params(&self) -> &AppParams {
        &self.params
    }

    pub fn set_params(&mut self, params: AppParams) {
        self.params = params;
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn script_name(&self) -> &str {
        base_name(&self.script)
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn pwd(&self) -> &str {
        &self.pwd
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn set_console(&mut self, console: Console) {
        self.console = console;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_app(argv: &[&str]) -> App {
        App::from_argv(
            AppParams::default(),
            argv.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn script_taken_from_first_element() {
        let app = make_app(&["/usr/bin/app", "sync"]);
        assert_eq!(app.script(), "/usr/bin/app");
        assert_eq!(app.script_name(), "app");
    }

    #[test]
    fn command_extraction_trims_and_removes() {
        let mut app = make_app(&["app", "  sync  ", "alpha"]);
        app.find_command();
        assert_eq!(app.command(), "sync");
        assert_eq!(app.args(), &["alpha".to_owned()]);
    }

    #[test]
    fn no_positionals_leaves_command_empty() {
        let mut app = make_app(&["app", "--force"]);
        app.find_command();
        assert_eq!(app.command(), "");
        assert!(app.get_bool_opt("force", false));
    }

    #[test]
    fn typed_arg_accessors() {
        let mut app = make_app(&["app", "sync", "alpha", "42"]);
        app.find_command();
        assert_eq!(app.get_arg(0), Some("alpha"));
        assert_eq!(app.get_str_arg(1, ""), "42");
        assert_eq!(app.get_int_arg(1, 0), 42);
        assert_eq!(app.get_int_arg(9, 7), 7);
    }

    #[test]
    fn typed_opt_accessors() {
        let app = make_app(&["app", "sync", "mode=fast", "--retries=3", "--force"]);
        assert_eq!(app.get_int_opt("retries", 0), 3);
        assert!(app.get_bool_opt("force", false));
        assert_eq!(app.get_str_opt("mode", ""), "fast");
        assert_eq!(app.get_str_opt("missing", "dflt"), "dflt");
    }

    #[test]
    fn default_params() {
        let params = AppParams::default();
        assert_eq!(params.name, "My application");
        assert_eq!(params.version, crate::VERSION);
    }

    #[test]
    fn global_snapshot_is_write_once() {
        let _first = make_app(&["first-app"]);
        let snapshot = App::global().map(|h| h.script.clone());
        let _second = make_app(&["second-app"]);
        assert_eq!(App::global().map(|h| h.script.clone()), snapshot);
    }
}
