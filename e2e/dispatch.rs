// e2e/dispatch.rs — end-to-end dispatch behaviour through the public API.
//
// Builds an App from an injected argv vector, captures console output in a
// shared buffer, and checks the full resolution table: overview on no
// command, error banner on unknown command, per-command help on -h/--help,
// handler exit statuses, and the two failure classes.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Context;
use clite::{App, AppParams, Command, CommandMeta, CommandSpec, Console, Handler, RunError};

fn capture_app(argv: &[&str]) -> (App, Rc<RefCell<Vec<u8>>>) {
    let buf: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
    let mut app = App::from_argv(
        AppParams {
            name: "demo".to_owned(),
            desc: "demo dispatch app".to_owned(),
            version: "1.0.0".to_owned(),
        },
        argv.iter().map(|s| s.to_string()).collect(),
    );
    app.set_console(Console::with_writer(buf.clone(), false));
    (app, buf)
}

fn output(buf: &Rc<RefCell<Vec<u8>>>) -> String {
    String::from_utf8(buf.borrow().clone()).expect("console output is utf-8")
}

// ── Overview paths ────────────────────────────────────────────────────────────

#[test]
fn no_command_renders_overview_with_status_zero() {
    let (mut app, buf) = capture_app(&["app"]);
    app.add("sync", Handler::Func(|_| Ok(0)), Some("Pull remote state".into()))
        .unwrap();

    let status = app.run(false);

    assert_eq!(status, 0);
    let out = output(&buf);
    assert!(out.contains("Demo dispatch app(v1.0.0)"));
    assert!(out.contains("Usage: app COMMAND -h"));
    assert!(out.contains("Pull remote state"));
    assert!(!out.contains("ERROR"));
}

#[test]
fn unknown_command_renders_banner_with_status_zero() {
    let (mut app, buf) = capture_app(&["app", "foo"]);
    app.add("sync", Handler::Func(|_| Ok(0)), Some("Pull remote state".into()))
        .unwrap();

    let status = app.run(false);

    assert_eq!(status, 0);
    let out = output(&buf);
    assert!(out.contains("ERROR: The command 'foo' is not exists!"));
    assert!(out.contains("Commands:"));
}

// ── Help flag ─────────────────────────────────────────────────────────────────

#[test]
fn help_flag_renders_command_help() {
    let (mut app, buf) = capture_app(&["app", "greet", "--help"]);
    app.add("greet", Handler::Func(|_| Ok(1)), Some("Say hello".into()))
        .unwrap();

    let status = app.run(false);

    assert_eq!(status, 0, "help request must not execute the handler");
    let out = output(&buf);
    assert!(out.contains("Say hello"));
    assert!(out.contains("app greet [args ...] [--opts ...]"));
}

#[test]
fn short_help_flag_works_too() {
    let (mut app, buf) = capture_app(&["app", "greet", "-h"]);
    app.add("greet", Handler::Func(|_| Ok(1)), Some("Say hello".into()))
        .unwrap();

    assert_eq!(app.run(false), 0);
    assert!(output(&buf).contains("Say hello"));
}

// ── Handler statuses ──────────────────────────────────────────────────────────

#[test]
fn handler_status_propagates() {
    let (mut app, _buf) = capture_app(&["app", "fail-ish"]);
    app.add("fail-ish", Handler::Func(|_| Ok(7)), None).unwrap();
    assert_eq!(app.run(false), 7);
}

#[test]
fn handler_default_status_is_zero() {
    let (mut app, _buf) = capture_app(&["app", "quiet"]);
    app.add("quiet", Handler::Func(|_| Ok(0)), None).unwrap();
    assert_eq!(app.run(false), 0);
}

#[test]
fn handler_sees_parsed_invocation() {
    let (mut app, buf) = capture_app(&["app", "greet", "world", "--upper", "--tag=a", "--tag=b"]);
    app.add(
        "greet",
        Handler::Func(|app| {
            let name = app.get_str_arg(0, "nobody");
            let upper = app.get_bool_opt("upper", false);
            let tags = app
                .get_opt("tag")
                .map(|v| v.values().join(","))
                .unwrap_or_default();
            app.console()
                .println(&format!("hello {name} upper={upper} tags={tags}"));
            Ok(0)
        }),
        None,
    )
    .unwrap();

    assert_eq!(app.run(false), 0);
    assert_eq!(output(&buf), "hello world upper=true tags=a,b\n");
}

// ── Failure classes ───────────────────────────────────────────────────────────

#[test]
fn usage_error_prints_one_line_and_exits_zero() {
    let (mut app, buf) = capture_app(&["app", "greet"]);
    app.add(
        "greet",
        Handler::Func(|_| Err(RunError::usage("missing <name> argument"))),
        None,
    )
    .unwrap();

    let status = app.run(false);

    assert_eq!(status, 0);
    assert_eq!(output(&buf), "ERROR: missing <name> argument\n");
}

#[test]
fn failure_with_code_maps_to_that_status() {
    let (mut app, buf) = capture_app(&["app", "sync"]);
    app.add(
        "sync",
        Handler::Func(|_| Err(RunError::failure_with_code(3, "remote unreachable"))),
        None,
    )
    .unwrap();

    let status = app.run(false);

    assert_eq!(status, 3);
    let out = output(&buf);
    assert!(out.contains("Error(3): remote unreachable"));
    assert!(out.contains("Command: sync"));
}

#[test]
fn failure_without_code_maps_to_minus_one() {
    let (mut app, _buf) = capture_app(&["app", "sync"]);
    app.add(
        "sync",
        Handler::Func(|_| Err(RunError::failure("boom"))),
        None,
    )
    .unwrap();
    assert_eq!(app.run(false), -1);
}

#[test]
fn anyhow_failures_carry_their_trace() {
    let (mut app, buf) = capture_app(&["app", "sync"]);
    app.add(
        "sync",
        Handler::Func(|_| {
            let root: Result<(), anyhow::Error> = Err(anyhow::anyhow!("connection refused"));
            root.context("fetching remote state")?;
            Ok(0)
        }),
        None,
    )
    .unwrap();

    let status = app.run(false);

    assert_eq!(status, -1);
    let out = output(&buf);
    assert!(out.contains("Error(-1): fetching remote state"));
    assert!(out.contains("Trace:"));
    assert!(out.contains("0: connection refused"));
}

// ── Handler shapes ────────────────────────────────────────────────────────────

#[test]
fn closure_handler_runs() {
    let (mut app, buf) = capture_app(&["app", "echo", "ping"]);
    let prefix = "echo:".to_owned();
    app.add(
        "echo",
        Handler::closure(move |app| {
            let word = app.get_str_arg(0, "");
            app.console().println(&format!("{prefix} {word}"));
            Ok(0)
        }),
        None,
    )
    .unwrap();

    assert_eq!(app.run(false), 0);
    assert_eq!(output(&buf), "echo: ping\n");
}

struct SyncCommand;

impl Command for SyncCommand {
    fn execute(&self, app: &mut App) -> clite::HandlerResult {
        app.console().println("synced");
        Ok(4)
    }

    fn help_config(&self) -> Option<(String, CommandMeta)> {
        Some(("sync".to_owned(), "Pull remote state".into()))
    }
}

#[test]
fn object_handler_self_registers_and_runs() {
    let (mut app, buf) = capture_app(&["app", "sync"]);
    app.add_object(Rc::new(SyncCommand)).unwrap();

    assert_eq!(app.run(false), 4);
    assert_eq!(output(&buf), "synced\n");
}

struct AnonymousCommand;

impl Command for AnonymousCommand {
    fn execute(&self, _: &mut App) -> clite::HandlerResult {
        Ok(0)
    }
}

#[test]
fn object_without_help_config_cannot_self_register() {
    let (mut app, _buf) = capture_app(&["app"]);
    assert!(app.add_object(Rc::new(AnonymousCommand)).is_err());
}

// ── Bulk registration ─────────────────────────────────────────────────────────

#[test]
fn bulk_registration_dispatches_under_override_name() {
    let (mut app, _buf) = capture_app(&["app", "pull"]);
    app.add_commands([
        (
            "filed-key".to_owned(),
            CommandSpec::new(Handler::Func(|_| Ok(5))).named("pull"),
        ),
        ("push".to_owned(), CommandSpec::new(Handler::Func(|_| Ok(6)))),
    ])
    .unwrap();

    assert_eq!(app.run(false), 5);
}

#[test]
fn bulk_entry_without_handler_is_rejected() {
    let (mut app, _buf) = capture_app(&["app"]);
    let err = app
        .add_commands([("ghost".to_owned(), CommandSpec::default())])
        .unwrap_err();
    assert_eq!(err.to_string(), "invalid handler for command `ghost`");
}

// ── Global snapshot ───────────────────────────────────────────────────────────

#[test]
fn global_handle_keeps_first_construction() {
    let (_first, _) = capture_app(&["app-one"]);
    let snapshot = App::global().map(|h| h.script.clone());
    assert!(snapshot.is_some());
    let (_second, _) = capture_app(&["app-two"]);
    assert_eq!(App::global().map(|h| h.script.clone()), snapshot);
}
