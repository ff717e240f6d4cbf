// e2e/help_render.rs — help rendering through the public App surface.
//
// Exercises overview and per-command output exactly as a user would see it
// (colorization off, tags stripped): ordering, column padding, metadata
// fallbacks, and placeholder substitution.

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use clite::{App, AppParams, CommandMeta, Console, Handler};

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

fn noop_handler() -> Handler {
    Handler::Func(|_| Ok(0))
}

// ── Overview ──────────────────────────────────────────────────────────────────

#[test]
fn overview_full_shape() {
    let (mut app, buf) = capture_app(&["app"]);
    app.add("sync", noop_handler(), Some("pull remote state".into()))
        .unwrap();
    app.add("greet", noop_handler(), Some("Say hello".into()))
        .unwrap();

    app.run(false);

    let expected = format!(
        "Demo dispatch app(v1.0.0)\n\
         \n\
         Usage: app COMMAND -h\n\
         Commands:\n\
         \x20 {greet:<12}   Say hello\n\
         \x20 {sync:<12}   Pull remote state\n\
         \n\
         For command usage please run: app COMMAND -h\n",
        greet = "greet",
        sync = "sync",
    );
    assert_eq!(output(&buf), expected);
}

#[test]
fn overview_sorted_regardless_of_registration_order() {
    let (mut app, buf) = capture_app(&["app"]);
    for name in ["zeta", "alpha", "mid"] {
        app.add(name, noop_handler(), None).unwrap();
    }

    app.run(false);

    let out = output(&buf);
    let alpha = out.find("alpha").expect("alpha listed");
    let mid = out.find("mid").expect("mid listed");
    let zeta = out.find("zeta").expect("zeta listed");
    assert!(alpha < mid && mid < zeta);
}

#[test]
fn overview_is_identical_across_renders() {
    let (mut first, first_buf) = capture_app(&["app"]);
    let (mut second, second_buf) = capture_app(&["app"]);
    for app in [&mut first, &mut second] {
        app.add("sync", noop_handler(), Some("pull remote state".into()))
            .unwrap();
    }

    first.run(false);
    second.run(false);

    assert_eq!(output(&first_buf), output(&second_buf));
}

#[test]
fn overview_column_grows_with_longest_name() {
    let (mut app, buf) = capture_app(&["app"]);
    app.add("ls", noop_handler(), Some("List".into())).unwrap();
    app.add("synchronise-everything", noop_handler(), Some("Sync".into()))
        .unwrap();

    app.run(false);

    let out = output(&buf);
    let width = "synchronise-everything".len();
    assert!(out.contains(&format!("  {:<width$}   List", "ls")));
}

// ── Per-command help ──────────────────────────────────────────────────────────

#[test]
fn command_help_without_meta() {
    let (mut app, buf) = capture_app(&["app", "bare", "-h"]);
    app.add("bare", noop_handler(), None).unwrap();

    let status = app.run(false);

    assert_eq!(status, 0);
    let expected = "No description for the command\nUsage: \n  app bare [args ...] [--opts ...]\n";
    assert_eq!(output(&buf), expected);
}

#[test]
fn command_help_with_full_meta() {
    let (mut app, buf) = capture_app(&["app", "sync", "--help"]);
    let meta = CommandMeta {
        desc: "pull remote state".into(),
        usage: "app sync <remote> [--force]".into(),
        help: "Fetches and applies the remote state.\n".into(),
    };
    app.add("sync", noop_handler(), Some(meta)).unwrap();

    app.run(false);

    let expected = "Pull remote state\nUsage: \n  app sync <remote> [--force]\n\nFetches and applies the remote state.\n\n";
    assert_eq!(output(&buf), expected);
}

#[test]
fn command_help_substitutes_placeholders() {
    let (mut app, buf) = capture_app(&["app", "sync", "-h"]);
    let meta = CommandMeta {
        desc: "pull remote state".into(),
        usage: String::new(),
        help: "Run {{fullCmd}} now".into(),
    };
    app.add("sync", noop_handler(), Some(meta)).unwrap();

    app.run(false);

    assert!(output(&buf).contains("Run app sync now"));
}

#[test]
fn command_help_substitutes_workdir_and_script() {
    let (mut app, buf) = capture_app(&["app", "sync", "-h"]);
    let workdir = app.pwd().to_owned();
    let meta = CommandMeta {
        desc: "pull remote state".into(),
        usage: String::new(),
        help: "{{script}} runs {{command}} in {{workDir}}".into(),
    };
    app.add("sync", noop_handler(), Some(meta)).unwrap();

    app.run(false);

    assert!(output(&buf).contains(&format!("app runs sync in {workdir}")));
}

#[test]
fn command_help_trims_trailing_blank_lines() {
    let (mut app, buf) = capture_app(&["app", "sync", "-h"]);
    let meta = CommandMeta {
        desc: "pull remote state".into(),
        usage: String::new(),
        help: "Body text\n\n\n\n".into(),
    };
    app.add("sync", noop_handler(), Some(meta)).unwrap();

    app.run(false);

    let out = output(&buf);
    assert!(out.trim_end().ends_with("Body text"));
    assert!(!out.contains("Body text\n\n\n"));
}

// ── Colorization ──────────────────────────────────────────────────────────────

#[test]
fn plain_output_has_no_escapes_or_tags() {
    let (mut app, buf) = capture_app(&["app"]);
    app.add("sync", noop_handler(), Some("pull remote state".into()))
        .unwrap();

    app.run(false);

    let out = output(&buf);
    assert!(!out.contains('\x1b'));
    assert!(!out.contains('<'));
}

#[test]
fn colored_output_carries_escapes() {
    let buf: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
    let mut app = App::from_argv(
        AppParams::default(),
        vec!["app".to_owned()],
    );
    app.set_console(Console::with_writer(buf.clone(), true));
    app.add("sync", noop_handler(), None).unwrap();

    app.run(false);

    let out = String::from_utf8(buf.borrow().clone()).expect("utf-8");
    assert!(out.contains("\x1b[36m"));
    assert!(out.contains("\x1b[0m"));
}
