//! Styled console output.
//!
//! Help text and error banners are authored with inline color tags
//! (`<red>…</red>`, `<comment>…</comment>`) that [`render_tags`] converts to
//! ANSI escapes, or strips entirely when colorization is off.  [`Console`]
//! is the single output sink: it owns a `Write` target (stdout by default,
//! an in-memory buffer in tests) and writes one rendered line per call.
//!
//! A process-wide verbosity level gates diagnostic chatter via the
//! [`verboseln!`](crate::verboseln) macro: 0 = silent, 1 = errors only,
//! 2 = normal, 3+ = verbose tracing.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use colored::control::SHOULD_COLORIZE;

// ── Inline color tags ─────────────────────────────────────────────────────────

/// Tag name → ANSI SGR parameter list.
const TAGS: &[(&str, &str)] = &[
    ("red", "31"),
    ("green", "32"),
    ("yellow", "33"),
    ("cyan", "36"),
    ("magenta", "35"),
    ("comment", "33"),
    ("info", "32"),
    ("error", "97;41"),
];

/// Replaces every known `<tag>`/`</tag>` pair in `text` with ANSI escapes,
/// or removes the tags when `colorize` is false.  Unknown tags pass through
/// untouched.
pub fn render_tags(text: &str, colorize: bool) -> String {
    let mut out = text.to_owned();
    for (tag, code) in TAGS {
        let open = format!("<{tag}>");
        let close = format!("</{tag}>");
        if !out.contains(open.as_str()) {
            continue;
        }
        if colorize {
            out = out
                .replace(open.as_str(), &format!("\x1b[{code}m"))
                .replace(close.as_str(), "\x1b[0m");
        } else {
            out = out.replace(open.as_str(), "").replace(close.as_str(), "");
        }
    }
    out
}

// ── Whole-line styles ─────────────────────────────────────────────────────────

/// Style applied to an entire output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Plain,
    /// White on red — fatal-looking error banners.
    Error,
    Info,
    Comment,
}

impl Style {
    fn code(self) -> Option<&'static str> {
        match self {
            Style::Plain => None,
            Style::Error => Some("97;41"),
            Style::Info => Some("32"),
            Style::Comment => Some("33"),
        }
    }
}

// ── Console sink ──────────────────────────────────────────────────────────────

/// A styled line writer over an injectable `Write` target.
///
/// Cloning a `Console` shares the underlying target, so an `App` and a test
/// harness can observe the same buffer.
#[derive(Clone)]
pub struct Console {
    out: Rc<RefCell<dyn Write>>,
    colorize: bool,
}

impl Console {
    /// Console on stdout; colorization follows terminal detection.
    pub fn stdout() -> Self {
        Console {
            out: Rc::new(RefCell::new(io::stdout())),
            colorize: SHOULD_COLORIZE.should_colorize(),
        }
    }

    /// Console over an explicit writer with an explicit colorize choice.
    pub fn with_writer(out: Rc<RefCell<dyn Write>>, colorize: bool) -> Self {
        Console { out, colorize }
    }

    pub fn colorize(&self) -> bool {
        self.colorize
    }

    /// Writes one line, rendering inline color tags.
    pub fn println(&self, text: &str) {
        let rendered = render_tags(text, self.colorize);
        let _ = writeln!(self.out.borrow_mut(), "{rendered}");
    }

    /// Writes one line wrapped in a whole-line style.
    pub fn styled_println(&self, text: &str, style: Style) {
        match style.code() {
            Some(code) if self.colorize => {
                let _ = writeln!(self.out.borrow_mut(), "\x1b[{code}m{text}\x1b[0m");
            }
            _ => {
                let _ = writeln!(self.out.borrow_mut(), "{text}");
            }
        }
    }
}

// ── Verbosity level ───────────────────────────────────────────────────────────

// 0 = silent; 1 = errors only; 2 = normal; 3+ = verbose tracing.
pub static DISPLAY_LEVEL: AtomicU32 = AtomicU32::new(2);

/// Returns the current verbosity level.
#[inline]
pub fn display_level() -> u32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

/// Sets the verbosity level.
#[inline]
pub fn set_display_level(level: u32) {
    DISPLAY_LEVEL.store(level, Ordering::Relaxed);
}

/// Writes a line to stderr when the verbosity level is at or above `level`.
#[macro_export]
macro_rules! verboseln {
    ($level:expr, $($arg:tt)*) => {
        if $crate::style::display_level() >= $level {
            eprintln!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_stripped_without_color() {
        assert_eq!(render_tags("<red>ERROR</red>: nope", false), "ERROR: nope");
    }

    #[test]
    fn tags_rendered_with_color() {
        assert_eq!(
            render_tags("<red>E</red>", true),
            "\x1b[31mE\x1b[0m"
        );
    }

    #[test]
    fn unknown_tags_pass_through() {
        assert_eq!(render_tags("<blink>x</blink>", false), "<blink>x</blink>");
    }

    #[test]
    fn multiple_tags_in_one_line() {
        assert_eq!(
            render_tags("<comment>Usage:</comment> <cyan>app COMMAND -h</cyan>", false),
            "Usage: app COMMAND -h"
        );
    }

    #[test]
    fn console_writes_to_buffer() {
        let buf: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
        let console = Console::with_writer(buf.clone(), false);
        console.println("<green>ok</green>");
        console.styled_println("plain", Style::Error);
        assert_eq!(String::from_utf8(buf.borrow().clone()).unwrap(), "ok\nplain\n");
    }

    #[test]
    fn styled_line_colored() {
        let buf: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
        let console = Console::with_writer(buf.clone(), true);
        console.styled_println("boom", Style::Error);
        assert_eq!(
            String::from_utf8(buf.borrow().clone()).unwrap(),
            "\x1b[97;41mboom\x1b[0m\n"
        );
    }

    #[test]
    fn display_level_round_trip() {
        let prev = display_level();
        set_display_level(3);
        assert_eq!(display_level(), 3);
        set_display_level(prev);
    }
}
